//! `ember [config.json]`: open a window and render a flame.
//!
//! Drag with the left mouse button to orbit, scroll to zoom. Space pauses,
//! `r` respawns the initial population, `s` toggles the emitter's circular
//! motion. Set `RUST_LOG=debug` for more output.

mod window;

use std::process::ExitCode;

use winit::event_loop::{ControlFlow, EventLoop};

use ember::{FlameConfig, ViewerError};

fn load_config() -> FlameConfig {
    match std::env::args().nth(1) {
        Some(path) => match FlameConfig::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(e) => {
                log::warn!("Could not load config {}: {}. Using defaults.", path, e);
                FlameConfig::default()
            }
        },
        None => FlameConfig::default(),
    }
}

fn run() -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = window::App::new(load_config());
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
