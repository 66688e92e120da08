//! Viewer window: surface setup, input handling and the frame loop.

use std::sync::Arc;

use glam::Vec3;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use ember::gpu::{self, Camera};
use ember::time::Time;
use ember::{Flame, FlameConfig, GpuError, ViewerError};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.01,
    g: 0.01,
    b: 0.02,
    a: 1.0,
};

/// Radius of the emitter's circular path.
const SWING_RADIUS: f32 = 0.3;
/// Angular speed of the emitter, radians per second.
const SWING_SPEED: f32 = 1.5;

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub flame: Flame,
    pub camera: Camera,
    pub time: Time,
    swing: bool,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, flame_config: FlameConfig) -> Result<Self, ViewerError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window).map_err(GpuError::from)?;
        let (adapter, device, queue) = gpu::request_device(&instance, Some(&surface)).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = gpu::pick_surface_format(&surface_caps.formats)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut flame = Flame::new(&device, &queue, surface_format, flame_config)?;
        flame.set_viewport(config.width, config.height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            flame,
            camera: Camera::new(),
            time: Time::new(),
            swing: true,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.flame.set_viewport(new_size.width, new_size.height);
        }
    }

    /// Steer the emitter along a circle so the trail stays in view.
    fn steer(&mut self) {
        if !self.swing {
            return;
        }
        let phase = self.time.elapsed_ms() * 0.001 * SWING_SPEED;
        let speed = SWING_RADIUS * SWING_SPEED;
        self.flame
            .set_velocity(Vec3::new(-phase.sin() * speed, 0.0, phase.cos() * speed));
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let delta_ms = self.time.update();
        self.steer();
        self.flame.update(delta_ms);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let _clear = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        let aspect = self.config.width as f32 / self.config.height as f32;
        let view_matrix = self.camera.view_matrix();
        let projection = self.camera.projection_matrix(aspect);
        self.flame
            .render(&self.queue, &mut encoder, &view, delta_ms, view_matrix, projection);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if delta_ms > 0.0 && self.time.frame() % 600 == 0 {
            log::debug!("{:.1} fps", self.time.fps());
        }
        Ok(())
    }

    fn handle_key(&mut self, key: &Key) {
        match key {
            Key::Named(NamedKey::Space) => self.time.toggle_pause(),
            Key::Character(c) if c.as_str() == "r" => self.flame.reset(&self.queue),
            Key::Character(c) if c.as_str() == "s" => {
                self.swing = !self.swing;
                if !self.swing {
                    self.flame.set_velocity(self.flame.config().velocity);
                }
            }
            _ => {}
        }
    }
}

pub struct App {
    flame_config: FlameConfig,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    error: Option<ViewerError>,
}

impl App {
    pub fn new(flame_config: FlameConfig) -> Self {
        Self {
            flame_config,
            window: None,
            gpu_state: None,
            mouse_pressed: false,
            last_mouse_pos: None,
            error: None,
        }
    }

    /// The error that stopped the viewer, if any.
    pub fn take_error(&mut self) -> Option<ViewerError> {
        self.error.take()
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title("Ember")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());
        self.gpu_state = Some(pollster::block_on(GpuState::new(window, self.flame_config.clone()))?);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if logical_key == Key::Named(NamedKey::Escape) {
                    event_loop.exit();
                } else if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.handle_key(&logical_key);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = position.x - last_x;
                        let dy = position.y - last_y;
                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.camera.orbit(-dx as f32 * 0.005, dy as f32 * 0.005);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    match gpu_state.render() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(winit::dpi::PhysicalSize {
                                width: gpu_state.config.width,
                                height: gpu_state.config.height,
                            })
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Surface out of memory, exiting");
                            event_loop.exit();
                        }
                        Err(e) => log::warn!("Render error: {:?}", e),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
