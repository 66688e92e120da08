//! GPU side of the emitter: buffers, textures and the two pipelines.

mod camera;
mod particle_store;
mod random_texture;
mod render;
mod simulation;
mod sprite;

pub use camera::Camera;
pub use particle_store::{BufferPair, CaptureCounter, ParticleStore, INSTANCE_COUNT_OFFSET, QUAD_VERTICES};
pub use random_texture::RandomTexture;
pub use render::{instance_attributes, RenderStage, RenderUniforms, ADDITIVE_BLEND};
pub use simulation::{SimUniforms, SimulationStage};
pub use sprite::{create_sprite_sampler, SpriteTexture};

use crate::error::GpuError;

/// Threads per simulation workgroup. Must match `@workgroup_size` in the update shader.
pub const WORKGROUP_SIZE: u32 = 64;

/// Route validation errors (shader compilation included) to the log.
pub fn log_uncaptured_errors(device: &wgpu::Device) {
    device.on_uncaptured_error(Box::new(|error: wgpu::Error| {
        log::error!("wgpu error: {}", error);
    }));
}

/// Prefer an sRGB surface format, else the first one offered.
pub fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Result<wgpu::TextureFormat, GpuError> {
    formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first())
        .copied()
        .ok_or(GpuError::NoSurfaceFormat)
}

/// Request an adapter and device compatible with `surface`.
pub async fn request_device(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), GpuError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(GpuError::NoAdapter)?;

    let info = adapter.get_info();
    log::info!("Using adapter {} ({:?})", info.name, info.backend);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await?;

    log_uncaptured_errors(&device);
    Ok((adapter, device, queue))
}
