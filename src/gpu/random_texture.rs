//! Upload of the random table as a 1-D texture.

use crate::random::RandomTable;

/// The random table on the GPU: a read-only `Rgba32Float` 1-D texture.
///
/// The update shader reads it with `textureLoad` and filters by hand, so no
/// sampler is needed (32-bit float formats are not filterable by default).
pub struct RandomTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    texels: u32,
}

impl RandomTexture {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, table: &RandomTable) -> Self {
        let texels = table.len() as u32;
        let size = wgpu::Extent3d {
            width: texels,
            height: 1,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Random Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D1,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let rgba = table.to_rgba();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&rgba),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(16 * texels),
                rows_per_image: Some(1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Random Texture View"),
            dimension: Some(wgpu::TextureViewDimension::D1),
            ..Default::default()
        });

        Self {
            texture,
            view,
            texels,
        }
    }

    pub fn texels(&self) -> u32 {
        self.texels
    }
}
