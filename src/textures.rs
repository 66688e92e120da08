//! Sprite images for the render stage.
//!
//! The flame is drawn with two sprites: the spark (texture slot 0) and the
//! start/flare sprite (texture slot 1). Each comes either from an image file
//! or, when no path is configured, from a generated soft radial falloff.
//!
//! # Channel mapping
//!
//! | Decoded channels | Upload format  |
//! |------------------|----------------|
//! | 1                | `R8Unorm`      |
//! | 3                | `Rgba8Unorm` (alpha filled with 255) |
//! | 4                | `Rgba8Unorm`   |
//! | anything else    | converted to RGBA8 |
//!
//! Sprites are drawn much smaller than their source images, so each one is
//! uploaded with a full mip chain built by [`SpriteImage::mip_chain`].
//!
//! A file that fails to decode is logged and replaced by a 1x1 texture of
//! zeros, so a missing asset never aborts emitter construction.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, GrayImage, RgbaImage};

use crate::error::TextureError;

/// Pixel layout of a decoded sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteFormat {
    /// Single channel, sampled as `(r, 0, 0, 1)`.
    R8,
    /// Four channels.
    Rgba8,
}

impl SpriteFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            SpriteFormat::R8 => 1,
            SpriteFormat::Rgba8 => 4,
        }
    }

    pub fn wgpu_format(self) -> wgpu::TextureFormat {
        match self {
            SpriteFormat::R8 => wgpu::TextureFormat::R8Unorm,
            SpriteFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// CPU-side sprite pixels ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: SpriteFormat,
}

impl SpriteImage {
    /// Decode an image file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let img = image::open(path.as_ref())?;
        Ok(Self::from_dynamic(img))
    }

    /// Map a decoded image onto one of the two upload formats.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        match img.color() {
            ColorType::L8 => Self {
                data: img.into_luma8().into_raw(),
                width,
                height,
                format: SpriteFormat::R8,
            },
            _ => Self {
                data: img.into_rgba8().into_raw(),
                width,
                height,
                format: SpriteFormat::Rgba8,
            },
        }
    }

    /// 1x1 texture of zeros.
    pub fn zero() -> Self {
        Self {
            data: vec![0; 4],
            width: 1,
            height: 1,
            format: SpriteFormat::Rgba8,
        }
    }

    /// Soft round sprite: white with alpha falling off from the centre.
    ///
    /// `sharpness` raises the falloff curve; higher values give a smaller
    /// bright core.
    pub fn soft_disc(size: u32, sharpness: f32) -> Self {
        let size = size.max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        let centre = (size as f32 - 1.0) * 0.5;
        let radius = (size as f32 * 0.5).max(0.5);
        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 - centre) / radius;
                let dy = (y as f32 - centre) / radius;
                let d = (dx * dx + dy * dy).sqrt();
                let falloff = (1.0 - d).clamp(0.0, 1.0).powf(sharpness);
                data.extend_from_slice(&[255, 255, 255, (falloff * 255.0).round() as u8]);
            }
        }
        Self {
            data,
            width: size,
            height: size,
            format: SpriteFormat::Rgba8,
        }
    }

    /// Number of levels in a full mip chain down to 1x1.
    pub fn mip_level_count(&self) -> u32 {
        32 - self.width.max(self.height).max(1).leading_zeros()
    }

    /// This image followed by successively halved, triangle-filtered levels.
    ///
    /// Stops early (with a warning) if the pixel data does not match the
    /// image's dimensions.
    pub fn mip_chain(&self) -> Vec<SpriteImage> {
        let mut levels = vec![self.clone()];
        for level in 1..self.mip_level_count() {
            let width = (self.width >> level).max(1);
            let height = (self.height >> level).max(1);
            let Some(next) = levels.last().and_then(|prev| prev.resized(width, height)) else {
                log::warn!("Sprite data does not match {}x{}; mips stop at level {}", self.width, self.height, level);
                break;
            };
            levels.push(next);
        }
        levels
    }

    fn resized(&self, width: u32, height: u32) -> Option<SpriteImage> {
        let data = match self.format {
            SpriteFormat::R8 => {
                let img = GrayImage::from_raw(self.width, self.height, self.data.clone())?;
                imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
            }
            SpriteFormat::Rgba8 => {
                let img = RgbaImage::from_raw(self.width, self.height, self.data.clone())?;
                imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
            }
        };
        Some(SpriteImage {
            data,
            width,
            height,
            format: self.format,
        })
    }

    /// Load `path` if given, otherwise generate a soft disc.
    ///
    /// Decode failures are logged and yield [`SpriteImage::zero`].
    pub fn load_or_default(path: Option<&Path>, sharpness: f32) -> Self {
        match path {
            Some(path) => match Self::from_file(path) {
                Ok(img) => {
                    log::debug!(
                        "Loaded sprite {} ({}x{}, {:?})",
                        path.display(),
                        img.width,
                        img.height,
                        img.format
                    );
                    img
                }
                Err(e) => {
                    log::error!("Failed to load sprite {}: {}", path.display(), e);
                    Self::zero()
                }
            },
            None => Self::soft_disc(64, sharpness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_single_channel_stays_r8() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 3, image::Luma([7])));
        let sprite = SpriteImage::from_dynamic(img);
        assert_eq!(sprite.format, SpriteFormat::R8);
        assert_eq!(sprite.data.len(), 6);
        assert_eq!((sprite.width, sprite.height), (2, 3));
    }

    #[test]
    fn test_rgb_expands_to_rgba() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30])));
        let sprite = SpriteImage::from_dynamic(img);
        assert_eq!(sprite.format, SpriteFormat::Rgba8);
        assert_eq!(&sprite.data[..4], &[10, 20, 30, 255]);
        assert_eq!(sprite.data.len(), 16);
    }

    #[test]
    fn test_rgba_is_kept() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, image::Rgba([1, 2, 3, 4])));
        assert_eq!(SpriteImage::from_dynamic(img).data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_missing_file_is_an_image_error() {
        let err = SpriteImage::from_file("does/not/exist.png").unwrap_err();
        assert!(matches!(err, TextureError::ImageLoad(image::ImageError::IoError(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_zero() {
        let sprite = SpriteImage::load_or_default(Some(Path::new("does/not/exist.png")), 2.0);
        assert_eq!(sprite, SpriteImage::zero());
    }

    #[test]
    fn test_soft_disc_fades_out() {
        let sprite = SpriteImage::soft_disc(16, 2.0);
        let alpha = |x: u32, y: u32| sprite.data[((y * 16 + x) * 4 + 3) as usize];
        assert!(alpha(8, 8) > 200);
        assert_eq!(alpha(0, 0), 0);
    }

    #[test]
    fn test_mip_chain_halves_down_to_one_pixel() {
        let sprite = SpriteImage::soft_disc(256, 2.0);
        assert_eq!(sprite.mip_level_count(), 9);
        let chain = sprite.mip_chain();
        assert_eq!(chain.len(), 9);
        for (level, img) in chain.iter().enumerate() {
            let side = 256 >> level;
            assert_eq!((img.width, img.height), (side, side));
            assert_eq!(img.data.len(), (side * side * 4) as usize);
            assert_eq!(img.format, SpriteFormat::Rgba8);
        }
    }

    #[test]
    fn test_mip_chain_keeps_single_channel() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 2, image::Luma([200])));
        let chain = SpriteImage::from_dynamic(img).mip_chain();
        let sizes: Vec<(u32, u32)> = chain.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, [(8, 2), (4, 1), (2, 1), (1, 1)]);
        assert!(chain.iter().all(|l| l.format == SpriteFormat::R8));
        assert_eq!(chain[3].data, vec![200]);
    }

    #[test]
    fn test_zero_texture_has_single_level() {
        assert_eq!(SpriteImage::zero().mip_chain(), vec![SpriteImage::zero()]);
    }
}
