//! Error types for Ember.
//!
//! This module provides error types for GPU initialization, texture loading,
//! configuration and emitter construction.

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// The surface reports no texture formats for the chosen adapter.
    #[error("The window surface supports no texture formats on this adapter")]
    NoSurfaceFormat,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors that can occur during texture decoding.
///
/// These never abort emitter construction: the loader logs them and falls
/// back to a zero texture.
#[derive(Debug, Error)]
pub enum TextureError {
    /// Failed to open or decode the image file.
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),
}

/// Errors that can occur when loading or validating a [`FlameConfig`](crate::FlameConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("Invalid flame config: {0}")]
    Invalid(String),
}

/// Errors that can occur when building a flame emitter.
#[derive(Debug, Error)]
pub enum FlameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The random source needs at least one texel.
    #[error("Random table must contain at least one texel")]
    EmptyRandomTable,
}

/// Errors that can occur when running the viewer.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Failed to create event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("Flame error: {0}")]
    Flame(#[from] FlameError),
}
