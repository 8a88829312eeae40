//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// The render target id is not currently acquired.
    #[error("render target {0} is not acquired")]
    UnknownTarget(u64),

    /// A render target was requested with a zero dimension.
    #[error("invalid render target size {width}x{height}")]
    InvalidTargetSize { width: u32, height: u32 },

    /// Mapping the readback buffer failed.
    #[error("GPU buffer mapping failed")]
    BufferMapFailed,

    /// Pixel data does not match the declared dimensions.
    #[error("invalid image data")]
    InvalidImageData,

    /// Unsupported output file extension.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Image encoding error.
    #[error("image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
