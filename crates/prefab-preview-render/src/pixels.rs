//! Pixel buffers and preview images.

use std::path::Path;

use glam::{Vec2, Vec3};
use image::{ImageBuffer, RgbaImage};

use crate::error::{RenderError, RenderResult};

/// Raw RGBA8 pixels, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw RGBA8 data. Fails if the length does not match the size.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> RenderResult<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(RenderError::InvalidImageData);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer filled with a single color.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: rgba.repeat(count),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the pixel at (x, y), or `None` when out of range.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Converts into an `image` buffer.
    pub fn into_image(self) -> RenderResult<RgbaImage> {
        ImageBuffer::from_raw(self.width, self.height, self.data).ok_or(RenderError::InvalidImageData)
    }
}

/// Converts an RGB color in 0..1 to opaque RGBA8.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn color_to_rgba8(color: Vec3) -> [u8; 4] {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, 255]
}

/// A displayable preview image with a normalized pivot.
#[derive(Debug, Clone)]
pub struct PreviewImage {
    image: RgbaImage,
    pivot: Vec2,
}

impl PreviewImage {
    /// Wraps pixels as an image pivoted at its center.
    pub fn from_pixels(pixels: PixelBuffer) -> RenderResult<Self> {
        Ok(Self {
            image: pixels.into_image()?,
            pivot: Vec2::splat(0.5),
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Normalized anchor point within the image.
    #[must_use]
    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    /// Full-image rectangle as (x, y, width, height).
    #[must_use]
    pub fn rect(&self) -> (u32, u32, u32, u32) {
        (0, 0, self.width(), self.height())
    }

    /// Returns the pixel at (x, y).
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Borrows the underlying image.
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Returns the underlying image.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Saves the image. The format follows the extension (.png, .jpg, .jpeg).
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "png" => {
                self.image.save_with_format(path, image::ImageFormat::Png)?;
            }
            "jpg" | "jpeg" => {
                // JPEG has no alpha channel
                let rgb = image::DynamicImage::ImageRgba8(self.image.clone()).to_rgb8();
                rgb.save_with_format(path, image::ImageFormat::Jpeg)?;
            }
            _ => {
                return Err(RenderError::UnsupportedFormat(extension));
            }
        }
        Ok(())
    }

    /// Encodes the image as PNG in memory.
    pub fn to_png_bytes(&self) -> RenderResult<Vec<u8>> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        self.image.write_to(&mut buffer, image::ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

impl From<PreviewImage> for RgbaImage {
    fn from(preview: PreviewImage) -> Self {
        preview.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_buffer_size_checked() {
        assert!(PixelBuffer::new(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            PixelBuffer::new(2, 2, vec![0; 15]),
            Err(RenderError::InvalidImageData)
        ));
    }

    #[test]
    fn test_filled_and_pixel() {
        let buf = PixelBuffer::filled(3, 2, [1, 2, 3, 4]);
        assert_eq!(buf.as_bytes().len(), 24);
        assert_eq!(buf.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(buf.pixel(3, 0), None);
    }

    #[test]
    fn test_color_to_rgba8() {
        assert_eq!(color_to_rgba8(Vec3::splat(0.94)), [240, 240, 240, 255]);
        assert_eq!(color_to_rgba8(Vec3::new(-1.0, 2.0, 0.5)), [0, 255, 128, 255]);
    }

    #[test]
    fn test_preview_image_pivot_and_png() {
        let image = PreviewImage::from_pixels(PixelBuffer::filled(4, 4, [10, 20, 30, 255])).unwrap();
        assert_eq!(image.pivot(), Vec2::new(0.5, 0.5));
        assert_eq!(image.rect(), (0, 0, 4, 4));
        assert_eq!(image.pixel(1, 1), Some([10, 20, 30, 255]));
        let png = image.to_png_bytes().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_unsupported_extension() {
        let image = PreviewImage::from_pixels(PixelBuffer::filled(1, 1, [0; 4])).unwrap();
        assert!(matches!(
            image.save("preview.bmpx"),
            Err(RenderError::UnsupportedFormat(_))
        ));
    }
}
