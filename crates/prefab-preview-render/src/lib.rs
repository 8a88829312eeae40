//! Rendering backend for prefab-preview.
//!
//! This crate provides:
//! - The [`OffscreenRenderer`] trait captures are written against
//! - A reusable render-target pool
//! - [`PreviewCamera`] view and projection
//! - [`HeadlessRenderer`], a wgpu implementation with CPU readback
//! - [`PreviewImage`] output and encoding

pub mod camera;
pub mod error;
pub mod headless;
pub mod pixels;
pub mod renderer;
pub mod target;

pub use camera::PreviewCamera;
pub use error::{RenderError, RenderResult};
pub use headless::{depth_format, HeadlessRenderer, COLOR_FORMAT};
pub use pixels::{color_to_rgba8, PixelBuffer, PreviewImage};
pub use renderer::{visible_renderers, DrawItem, OffscreenRenderer, ScopedTarget};
pub use target::{TargetDescriptor, TargetId, TargetPool};
