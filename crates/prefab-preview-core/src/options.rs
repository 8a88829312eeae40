//! Configuration options for preview capture.

use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transform::euler_degrees_to_quat;

/// How the subject is staged for capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Capture a transient copy with non-builtin behaviours stripped.
    #[default]
    Instantiate,
    /// Capture the subject itself, restoring its state afterwards.
    InPlace,
}

/// Camera projection used for the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Perspective projection; the framing distance keeps the object in view.
    #[default]
    Perspective,
    /// Orthographic projection with the framing view size as half-height.
    Orthographic,
}

/// Options controlling how previews are captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewOptions {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Depth buffer precision in bits.
    pub depth_bits: u32,
    /// World position the subject is staged at, away from the working area.
    pub staging_position: Vec3,
    /// Staging rotation as Euler angles in degrees (Z, then X, then Y).
    pub staging_rotation_degrees: Vec3,
    /// Local scale applied to the staged subject.
    pub preview_scale: Vec3,
    /// Background color (RGB, 0..1).
    pub background_color: Vec3,
    /// Layer the staged subject is moved to and the camera renders.
    pub preview_layer: u8,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Fixed camera forward direction.
    pub camera_forward: Vec3,
    /// Camera up direction.
    pub camera_up: Vec3,
    /// Projection mode.
    pub projection: ProjectionMode,
    /// Staging mode.
    pub capture_mode: CaptureMode,
    /// Behaviour type-path prefixes that survive stripping in
    /// [`CaptureMode::Instantiate`].
    pub builtin_namespaces: Vec<String>,
}

/// Default background: light gray.
pub const DEFAULT_BACKGROUND: Vec3 = Vec3::splat(0.94);

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            depth_bits: 24,
            staging_position: Vec3::new(0.0, 1000.0, 0.0),
            staging_rotation_degrees: Vec3::new(26.0, 135.0, -24.0),
            preview_scale: Vec3::ONE,
            background_color: DEFAULT_BACKGROUND,
            preview_layer: 0,
            fov_degrees: 60.0,
            near: 0.01,
            far: 1000.0,
            camera_forward: Vec3::NEG_Z,
            camera_up: Vec3::Y,
            projection: ProjectionMode::Perspective,
            capture_mode: CaptureMode::Instantiate,
            builtin_namespaces: vec!["engine::".to_string()],
        }
    }
}

impl PreviewOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    /// Sets the background color.
    #[must_use]
    pub fn with_background(mut self, color: Vec3) -> Self {
        self.background_color = color;
        self
    }

    /// Sets the staging mode.
    #[must_use]
    pub fn with_capture_mode(mut self, mode: CaptureMode) -> Self {
        self.capture_mode = mode;
        self
    }

    /// Sets the projection mode.
    #[must_use]
    pub fn with_projection(mut self, projection: ProjectionMode) -> Self {
        self.projection = projection;
        self
    }

    /// Sets the field of view in degrees.
    #[must_use]
    pub fn with_fov_degrees(mut self, degrees: f32) -> Self {
        self.fov_degrees = degrees.clamp(1.0, 179.0);
        self
    }

    /// Sets the staging pose.
    #[must_use]
    pub fn with_staging(mut self, position: Vec3, rotation_degrees: Vec3) -> Self {
        self.staging_position = position;
        self.staging_rotation_degrees = rotation_degrees;
        self
    }

    /// Staging rotation as a quaternion.
    #[must_use]
    pub fn staging_rotation(&self) -> Quat {
        euler_degrees_to_quat(self.staging_rotation_degrees)
    }

    /// Field of view in radians.
    #[must_use]
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    /// Parses options from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = PreviewOptions::default();
        assert_eq!((opts.width, opts.height), (256, 256));
        assert_eq!(opts.depth_bits, 24);
        assert_eq!(opts.background_color, Vec3::splat(0.94));
        assert_eq!(opts.capture_mode, CaptureMode::Instantiate);
        assert_eq!(opts.projection, ProjectionMode::Perspective);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let opts = PreviewOptions::from_json_str(
            r#"{ "width": 128, "capture_mode": "in_place", "background_color": [0.0, 0.0, 0.0] }"#,
        )
        .unwrap();
        assert_eq!(opts.width, 128);
        assert_eq!(opts.height, 256);
        assert_eq!(opts.capture_mode, CaptureMode::InPlace);
        assert_eq!(opts.background_color, Vec3::ZERO);
        assert_eq!(opts.builtin_namespaces, vec!["engine::".to_string()]);
    }

    #[test]
    fn test_builder() {
        let opts = PreviewOptions::new()
            .with_size(0, 64)
            .with_fov_degrees(500.0)
            .with_projection(ProjectionMode::Orthographic);
        assert_eq!((opts.width, opts.height), (1, 64));
        assert_eq!(opts.fov_degrees, 179.0);
        assert_eq!(opts.projection, ProjectionMode::Orthographic);
    }
}
