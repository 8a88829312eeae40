//! Preview camera.

use glam::{Mat4, Vec3};
use prefab_preview_core::{CameraFrame, PreviewOptions, ProjectionMode};

/// A camera for rendering a preview.
///
/// Owned by a single capture; nothing here is shared between captures.
#[derive(Debug, Clone)]
pub struct PreviewCamera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Viewing direction (unit length).
    pub forward: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Projection mode.
    pub projection_mode: ProjectionMode,
    /// Orthographic half-height (used when `projection_mode` is Orthographic).
    pub ortho_size: f32,
    /// Bit mask of the layers this camera renders.
    pub culling_mask: u32,
    /// Clear color (RGB, 0..1).
    pub background_color: Vec3,
}

impl PreviewCamera {
    /// Creates a new camera with default settings.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_3,
            aspect_ratio,
            near: 0.01,
            far: 1000.0,
            projection_mode: ProjectionMode::Perspective,
            ortho_size: 1.0,
            culling_mask: u32::MAX,
            background_color: Vec3::splat(0.94),
        }
    }

    /// Creates a camera configured from capture options.
    ///
    /// The camera renders only the preview layer.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_options(options: &PreviewOptions) -> Self {
        let mut camera = Self::new(options.width as f32 / options.height.max(1) as f32);
        camera.set_fov(options.fov_radians());
        camera.near = options.near.max(0.0001);
        camera.far = options.far.max(camera.near + 0.1);
        camera.forward = options.camera_forward.try_normalize().unwrap_or(Vec3::NEG_Z);
        camera.up = options.camera_up.try_normalize().unwrap_or(Vec3::Y);
        camera.projection_mode = options.projection;
        camera.background_color = options.background_color;
        camera.set_culling_layer(options.preview_layer);
        camera
    }

    /// Places the camera according to a computed frame.
    pub fn apply_frame(&mut self, frame: &CameraFrame) {
        self.position = frame.position;
        self.forward = frame.forward;
        self.ortho_size = frame.view_size.max(0.0001);
    }

    /// Restricts rendering to a single layer.
    pub fn set_culling_layer(&mut self, layer: u8) {
        self.culling_mask = 1u32 << u32::from(layer.min(31));
    }

    /// Returns true if nodes on `layer` are rendered by this camera.
    #[must_use]
    pub fn renders_layer(&self, layer: u8) -> bool {
        layer < 32 && self.culling_mask & (1u32 << u32::from(layer)) != 0
    }

    /// Sets the field of view in radians.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov.clamp(0.01, std::f32::consts::PI - 0.01);
    }

    /// Up vector that is not parallel to the forward direction.
    fn effective_up(&self) -> Vec3 {
        if self.forward.cross(self.up).length_squared() > 1e-8 {
            self.up
        } else if self.forward.cross(Vec3::Z).length_squared() > 1e-8 {
            Vec3::Z
        } else {
            Vec3::X
        }
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.effective_up())
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection_mode {
            ProjectionMode::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_height = self.ortho_size;
                let half_width = half_height * self.aspect_ratio;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for PreviewCamera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prefab_preview_core::{compute_frame, Bounds};

    #[test]
    fn test_from_options() {
        let opts = PreviewOptions::default();
        let camera = PreviewCamera::from_options(&opts);
        assert_eq!(camera.aspect_ratio, 1.0);
        assert!((camera.fov - 60f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.culling_mask, 1);
        assert!(camera.renders_layer(0));
        assert!(!camera.renders_layer(3));
    }

    #[test]
    fn test_framed_center_projects_to_middle() {
        let bounds = Bounds::new(Vec3::new(0.0, 1000.0, 0.0), Vec3::new(1.0, 2.0, 0.5));
        let frame = compute_frame(&bounds, std::f32::consts::FRAC_PI_3, Vec3::NEG_Z);
        let mut camera = PreviewCamera::new(1.0);
        camera.apply_frame(&frame);

        let clip = camera.view_projection_matrix() * bounds.center.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_projection_mode_orthographic() {
        let mut camera = PreviewCamera::new(1.0);
        camera.projection_mode = ProjectionMode::Orthographic;
        camera.ortho_size = 5.0;
        let proj = camera.projection_matrix();
        assert!((proj.w_axis.w - 1.0).abs() < 0.001);
        assert!((proj.y_axis.y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_forward_parallel_to_up() {
        let mut camera = PreviewCamera::new(1.0);
        camera.forward = Vec3::NEG_Y;
        let view = camera.view_matrix();
        assert!(view.is_finite());
    }

    #[test]
    fn test_set_fov_clamping() {
        let mut camera = PreviewCamera::new(1.0);
        camera.set_fov(0.0);
        assert!(camera.fov > 0.0);
        camera.set_fov(std::f32::consts::PI);
        assert!(camera.fov < std::f32::consts::PI);
    }
}
