//! Automatic camera framing.

use glam::Vec3;

use crate::bounds::Bounds;

/// Camera placement derived from a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    /// World-space camera position.
    pub position: Vec3,
    /// Camera forward direction (unit length).
    pub forward: Vec3,
    /// Point the camera looks at (the bounds center).
    pub target: Vec3,
    /// Distance from `position` to `target`.
    pub distance: f32,
    /// Largest half-extent of the bounds; used as orthographic half-height.
    pub view_size: f32,
}

/// Frames `bounds` for a camera with vertical field of view `fov` (radians)
/// looking along `forward`.
///
/// The camera is pulled back from the bounds center along `-forward` far
/// enough that a cone of half-angle `fov / 2` spans the largest half-extent.
/// A zero `forward` falls back to `-Z`.
#[must_use]
pub fn compute_frame(bounds: &Bounds, fov: f32, forward: Vec3) -> CameraFrame {
    let forward = forward.try_normalize().unwrap_or(Vec3::NEG_Z);
    let obj_size = bounds.max_extent();
    let distance = (obj_size / (fov / 2.0).sin()).abs();

    log::debug!(
        "framing bounds center={:?} size={obj_size} at distance {distance}",
        bounds.center
    );

    CameraFrame {
        position: bounds.center - distance * forward,
        forward,
        target: bounds.center,
        distance,
        view_size: obj_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ninety_degree_fov() {
        let bounds = Bounds::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 2.0, 1.0));
        let frame = compute_frame(&bounds, std::f32::consts::FRAC_PI_2, Vec3::NEG_Z);

        let expected = 2.0 / std::f32::consts::FRAC_PI_4.sin();
        assert!((frame.distance - expected).abs() < 1e-4);
        assert!((frame.distance - 2.828_427).abs() < 1e-3);
        assert!((frame.position - Vec3::new(1.0, 2.0, 3.0 + expected)).length() < 1e-4);
        assert_eq!(frame.view_size, 2.0);
        assert_eq!(frame.target, bounds.center);
    }

    #[test]
    fn test_negative_fov_gives_positive_distance() {
        let bounds = Bounds::new(Vec3::ZERO, Vec3::ONE);
        let frame = compute_frame(&bounds, -std::f32::consts::FRAC_PI_2, Vec3::Z);
        assert!(frame.distance > 0.0);
        assert!(frame.position.z < 0.0);
    }

    #[test]
    fn test_forward_is_normalized() {
        let bounds = Bounds::new(Vec3::ZERO, Vec3::ONE);
        let frame = compute_frame(&bounds, 1.0, Vec3::new(0.0, 0.0, -4.0));
        assert!((frame.forward.length() - 1.0).abs() < 1e-6);
        assert!((frame.position.distance(bounds.center) - frame.distance).abs() < 1e-4);
    }

    #[test]
    fn test_zero_forward_falls_back() {
        let frame = compute_frame(&Bounds::unit_at(Vec3::ZERO), 1.0, Vec3::ZERO);
        assert_eq!(frame.forward, Vec3::NEG_Z);
    }
}
