//! Axis-aligned bounding boxes.
//!
//! A [`Bounds`] is stored as a center and half-size (extents), which is the
//! representation the framing math works in. Min/max corners are derived.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Half-extent used whenever a box would otherwise be degenerate.
pub const DEFAULT_EXTENTS: Vec3 = Vec3::splat(0.5);

/// An axis-aligned bounding box described by its center and extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Center of the box.
    pub center: Vec3,
    /// Half-size along each axis. Always component-wise non-negative.
    pub extents: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            extents: Vec3::ZERO,
        }
    }
}

impl Bounds {
    /// Creates a box from a center and extents.
    ///
    /// Negative extents are folded to their absolute value.
    #[must_use]
    pub fn new(center: Vec3, extents: Vec3) -> Self {
        Self {
            center,
            extents: extents.abs(),
        }
    }

    /// Creates a box from its min and max corners.
    #[must_use]
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        let lo = min.min(max);
        let hi = min.max(max);
        Self {
            center: (lo + hi) * 0.5,
            extents: (hi - lo) * 0.5,
        }
    }

    /// Creates the tightest box around a set of points.
    ///
    /// Returns `None` if the iterator is empty.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self::from_min_max(min, max))
    }

    /// The default box centered at `center`, with [`DEFAULT_EXTENTS`].
    #[must_use]
    pub fn unit_at(center: Vec3) -> Self {
        Self {
            center,
            extents: DEFAULT_EXTENTS,
        }
    }

    /// Returns the min corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    /// Returns the max corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    /// Returns the full size (twice the extents).
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.extents * 2.0
    }

    /// Largest extent over the three axes.
    #[must_use]
    pub fn max_extent(&self) -> f32 {
        self.extents.max_element()
    }

    /// Returns true if every extent is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extents == Vec3::ZERO
    }

    /// Extends the box so that it contains `point`.
    pub fn encapsulate_point(&mut self, point: Vec3) {
        *self = Self::from_min_max(self.min().min(point), self.max().max(point));
    }

    /// Extends the box so that it contains `other`.
    pub fn encapsulate(&mut self, other: &Bounds) {
        self.encapsulate_point(other.min());
        self.encapsulate_point(other.max());
    }

    /// Returns the smallest box containing both `self` and `other`.
    #[must_use]
    pub fn union(mut self, other: &Bounds) -> Self {
        self.encapsulate(other);
        self
    }

    /// Replaces every zero extent with the matching [`DEFAULT_EXTENTS`] axis.
    #[must_use]
    pub fn with_min_extents(self) -> Self {
        let extents = Vec3::select(self.extents.cmpeq(Vec3::ZERO), DEFAULT_EXTENTS, self.extents);
        Self {
            center: self.center,
            extents,
        }
    }

    /// World-space box of this (locally axis-aligned) box under `matrix`.
    ///
    /// The center is transformed as a point. Each local extent axis is
    /// transformed as a vector and the absolute components are summed per
    /// world axis, which gives the tight box for any rotation, scale or shear.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let center = matrix.transform_point3(self.center);

        let axis_x = matrix.transform_vector3(Vec3::new(self.extents.x, 0.0, 0.0)).abs();
        let axis_y = matrix.transform_vector3(Vec3::new(0.0, self.extents.y, 0.0)).abs();
        let axis_z = matrix.transform_vector3(Vec3::new(0.0, 0.0, self.extents.z)).abs();

        Self {
            center,
            extents: axis_x + axis_y + axis_z,
        }
    }

    /// The eight corners of the box.
    #[must_use]
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min(), self.max());
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }
}
