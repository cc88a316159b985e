//! Axis-aligned bounds reported by every proximity.

use nalgebra::{Point3, Vector3, center};

use crate::Frame;

/// Size reported for an axis that has no limit.
///
/// Unbounded shapes report this finite world size instead of infinity so that
/// volumes and surface areas stay comparable between shapes.
pub const UNBOUNDED_EXTENT: f32 = 1.0e6;

/// Replaces an infinite extent by [`UNBOUNDED_EXTENT`].
#[inline]
pub(crate) fn reported_extent(extent: f32) -> f32 {
    if extent.is_finite() {
        extent
    } else {
        UNBOUNDED_EXTENT
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Point3<f32>,
    /// Maximum corner.
    pub max: Point3<f32>,
}

impl Bounds {
    /// Creates bounds from two corners, sorting each axis.
    pub fn new(a: Point3<f32>, b: Point3<f32>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Creates bounds from a center and a full size per axis.
    ///
    /// Infinite sizes are reported as [`UNBOUNDED_EXTENT`].
    pub fn from_center_size(center: Point3<f32>, size: Vector3<f32>) -> Self {
        let half = size.map(|s| reported_extent(s.abs()) * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Zero-sized bounds at a point.
    pub fn singleton(point: Point3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Smallest bounds enclosing all points. Returns `None` for an empty iterator.
    pub fn around_points(points: impl IntoIterator<Item = Point3<f32>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::singleton(first);
        for point in iter {
            bounds.expand_to_cover(point);
        }
        Some(bounds)
    }

    /// Grows the bounds so that they contain `point`.
    pub fn expand_to_cover(&mut self, point: Point3<f32>) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Smallest bounds containing both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        center(&self.min, &self.max)
    }

    /// Full size per axis.
    #[inline]
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Enclosed volume.
    pub fn volume(&self) -> f32 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Total area of the six faces.
    pub fn surface_area(&self) -> f32 {
        let s = self.size();
        2.0 * (s.x * s.y + s.y * s.z + s.z * s.x)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &Point3<f32>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// The eight corners, in binary order of (x, y, z) being max.
    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// World-space bounds of these local bounds placed in `frame`.
    ///
    /// Transforms the eight corners, so the result is conservative under rotation.
    pub fn transformed<F: Frame + ?Sized>(&self, frame: &F) -> Bounds {
        let corners = self.corners();
        let mut out = Bounds::singleton(frame.to_world(&corners[0]));
        for corner in &corners[1..] {
            out.expand_to_cover(frame.to_world(corner));
        }
        out
    }
}
