//! Axis-aligned box with optionally unbounded axes.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{ensure_finite, ensure_non_negative};
use crate::{Attached, Bounds, Frame, Proximity, ProximityError, Result, border};

/// An axis-aligned box given by its center and full size per axis.
///
/// A size of `f32::INFINITY` makes that axis unbounded: every coordinate
/// passes on it. Faces are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    center: Point3<f32>,
    size: Vector3<f32>,
}

const AXIS_NAMES: [&str; 3] = ["box center x", "box center y", "box center z"];
const SIZE_NAMES: [&str; 3] = ["box size x", "box size y", "box size z"];

impl Cuboid {
    /// Creates a box from its center and full size.
    ///
    /// Each size component must be finite and non-negative or `+inf`. The center
    /// must be finite on every bounded axis; it is zeroed on unbounded axes.
    pub fn new(center: Point3<f32>, size: Vector3<f32>) -> Result<Self> {
        let mut center = center;
        for i in 0..3 {
            if size[i] == f32::INFINITY {
                center[i] = 0.0;
            } else {
                ensure_non_negative(SIZE_NAMES[i], size[i])?;
                ensure_finite(AXIS_NAMES[i], center[i])?;
            }
        }
        Ok(Self { center, size })
    }

    /// Creates a bounded box spanning two corners.
    pub fn from_corners(a: Point3<f32>, b: Point3<f32>) -> Result<Self> {
        let bounds = Bounds::new(a, b);
        Self::new(bounds.center(), bounds.size())
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    /// Full size per axis; unbounded axes are infinite.
    #[inline]
    pub fn size(&self) -> Vector3<f32> {
        self.size
    }

    /// Returns `true` if `axis` (0 = X, 1 = Y, 2 = Z) has no limit.
    #[inline]
    pub fn is_unbounded(&self, axis: usize) -> bool {
        self.size[axis].is_infinite()
    }

    #[inline]
    fn axis_contains(&self, axis: usize, value: f32) -> bool {
        self.is_unbounded(axis) || (value - self.center[axis]).abs() <= self.size[axis] * 0.5
    }

    /// Binds the box to an external frame.
    pub fn attach<'a, F: Frame + ?Sized>(&'a self, frame: &'a F) -> Attached<'a, Cuboid, F> {
        Attached::new(self, frame)
    }
}

impl Proximity for Cuboid {
    fn kind(&self) -> &'static str {
        "box"
    }

    #[inline]
    fn test_point(&self, point: &Point3<f32>) -> bool {
        self.axis_contains(0, point.x)
            && self.axis_contains(1, point.y)
            && self.axis_contains(2, point.z)
    }

    #[inline]
    fn test_point_2d(&self, point: &Point2<f32>) -> bool {
        self.axis_contains(0, point.x) && self.axis_contains(2, point.y)
    }

    fn bounding_box(&self) -> Bounds {
        Bounds::from_center_size(self.center, self.size)
    }

    fn volume(&self) -> f32 {
        self.bounding_box().volume()
    }

    fn surface_area(&self) -> f32 {
        self.bounding_box().surface_area()
    }

    fn nearest_border_point(&self, point: &Point3<f32>) -> Result<Point3<f32>> {
        border::cuboid(self, point).ok_or(ProximityError::NoBorder)
    }
}
