//! Axis-aligned cylinder proximity.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use nalgebra::{Point2, Point3, Vector3};

use crate::bounds::reported_extent;
use crate::error::{ensure_finite, ensure_non_negative};
use crate::{Attached, Bounds, Frame, Proximity, ProximityError, Result, TriggerCollider, border};

/// Principal axis of a cylinder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// World X.
    X,
    /// World Y (vertical).
    Y,
    /// World Z.
    Z,
}

impl Axis {
    /// Component index of this axis.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Indices of the two axes perpendicular to this one, in ascending order.
    #[inline]
    pub fn planar(self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        }
    }

    /// Unit vector along the axis.
    pub fn unit(self) -> Vector3<f32> {
        let mut v = Vector3::zeros();
        v[self.index()] = 1.0;
        v
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

impl FromStr for Axis {
    type Err = ProximityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(ProximityError::InvalidAxis(s.to_string())),
        }
    }
}

/// A solid cylinder whose principal axis is one of the world axes.
///
/// Radially inclusive; along the principal axis the range is half-open,
/// `[center - height / 2, center + height / 2)`. An infinite height removes the
/// axial limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    axis: Axis,
    center: Point3<f32>,
    radius: f32,
    height: f32,
}

impl Cylinder {
    /// Creates a cylinder.
    ///
    /// The height's sign is dropped, `±inf` meaning unbounded. Off-axis center
    /// components must be finite; the on-axis component must be finite unless
    /// the height is unbounded, in which case it is zeroed.
    pub fn new(axis: Axis, center: Point3<f32>, radius: f32, height: f32) -> Result<Self> {
        let radius = ensure_non_negative("cylinder radius", radius)?;
        if height.is_nan() {
            return Err(ProximityError::NonFinite {
                what: "cylinder height",
                value: height,
            });
        }
        let height = height.abs();

        let (u, v) = axis.planar();
        ensure_finite("cylinder center", center[u])?;
        ensure_finite("cylinder center", center[v])?;

        let mut center = center;
        let a = axis.index();
        if height.is_infinite() {
            center[a] = 0.0;
        } else {
            ensure_finite("cylinder center", center[a])?;
        }

        Ok(Self {
            axis,
            center,
            radius,
            height,
        })
    }

    /// Principal axis.
    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    /// Radius.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Full height along the principal axis; infinite when unbounded.
    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Returns `true` when the height is unbounded.
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.height.is_infinite()
    }

    /// Half-open axial test on an offset from the center.
    #[inline]
    pub(crate) fn axial_contains(&self, offset: f32) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let half = self.height * 0.5;
        offset >= -half && offset < half
    }

    /// Binds the cylinder to an external frame.
    pub fn attach<'a, F: Frame + ?Sized>(&'a self, frame: &'a F) -> Attached<'a, Cylinder, F> {
        Attached::new(self, frame)
    }
}

impl Proximity for Cylinder {
    fn kind(&self) -> &'static str {
        "cylinder"
    }

    #[inline]
    fn test_point(&self, point: &Point3<f32>) -> bool {
        let d = point - self.center;
        let (u, v) = self.axis.planar();
        d[u] * d[u] + d[v] * d[v] <= self.radius * self.radius
            && self.axial_contains(d[self.axis.index()])
    }

    fn test_point_2d(&self, point: &Point2<f32>) -> bool {
        let dx = point.x - self.center.x;
        let dz = point.y - self.center.z;
        match self.axis {
            Axis::Y => dx * dx + dz * dz <= self.radius * self.radius,
            Axis::X => self.axial_contains(dx) && dz.abs() <= self.radius,
            Axis::Z => dx.abs() <= self.radius && self.axial_contains(dz),
        }
    }

    fn bounding_box(&self) -> Bounds {
        let mut size = Vector3::repeat(2.0 * self.radius);
        size[self.axis.index()] = self.height;
        Bounds::from_center_size(self.center, size)
    }

    fn volume(&self) -> f32 {
        PI * self.radius * self.radius * reported_extent(self.height)
    }

    fn surface_area(&self) -> f32 {
        2.0 * PI * self.radius * (self.radius + reported_extent(self.height))
    }

    fn nearest_border_point(&self, point: &Point3<f32>) -> Result<Point3<f32>> {
        Ok(border::cylinder(self, point))
    }

    fn trigger_collider(&self) -> Result<TriggerCollider> {
        Ok(TriggerCollider::Capsule {
            center: self.center,
            axis: self.axis,
            half_height: reported_extent(self.height) * 0.5,
            radius: self.radius,
        })
    }
}
