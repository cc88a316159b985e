//! The common proximity contract.

use std::fmt;

use nalgebra::{Point2, Point3};

use crate::{Bounds, ProximityError, Result, TriggerCollider};

/// A region of space that points can be tested against.
///
/// All queries are pure: they never mutate the proximity and can be evaluated
/// concurrently as long as any attached frame is not being mutated.
///
/// `Point2` arguments hold horizontal coordinates: `x` is world X and `y` is
/// world Z. Y is the vertical axis.
pub trait Proximity: fmt::Debug {
    /// Short, human-readable name of the shape family.
    fn kind(&self) -> &'static str;

    /// Returns `true` if the point lies inside the region.
    fn test_point(&self, point: &Point3<f32>) -> bool;

    /// Returns `true` if the vertical line through the horizontal point meets
    /// the region, i.e. the point lies inside the region's XZ projection.
    fn test_point_2d(&self, point: &Point2<f32>) -> bool;

    /// Axis-aligned bounds. Unbounded axes report [`UNBOUNDED_EXTENT`](crate::UNBOUNDED_EXTENT).
    fn bounding_box(&self) -> Bounds;

    /// Enclosed volume.
    fn volume(&self) -> f32;

    /// Area of the boundary surface.
    fn surface_area(&self) -> f32;

    /// Closest point on the region's border.
    ///
    /// Returns [`ProximityError::Unsupported`] for regions without this capability.
    fn nearest_border_point(&self, _point: &Point3<f32>) -> Result<Point3<f32>> {
        Err(ProximityError::unsupported("nearest border point", self.kind()))
    }

    /// Physical trigger volume approximating the region.
    ///
    /// Defaults to the bounding box.
    fn trigger_collider(&self) -> Result<TriggerCollider> {
        Ok(bounds_collider(&self.bounding_box()))
    }
}

/// Box trigger volume covering `bounds`.
pub(crate) fn bounds_collider(bounds: &Bounds) -> TriggerCollider {
    TriggerCollider::Cuboid {
        center: bounds.center(),
        half_extents: bounds.size() * 0.5,
    }
}
