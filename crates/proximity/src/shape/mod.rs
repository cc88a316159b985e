//! Shape primitives and the closed union over them.
//!
//! Four families are built in: [`Cuboid`], [`Sphere`], [`Cylinder`] and
//! [`Polygon`]. Anything else implements [`Proximity`] directly and is carried
//! by [`Shape::Custom`].

mod cuboid;
mod cylinder;
mod polygon;
mod sphere;

use std::sync::Arc;

use nalgebra::{Point2, Point3};

use crate::{AttachedShape, Bounds, Frame, Proximity, ProximityError, Result, TriggerCollider};

pub use cuboid::Cuboid;
pub use cylinder::{Axis, Cylinder};
pub(crate) use polygon::shoelace;
pub use polygon::{Edge, HeightRange, Polygon};
pub use sphere::Sphere;

/// Any proximity shape.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Axis-aligned box.
    Cuboid(Cuboid),
    /// Sphere.
    Sphere(Sphere),
    /// Axis-aligned cylinder.
    Cylinder(Cylinder),
    /// Horizontal polygon, optionally extruded.
    Polygon(Polygon),
    /// A caller-defined proximity.
    Custom(Arc<dyn Proximity + Send + Sync>),
}

impl Shape {
    /// Binds the shape to an external frame.
    ///
    /// Custom shapes cannot be attached and return [`ProximityError::Unsupported`].
    pub fn attach<'a, F: Frame + ?Sized>(&'a self, frame: &'a F) -> Result<AttachedShape<'a, F>> {
        Ok(match self {
            Shape::Cuboid(s) => AttachedShape::Cuboid(s.attach(frame)),
            Shape::Sphere(s) => AttachedShape::Sphere(s.attach(frame)),
            Shape::Cylinder(s) => AttachedShape::Cylinder(s.attach(frame)),
            Shape::Polygon(s) => AttachedShape::Polygon(s.attach(frame)),
            Shape::Custom(s) => {
                return Err(ProximityError::unsupported("frame attachment", s.kind()));
            }
        })
    }

    fn as_proximity(&self) -> &dyn Proximity {
        match self {
            Shape::Cuboid(s) => s,
            Shape::Sphere(s) => s,
            Shape::Cylinder(s) => s,
            Shape::Polygon(s) => s,
            Shape::Custom(s) => s.as_ref(),
        }
    }
}

impl Proximity for Shape {
    fn kind(&self) -> &'static str {
        self.as_proximity().kind()
    }

    #[inline]
    fn test_point(&self, point: &Point3<f32>) -> bool {
        self.as_proximity().test_point(point)
    }

    #[inline]
    fn test_point_2d(&self, point: &Point2<f32>) -> bool {
        self.as_proximity().test_point_2d(point)
    }

    fn bounding_box(&self) -> Bounds {
        self.as_proximity().bounding_box()
    }

    fn volume(&self) -> f32 {
        self.as_proximity().volume()
    }

    fn surface_area(&self) -> f32 {
        self.as_proximity().surface_area()
    }

    fn nearest_border_point(&self, point: &Point3<f32>) -> Result<Point3<f32>> {
        self.as_proximity().nearest_border_point(point)
    }

    fn trigger_collider(&self) -> Result<TriggerCollider> {
        self.as_proximity().trigger_collider()
    }
}

impl From<Cuboid> for Shape {
    fn from(shape: Cuboid) -> Self {
        Shape::Cuboid(shape)
    }
}

impl From<Sphere> for Shape {
    fn from(shape: Sphere) -> Self {
        Shape::Sphere(shape)
    }
}

impl From<Cylinder> for Shape {
    fn from(shape: Cylinder) -> Self {
        Shape::Cylinder(shape)
    }
}

impl From<Polygon> for Shape {
    fn from(shape: Polygon) -> Self {
        Shape::Polygon(shape)
    }
}
