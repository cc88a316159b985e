//! Proximities expressed relative to an external, possibly moving frame.
//!
//! An attached wrapper borrows both the shape and the frame. Point queries are
//! mapped into the frame's local space and delegated; bounds are the wrapped
//! shape's bounds carried into world space. Nothing is copied and neither the
//! shape nor the frame is ever mutated.

mod polygon;

use std::f32::consts::PI;
use std::fmt;

use nalgebra::{Point2, Point3, UnitQuaternion, Vector3};

use crate::bounds::UNBOUNDED_EXTENT;
use crate::proximity::bounds_collider;
use crate::{
    Axis, Bounds, Cuboid, Cylinder, Frame, Polygon, Proximity, Result, Sphere, TriggerCollider,
};

pub use polygon::AttachedPolygon;

/// Exponent of Thomsen's ellipsoid surface approximation (relative error below 1.1%).
const THOMSEN_P: f32 = 1.6075;

/// Relative tolerance when deciding that scales agree or an axis stays aligned.
const ALIGNMENT_EPSILON: f32 = 1e-5;

/// Volume and surface area under a per-axis scale.
///
/// Unbounded extents keep reporting [`UNBOUNDED_EXTENT`] whatever the scale.
pub trait ScaleAware {
    /// Enclosed volume after scaling by `scale`.
    fn scaled_volume(&self, scale: &Vector3<f32>) -> f32;

    /// Boundary area after scaling by `scale`.
    fn scaled_surface_area(&self, scale: &Vector3<f32>) -> f32;

    /// Trigger volume of the shape placed in `frame`.
    ///
    /// `None` means the frame distorts the shape's own collider, and the
    /// world-space bounding box is used instead.
    fn framed_collider<F: Frame + ?Sized>(&self, _frame: &F) -> Option<TriggerCollider> {
        None
    }
}

fn scaled_extent(extent: f32, scale: f32) -> f32 {
    if extent.is_finite() {
        extent * scale.abs()
    } else {
        UNBOUNDED_EXTENT
    }
}

/// Common magnitude of the `axes` components of `scale`, if they agree.
fn uniform_scale(scale: &Vector3<f32>, axes: &[usize]) -> Option<f32> {
    let first = scale[axes[0]].abs();
    let tolerance = ALIGNMENT_EPSILON * first.max(1.0);
    axes.iter()
        .all(|&i| (scale[i].abs() - first).abs() <= tolerance)
        .then_some(first)
}

/// World axis that `rotation` carries the local `axis` onto, if it stays aligned.
fn world_axis(rotation: &UnitQuaternion<f32>, axis: Axis) -> Option<Axis> {
    let direction = rotation * axis.unit();
    [Axis::X, Axis::Y, Axis::Z]
        .into_iter()
        .find(|a| direction[a.index()].abs() >= 1.0 - ALIGNMENT_EPSILON)
}

/// Perimeter of an ellipse with semi-axes `a` and `b` (Ramanujan's first approximation).
fn ellipse_perimeter(a: f32, b: f32) -> f32 {
    PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt())
}

impl ScaleAware for Cuboid {
    fn scaled_volume(&self, scale: &Vector3<f32>) -> f32 {
        let s = self.size().zip_map(scale, scaled_extent);
        s.x * s.y * s.z
    }

    fn scaled_surface_area(&self, scale: &Vector3<f32>) -> f32 {
        let s = self.size().zip_map(scale, scaled_extent);
        2.0 * (s.x * s.y + s.y * s.z + s.z * s.x)
    }
}

impl ScaleAware for Sphere {
    fn scaled_volume(&self, scale: &Vector3<f32>) -> f32 {
        self.volume() * (scale.x * scale.y * scale.z).abs()
    }

    fn scaled_surface_area(&self, scale: &Vector3<f32>) -> f32 {
        let [a, b, c] =
            [scale.x, scale.y, scale.z].map(|s| (self.radius() * s.abs()).powf(THOMSEN_P));
        4.0 * PI * ((a * b + a * c + b * c) / 3.0).powf(1.0 / THOMSEN_P)
    }

    /// Stays a sphere under any rotation as long as the scale is uniform.
    fn framed_collider<F: Frame + ?Sized>(&self, frame: &F) -> Option<TriggerCollider> {
        let s = uniform_scale(&frame.scale(), &[0, 1, 2])?;
        Some(TriggerCollider::Sphere {
            center: frame.to_world(&self.center()),
            radius: self.radius() * s,
        })
    }
}

impl ScaleAware for Cylinder {
    fn scaled_volume(&self, scale: &Vector3<f32>) -> f32 {
        let (u, v) = self.axis().planar();
        let height = scaled_extent(self.height(), scale[self.axis().index()]);
        PI * self.radius() * self.radius() * (scale[u] * scale[v]).abs() * height
    }

    fn scaled_surface_area(&self, scale: &Vector3<f32>) -> f32 {
        let (u, v) = self.axis().planar();
        let a = self.radius() * scale[u].abs();
        let b = self.radius() * scale[v].abs();
        let height = scaled_extent(self.height(), scale[self.axis().index()]);
        2.0 * PI * a * b + ellipse_perimeter(a, b) * height
    }

    /// Stays a capsule while the cross-section is circular and the axis is
    /// carried onto a world axis.
    fn framed_collider<F: Frame + ?Sized>(&self, frame: &F) -> Option<TriggerCollider> {
        let scale = frame.scale();
        let (u, v) = self.axis().planar();
        let s = uniform_scale(&scale, &[u, v])?;
        let axis = world_axis(&frame.rotation(), self.axis())?;
        Some(TriggerCollider::Capsule {
            center: frame.to_world(&self.center()),
            axis,
            half_height: scaled_extent(self.height(), scale[self.axis().index()]) * 0.5,
            radius: self.radius() * s,
        })
    }
}

impl ScaleAware for Polygon {
    fn scaled_volume(&self, scale: &Vector3<f32>) -> f32 {
        let height = self.height().map_or(UNBOUNDED_EXTENT, |h| h.extent() * scale.y.abs());
        self.area() * (scale.x * scale.z).abs() * height
    }

    fn scaled_surface_area(&self, scale: &Vector3<f32>) -> f32 {
        let height = self.height().map_or(UNBOUNDED_EXTENT, |h| h.extent() * scale.y.abs());
        let points = self.points();
        let n = points.len();
        let perimeter: f32 = (0..n)
            .map(|i| {
                let d = points[(i + 1) % n] - points[i];
                (d.x * scale.x).hypot(d.y * scale.z)
            })
            .sum();
        2.0 * self.area() * (scale.x * scale.z).abs() + perimeter * height
    }
}

/// A shape bound to a frame.
///
/// `test_point` maps the query into local space. `test_point_2d` lifts the
/// horizontal point to the frame's height first, which is exact for frames
/// that only rotate about Y.
pub struct Attached<'a, S, F: ?Sized> {
    shape: &'a S,
    frame: &'a F,
}

impl<'a, S, F: Frame + ?Sized> Attached<'a, S, F> {
    /// Binds `shape` to `frame`.
    pub fn new(shape: &'a S, frame: &'a F) -> Self {
        Self { shape, frame }
    }

    /// The wrapped shape, in local coordinates.
    #[inline]
    pub fn shape(&self) -> &'a S {
        self.shape
    }

    /// The external frame.
    #[inline]
    pub fn frame(&self) -> &'a F {
        self.frame
    }
}

impl<S, F: ?Sized> Clone for Attached<'_, S, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, F: ?Sized> Copy for Attached<'_, S, F> {}

impl<S: fmt::Debug, F: fmt::Debug + ?Sized> fmt::Debug for Attached<'_, S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attached")
            .field("shape", self.shape)
            .field("frame", &self.frame)
            .finish()
    }
}

/// Horizontal point lifted to the frame's height and mapped into local space.
pub(crate) fn local_2d<F: Frame + ?Sized>(frame: &F, point: &Point2<f32>) -> Point2<f32> {
    let world = Point3::new(point.x, frame.position().y, point.y);
    let local = frame.to_local(&world);
    Point2::new(local.x, local.z)
}

impl<S, F> Proximity for Attached<'_, S, F>
where
    S: Proximity + ScaleAware,
    F: Frame + ?Sized,
{
    fn kind(&self) -> &'static str {
        self.shape.kind()
    }

    #[inline]
    fn test_point(&self, point: &Point3<f32>) -> bool {
        self.shape.test_point(&self.frame.to_local(point))
    }

    fn test_point_2d(&self, point: &Point2<f32>) -> bool {
        self.shape.test_point_2d(&local_2d(self.frame, point))
    }

    fn bounding_box(&self) -> Bounds {
        self.shape.bounding_box().transformed(self.frame)
    }

    fn volume(&self) -> f32 {
        self.shape.scaled_volume(&self.frame.scale())
    }

    fn surface_area(&self) -> f32 {
        self.shape.scaled_surface_area(&self.frame.scale())
    }

    /// Projects in local space and maps the result back to world space.
    ///
    /// The result lies on the world-space border; under non-uniform scale it
    /// need not be the closest such point.
    fn nearest_border_point(&self, point: &Point3<f32>) -> Result<Point3<f32>> {
        let local = self.shape.nearest_border_point(&self.frame.to_local(point))?;
        Ok(self.frame.to_world(&local))
    }

    fn trigger_collider(&self) -> Result<TriggerCollider> {
        Ok(self
            .shape
            .framed_collider(self.frame)
            .unwrap_or_else(|| bounds_collider(&self.bounding_box())))
    }
}

/// Any built-in shape bound to a frame.
#[derive(Debug)]
pub enum AttachedShape<'a, F: ?Sized> {
    /// Attached box.
    Cuboid(Attached<'a, Cuboid, F>),
    /// Attached sphere.
    Sphere(Attached<'a, Sphere, F>),
    /// Attached cylinder.
    Cylinder(Attached<'a, Cylinder, F>),
    /// Attached polygon, with cached scaled metrics.
    Polygon(AttachedPolygon<'a, F>),
}

impl<F: ?Sized> Clone for AttachedShape<'_, F> {
    fn clone(&self) -> Self {
        match self {
            AttachedShape::Cuboid(a) => AttachedShape::Cuboid(*a),
            AttachedShape::Sphere(a) => AttachedShape::Sphere(*a),
            AttachedShape::Cylinder(a) => AttachedShape::Cylinder(*a),
            AttachedShape::Polygon(a) => AttachedShape::Polygon(a.clone()),
        }
    }
}

impl<F: Frame + ?Sized> AttachedShape<'_, F> {
    /// The frame every query is expressed in.
    pub fn frame(&self) -> &F {
        match self {
            AttachedShape::Cuboid(a) => a.frame(),
            AttachedShape::Sphere(a) => a.frame(),
            AttachedShape::Cylinder(a) => a.frame(),
            AttachedShape::Polygon(a) => a.frame(),
        }
    }

    fn as_proximity(&self) -> &dyn Proximity {
        match self {
            AttachedShape::Cuboid(a) => a,
            AttachedShape::Sphere(a) => a,
            AttachedShape::Cylinder(a) => a,
            AttachedShape::Polygon(a) => a,
        }
    }
}

impl<F: Frame + ?Sized> Proximity for AttachedShape<'_, F> {
    fn kind(&self) -> &'static str {
        self.as_proximity().kind()
    }

    #[inline]
    fn test_point(&self, point: &Point3<f32>) -> bool {
        self.as_proximity().test_point(point)
    }

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::arbitrary_point;
    use crate::{Axis, Shape, Transform};
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    fn shapes() -> Vec<Shape> {
        vec![
            Cuboid::new(Point3::new(1.0, 0.0, -1.0), Vector3::new(4.0, f32::INFINITY, 6.0))
                .unwrap()
                .into(),
            Sphere::new(Point3::new(0.0, 2.0, 0.0), 5.0).unwrap().into(),
            Cylinder::new(Axis::X, Point3::new(0.0, 1.0, 1.0), 3.0, 8.0).unwrap().into(),
            Polygon::from_xz(&[[-4.0, -4.0], [6.0, -2.0], [0.0, 7.0]], Some((-3.0, 3.0)))
                .unwrap()
                .into(),
        ]
    }

    #[test]
    fn translation_moves_the_region() {
        let sphere = Sphere::new(Point3::origin(), 1.0).unwrap();
        let frame = Transform::from_translation(Vector3::new(10.0, 0.0, 0.0));
        let attached = sphere.attach(&frame);
        assert!(attached.test_point(&Point3::new(10.5, 0.0, 0.0)));
        assert!(!attached.test_point(&Point3::new(0.5, 0.0, 0.0)));
        assert!(attached.test_point_2d(&Point2::new(10.0, 0.9)));
        assert_eq!(attached.bounding_box().center(), Point3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn rotation_about_y_swaps_extents() {
        let slab = Cuboid::new(Point3::origin(), Vector3::new(4.0, 2.0, 2.0)).unwrap();
        let frame = Transform::identity()
            .with_rotation(UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2));
        let attached = slab.attach(&frame);
        assert!(attached.test_point(&Point3::new(0.0, 0.0, 1.5)));
        assert!(!attached.test_point(&Point3::new(1.5, 0.0, 0.0)));
        assert!(attached.test_point_2d(&Point2::new(0.0, -1.5)));

        let bounds = attached.bounding_box();
        assert_relative_eq!(bounds.size(), Vector3::new(2.0, 2.0, 4.0), epsilon = 1e-5);
    }

    #[test]
    fn scale_stretches_containment_and_metrics() {
        let sphere = Sphere::new(Point3::origin(), 1.0).unwrap();
        let frame = Transform::identity().with_scale(Vector3::new(2.0, 1.0, 1.0));
        let attached = sphere.attach(&frame);
        assert!(attached.test_point(&Point3::new(1.5, 0.0, 0.0)));
        assert!(!attached.test_point(&Point3::new(0.0, 1.5, 0.0)));
        assert_relative_eq!(attached.volume(), 8.0 / 3.0 * PI, max_relative = 1e-6);
        // Prolate spheroid a = 2, b = c = 1: about 21.48.
        assert_relative_eq!(attached.surface_area(), 21.48, max_relative = 0.02);
    }

    #[test]
    fn scaled_box_metrics_are_exact() {
        let b = Cuboid::new(Point3::origin(), Vector3::new(1.0, 2.0, 3.0)).unwrap();
        let frame = Transform::identity().with_scale(Vector3::new(2.0, -1.0, 1.0));
        let attached = b.attach(&frame);
        assert_relative_eq!(attached.volume(), 12.0);
        assert_relative_eq!(attached.surface_area(), 2.0 * (4.0 + 6.0 + 6.0));
    }

    #[test]
    fn scaled_cylinder_is_elliptic() {
        let c = Cylinder::new(Axis::Y, Point3::origin(), 1.0, 2.0).unwrap();
        let frame = Transform::identity().with_scale(Vector3::new(2.0, 3.0, 1.0));
        let attached = c.attach(&frame);
        assert_relative_eq!(attached.volume(), PI * 2.0 * 6.0, max_relative = 1e-6);
        // Ellipse (2, 1) perimeter is about 9.6884.
        assert_relative_eq!(
            attached.surface_area(),
            2.0 * PI * 2.0 + 9.6884 * 6.0,
            max_relative = 1e-4
        );
    }

    #[test]
    fn border_point_returns_to_world() {
        let sphere = Sphere::new(Point3::origin(), 2.0).unwrap();
        let frame = Transform::from_translation(Vector3::new(0.0, 5.0, 0.0));
        let attached = sphere.attach(&frame);
        let b = attached.nearest_border_point(&Point3::new(0.0, 10.0, 0.0)).unwrap();
        assert_relative_eq!(b, Point3::new(0.0, 7.0, 0.0));
    }

    #[test]
    fn attached_shape_reports_frame() {
        let shape = Shape::from(Cylinder::new(Axis::Y, Point3::origin(), 1.0, 2.0).unwrap());
        let frame = Transform::from_translation(Vector3::new(0.0, 3.0, 0.0));
        let attached = shape.attach(&frame).unwrap();
        assert_eq!(attached.frame().translation, frame.translation);
        assert_eq!(attached.kind(), "cylinder");
        assert!(attached.test_point(&Point3::new(0.0, 3.5, 0.0)));
        assert!(!attached.test_point(&Point3::new(0.0, 0.5, 0.0)));
    }

    #[test]
    fn identity_frame_keeps_trigger_collider() {
        let frame = Transform::identity();
        for shape in shapes() {
            let attached = shape.attach(&frame).unwrap();
            let plain = shape.trigger_collider().unwrap();
            let framed = attached.trigger_collider().unwrap();
            match &shape {
                // Mesh vertices are rebased on the world origin, so compare families only.
                Shape::Polygon(_) => assert_eq!(framed.kind(), plain.kind()),
                _ => assert_eq!(framed, plain),
            }
        }
    }

    #[test]
    fn uniform_scale_keeps_sphere_collider() {
        let sphere = Sphere::new(Point3::new(1.0, 0.0, 0.0), 2.0).unwrap();
        let frame = Transform::from_translation(Vector3::new(0.0, 5.0, 0.0))
            .with_rotation(UnitQuaternion::from_euler_angles(0.3, 0.7, 0.0))
            .with_scale(Vector3::repeat(-3.0));
        let collider = sphere.attach(&frame).trigger_collider().unwrap();
        let TriggerCollider::Sphere { center, radius } = collider else {
            panic!("expected a sphere, got {}", collider.kind());
        };
        assert_relative_eq!(center, frame.to_world(&sphere.center()));
        assert_relative_eq!(radius, 6.0);

        let squashed = Transform::identity().with_scale(Vector3::new(1.0, 0.5, 1.0));
        let collider = sphere.attach(&squashed).trigger_collider().unwrap();
        assert_eq!(collider.kind(), "cuboid");
    }

    #[test]
    fn quarter_turn_moves_capsule_axis() {
        let cylinder = Cylinder::new(Axis::Y, Point3::new(0.0, 2.0, 0.0), 1.0, 4.0).unwrap();
        let frame = Transform::identity()
            .with_rotation(UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2))
            .with_scale(Vector3::new(2.0, 3.0, 2.0));
        let collider = cylinder.attach(&frame).trigger_collider().unwrap();
        let TriggerCollider::Capsule {
            center,
            axis,
            half_height,
            radius,
        } = collider
        else {
            panic!("expected a capsule, got {}", collider.kind());
        };
        assert_eq!(axis, Axis::X);
        assert_relative_eq!(center, Point3::new(-6.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(half_height, 6.0);
        assert_relative_eq!(radius, 2.0);
    }

    #[test]
    fn tilted_or_elliptic_cylinder_falls_back_to_box() {
        let cylinder = Cylinder::new(Axis::Y, Point3::origin(), 1.0, 4.0).unwrap();
        let tilted = Transform::identity()
            .with_rotation(UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.4));
        let elliptic = Transform::identity().with_scale(Vector3::new(2.0, 1.0, 1.0));
        for frame in [tilted, elliptic] {
            let attached = cylinder.attach(&frame);
            let bounds = attached.bounding_box();
            assert_eq!(
                attached.trigger_collider().unwrap(),
                TriggerCollider::Cuboid {
                    center: bounds.center(),
                    half_extents: bounds.size() * 0.5,
                }
            );
        }
    }

    proptest! {
        #[test]
        fn identity_frame_matches_unwrapped(p in arbitrary_point()) {
            let frame = Transform::identity();
            for shape in shapes() {
                let attached = shape.attach(&frame).unwrap();
                prop_assert_eq!(attached.test_point(&p), shape.test_point(&p));
                let q = Point2::new(p.x, p.z);
                prop_assert_eq!(attached.test_point_2d(&q), shape.test_point_2d(&q));
                prop_assert_eq!(attached.bounding_box(), shape.bounding_box());
                prop_assert_eq!(
                    attached.nearest_border_point(&p).unwrap(),
                    shape.nearest_border_point(&p).unwrap()
                );
                let close = |a: f32, b: f32| (a - b).abs() <= 1e-3 * b;
                prop_assert!(close(attached.volume(), shape.volume()));
                prop_assert!(close(attached.surface_area(), shape.surface_area()));
            }
        }
    }
}
