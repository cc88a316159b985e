//! Sphere proximity.

use std::f32::consts::PI;

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{ensure_finite, ensure_non_negative};
use crate::{Attached, Bounds, Frame, Proximity, Result, TriggerCollider, border};

/// A solid sphere. The surface is inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    center: Point3<f32>,
    radius: f32,
}

impl Sphere {
    /// Creates a sphere. Center and radius must be finite, radius non-negative.
    pub fn new(center: Point3<f32>, radius: f32) -> Result<Self> {
        for (what, value) in [
            ("sphere center x", center.x),
            ("sphere center y", center.y),
            ("sphere center z", center.z),
        ] {
            ensure_finite(what, value)?;
        }
        let radius = ensure_non_negative("sphere radius", radius)?;
        Ok(Self { center, radius })
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

    /// Binds the sphere to an external frame.
    pub fn attach<'a, F: Frame + ?Sized>(&'a self, frame: &'a F) -> Attached<'a, Sphere, F> {
        Attached::new(self, frame)
    }
}

impl Proximity for Sphere {
    fn kind(&self) -> &'static str {
        "sphere"
    }

    #[inline]
    fn test_point(&self, point: &Point3<f32>) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }

    #[inline]
    fn test_point_2d(&self, point: &Point2<f32>) -> bool {
        let dx = point.x - self.center.x;
        let dz = point.y - self.center.z;
        dx * dx + dz * dz <= self.radius * self.radius
    }

    fn bounding_box(&self) -> Bounds {
        let half = Vector3::repeat(self.radius);
        Bounds {
            min: self.center - half,
            max: self.center + half,
        }
    }

    fn volume(&self) -> f32 {
        4.0 / 3.0 * PI * self.radius.powi(3)
    }

    fn surface_area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn nearest_border_point(&self, point: &Point3<f32>) -> Result<Point3<f32>> {
        Ok(border::sphere(&self.center, self.radius, point))
    }

    fn trigger_collider(&self) -> Result<TriggerCollider> {
        Ok(TriggerCollider::Sphere {
            center: self.center,
            radius: self.radius,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProximityError;
    use crate::test_support::{arbitrary_point, decisive};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    /// Distance containment in f64, or `None` too close to the surface to call.
    fn reference_contains(s: &Sphere, offsets: &[f64]) -> Option<bool> {
        let distance = offsets.iter().map(|d| d * d).sum::<f64>().sqrt();
        let margin = s.radius() as f64 - distance;
        decisive(margin).then_some(margin >= 0.0)
    }

    #[test]
    fn containment_is_squared_distance() {
        let s = Sphere::new(Point3::new(1.0, 1.0, 1.0), 2.0).unwrap();
        assert!(s.test_point(&Point3::new(1.0, 1.0, 1.0)));
        assert!(s.test_point(&Point3::new(3.0, 1.0, 1.0)));
        assert!(!s.test_point(&Point3::new(2.5, 2.5, 1.0)));
    }

    #[test]
    fn planar_test_uses_xz() {
        let s = Sphere::new(Point3::new(0.0, 100.0, 0.0), 5.0).unwrap();
        assert!(s.test_point_2d(&Point2::new(3.0, 4.0)));
        assert!(!s.test_point_2d(&Point2::new(4.0, 4.0)));
    }

    #[test]
    fn metrics() {
        let s = Sphere::new(Point3::origin(), 3.0).unwrap();
        assert_relative_eq!(s.volume(), 36.0 * PI, max_relative = 1e-6);
        assert_relative_eq!(s.surface_area(), 36.0 * PI, max_relative = 1e-6);
        let b = s.bounding_box();
        assert_eq!(b.min, Point3::new(-3.0, -3.0, -3.0));
        assert_eq!(b.max, Point3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn rejects_invalid() {
        assert!(matches!(
            Sphere::new(Point3::origin(), -1.0),
            Err(ProximityError::Negative { .. })
        ));
        assert!(matches!(
            Sphere::new(Point3::new(0.0, f32::NAN, 0.0), 1.0),
            Err(ProximityError::NonFinite { .. })
        ));
        assert!(Sphere::new(Point3::origin(), f32::INFINITY).is_err());
    }

    proptest! {
        #[test]
        fn containment_matches_distance_reference(p in arbitrary_point(), radius in 0.0f32..20.0) {
            let s = Sphere::new(Point3::new(1.0, -2.0, 0.5), radius).unwrap();
            let d = [
                p.x as f64 - 1.0,
                p.y as f64 + 2.0,
                p.z as f64 - 0.5,
            ];
            if let Some(inside) = reference_contains(&s, &d) {
                prop_assert_eq!(s.test_point(&p), inside);
            }
            if let Some(inside) = reference_contains(&s, &[d[0], d[2]]) {
                prop_assert_eq!(s.test_point_2d(&Point2::new(p.x, p.z)), inside);
            }
        }
    }
}
