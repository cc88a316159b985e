//! A proximity that never matches.

use nalgebra::{Point2, Point3};

use crate::{Bounds, Proximity, ProximityError, Result, TriggerCollider};

/// Sentinel region that contains nothing.
///
/// Use it wherever a proximity is optional so callers never branch on absence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullProximity;

impl Proximity for NullProximity {
    fn kind(&self) -> &'static str {
        "null proximity"
    }

    #[inline]
    fn test_point(&self, _point: &Point3<f32>) -> bool {
        false
    }

    #[inline]
    fn test_point_2d(&self, _point: &Point2<f32>) -> bool {
        false
    }

    fn bounding_box(&self) -> Bounds {
        Bounds::singleton(Point3::origin())
    }

    fn volume(&self) -> f32 {
        0.0
    }

    fn surface_area(&self) -> f32 {
        0.0
    }

    fn trigger_collider(&self) -> Result<TriggerCollider> {
        Err(ProximityError::unsupported("trigger collider", self.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_matches() {
        let null = NullProximity;
        assert!(!null.test_point(&Point3::origin()));
        assert!(!null.test_point(&Point3::new(1e6, -3.0, 2.0)));
        assert!(!null.test_point_2d(&Point2::origin()));
        assert_eq!(null.volume(), 0.0);
        assert_eq!(null.surface_area(), 0.0);
        assert_eq!(null.bounding_box().volume(), 0.0);
    }

    #[test]
    fn capabilities_are_unsupported() {
        let null = NullProximity;
        assert!(matches!(
            null.nearest_border_point(&Point3::origin()),
            Err(ProximityError::Unsupported { .. })
        ));
        assert!(matches!(
            null.trigger_collider(),
            Err(ProximityError::Unsupported { .. })
        ));
    }
}
