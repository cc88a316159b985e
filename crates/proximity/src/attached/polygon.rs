//! Frame-relative polygon.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use nalgebra::{Point2, Point3, Vector3};

use super::{ScaleAware, local_2d};
use crate::{Bounds, Frame, Polygon, Proximity, Result, TriggerCollider};

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScaledMetrics {
    scale: Vector3<f32>,
    volume: f32,
    surface_area: f32,
}

/// A polygon bound to a frame.
///
/// Volume and surface area under the frame's scale walk every edge, so they
/// are cached and only recomputed when the frame reports a different scale.
pub struct AttachedPolygon<'a, F: ?Sized> {
    polygon: &'a Polygon,
    frame: &'a F,
    cache: Mutex<Option<ScaledMetrics>>,
}

impl<'a, F: Frame + ?Sized> AttachedPolygon<'a, F> {
    /// Binds `polygon` to `frame`.
    pub fn new(polygon: &'a Polygon, frame: &'a F) -> Self {
        Self {
            polygon,
            frame,
            cache: Mutex::new(None),
        }
    }

    /// The wrapped polygon, in local coordinates.
    #[inline]
    pub fn polygon(&self) -> &'a Polygon {
        self.polygon
    }

    /// The external frame.
    #[inline]
    pub fn frame(&self) -> &'a F {
        self.frame
    }

    fn metrics(&self) -> ScaledMetrics {
        let scale = self.frame.scale();
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        match *cache {
            Some(metrics) if metrics.scale == scale => metrics,
            _ => {
                let metrics = ScaledMetrics {
                    scale,
                    volume: self.polygon.scaled_volume(&scale),
                    surface_area: self.polygon.scaled_surface_area(&scale),
                };
                *cache = Some(metrics);
                metrics
            }
        }
    }
}

impl<F: ?Sized> Clone for AttachedPolygon<'_, F> {
    fn clone(&self) -> Self {
        let cached = *self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        Self {
            polygon: self.polygon,
            frame: self.frame,
            cache: Mutex::new(cached),
        }
    }
}

impl<F: fmt::Debug + ?Sized> fmt::Debug for AttachedPolygon<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedPolygon")
            .field("polygon", self.polygon)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl<F: Frame + ?Sized> Proximity for AttachedPolygon<'_, F> {
    fn kind(&self) -> &'static str {
        self.polygon.kind()
    }

    #[inline]
    fn test_point(&self, point: &Point3<f32>) -> bool {
        self.polygon.test_point(&self.frame.to_local(point))
    }

    fn test_point_2d(&self, point: &Point2<f32>) -> bool {
        self.polygon.test_point_2d(&local_2d(self.frame, point))
    }

    fn bounding_box(&self) -> Bounds {
        self.polygon.bounding_box().transformed(self.frame)
    }

    fn volume(&self) -> f32 {
        self.metrics().volume
    }

    fn surface_area(&self) -> f32 {
        self.metrics().surface_area
    }

    fn nearest_border_point(&self, point: &Point3<f32>) -> Result<Point3<f32>> {
        let local = self.polygon.nearest_border_point(&self.frame.to_local(point))?;
        Ok(self.frame.to_world(&local))
    }

    /// The extruded mesh carried into world space.
    fn trigger_collider(&self) -> Result<TriggerCollider> {
        Ok(TriggerCollider::Mesh(self.polygon.mesh()?.transformed(self.frame)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transform;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;
    use std::cell::Cell;

    #[derive(Debug)]
    struct Scalable {
        scale: Cell<Vector3<f32>>,
    }

    impl Frame for Scalable {
        fn position(&self) -> Point3<f32> {
            Point3::origin()
        }

        fn rotation(&self) -> UnitQuaternion<f32> {
            UnitQuaternion::identity()
        }

        fn scale(&self) -> Vector3<f32> {
            self.scale.get()
        }
    }

    fn square(height: Option<(f32, f32)>) -> Polygon {
        Polygon::from_xz(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]], height).unwrap()
    }

    #[test]
    fn metrics_follow_scale_changes() {
        let polygon = square(Some((0.0, 2.0)));
        let frame = Scalable {
            scale: Cell::new(Vector3::repeat(1.0)),
        };
        let attached = polygon.attach(&frame);
        assert_relative_eq!(attached.volume(), 200.0);
        assert_relative_eq!(attached.surface_area(), 280.0);

        frame.scale.set(Vector3::new(2.0, 3.0, 1.0));
        assert_relative_eq!(attached.volume(), 1200.0);
        // Footprint 20 x 10, perimeter 60, height 6.
        assert_relative_eq!(attached.surface_area(), 400.0 + 360.0);
    }

    #[test]
    fn cache_is_keyed_by_scale() {
        let polygon = square(Some((0.0, 1.0)));
        let frame = Scalable {
            scale: Cell::new(Vector3::repeat(2.0)),
        };
        let attached = polygon.attach(&frame);
        assert!(attached.cache.lock().unwrap().is_none());
        attached.volume();
        let cached = attached.cache.lock().unwrap().unwrap();
        assert_eq!(cached.scale, Vector3::repeat(2.0));

        attached.surface_area();
        assert_eq!(attached.cache.lock().unwrap().unwrap(), cached);

        frame.scale.set(Vector3::repeat(0.5));
        attached.surface_area();
        assert_eq!(attached.cache.lock().unwrap().unwrap().scale, Vector3::repeat(0.5));
    }

    #[test]
    fn clone_keeps_cached_metrics() {
        let polygon = square(None);
        let frame = Transform::identity();
        let attached = polygon.attach(&frame);
        let volume = attached.volume();
        let copy = attached.clone();
        assert_eq!(copy.cache.lock().unwrap().map(|m| m.volume), Some(volume));
    }

    #[test]
    fn translated_containment() {
        let polygon = square(Some((0.0, 2.0)));
        let frame = Transform::from_translation(Vector3::new(100.0, 10.0, 0.0));
        let attached = polygon.attach(&frame);
        assert!(attached.test_point(&Point3::new(105.0, 11.0, 5.0)));
        assert!(!attached.test_point(&Point3::new(105.0, 1.0, 5.0)));
        assert!(attached.test_point_2d(&Point2::new(105.0, 5.0)));
        assert!(!attached.test_point_2d(&Point2::new(5.0, 5.0)));

        let border = attached.nearest_border_point(&Point3::new(105.0, 11.0, 1.0)).unwrap();
        assert_relative_eq!(border, Point3::new(105.0, 11.0, 0.0));
    }

    #[test]
    fn trigger_mesh_is_in_world_space() {
        let polygon = square(Some((0.0, 2.0)));
        let frame = Transform::from_translation(Vector3::new(100.0, 0.0, 0.0));
        let attached = polygon.attach(&frame);
        match attached.trigger_collider().unwrap() {
            TriggerCollider::Mesh(mesh) => {
                assert_relative_eq!(mesh.origin(), Point3::new(105.0, 1.0, 5.0));
            }
            other => panic!("expected a mesh, got {other:?}"),
        }
    }
}
