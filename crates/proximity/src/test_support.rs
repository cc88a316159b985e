//! Proptest strategies and brute-force references shared by the unit tests.

use std::f32::consts::TAU;

use nalgebra::{Point2, Point3, Vector3};
use proptest::prelude::*;

/// A Strategy to generate f32 values within [-50.0, 50.0], biased towards
/// zeros, round numbers and other values that land exactly on shape faces.
pub fn scalar_strategy() -> impl Strategy<Value = f32> {
    prop_oneof![
        prop_oneof![
            Just(0.0),
            Just(1.0),
            Just(-1.0),
            Just(5.0),
            Just(-5.0),
            Just(10.0),
            Just(-10.0),
            Just(0.5),
            Just(-0.5),
        ],
        -50.0f32..=50.0,
    ]
}

pub fn arbitrary_vector() -> impl Strategy<Value = Vector3<f32>> {
    (scalar_strategy(), scalar_strategy(), scalar_strategy())
        .prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

pub fn arbitrary_point() -> impl Strategy<Value = Point3<f32>> {
    arbitrary_vector().prop_map(Point3::from)
}

/// Star-shaped simple polygons with 3 to `max_n` points, counter-clockwise,
/// every point between 1 and 10 units from the origin.
///
/// Each point gets its own angular slot, so consecutive points never fold back.
pub fn simple_polygon(max_n: usize) -> impl Strategy<Value = Vec<Point2<f32>>> {
    (3..=max_n)
        .prop_flat_map(|n| prop::collection::vec((0.1f32..0.9, 1.0f32..10.0), n))
        .prop_map(|slots| {
            let n = slots.len() as f32;
            slots
                .iter()
                .enumerate()
                .map(|(i, &(jitter, radius))| {
                    let theta = (i as f32 + jitter) * TAU / n;
                    Point2::new(radius * theta.cos(), radius * theta.sin())
                })
                .collect()
        })
}

/// Same polygons as [`simple_polygon`], in either winding order.
pub fn simple_polygon_any_winding(max_n: usize) -> impl Strategy<Value = Vec<Point2<f32>>> {
    (simple_polygon(max_n), any::<bool>()).prop_map(|(mut points, reverse)| {
        if reverse {
            points.reverse();
        }
        points
    })
}

/// Winding number of the closed ring around `q`, evaluated in f64.
///
/// Independent of the even-odd crossing test used by `Polygon`.
pub fn winding_number(points: &[Point2<f32>], q: &Point2<f32>) -> i32 {
    let (qx, qy) = (q.x as f64, q.y as f64);
    let is_left = |a: &Point2<f32>, b: &Point2<f32>| {
        let (ax, ay) = (a.x as f64, a.y as f64);
        (b.x as f64 - ax) * (qy - ay) - (qx - ax) * (b.y as f64 - ay)
    };

    let n = points.len();
    let mut winding = 0;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        if a.y as f64 <= qy {
            if b.y as f64 > qy && is_left(a, b) > 0.0 {
                winding += 1;
            }
        } else if b.y as f64 <= qy && is_left(a, b) < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// Twice the signed area of a triangle, in f64.
pub fn area2(a: &Point2<f32>, b: &Point2<f32>, c: &Point2<f32>) -> f64 {
    (b.x as f64 - a.x as f64) * (c.y as f64 - a.y as f64)
        - (c.x as f64 - a.x as f64) * (b.y as f64 - a.y as f64)
}

/// Margins closer to a surface than this are too close to call: f32 queries and
/// f64 references may round to different sides there.
pub const REFERENCE_TOLERANCE: f64 = 1e-4;

/// Returns `true` when the f64 `margin` decides containment on its own, i.e.
/// it is exactly zero or clear of [`REFERENCE_TOLERANCE`].
pub fn decisive(margin: f64) -> bool {
    margin == 0.0 || margin.abs() >= REFERENCE_TOLERANCE
}
