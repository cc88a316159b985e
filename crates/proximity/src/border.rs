//! Nearest-point-on-border projections, one per shape family.
//!
//! Each projection is consistent with the family's containment test: the
//! returned point lies on the surface that `test_point` switches across.

use nalgebra::{Point2, Point3, Vector3};

use crate::{Cuboid, Cylinder, Polygon};

/// Offsets shorter than this are treated as "at the center".
pub const MIN_BORDER_DISTANCE: f32 = 1e-6;

/// Sphere: scale the center-to-query direction to the radius.
///
/// A query at the center projects along +X.
pub(crate) fn sphere(center: &Point3<f32>, radius: f32, point: &Point3<f32>) -> Point3<f32> {
    let offset = point - center;
    let distance = offset.norm();
    if distance < MIN_BORDER_DISTANCE {
        return center + Vector3::x() * radius;
    }
    center + offset * (radius / distance)
}

/// Box: clamp per axis from outside; snap to the closest face from inside.
///
/// Inside ties resolve to the first face in the order -X, +X, -Y, +Y, -Z, +Z.
/// Returns `None` when every axis is unbounded.
pub(crate) fn cuboid(shape: &Cuboid, point: &Point3<f32>) -> Option<Point3<f32>> {
    let center = shape.center();
    let half = shape.size() * 0.5;
    let bounded = |i: usize| !shape.is_unbounded(i);
    if !(0..3).any(bounded) {
        return None;
    }

    let outside = (0..3).any(|i| bounded(i) && (point[i] - center[i]).abs() > half[i]);

    let mut out = *point;
    if outside {
        for i in (0..3).filter(|&i| bounded(i)) {
            out[i] = point[i].clamp(center[i] - half[i], center[i] + half[i]);
        }
        return Some(out);
    }

    let mut best: Option<(f32, usize, f32)> = None;
    for i in (0..3).filter(|&i| bounded(i)) {
        let lo = center[i] - half[i];
        let hi = center[i] + half[i];
        for (distance, face) in [(point[i] - lo, lo), (hi - point[i], hi)] {
            if best.is_none_or(|(d, _, _)| distance < d) {
                best = Some((distance, i, face));
            }
        }
    }
    if let Some((_, axis, face)) = best {
        out[axis] = face;
    }
    Some(out)
}

/// Cylinder: clamp along the principal axis, then project radially if needed.
pub(crate) fn cylinder(shape: &Cylinder, point: &Point3<f32>) -> Point3<f32> {
    let center = shape.center();
    let radius = shape.radius();
    let a = shape.axis().index();
    let (u, v) = shape.axis().planar();

    let mut d = point - center;
    let half = shape.height() * 0.5;
    let mut axial_outside = false;
    if !shape.is_unbounded() {
        if d[a] < -half {
            d[a] = -half;
            axial_outside = true;
        } else if d[a] > half {
            d[a] = half;
            axial_outside = true;
        }
    }

    let radial = (d[u] * d[u] + d[v] * d[v]).sqrt();
    if radial > radius {
        project_radial(&mut d, u, v, radial, radius);
    } else if !axial_outside {
        let side_distance = radius - radial;
        let cap_distance = if shape.is_unbounded() {
            f32::INFINITY
        } else {
            (d[a] + half).min(half - d[a])
        };
        if cap_distance < side_distance {
            d[a] = if d[a] + half <= half - d[a] { -half } else { half };
        } else {
            project_radial(&mut d, u, v, radial, radius);
        }
    }

    center + d
}

fn project_radial(d: &mut Vector3<f32>, u: usize, v: usize, radial: f32, radius: f32) {
    if radial < MIN_BORDER_DISTANCE {
        d[u] = radius;
        d[v] = 0.0;
    } else {
        let scale = radius / radial;
        d[u] *= scale;
        d[v] *= scale;
    }
}

/// Closest point to `q` on the segment `a`–`b`.
pub(crate) fn closest_on_segment(q: &Point2<f32>, a: &Point2<f32>, b: &Point2<f32>) -> Point2<f32> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return *a;
    }
    let t = ((q - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Polygon: closest point over all walls, plus the caps when bounded and above/below the footprint.
pub(crate) fn polygon(shape: &Polygon, point: &Point3<f32>) -> Point3<f32> {
    let q = Point2::new(point.x, point.z);
    let wall_y = shape
        .height()
        .map_or(point.y, |h| point.y.clamp(h.min(), h.max()));

    let points = shape.points();
    let n = points.len();
    let mut best = *point;
    let mut best_sq = f32::INFINITY;
    for i in 0..n {
        let c = closest_on_segment(&q, &points[i], &points[(i + 1) % n]);
        let candidate = Point3::new(c.x, wall_y, c.y);
        let dist_sq = (candidate - point).norm_squared();
        if dist_sq < best_sq {
            best_sq = dist_sq;
            best = candidate;
        }
    }

    if let Some(h) = shape.height() {
        if shape.contains_2d(&q) {
            for cap in [h.min(), h.max()] {
                let dist_sq = (point.y - cap) * (point.y - cap);
                if dist_sq < best_sq {
                    best_sq = dist_sq;
                    best = Point3::new(point.x, cap, point.z);
                }
            }
        }
    }

    best
}
