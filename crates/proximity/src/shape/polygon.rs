//! Simple polygon in the horizontal plane, optionally extruded over a height range.

use nalgebra::{Point2, Point3};

use crate::bounds::UNBOUNDED_EXTENT;
use crate::error::ensure_finite;
use crate::{
    AttachedPolygon, Bounds, Frame, PolygonMesh, Proximity, ProximityError, Result,
    TriggerCollider, border,
};

/// Vertical extent of an extruded polygon. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightRange {
    min: f32,
    max: f32,
}

impl HeightRange {
    /// Creates a height range from two finite values in any order.
    pub fn new(a: f32, b: f32) -> Result<Self> {
        let a = ensure_finite("polygon height", a)?;
        let b = ensure_finite("polygon height", b)?;
        Ok(Self {
            min: a.min(b),
            max: a.max(b),
        })
    }

    /// Lower bound.
    #[inline]
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound.
    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Distance between the bounds.
    #[inline]
    pub fn extent(&self) -> f32 {
        self.max - self.min
    }

    /// Inclusive containment.
    #[inline]
    pub fn contains(&self, y: f32) -> bool {
        y >= self.min && y <= self.max
    }
}

/// Cached line data for one polygon edge.
///
/// The edge runs from point `i` to point `i + 1` (wrapping). The line is
/// `z = slope * x + intercept`; vertical edges store an infinite slope and use
/// their x coordinate as intercept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Euclidean length.
    pub length: f32,
    /// `dz / dx`, infinite for vertical edges.
    pub slope: f32,
    /// Z at x = 0, or the constant x of a vertical edge.
    pub intercept: f32,
}

impl Edge {
    fn between(a: &Point2<f32>, b: &Point2<f32>) -> Self {
        let d = b - a;
        let length = d.norm();
        if d.x == 0.0 {
            Self {
                length,
                slope: f32::INFINITY,
                intercept: a.x,
            }
        } else {
            let slope = d.y / d.x;
            Self {
                length,
                slope,
                intercept: a.y - slope * a.x,
            }
        }
    }

    /// Returns `true` for edges parallel to the Z axis.
    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.slope.is_infinite()
    }
}

/// A simple polygon in the XZ plane.
///
/// Points are `(x, z)` pairs in order, without a closing duplicate. Without a
/// height range the polygon is an infinite vertical prism.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Point2<f32>>,
    edges: Vec<Edge>,
    height: Option<HeightRange>,
    min: Point2<f32>,
    max: Point2<f32>,
    signed_area: f32,
    perimeter: f32,
}

impl Polygon {
    /// Creates a polygon from at least three finite points.
    pub fn new(points: Vec<Point2<f32>>, height: Option<HeightRange>) -> Result<Self> {
        if points.len() < 3 {
            return Err(ProximityError::TooFewPoints {
                count: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(ProximityError::NonFinitePoint { index });
        }

        let n = points.len();
        let edges: Vec<Edge> = (0..n)
            .map(|i| Edge::between(&points[i], &points[(i + 1) % n]))
            .collect();

        let mut min = points[0];
        let mut max = points[0];
        for p in &points[1..] {
            min = min.inf(p);
            max = max.sup(p);
        }

        let signed_area = shoelace(&points);
        let perimeter = edges.iter().map(|e| e.length).sum();

        Ok(Self {
            points,
            edges,
            height,
            min,
            max,
            signed_area,
            perimeter,
        })
    }

    /// Convenience constructor taking `[x, z]` pairs and an optional `(min, max)` height.
    pub fn from_xz(points: &[[f32; 2]], height: Option<(f32, f32)>) -> Result<Self> {
        let height = height.map(|(a, b)| HeightRange::new(a, b)).transpose()?;
        Self::new(points.iter().map(|&[x, z]| Point2::new(x, z)).collect(), height)
    }

    /// The polygon's points.
    #[inline]
    pub fn points(&self) -> &[Point2<f32>] {
        &self.points
    }

    /// Cached edge data, one entry per point.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Height range, if any.
    #[inline]
    pub fn height(&self) -> Option<HeightRange> {
        self.height
    }

    /// Vertical extent used for volume and area; unbounded prisms report [`UNBOUNDED_EXTENT`].
    pub fn extruded_height(&self) -> f32 {
        self.height.map_or(UNBOUNDED_EXTENT, |h| h.extent())
    }

    /// Shoelace area, positive for counter-clockwise `(x, z)` order.
    #[inline]
    pub fn signed_area(&self) -> f32 {
        self.signed_area
    }

    /// Absolute area of the footprint.
    #[inline]
    pub fn area(&self) -> f32 {
        self.signed_area.abs()
    }

    /// Returns `true` when points run counter-clockwise in `(x, z)`.
    #[inline]
    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area > 0.0
    }

    /// Total edge length.
    #[inline]
    pub fn perimeter(&self) -> f32 {
        self.perimeter
    }

    /// Even-odd ray cast along +X, without the bounds check.
    pub(crate) fn contains_2d(&self, q: &Point2<f32>) -> bool {
        let n = self.points.len();
        let mut inside = false;
        for (i, edge) in self.edges.iter().enumerate() {
            let a = &self.points[i];
            let b = &self.points[(i + 1) % n];
            if (a.y > q.y) == (b.y > q.y) {
                continue;
            }
            let crossing = if edge.is_vertical() {
                b.x
            } else {
                (q.y - edge.intercept) / edge.slope
            };
            if crossing > q.x {
                inside = !inside;
            }
        }
        inside
    }

    #[inline]
    fn in_footprint_bounds(&self, q: &Point2<f32>) -> bool {
        q.x >= self.min.x && q.x <= self.max.x && q.y >= self.min.y && q.y <= self.max.y
    }

    /// Builds the extruded mesh: top cap, bottom cap and side walls.
    pub fn mesh(&self) -> Result<PolygonMesh> {
        PolygonMesh::extrude(self)
    }

    /// Binds the polygon to an external frame.
    pub fn attach<'a, F: Frame + ?Sized>(&'a self, frame: &'a F) -> AttachedPolygon<'a, F> {
        AttachedPolygon::new(self, frame)
    }
}

/// Signed shoelace area of a closed ring.
pub(crate) fn shoelace(points: &[Point2<f32>]) -> f32 {
    let n = points.len();
    let twice: f32 = (0..n)
        .map(|i| {
            let a = &points[i];
            let b = &points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice * 0.5
}

impl Proximity for Polygon {
    fn kind(&self) -> &'static str {
        "polygon"
    }

    fn test_point(&self, point: &Point3<f32>) -> bool {
        let q = Point2::new(point.x, point.z);
        if !self.in_footprint_bounds(&q) {
            return false;
        }
        if let Some(h) = &self.height {
            if !h.contains(point.y) {
                return false;
            }
        }
        self.contains_2d(&q)
    }

    fn test_point_2d(&self, point: &Point2<f32>) -> bool {
        self.in_footprint_bounds(point) && self.contains_2d(point)
    }

    fn bounding_box(&self) -> Bounds {
        let (y0, y1) = match self.height {
            Some(h) => (h.min, h.max),
            None => (-UNBOUNDED_EXTENT * 0.5, UNBOUNDED_EXTENT * 0.5),
        };
        Bounds {
            min: Point3::new(self.min.x, y0, self.min.y),
            max: Point3::new(self.max.x, y1, self.max.y),
        }
    }

    fn volume(&self) -> f32 {
        self.area() * self.extruded_height()
    }

    fn surface_area(&self) -> f32 {
        2.0 * self.area() + self.perimeter * self.extruded_height()
    }

    fn nearest_border_point(&self, point: &Point3<f32>) -> Result<Point3<f32>> {
        Ok(border::polygon(self, point))
    }

    fn trigger_collider(&self) -> Result<TriggerCollider> {
        Ok(TriggerCollider::Mesh(self.mesh()?))
    }
}
