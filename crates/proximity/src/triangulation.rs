//! Ear-clipping triangulation of simple polygons.
//!
//! The ring is an array of vertex records linked by `prev`/`next` indices.
//! Clipping an ear splices one record out and refreshes only its two former
//! neighbours. Both windings are accepted; every emitted triangle
//! `[next, vertex, prev]` winds opposite to the input polygon.

use nalgebra::Point2;

use crate::TriangulationError;

type Result<T> = std::result::Result<T, TriangulationError>;

/// Twice the signed area of the triangle `abc`; positive when counter-clockwise.
#[inline]
pub(crate) fn area2(a: &Point2<f32>, b: &Point2<f32>, c: &Point2<f32>) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

#[inline]
fn collinear(a: &Point2<f32>, b: &Point2<f32>, c: &Point2<f32>) -> bool {
    area2(a, b, c) == 0.0
}

/// `c` lies on the closed segment `ab`.
fn between(a: &Point2<f32>, b: &Point2<f32>, c: &Point2<f32>) -> bool {
    if !collinear(a, b, c) {
        return false;
    }
    if a.x != b.x {
        (a.x <= c.x && c.x <= b.x) || (a.x >= c.x && c.x >= b.x)
    } else {
        (a.y <= c.y && c.y <= b.y) || (a.y >= c.y && c.y >= b.y)
    }
}

#[derive(Debug, Clone)]
struct Vertex {
    point: Point2<f32>,
    prev: usize,
    next: usize,
    /// `area2(prev, self, next)` for the current ring.
    area2: f32,
    ear: bool,
}

/// Streaming ear clipper.
///
/// Yields one triangle per call as three indices into the input points.
/// After an error the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct Triangulator {
    vertices: Vec<Vertex>,
    /// `1.0` for counter-clockwise input, `-1.0` for clockwise.
    orientation: f32,
    head: usize,
    remaining: usize,
}

impl Triangulator {
    /// Builds the vertex ring and classifies every vertex.
    pub fn new(points: &[Point2<f32>]) -> Result<Self> {
        let n = points.len();
        if n < 3 {
            return Err(TriangulationError::TooFewPoints(n));
        }

        let vertices = points
            .iter()
            .enumerate()
            .map(|(i, &point)| Vertex {
                point,
                prev: (i + n - 1) % n,
                next: (i + 1) % n,
                area2: 0.0,
                ear: false,
            })
            .collect();
        let orientation = if crate::shape::shoelace(points) < 0.0 {
            -1.0
        } else {
            1.0
        };

        let mut triangulator = Self {
            vertices,
            orientation,
            head: 0,
            remaining: n,
        };
        for i in 0..n {
            triangulator.refresh_area(i);
        }
        for i in 0..n {
            triangulator.refresh_ear(i);
        }
        Ok(triangulator)
    }

    /// Vertices still in the ring.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Returns `true` when the input was clockwise.
    #[inline]
    pub fn is_clockwise(&self) -> bool {
        self.orientation < 0.0
    }

    #[inline]
    fn point(&self, i: usize) -> &Point2<f32> {
        &self.vertices[i].point
    }

    #[inline]
    fn left(&self, a: &Point2<f32>, b: &Point2<f32>, c: &Point2<f32>) -> bool {
        area2(a, b, c) * self.orientation > 0.0
    }

    #[inline]
    fn left_on(&self, a: &Point2<f32>, b: &Point2<f32>, c: &Point2<f32>) -> bool {
        area2(a, b, c) * self.orientation >= 0.0
    }

    /// Proper intersection: the segments cross at a point interior to both.
    fn intersect_prop(
        &self,
        a: &Point2<f32>,
        b: &Point2<f32>,
        c: &Point2<f32>,
        d: &Point2<f32>,
    ) -> bool {
        if collinear(a, b, c) || collinear(a, b, d) || collinear(c, d, a) || collinear(c, d, b) {
            return false;
        }
        (self.left(a, b, c) != self.left(a, b, d)) && (self.left(c, d, a) != self.left(c, d, b))
    }

    fn intersect(
        &self,
        a: &Point2<f32>,
        b: &Point2<f32>,
        c: &Point2<f32>,
        d: &Point2<f32>,
    ) -> bool {
        self.intersect_prop(a, b, c, d)
            || between(a, b, c)
            || between(a, b, d)
            || between(c, d, a)
            || between(c, d, b)
    }

    /// The segment `ab` crosses no ring edge other than those incident to `a` or `b`.
    fn diagonalie(&self, a: usize, b: usize) -> bool {
        let (pa, pb) = (self.point(a), self.point(b));
        let mut c = self.head;
        for _ in 0..self.remaining {
            let c1 = self.vertices[c].next;
            let incident = c == a || c1 == a || c == b || c1 == b;
            if !incident && self.intersect(pa, pb, self.point(c), self.point(c1)) {
                return false;
            }
            c = c1;
        }
        true
    }

    /// The segment `ab` starts into the polygon's interior at `a`.
    fn in_cone(&self, a: usize, b: usize) -> bool {
        let va = &self.vertices[a];
        let (pa, pb) = (&va.point, self.point(b));
        let a0 = self.point(va.prev);
        let a1 = self.point(va.next);
        if va.area2 * self.orientation >= 0.0 {
            // convex
            self.left(pa, pb, a0) && self.left(pb, pa, a1)
        } else {
            !(self.left_on(pa, pb, a1) && self.left_on(pb, pa, a0))
        }
    }

    fn diagonal(&self, a: usize, b: usize) -> bool {
        self.in_cone(a, b) && self.in_cone(b, a) && self.diagonalie(a, b)
    }

    fn refresh_area(&mut self, i: usize) {
        let v = &self.vertices[i];
        let area = area2(self.point(v.prev), &v.point, self.point(v.next));
        self.vertices[i].area2 = area;
    }

    fn refresh_ear(&mut self, i: usize) {
        let ear = self.diagonal(self.vertices[i].prev, self.vertices[i].next);
        self.vertices[i].ear = ear;
    }

    /// Finds an ear, emits it and splices it out of the ring.
    fn clip_ear(&mut self) -> Result<[u32; 3]> {
        let mut v = self.head;
        for _ in 0..self.remaining {
            if self.vertices[v].ear {
                let Vertex { prev, next, .. } = self.vertices[v];
                self.vertices[prev].next = next;
                self.vertices[next].prev = prev;
                self.remaining -= 1;
                self.head = next;

                self.refresh_area(prev);
                self.refresh_area(next);
                self.refresh_ear(prev);
                self.refresh_ear(next);
                return Ok([next as u32, v as u32, prev as u32]);
            }
            v = self.vertices[v].next;
        }

        let error = TriangulationError::NoEar {
            remaining: self.remaining,
            attempts: self.remaining,
        };
        log::warn!("ear clipping gave up: {error}");
        self.remaining = 0;
        Err(error)
    }
}

impl Iterator for Triangulator {
    type Item = Result<[u32; 3]>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.remaining {
            0..=2 => None,
            3 => {
                let b = self.vertices[self.head].next;
                let c = self.vertices[b].next;
                let a = self.head;
                self.remaining = 0;
                Some(Ok([c as u32, b as u32, a as u32]))
            }
            _ => Some(self.clip_ear()),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let upper = self.remaining.saturating_sub(2);
        (0, Some(upper))
    }
}

/// Triangulates a simple polygon into `n - 2` triangles.
pub fn triangulate(points: &[Point2<f32>]) -> Result<Vec<[u32; 3]>> {
    Triangulator::new(points)?.collect()
}

/// Writes at most `max_triangles` triangles into `out` as flat index triples.
///
/// `out` must hold `3 * min(n - 2, max_triangles)` indices. Returns the number
/// of triangles written.
pub fn triangulate_into(
    points: &[Point2<f32>],
    out: &mut [u32],
    max_triangles: usize,
) -> Result<usize> {
    let triangulator = Triangulator::new(points)?;
    let required = 3 * (points.len() - 2).min(max_triangles);
    if out.len() < required {
        return Err(TriangulationError::BufferTooSmall {
            capacity: out.len(),
            required,
        });
    }

    let mut count = 0;
    for (chunk, triangle) in out.chunks_exact_mut(3).zip(triangulator.take(max_triangles)) {
        chunk.copy_from_slice(&triangle?);
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, simple_polygon_any_winding};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn points(raw: &[[f32; 2]]) -> Vec<Point2<f32>> {
        raw.iter().map(|&[x, y]| Point2::new(x, y)).collect()
    }

    fn total_area(points: &[Point2<f32>], triangles: &[[u32; 3]]) -> f64 {
        triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|i| &points[i as usize]);
                test_support::area2(a, b, c).abs() * 0.5
            })
            .sum()
    }

    #[test]
    fn square_yields_two_triangles() {
        let square = points(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        let triangles = triangulate(&square).unwrap();
        assert_eq!(triangles.len(), 2);
        assert_eq!(total_area(&square, &triangles), 100.0);
    }

    #[test]
    fn first_ear_is_emitted_as_next_vertex_prev() {
        let square = points(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        let mut t = Triangulator::new(&square).unwrap();
        assert_eq!(t.next(), Some(Ok([1, 0, 3])));
        assert_eq!(t.remaining(), 3);
        assert_eq!(t.next(), Some(Ok([3, 2, 1])));
        assert_eq!(t.next(), None);
    }

    #[test]
    fn winding_is_opposite_to_input() {
        let ccw = points(&[[0.0, 0.0], [4.0, 0.0], [4.0, 3.0], [2.0, 5.0], [0.0, 3.0]]);
        for t in triangulate(&ccw).unwrap() {
            let [a, b, c] = t.map(|i| ccw[i as usize]);
            assert!(area2(&a, &b, &c) < 0.0);
        }

        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        let triangulator = Triangulator::new(&cw).unwrap();
        assert!(triangulator.is_clockwise());
        let triangles: Vec<_> = triangulator.collect::<Result<_>>().unwrap();
        assert_eq!(triangles.len(), 3);
        for t in triangles {
            let [a, b, c] = t.map(|i| cw[i as usize]);
            assert!(area2(&a, &b, &c) > 0.0);
        }
    }

    #[test]
    fn collinear_points_are_never_clipped_flat() {
        let notched = points(&[[0.0, 0.0], [5.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        let triangles = triangulate(&notched).unwrap();
        assert_eq!(triangles.len(), 3);
        for t in &triangles {
            let [a, b, c] = t.map(|i| notched[i as usize]);
            assert_ne!(area2(&a, &b, &c), 0.0);
        }
        assert_eq!(total_area(&notched, &triangles), 100.0);
    }

    #[test]
    fn concave_polygon() {
        let u = points(&[
            [0.0, 0.0],
            [6.0, 0.0],
            [6.0, 6.0],
            [4.0, 6.0],
            [4.0, 2.0],
            [2.0, 2.0],
            [2.0, 6.0],
            [0.0, 6.0],
        ]);
        let triangles = triangulate(&u).unwrap();
        assert_eq!(triangles.len(), 6);
        assert!((total_area(&u, &triangles) - 28.0).abs() < 1e-4);
    }

    #[test]
    fn self_intersecting_input_fails_fast() {
        let bowtie = points(&[[0.0, 0.0], [2.0, 2.0], [2.0, 0.0], [0.0, 2.0]]);
        let mut t = Triangulator::new(&bowtie).unwrap();
        assert_eq!(
            t.next(),
            Some(Err(TriangulationError::NoEar {
                remaining: 4,
                attempts: 4
            }))
        );
        assert_eq!(t.next(), None);
        assert!(triangulate(&bowtie).is_err());
    }

    #[test]
    fn too_few_points() {
        let line = points(&[[0.0, 0.0], [1.0, 0.0]]);
        assert_eq!(Triangulator::new(&line).err(), Some(TriangulationError::TooFewPoints(2)));
        assert_eq!(triangulate_into(&line, &mut [], 1), Err(TriangulationError::TooFewPoints(2)));
    }

    #[test]
    fn budget_limits_output() {
        let hexagon: Vec<_> = (0..6)
            .map(|i| {
                let theta = i as f32 * std::f32::consts::TAU / 6.0;
                Point2::new(theta.cos(), theta.sin())
            })
            .collect();
        let mut out = [u32::MAX; 12];
        assert_eq!(triangulate_into(&hexagon, &mut out, 2), Ok(2));
        assert!(out[..6].iter().all(|&i| i < 6));
        assert!(out[6..].iter().all(|&i| i == u32::MAX));

        let mut full = [0; 12];
        assert_eq!(triangulate_into(&hexagon, &mut full, usize::MAX), Ok(4));
    }

    #[test]
    fn short_buffer_is_rejected() {
        let square = points(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        let mut out = [0; 5];
        assert_eq!(
            triangulate_into(&square, &mut out, 2),
            Err(TriangulationError::BufferTooSmall {
                capacity: 5,
                required: 6
            })
        );
        assert_eq!(triangulate_into(&square, &mut out, 1), Ok(1));
    }

    proptest! {
        #[test]
        fn simple_polygons_triangulate_fully(points in simple_polygon_any_winding(16)) {
            let triangles = triangulate(&points).unwrap();
            let n = points.len();
            prop_assert_eq!(triangles.len(), n - 2);

            let mut seen = HashSet::new();
            for t in &triangles {
                prop_assert!(t.iter().all(|&i| (i as usize) < n));
                prop_assert!(t[0] != t[1] && t[1] != t[2] && t[0] != t[2]);
                let mut key = *t;
                key.sort_unstable();
                prop_assert!(seen.insert(key));
            }

            let expected = crate::shape::shoelace(&points).abs() as f64;
            let area = total_area(&points, &triangles);
            prop_assert!((area - expected).abs() <= 1e-3 * expected.max(1.0));
        }

        #[test]
        fn triangulation_is_deterministic(points in simple_polygon_any_winding(10)) {
            prop_assert_eq!(triangulate(&points), triangulate(&points));
        }
    }
}
