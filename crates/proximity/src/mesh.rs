//! Closed triangle meshes of extruded polygons.

use nalgebra::{Point3, Vector3};

use crate::bounds::UNBOUNDED_EXTENT;
use crate::{Frame, Polygon, Proximity, Result, triangulate};

/// Indexed triangle mesh with vertices stored relative to an origin.
///
/// Triangles wind counter-clockwise seen from outside, so face normals
/// `(v1 - v0) x (v2 - v0)` point outwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonMesh {
    origin: Point3<f32>,
    vertices: Vec<Vector3<f32>>,
    indices: Vec<u32>,
}

impl PolygonMesh {
    /// Extrudes a polygon between its height bounds.
    ///
    /// Vertices `0..n` form the bottom ring and `n..2n` the top ring. The
    /// origin is the center of the polygon's bounding box. An unbounded
    /// polygon is closed at `±UNBOUNDED_EXTENT / 2`.
    pub fn extrude(polygon: &Polygon) -> Result<Self> {
        let triangles = triangulate(polygon.points())?;

        let (y_lo, y_hi) = polygon
            .height()
            .map_or((-UNBOUNDED_EXTENT * 0.5, UNBOUNDED_EXTENT * 0.5), |h| (h.min(), h.max()));
        let origin = polygon.bounding_box().center();

        let points = polygon.points();
        let n = points.len();
        let ring = |y: f32| {
            points
                .iter()
                .map(move |p| Vector3::new(p.x - origin.x, y - origin.y, p.y - origin.z))
        };
        let vertices: Vec<_> = ring(y_lo).chain(ring(y_hi)).collect();

        let top = n as u32;
        let ccw = polygon.is_counter_clockwise();
        let mut indices = Vec::with_capacity(3 * (2 * triangles.len() + 2 * n));

        // Emitted ear triangles wind opposite to the polygon, which faces +Y
        // for counter-clockwise input.
        for &[a, b, c] in &triangles {
            if ccw {
                indices.extend_from_slice(&[a + top, b + top, c + top, c, b, a]);
            } else {
                indices.extend_from_slice(&[c + top, b + top, a + top, a, b, c]);
            }
        }

        for i in 0..n as u32 {
            let j = (i + 1) % top;
            if ccw {
                indices.extend_from_slice(&[i, j + top, j, i, i + top, j + top]);
            } else {
                indices.extend_from_slice(&[i, j, j + top, i, j + top, i + top]);
            }
        }

        log::trace!(
            "extruded {n}-point polygon into {} triangles",
            indices.len() / 3
        );
        Ok(Self {
            origin,
            vertices,
            indices,
        })
    }

    /// Reference point the vertices are relative to.
    #[inline]
    pub fn origin(&self) -> Point3<f32> {
        self.origin
    }

    /// Vertex offsets from [`origin`](Self::origin).
    #[inline]
    pub fn vertices(&self) -> &[Vector3<f32>] {
        &self.vertices
    }

    /// Flat triangle index list.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertices in absolute coordinates.
    pub fn world_vertices(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        self.vertices.iter().map(|v| self.origin + v)
    }

    /// The same mesh placed in `frame`.
    ///
    /// Mirroring scales flip every triangle so normals keep pointing outwards.
    pub fn transformed<F: Frame + ?Sized>(&self, frame: &F) -> PolygonMesh {
        let origin = frame.to_world(&self.origin);
        let vertices = self
            .world_vertices()
            .map(|p| frame.to_world(&p) - origin)
            .collect();

        let scale = frame.scale();
        let mut indices = self.indices.clone();
        if scale.x * scale.y * scale.z < 0.0 {
            for triangle in indices.chunks_exact_mut(3) {
                triangle.swap(1, 2);
            }
        }
        PolygonMesh {
            origin,
            vertices,
            indices,
        }
    }
}
