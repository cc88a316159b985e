//! Collaborators a tracking proximity is wired to.

use nalgebra::{Point3, Vector3};

use crate::{Axis, PolygonMesh, Result};

/// Physical volume requested from the physics backend for a proximity.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerCollider {
    /// Axis-aligned box.
    Cuboid {
        /// Box center.
        center: Point3<f32>,
        /// Half the size per axis.
        half_extents: Vector3<f32>,
    },
    /// Sphere.
    Sphere {
        /// Sphere center.
        center: Point3<f32>,
        /// Radius.
        radius: f32,
    },
    /// Capsule enclosing a cylinder: a segment of `2 * half_height` along
    /// `axis`, swept by `radius`.
    Capsule {
        /// Segment midpoint.
        center: Point3<f32>,
        /// Segment direction.
        axis: Axis,
        /// Half the segment length.
        half_height: f32,
        /// Sweep radius.
        radius: f32,
    },
    /// Closed triangle mesh.
    Mesh(PolygonMesh),
}

impl TriggerCollider {
    /// Short name of the collider family.
    pub fn kind(&self) -> &'static str {
        match self {
            TriggerCollider::Cuboid { .. } => "cuboid",
            TriggerCollider::Sphere { .. } => "sphere",
            TriggerCollider::Capsule { .. } => "capsule",
            TriggerCollider::Mesh(_) => "mesh",
        }
    }
}

/// A physical trigger volume owned by a tracking proximity.
pub trait TriggerVolume {
    /// Destroys the physical resource. Called exactly once.
    fn release(&mut self);
}

/// Physics backend able to materialize trigger volumes.
///
/// Overlap notifications for a spawned volume are delivered by the caller to
/// `TrackingProximity::on_overlap_enter`, `on_overlap_exit` and
/// `on_overlap_stay`.
pub trait TriggerBackend {
    /// Handle type of spawned volumes.
    type Volume: TriggerVolume;

    /// Creates a trigger volume for `collider`.
    fn spawn_trigger(&mut self, collider: &TriggerCollider) -> Result<Self::Volume>;
}

/// The world simulation's view of entities.
pub trait EntitySource<E> {
    /// Current world position, or `None` if the entity no longer exists.
    fn position(&self, entity: E) -> Option<Point3<f32>>;

    /// Entities carried by `container`, e.g. a vehicle's passengers.
    ///
    /// The default treats every entity as its own sole occupant.
    fn occupants(&self, container: E, out: &mut Vec<E>) {
        out.push(container);
    }
}
