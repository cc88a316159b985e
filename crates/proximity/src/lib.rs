//! Spatial proximities: regions of space that points are tested against.
//!
//! Shapes ([`Cuboid`], [`Sphere`], [`Cylinder`], [`Polygon`]) answer
//! containment, bounds, volume, surface area and nearest-border queries. They
//! can be bound to a moving [`Frame`], extruded into a [`PolygonMesh`] through
//! ear-clipping [`triangulate`], and wrapped in a [`TrackingProximity`] that
//! keeps the set of entities currently inside.
//!
//! Y is the vertical axis. Horizontal (`Point2`) queries use `(x, z)`.

mod attached;
mod border;
mod bounds;
pub mod config;
mod error;
mod frame;
mod mesh;
mod null;
mod proximity;
mod shape;
pub mod tracking;
mod triangulation;

#[cfg(test)]
mod test_support;

pub use attached::{Attached, AttachedPolygon, AttachedShape, ScaleAware};
pub use border::MIN_BORDER_DISTANCE;
pub use bounds::{Bounds, UNBOUNDED_EXTENT};
pub use error::{ProximityError, Result, TriangulationError};
pub use frame::{Frame, Transform};
pub use mesh::PolygonMesh;
pub use null::NullProximity;
pub use proximity::Proximity;
pub use shape::{Axis, Cuboid, Cylinder, Edge, HeightRange, Polygon, Shape, Sphere};
pub use tracking::{
    CollectingListener, DisposalHandle, EntitySource, FnListener, ProximityEvent, ProximityListener,
    TrackingProximity, TriggerBackend, TriggerCollider, TriggerVolume,
};
pub use triangulation::{Triangulator, triangulate, triangulate_into};
