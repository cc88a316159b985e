//! Event-based proximities that keep a live membership set.
//!
//! A [`TrackingProximity`] owns a physical trigger volume spawned through a
//! [`TriggerBackend`]. The physics collaborator forwards overlap notifications,
//! the simulation loop calls [`TrackingProximity::revalidate`] every tick, and
//! both end up in the same reconciliation step. Transitions are reported to a
//! [`ProximityListener`].

mod backend;
mod listener;
mod tracker;

pub use backend::{EntitySource, TriggerBackend, TriggerCollider, TriggerVolume};
pub use listener::{CollectingListener, FnListener, ProximityEvent, ProximityListener};
pub use tracker::{DisposalHandle, TrackingProximity};
