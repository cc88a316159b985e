//! Membership tracking on top of a physical trigger volume.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nalgebra::Point3;

use super::{EntitySource, ProximityEvent, ProximityListener, TriggerBackend, TriggerVolume};
use crate::{Proximity, ProximityError, Result};

type Validator<E> = Box<dyn Fn(E, &Point3<f32>) -> bool + Send>;

/// Requests disposal of a [`TrackingProximity`] from any thread.
///
/// The request only sets a flag; teardown happens on the owning thread the
/// next time the tracker is driven or [`TrackingProximity::process_pending_disposal`]
/// is called.
#[derive(Debug, Clone)]
pub struct DisposalHandle {
    requested: Arc<AtomicBool>,
}

impl DisposalHandle {
    /// Flags the tracker for disposal.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Returns `true` once disposal was requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

/// A proximity that keeps the set of entities currently inside it.
///
/// An entity is a member while it physically overlaps the trigger volume, its
/// position passes the shape's containment test and the optional validator
/// accepts it. Physical callbacks and periodic revalidation both go through
/// [`reconcile`](Self::reconcile), so each transition is reported once.
///
/// Not thread-safe: drive it from the thread that owns the world state. Use a
/// [`DisposalHandle`] to request teardown from elsewhere.
pub struct TrackingProximity<P, V: TriggerVolume, E> {
    shape: P,
    trigger: Option<V>,
    overlapping: HashSet<E>,
    members: HashMap<E, Point3<f32>>,
    validator: Option<Validator<E>>,
    pending_disposal: Arc<AtomicBool>,
    disposed: bool,
    scratch: Vec<E>,
}

impl<P, V, E> TrackingProximity<P, V, E>
where
    P: Proximity,
    V: TriggerVolume,
    E: Copy + Eq + Hash + fmt::Debug,
{
    /// Wraps `shape` with an already spawned trigger volume.
    pub fn new(shape: P, trigger: V) -> Self {
        Self {
            shape,
            trigger: Some(trigger),
            overlapping: HashSet::new(),
            members: HashMap::new(),
            validator: None,
            pending_disposal: Arc::new(AtomicBool::new(false)),
            disposed: false,
            scratch: Vec::new(),
        }
    }

    /// Asks `backend` for a trigger volume approximating `shape`.
    pub fn spawn<B>(shape: P, backend: &mut B) -> Result<Self>
    where
        B: TriggerBackend<Volume = V>,
    {
        let collider = shape.trigger_collider()?;
        let trigger = backend.spawn_trigger(&collider)?;
        log::debug!("spawned {} trigger for {} proximity", collider.kind(), shape.kind());
        Ok(Self::new(shape, trigger))
    }

    /// Adds an extra membership condition evaluated with the entity's position.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(E, &Point3<f32>) -> bool + Send + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// The tracked shape.
    #[inline]
    pub fn shape(&self) -> &P {
        &self.shape
    }

    /// Handle that can request disposal from another thread.
    pub fn disposal_handle(&self) -> DisposalHandle {
        DisposalHandle {
            requested: Arc::clone(&self.pending_disposal),
        }
    }

    /// Returns `true` once the tracker was disposed.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            Err(ProximityError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Processes a pending disposal request, then fails if disposed.
    fn drive(&mut self) -> Result<()> {
        self.process_pending_disposal();
        self.ensure_live()
    }

    /// Returns `true` if `entity` is currently a member.
    pub fn contains(&self, entity: E) -> Result<bool> {
        self.ensure_live()?;
        Ok(self.members.contains_key(&entity))
    }

    /// Current members with their last known positions.
    pub fn members(&self) -> Result<impl Iterator<Item = (E, Point3<f32>)> + '_> {
        self.ensure_live()?;
        Ok(self.members.iter().map(|(&entity, &position)| (entity, position)))
    }

    /// Number of current members.
    pub fn member_count(&self) -> Result<usize> {
        self.ensure_live()?;
        Ok(self.members.len())
    }

    /// Last position recorded for a member, `None` for non-members.
    pub fn last_position(&self, entity: E) -> Result<Option<Point3<f32>>> {
        self.ensure_live()?;
        Ok(self.members.get(&entity).copied())
    }

    /// Brings one entity's membership in line with the given facts.
    ///
    /// `position` is `None` when the entity no longer exists. Returns the
    /// transition that was reported, if any; an entity already in the right
    /// state produces nothing.
    pub fn reconcile<L>(
        &mut self,
        entity: E,
        overlapping: bool,
        position: Option<Point3<f32>>,
        listener: &mut L,
    ) -> Result<Option<ProximityEvent<E>>>
    where
        L: ProximityListener<E> + ?Sized,
    {
        self.ensure_live()?;

        let inside = match position {
            Some(p) if overlapping => {
                self.shape.test_point(&p)
                    && self.validator.as_ref().is_none_or(|valid| valid(entity, &p))
            }
            _ => false,
        };

        let event = match (self.members.get_mut(&entity), inside, position) {
            (Some(last), true, Some(p)) => {
                *last = p;
                None
            }
            (None, true, Some(p)) => {
                self.members.insert(entity, p);
                log::debug!("{entity:?} entered {} proximity at {p}", self.shape.kind());
                listener.on_enter(entity, &p);
                Some(ProximityEvent::Enter(entity, p))
            }
            (Some(last), false, _) => {
                let p = position.unwrap_or(*last);
                self.members.remove(&entity);
                log::debug!("{entity:?} left {} proximity at {p}", self.shape.kind());
                listener.on_exit(entity, &p);
                Some(ProximityEvent::Exit(entity, p))
            }
            _ => None,
        };
        Ok(event)
    }

    fn overlap_changed<W, L>(
        &mut self,
        collider: E,
        overlapping: bool,
        world: &W,
        listener: &mut L,
    ) -> Result<()>
    where
        W: EntitySource<E> + ?Sized,
        L: ProximityListener<E> + ?Sized,
    {
        self.drive()?;

        let mut occupants = std::mem::take(&mut self.scratch);
        occupants.clear();
        world.occupants(collider, &mut occupants);

        let mut result = Ok(());
        for &entity in &occupants {
            if overlapping {
                self.overlapping.insert(entity);
            } else {
                self.overlapping.remove(&entity);
            }
            let position = world.position(entity);
            if let Err(error) = self.reconcile(entity, overlapping, position, listener) {
                result = Err(error);
                break;
            }
        }

        self.scratch = occupants;
        result
    }

    /// Physics reported that `collider` started overlapping the trigger.
    pub fn on_overlap_enter<W, L>(&mut self, collider: E, world: &W, listener: &mut L) -> Result<()>
    where
        W: EntitySource<E> + ?Sized,
        L: ProximityListener<E> + ?Sized,
    {
        self.overlap_changed(collider, true, world, listener)
    }

    /// Physics reported that `collider` keeps overlapping the trigger.
    pub fn on_overlap_stay<W, L>(&mut self, collider: E, world: &W, listener: &mut L) -> Result<()>
    where
        W: EntitySource<E> + ?Sized,
        L: ProximityListener<E> + ?Sized,
    {
        self.overlap_changed(collider, true, world, listener)
    }

    /// Physics reported that `collider` stopped overlapping the trigger.
    pub fn on_overlap_exit<W, L>(&mut self, collider: E, world: &W, listener: &mut L) -> Result<()>
    where
        W: EntitySource<E> + ?Sized,
        L: ProximityListener<E> + ?Sized,
    {
        self.overlap_changed(collider, false, world, listener)
    }

    /// Re-checks every overlapping entity and every member against current positions.
    ///
    /// Entities that no longer exist are forgotten. Returns the number of
    /// transitions reported.
    pub fn revalidate<W, L>(&mut self, world: &W, listener: &mut L) -> Result<usize>
    where
        W: EntitySource<E> + ?Sized,
        L: ProximityListener<E> + ?Sized,
    {
        self.drive()?;

        let mut candidates = std::mem::take(&mut self.scratch);
        candidates.clear();
        candidates.extend(self.overlapping.iter().copied());
        candidates.extend(self.members.keys().filter(|e| !self.overlapping.contains(e)).copied());

        let mut transitions = 0;
        let mut result = Ok(());
        for &entity in &candidates {
            let position = world.position(entity);
            if position.is_none() {
                self.overlapping.remove(&entity);
            }
            let overlapping = self.overlapping.contains(&entity);
            match self.reconcile(entity, overlapping, position, listener) {
                Ok(Some(_)) => transitions += 1,
                Ok(None) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
        log::trace!(
            "revalidated {} entities against {} proximity: {transitions} transitions, {} members",
            candidates.len(),
            self.shape.kind(),
            self.members.len()
        );

        self.scratch = candidates;
        result.map(|()| transitions)
    }

    /// Disposes the tracker if a [`DisposalHandle`] asked for it.
    ///
    /// Returns `true` if disposal happened during this call.
    pub fn process_pending_disposal(&mut self) -> bool {
        if self.disposed || !self.pending_disposal.load(Ordering::Acquire) {
            return false;
        }
        log::debug!("processing pending disposal of {} proximity", self.shape.kind());
        self.dispose();
        true
    }

    /// Releases the trigger volume and forgets every member without exit notifications.
    ///
    /// Disposing twice is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(mut trigger) = self.trigger.take() {
            trigger.release();
        }
        log::debug!(
            "disposed {} proximity with {} members",
            self.shape.kind(),
            self.members.len()
        );
        self.members.clear();
        self.overlapping.clear();
        self.disposed = true;
    }
}

impl<P, V: TriggerVolume, E> Drop for TrackingProximity<P, V, E> {
    fn drop(&mut self) {
        if let Some(mut trigger) = self.trigger.take() {
            trigger.release();
        }
    }
}

impl<P: fmt::Debug, V: TriggerVolume, E: fmt::Debug> fmt::Debug for TrackingProximity<P, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingProximity")
            .field("shape", &self.shape)
            .field("members", &self.members)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
