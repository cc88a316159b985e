//! Listeners for tracking transitions.
//!
//! Listeners receive enter/exit notifications without coupling the tracker to
//! whatever reacts to them (gameplay rules, logging, tests).

use nalgebra::Point3;

/// A single membership transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProximityEvent<E> {
    /// The entity became a member at the given position.
    Enter(E, Point3<f32>),
    /// The entity stopped being a member. Carries its last known position.
    Exit(E, Point3<f32>),
}

impl<E: Copy> ProximityEvent<E> {
    /// The entity the transition is about.
    pub fn entity(&self) -> E {
        match *self {
            ProximityEvent::Enter(entity, _) | ProximityEvent::Exit(entity, _) => entity,
        }
    }

    /// Returns `true` for [`ProximityEvent::Enter`].
    pub fn is_enter(&self) -> bool {
        matches!(self, ProximityEvent::Enter(..))
    }
}

/// Receiver of membership transitions.
///
/// Each transition is reported exactly once. Disposal of the tracker never
/// produces exit notifications.
pub trait ProximityListener<E> {
    /// Called when `entity` becomes a member.
    fn on_enter(&mut self, entity: E, position: &Point3<f32>);

    /// Called when `entity` stops being a member.
    fn on_exit(&mut self, entity: E, position: &Point3<f32>);
}

/// Listener that ignores every notification.
impl<E> ProximityListener<E> for () {
    fn on_enter(&mut self, _entity: E, _position: &Point3<f32>) {}

    fn on_exit(&mut self, _entity: E, _position: &Point3<f32>) {}
}

/// A simple listener that records every transition in order.
#[derive(Debug, Clone)]
pub struct CollectingListener<E> {
    events: Vec<ProximityEvent<E>>,
}

impl<E> Default for CollectingListener<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> CollectingListener<E> {
    /// Creates a new empty collecting listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded transitions.
    pub fn events(&self) -> &[ProximityEvent<E>] {
        &self.events
    }

    /// Returns the recorded transitions, leaving the listener empty.
    pub fn drain(&mut self) -> Vec<ProximityEvent<E>> {
        std::mem::take(&mut self.events)
    }
}

impl<E> ProximityListener<E> for CollectingListener<E> {
    fn on_enter(&mut self, entity: E, position: &Point3<f32>) {
        self.events.push(ProximityEvent::Enter(entity, *position));
    }

    fn on_exit(&mut self, entity: E, position: &Point3<f32>) {
        self.events.push(ProximityEvent::Exit(entity, *position));
    }
}

/// A listener that calls a closure for each transition.
pub struct FnListener<F> {
    func: F,
}

impl<F> FnListener<F> {
    /// Creates a new listener from a closure.
    pub fn new<E>(func: F) -> Self
    where
        F: FnMut(ProximityEvent<E>),
    {
        Self { func }
    }
}

impl<E, F> ProximityListener<E> for FnListener<F>
where
    F: FnMut(ProximityEvent<E>),
{
    fn on_enter(&mut self, entity: E, position: &Point3<f32>) {
        (self.func)(ProximityEvent::Enter(entity, *position));
    }

    fn on_exit(&mut self, entity: E, position: &Point3<f32>) {
        (self.func)(ProximityEvent::Exit(entity, *position));
    }
}
