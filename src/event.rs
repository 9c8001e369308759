//! Events and observers
//!
//! Two delivery styles are used:
//! - `EventQueue<T>`: collected during a physics step, drained afterwards
//!   (collision contacts)
//! - `Observers<T>`: listeners called synchronously when something happens
//!   (direction changes, appearance requests)
//!
//! Observers can be attached and detached independently; removing one
//! listener never affects the others.

use crate::math::Vec2;
use crate::physics::BodyId;

/// A queue for events of a single type.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Contact between two bodies, reported once from each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// The body receiving this report
    pub body: BodyId,
    /// The body it touched
    pub other: BodyId,
    /// Unit contact normal pointing from `body` toward `other`
    pub normal: Vec2,
}

/// Handle returned by `Observers::subscribe`, used to detach a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A list of independent listeners for values of type `T`.
pub struct Observers<T> {
    next_id: u64,
    listeners: Vec<(ListenerId, Box<dyn FnMut(&T)>)>,
}

impl<T> Observers<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Detach a listener. Returns false if it was not attached.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Call every listener in subscription order.
    pub fn notify(&mut self, value: &T) {
        for (_, listener) in &mut self.listeners {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_contacts_drain_in_report_order() {
        let a = BodyId::new(0, 0);
        let b = BodyId::new(1, 0);
        let mut contacts = EventQueue::new();
        contacts.send(CollisionEvent { body: a, other: b, normal: Vec2::NEG_Y });
        contacts.send(CollisionEvent { body: b, other: a, normal: Vec2::Y });

        let bodies: Vec<_> = contacts.iter().map(|c| c.body).collect();
        assert_eq!(bodies, vec![a, b]);

        let drained: Vec<_> = contacts.drain().collect();
        assert_eq!(drained[1].normal, -drained[0].normal);
        assert!(contacts.is_empty());
    }

    #[test]
    fn test_observers_detach_independently() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers: Observers<i32> = Observers::new();

        let a_log = Rc::clone(&log);
        let a = observers.subscribe(move |v| a_log.borrow_mut().push(("a", *v)));
        let b_log = Rc::clone(&log);
        observers.subscribe(move |v| b_log.borrow_mut().push(("b", *v)));

        observers.notify(&1);
        assert!(observers.unsubscribe(a));
        assert!(!observers.unsubscribe(a));
        observers.notify(&2);

        assert_eq!(*log.borrow(), vec![("a", 1), ("b", 1), ("b", 2)]);
        assert_eq!(observers.len(), 1);
    }
}
