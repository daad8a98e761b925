use std::collections::VecDeque;

use crate::collision::{ColliderHandle, ContactKind};
use crate::core::BodyHandle;
use crate::math::Vector3;

/// A contact that was resolved during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// Which narrow-phase routine produced the contact
    pub kind: ContactKind,

    /// The first collider of the pair
    pub collider_a: ColliderHandle,

    /// The second collider of the pair
    pub collider_b: ColliderHandle,

    /// Body owning the first collider (`None` for static geometry)
    pub body_a: Option<BodyHandle>,

    /// Body owning the second collider (`None` for static geometry)
    pub body_b: Option<BodyHandle>,

    /// Contact normal, pointing from the first collider toward the second
    pub normal: Vector3,

    /// Penetration depth before resolution
    pub depth: f32,
}

/// Types of body events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEventType {
    /// A body has been added to the world
    Added,

    /// A body has been removed from the world
    Removed,
}

/// An event related to a single body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyEvent {
    /// The type of body event
    pub event_type: BodyEventType,

    /// The body that the event refers to
    pub body: BodyHandle,
}

/// A queue of simulation events the host drains between ticks
#[derive(Debug, Default)]
pub struct EventQueue {
    collision_events: VecDeque<CollisionEvent>,
    body_events: VecDeque<BodyEvent>,
}

impl EventQueue {
    /// Creates a new empty event queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collision event to the queue
    pub fn add_collision_event(&mut self, event: CollisionEvent) {
        self.collision_events.push_back(event);
    }

    /// Adds a body event to the queue
    pub fn add_body_event(&mut self, event: BodyEvent) {
        self.body_events.push_back(event);
    }

    /// Gets the next collision event from the queue
    pub fn next_collision_event(&mut self) -> Option<CollisionEvent> {
        self.collision_events.pop_front()
    }

    /// Gets the next body event from the queue
    pub fn next_body_event(&mut self) -> Option<BodyEvent> {
        self.body_events.pop_front()
    }

    /// Removes and returns every pending collision event
    pub fn drain_collision_events(&mut self) -> Vec<CollisionEvent> {
        self.collision_events.drain(..).collect()
    }

    /// Drops pending collision events, keeping body events
    pub fn clear_collision_events(&mut self) {
        self.collision_events.clear();
    }

    /// Returns whether there are any collision events in the queue
    pub fn has_collision_events(&self) -> bool {
        !self.collision_events.is_empty()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.collision_events.is_empty() && self.body_events.is_empty()
    }

    /// Clears all events from the queue
    pub fn clear(&mut self) {
        self.collision_events.clear();
        self.body_events.clear();
    }

    /// Gets all collision events of a specific kind
    pub fn collision_events_of_kind(&self, kind: ContactKind) -> Vec<&CollisionEvent> {
        self.collision_events.iter().filter(|e| e.kind == kind).collect()
    }

    /// Gets all collision events involving a specific body
    pub fn collision_events_for_body(&self, body: BodyHandle) -> Vec<&CollisionEvent> {
        self.collision_events
            .iter()
            .filter(|e| e.body_a == Some(body) || e.body_b == Some(body))
            .collect()
    }
}
