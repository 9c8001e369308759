//! Physics World
//!
//! The reference physics collaborator used by platform characters:
//! - Body allocation with generational handles
//! - Gravity, forces, damping and impulses
//! - Oriented-box contact detection (separating axis test)
//! - Positional correction and velocity response (no restitution)
//! - Collision events, reported once from each side
//! - Point queries ("which bodies occupy this point")
//!
//! The solver is deliberately discrete: one detection pass per step, no
//! continuous collision detection.

use tracing::trace;

use super::body::{Body, Collidable};
use super::handle::{BodyAllocator, BodyId};
use super::storage::BodySlots;
use crate::event::{CollisionEvent, EventQueue};
use crate::math::Vec2;

/// Default gravity in world units per second squared (y-up world).
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, -1000.0);

/// Result of a separating axis test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first body toward the second
    pub normal: Vec2,
    /// Penetration depth along the normal
    pub depth: f32,
}

/// Separating axis test between two oriented rectangles.
/// Touching edges do not count as contact.
pub fn overlap(a: &Body, b: &Body) -> Option<Contact> {
    let corners_a = a.corners();
    let corners_b = b.corners();
    let mut best: Option<Contact> = None;

    for axis in a.axes().into_iter().chain(b.axes()) {
        let (a_min, a_max) = project(&corners_a, axis);
        let (b_min, b_max) = project(&corners_b, axis);

        // Depth needed to push b toward +axis, or toward -axis
        let forward = a_max - b_min;
        let backward = b_max - a_min;
        if forward <= 0.0 || backward <= 0.0 {
            return None;
        }

        let candidate = if forward <= backward {
            Contact { normal: axis, depth: forward }
        } else {
            Contact { normal: -axis, depth: backward }
        };

        if best.map_or(true, |c| candidate.depth < c.depth) {
            best = Some(candidate);
        }
    }

    best
}

fn project(corners: &[Vec2; 4], axis: Vec2) -> (f32, f32) {
    corners.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), c| {
        let d = c.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// The physics world containing all bodies.
pub struct PhysicsWorld {
    allocator: BodyAllocator,
    bodies: BodySlots<Body>,
    pub gravity: Vec2,
    collisions: EventQueue<CollisionEvent>,
    /// Simulated seconds since the world was created
    elapsed: f64,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            allocator: BodyAllocator::new(),
            bodies: BodySlots::new(),
            gravity,
            collisions: EventQueue::new(),
            elapsed: 0.0,
        }
    }

    pub fn add(&mut self, body: Body) -> BodyId {
        let id = self.allocator.allocate();
        self.bodies.insert(id, body);
        id
    }

    /// Remove a body. Every outstanding handle to it becomes stale.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let body = self.bodies.remove(id)?;
        self.allocator.free(id);
        Some(body)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains(id)
    }

    pub fn len(&self) -> usize {
        self.allocator.alive_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Apply an impulse. Returns false for a stale handle.
    pub fn hit(&mut self, id: BodyId, impulse: Vec2) -> bool {
        match self.bodies.get_mut(id) {
            Some(body) => {
                body.hit(impulse);
                true
            }
            None => false,
        }
    }

    /// Apply a force during the next step. Returns false for a stale handle.
    pub fn push(&mut self, id: BodyId, force: Vec2) -> bool {
        match self.bodies.get_mut(id) {
            Some(body) => {
                body.push(force);
                true
            }
            None => false,
        }
    }

    /// Whether two bodies filter each other out. A body always ignores itself.
    pub fn ignores_collision_between(&self, a: BodyId, b: BodyId) -> bool {
        if a == b {
            return true;
        }
        match (self.get(a), self.get(b)) {
            (Some(ba), Some(bb)) => ba.ignores_collision_with(bb),
            _ => true,
        }
    }

    /// Every body whose outline contains `point`, in slot order.
    pub fn objects_at(&self, point: Vec2) -> Vec<BodyId> {
        self.bodies
            .iter()
            .filter(|(_, body)| body.contains_point(point))
            .map(|(id, _)| id)
            .collect()
    }

    /// The top-most body at `point` (highest slot wins).
    pub fn object_at(&self, point: Vec2) -> Option<BodyId> {
        self.objects_at(point).last().copied()
    }

    /// Collision events produced by the last steps, not yet drained.
    pub fn collisions(&self) -> &EventQueue<CollisionEvent> {
        &self.collisions
    }

    pub fn drain_collisions(&mut self) -> Vec<CollisionEvent> {
        self.collisions.drain().collect()
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.elapsed += dt as f64;
        self.integrate(dt);
        self.detect_and_resolve();
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;

        for (_, body) in self.bodies.iter_mut() {
            let force = std::mem::replace(&mut body.pending_force, Vec2::ZERO);
            if body.is_static() {
                continue;
            }

            if !body.ignores_gravity {
                body.velocity += gravity * dt;
            }
            body.velocity += force * (body.inverse_mass() * dt);
            body.velocity *= body.linear_damping;
            body.position += body.velocity * dt;
        }
    }

    fn detect_and_resolve(&mut self) {
        let ids = self.bodies.ids();

        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let (Some(body_a), Some(body_b)) = (self.bodies.get(a), self.bodies.get(b)) else {
                    continue;
                };

                if body_a.is_static() && body_b.is_static() {
                    continue;
                }

                let sensor_a = body_a.ignores_collision_response;
                let sensor_b = body_b.ignores_collision_response;
                if sensor_a && sensor_b {
                    continue;
                }

                let group = body_a.collision_ignore_group;
                if group != 0 && group == body_b.collision_ignore_group {
                    continue;
                }

                let Some(contact) = overlap(body_a, body_b) else {
                    continue;
                };

                if !sensor_a && !sensor_b {
                    self.resolve(a, b, contact);
                }

                trace!(%a, %b, depth = contact.depth, "contact");
                self.collisions.send(CollisionEvent {
                    body: a,
                    other: b,
                    normal: contact.normal,
                });
                self.collisions.send(CollisionEvent {
                    body: b,
                    other: a,
                    normal: -contact.normal,
                });
            }
        }
    }

    fn resolve(&mut self, a: BodyId, b: BodyId, contact: Contact) {
        let Some((body_a, body_b)) = self.bodies.get_pair_mut(a, b) else {
            return;
        };

        let inv_a = body_a.inverse_mass();
        let inv_b = body_b.inverse_mass();
        let total = inv_a + inv_b;
        if total == 0.0 {
            return;
        }

        let n = contact.normal;
        body_a.position -= n * (contact.depth * inv_a / total);
        body_b.position += n * (contact.depth * inv_b / total);

        let approach = (body_b.velocity - body_a.velocity).dot(n);
        if approach >= 0.0 {
            return;
        }

        // Against an immovable body the normal component is removed outright
        if inv_a == 0.0 {
            body_b.velocity -= n * approach;
        } else if inv_b == 0.0 {
            body_a.velocity += n * approach;
        } else {
            let j = -approach / total;
            body_a.velocity -= n * (j * inv_a);
            body_b.velocity += n * (j * inv_b);
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY)
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("bodies", &self.len())
            .field("gravity", &self.gravity)
            .field("pending_collisions", &self.collisions.len())
            .field("elapsed", &self.elapsed)
            .finish()
    }
}
