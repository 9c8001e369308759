//! Ground probes
//!
//! Sensor bodies hanging from a character's left, center and right, each
//! a third of the character's width and its full height. A probe only
//! remembers the last platform it touched; it never owns it.

use tracing::trace;

use super::contact::is_platform;
use crate::math::Vec2;
use crate::physics::{Body, BodyId, PhysicsWorld};

/// Probe offsets as fractions of the owner's (width, height).
pub const PROBE_LAYOUT: [(f32, f32); 3] = [(0.25, -0.125), (0.0, -0.125), (-0.25, -0.125)];

#[derive(Debug, Clone)]
pub struct GroundProbe {
    /// Fraction of the owner's size from its center to the probe's center
    layout: Vec2,
    body: Option<BodyId>,
    last_hit: Option<BodyId>,
}

impl GroundProbe {
    pub fn new(layout: (f32, f32)) -> Self {
        Self {
            layout: Vec2::new(layout.0, layout.1),
            body: None,
            last_hit: None,
        }
    }

    /// The standard left/center/right set.
    pub fn set() -> [GroundProbe; 3] {
        PROBE_LAYOUT.map(GroundProbe::new)
    }

    pub fn body(&self) -> Option<BodyId> {
        self.body
    }

    /// Last platform this probe touched. May be stale.
    pub fn last_hit(&self) -> Option<BodyId> {
        self.last_hit
    }

    pub fn size_for(owner_size: Vec2) -> Vec2 {
        Vec2::new(owner_size.x / 3.0, owner_size.y)
    }

    pub fn position_for(&self, owner_position: Vec2, owner_size: Vec2) -> Vec2 {
        owner_position + self.layout * owner_size
    }

    /// Register the probe's sensor body with the world.
    pub fn spawn(&mut self, world: &mut PhysicsWorld, owner_position: Vec2, owner_size: Vec2, group: u32) -> BodyId {
        let size = Self::size_for(owner_size);
        let position = self.position_for(owner_position, owner_size);
        let id = world.add(
            Body::sensor(size.x, size.y)
                .at(position.x, position.y)
                .with_group(group),
        );
        self.body = Some(id);
        id
    }

    pub fn despawn(&mut self, world: &mut PhysicsWorld) {
        if let Some(id) = self.body.take() {
            world.remove(id);
        }
        self.last_hit = None;
    }

    /// Follow the owner.
    pub fn reposition(&self, world: &mut PhysicsWorld, owner_position: Vec2, owner_size: Vec2) {
        let position = self.position_for(owner_position, owner_size);
        if let Some(body) = self.body.and_then(|id| world.get_mut(id)) {
            body.position = position;
            body.velocity = Vec2::ZERO;
        }
    }

    /// Record a contact reported for this probe. Returns true when recorded.
    pub fn record_hit(&mut self, world: &PhysicsWorld, owner: BodyId, target: BodyId) -> bool {
        if target == owner {
            return false;
        }
        match world.get(target) {
            Some(body) if is_platform(body) => {
                if self.last_hit != Some(target) {
                    trace!(probe = ?self.body, %target, "probe hit");
                }
                self.last_hit = Some(target);
                true
            }
            _ => false,
        }
    }

    pub fn bottom(&self, world: &PhysicsWorld) -> Option<f32> {
        let body = world.get(self.body?)?;
        Some(body.position.y - body.size.y / 2.0)
    }
}
