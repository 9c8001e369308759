//! Physics bodies
//!
//! A body is an oriented rectangle with a position at its center. Edge
//! accessors (`top`, `bottom`, `left`, `right`) ignore rotation, the same
//! way the platform logic treats a rotated platform's bounding edges; the
//! rotated outline is only used for contact detection and point queries.

use serde::{Deserialize, Serialize};

use crate::math::{rotate, Vec2};

/// How the solver treats a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moved by the solver. Movers may still reposition it.
    Static,
    #[default]
    Dynamic,
}

/// Anything with a center, a size and a rotation.
pub trait Positionable {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);
    /// Full width and height.
    fn size(&self) -> Vec2;
    fn angle(&self) -> f32;

    fn width(&self) -> f32 {
        self.size().x
    }

    fn height(&self) -> f32 {
        self.size().y
    }

    fn top(&self) -> f32 {
        self.position().y + self.size().y / 2.0
    }

    fn bottom(&self) -> f32 {
        self.position().y - self.size().y / 2.0
    }

    fn left(&self) -> f32 {
        self.position().x - self.size().x / 2.0
    }

    fn right(&self) -> f32 {
        self.position().x + self.size().x / 2.0
    }
}

/// Collision filtering flags.
pub trait Collidable {
    /// Sensors and decorations: reported in contacts, never pushed apart.
    fn ignores_collision_response(&self) -> bool;
    /// Bodies sharing a non-zero group never collide. 0 means no group.
    fn collision_ignore_group(&self) -> u32;

    /// Whether contact with `other` is filtered out.
    /// Identity is checked by the caller, which holds the handles.
    fn ignores_collision_with(&self, other: &dyn Collidable) -> bool {
        if self.ignores_collision_response() || other.ignores_collision_response() {
            return true;
        }
        let group = self.collision_ignore_group();
        group != 0 && group == other.collision_ignore_group()
    }
}

/// A rigid body in the reference physics world.
#[derive(Debug, Clone)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Rotation in radians
    pub angle: f32,
    pub size: Vec2,
    pub mass: f32,
    pub kind: BodyKind,
    pub ignores_gravity: bool,
    pub ignores_collision_response: bool,
    pub ignores_explosions: bool,
    pub collision_ignore_group: u32,
    /// Velocity multiplier applied once per step (1.0 = no damping)
    pub linear_damping: f32,
    /// Force accumulated for the next step
    pub(crate) pending_force: Vec2,
}

impl Body {
    /// A dynamic body of the given size at the origin.
    pub fn dynamic(width: f32, height: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            size: Vec2::new(width, height),
            mass: 1.0,
            kind: BodyKind::Dynamic,
            ignores_gravity: false,
            ignores_collision_response: false,
            ignores_explosions: false,
            collision_ignore_group: 0,
            linear_damping: 1.0,
            pending_force: Vec2::ZERO,
        }
    }

    /// A static body (platform, wall) of the given size at the origin.
    pub fn fixed(width: f32, height: f32) -> Self {
        Self {
            kind: BodyKind::Static,
            ignores_gravity: true,
            mass: f32::INFINITY,
            ..Self::dynamic(width, height)
        }
    }

    /// A non-interacting sensor: no gravity, no response, no explosions.
    pub fn sensor(width: f32, height: f32) -> Self {
        Self {
            ignores_gravity: true,
            ignores_collision_response: true,
            ignores_explosions: true,
            ..Self::dynamic(width, height)
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_group(mut self, group: u32) -> Self {
        self.collision_ignore_group = group;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    /// Inverse mass used by the solver; zero for static bodies.
    pub fn inverse_mass(&self) -> f32 {
        if self.is_static() || !self.mass.is_finite() || self.mass <= 0.0 {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Instantaneous impulse: velocity changes by `impulse / mass`.
    pub fn hit(&mut self, impulse: Vec2) {
        let inv = self.inverse_mass();
        self.velocity += impulse * inv;
    }

    /// Force applied during the next step.
    pub fn push(&mut self, force: Vec2) {
        self.pending_force += force;
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    pub fn stop_horizontal(&mut self) {
        self.velocity.x = 0.0;
    }

    pub fn stop_vertical(&mut self) {
        self.velocity.y = 0.0;
    }

    /// Local x and y axes of the rotated rectangle.
    pub fn axes(&self) -> [Vec2; 2] {
        let x = rotate(Vec2::X, self.angle);
        [x, Vec2::new(-x.y, x.x)]
    }

    /// Corners of the rotated rectangle, counter-clockwise from bottom-left.
    pub fn corners(&self) -> [Vec2; 4] {
        let [ax, ay] = self.axes();
        let hx = ax * (self.size.x / 2.0);
        let hy = ay * (self.size.y / 2.0);
        let p = self.position;
        [p - hx - hy, p + hx - hy, p + hx + hy, p - hx + hy]
    }

    /// Point containment against the rotated outline, edges inclusive.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let local = rotate(point - self.position, -self.angle);
        local.x.abs() <= self.size.x / 2.0 && local.y.abs() <= self.size.y / 2.0
    }
}

impl Positionable for Body {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn angle(&self) -> f32 {
        self.angle
    }
}

impl Collidable for Body {
    fn ignores_collision_response(&self) -> bool {
        self.ignores_collision_response
    }

    fn collision_ignore_group(&self) -> u32 {
        self.collision_ignore_group
    }
}
