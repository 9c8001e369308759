//! Gravity-adapted locomotion
//!
//! Works for any gravity direction. "Up" is the unit vector opposite the
//! world's gravity and the walking axis is its clockwise perpendicular, so
//! standard downward gravity walks along +x.
//!
//! Instead of probes the character binds to the first floor-like body it
//! touches (contact normal within 60 degrees of up). Contact loss is
//! debounced: the platform is only dropped after `platform_tolerance`
//! consecutive updates without a confirming contact.

use tracing::debug;

use super::appearance::AnimationSlot;
use super::core::{CharacterCore, Direction};
use super::state::LocomotionState;
use crate::math::{right_normal, Vec2};
use crate::physics::{BodyId, PhysicsWorld};

/// Minimum |normal . up| for a contact to count as floor
pub const FLOOR_DOT: f32 = 0.5;

/// Unit vector opposite `gravity`; +y when there is no gravity.
pub fn up_from_gravity(gravity: Vec2) -> Vec2 {
    if gravity.length_squared() > 0.0 {
        -gravity.normalize()
    } else {
        Vec2::Y
    }
}

#[derive(Debug, Clone, Default)]
pub struct GravityAdapter {
    platform: Option<BodyId>,
    platform_normal: Option<Vec2>,
    collision_detected: bool,
    no_collision_count: u32,
}

impl GravityAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The body currently stood on, if bound.
    pub fn platform(&self) -> Option<BodyId> {
        self.platform
    }

    /// Last confirming contact normal (points from the character to the platform).
    pub fn platform_normal(&self) -> Option<Vec2> {
        self.platform_normal
    }

    /// Consecutive updates without a confirming contact.
    pub fn missed_updates(&self) -> u32 {
        self.no_collision_count
    }

    fn clear_platform(&mut self) {
        self.platform = None;
        self.platform_normal = None;
        self.no_collision_count = 0;
    }

    pub fn on_body_collision(
        &mut self,
        core: &mut CharacterCore,
        world: &PhysicsWorld,
        other: BodyId,
        normal: Vec2,
    ) {
        let Some(target) = world.get(other) else {
            return;
        };
        if target.ignores_collision_response {
            return;
        }

        let up = up_from_gravity(world.gravity);
        if normal.dot(up).abs() < FLOOR_DOT {
            return;
        }

        match self.platform {
            Some(bound) if bound != other => return,
            Some(_) => {}
            None => {
                debug!(platform = %other, "bound platform");
                self.platform = Some(other);
            }
        }

        self.collision_detected = true;
        self.no_collision_count = 0;
        self.platform_normal = Some(normal);

        if core.state() == LocomotionState::Falling {
            core.set_state(LocomotionState::Idle);
        }
    }

    pub fn update(&mut self, core: &mut CharacterCore, world: &mut PhysicsWorld, dt: f32) {
        if self.platform.is_some() && !self.collision_detected {
            self.no_collision_count += 1;
            if self.no_collision_count >= core.config.platform_tolerance {
                debug!(missed = self.no_collision_count, "lost platform");
                self.clear_platform();
                if core.state() != LocomotionState::Jumping {
                    core.set_state(LocomotionState::Falling);
                    core.show(AnimationSlot::Fall);
                }
            }
        }
        self.collision_detected = false;

        let up = up_from_gravity(world.gravity);
        if core.motion.take_walk_step() {
            let right = right_normal(up);
            let facing = core.facing();
            let (acceleration, max_velocity) = (core.config.acceleration, core.config.max_velocity);

            if let Some(body) = core.body_mut(world) {
                let along = body.velocity.dot(right);
                let force = right * (body.mass * acceleration);
                match facing {
                    Direction::Left if -along < max_velocity => body.push(-force),
                    Direction::Right if along < max_velocity => body.push(force),
                    _ => {}
                }
            }
            if core.state() == LocomotionState::Idle {
                core.show(AnimationSlot::Walk);
            }
        } else if core.state() == LocomotionState::Idle {
            core.show(AnimationSlot::Idle);
        }

        core.motion.settle(dt);
        core.tick_jump_poll(world, dt, up);
    }

    /// Queue one update's worth of walking in the sign of `velocity`.
    pub fn walk(&mut self, core: &mut CharacterCore, velocity: f32) {
        let direction = if velocity > 0.0 {
            Some(Direction::Right)
        } else if velocity < 0.0 {
            Some(Direction::Left)
        } else {
            None
        };
        if let Some(direction) = direction {
            if core.turn(direction) {
                core.motion.clear_walk_steps();
            }
        }

        core.motion.add_walk_step();
        if core.state() == LocomotionState::Idle || core.config.walk_on_air {
            core.show(AnimationSlot::Walk);
        }
    }

    /// Drop queued walk steps.
    pub fn stop_walking(&self, core: &mut CharacterCore) {
        core.motion.clear_walk_steps();
        if core.state() == LocomotionState::Idle {
            core.show(AnimationSlot::Idle);
        }
    }

    /// Walk along the walking axis and jump with any upward component.
    pub fn move_at(&mut self, core: &mut CharacterCore, world: &mut PhysicsWorld, velocity: Vec2) {
        let up = up_from_gravity(world.gravity);
        let along = velocity.dot(right_normal(up));
        if along != 0.0 {
            self.walk(core, along);
        }
        let rise = velocity.dot(up);
        if rise > 0.0 {
            self.jump(core, world, rise);
        }
    }

    pub fn jump(&mut self, core: &mut CharacterCore, world: &mut PhysicsWorld, speed: f32) -> bool {
        if self.platform.is_none() || core.state() == LocomotionState::Jumping {
            return false;
        }
        self.force_jump(core, world, speed);
        true
    }

    pub fn force_jump(&mut self, core: &mut CharacterCore, world: &mut PhysicsWorld, speed: f32) {
        let up = up_from_gravity(world.gravity);
        if let Some(body) = core.body_mut(world) {
            body.ignores_gravity = false;
            let impulse = up * (body.mass * speed);
            body.hit(impulse);
        }
        self.clear_platform();

        core.set_state(LocomotionState::Jumping);
        core.show(AnimationSlot::Jump);
        core.jump.arm();
        debug!(speed, "jump");
    }

    /// Whether the ground ends just ahead, measured along the walking axis.
    pub fn is_about_to_fall(&self, core: &CharacterCore, world: &PhysicsWorld) -> bool {
        let Some(id) = core.body else {
            return false;
        };
        let Some(body) = world.get(id) else {
            return false;
        };

        let up = up_from_gravity(world.gravity);
        let forward = right_normal(up) * core.facing().unit().x;
        let probe = body.position + forward * (body.size.x / 2.0) - up * (body.size.y / 2.0 + 1.0);

        let Some(below) = world.object_at(probe).and_then(|b| world.get(b)) else {
            return true;
        };
        if below.ignores_collision_response {
            return true;
        }
        let group = body.collision_ignore_group;
        group != 0 && below.collision_ignore_group == group
    }
}
