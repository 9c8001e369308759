//! Fixed-gravity locomotion
//!
//! Three ground probes sample what is under the character. While a probe
//! reports a platform within the low tolerance the character is snapped to
//! its top surface and carried along with it; gravity is switched off while
//! Idle so the character sits flush without solver jitter. "Up" is always
//! world +y.

use tracing::debug;

use super::appearance::AnimationSlot;
use super::contact::{high_tolerance, is_platform, is_standing_on, low_tolerance, platform_top_y};
use super::core::{CharacterCore, Direction};
use super::probe::GroundProbe;
use super::state::LocomotionState;
use crate::math::Vec2;
use crate::physics::{BodyId, PhysicsWorld, Positionable};

const UP: Vec2 = Vec2::Y;

#[derive(Debug, Clone)]
pub struct FixedGravity {
    probes: [GroundProbe; 3],
}

impl Default for FixedGravity {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedGravity {
    pub fn new() -> Self {
        Self {
            probes: GroundProbe::set(),
        }
    }

    pub fn probes(&self) -> &[GroundProbe] {
        &self.probes
    }

    pub fn spawn_probes(&mut self, core: &CharacterCore, world: &mut PhysicsWorld, position: Vec2) {
        let size = core.size();
        let group = core.config.collision_ignore_group;
        for probe in &mut self.probes {
            probe.spawn(world, position, size, group);
        }
    }

    pub fn despawn_probes(&mut self, world: &mut PhysicsWorld) {
        for probe in &mut self.probes {
            probe.despawn(world);
        }
    }

    /// Index of the probe owning `body`, if any.
    pub fn probe_index(&self, body: BodyId) -> Option<usize> {
        self.probes.iter().position(|p| p.body() == Some(body))
    }

    pub fn on_probe_collision(&mut self, index: usize, core: &CharacterCore, world: &PhysicsWorld, other: BodyId) {
        let Some(owner) = core.body else {
            return;
        };
        if let Some(probe) = self.probes.get_mut(index) {
            probe.record_hit(world, owner, other);
        }
    }

    /// Landing. Ascending through a platform does not land.
    pub fn on_body_collision(&mut self, core: &mut CharacterCore, world: &mut PhysicsWorld, other: BodyId) {
        let Some(id) = core.body else {
            return;
        };
        let Some(target) = world.get(other) else {
            return;
        };
        if !is_platform(target) || !is_standing_on(world, id, Some(other), high_tolerance(core.size())) {
            return;
        }

        let Some(body) = world.get_mut(id) else {
            return;
        };
        if body.velocity.y > 0.0 {
            return;
        }
        body.ignores_gravity = true;
        body.stop_vertical();

        core.show(AnimationSlot::Idle);
        if core.set_state(LocomotionState::Idle).is_some() {
            debug!(character = %id, platform = %other, "landed");
        }
    }

    fn any_probe_standing(&self, core: &CharacterCore, world: &PhysicsWorld, tolerance: f32) -> bool {
        let Some(id) = core.body else {
            return false;
        };
        self.probes
            .iter()
            .any(|p| is_standing_on(world, id, p.last_hit(), tolerance))
    }

    /// The last probe whose platform passes the low tolerance wins.
    fn find_platform(&self, core: &mut CharacterCore, world: &PhysicsWorld) -> Option<BodyId> {
        let id = core.body?;
        let tolerance = low_tolerance(core.size());
        let mut platform = None;

        for probe in &self.probes {
            if is_standing_on(world, id, probe.last_hit(), tolerance) {
                platform = probe.last_hit();
                if let Some(p) = platform {
                    core.motion.track_platform(p);
                }
            }
        }
        platform
    }

    fn adjust_position(&mut self, core: &mut CharacterCore, world: &mut PhysicsWorld) {
        let Some(id) = core.body else {
            return;
        };
        let Some(position) = world.get(id).map(|b| b.position) else {
            return;
        };
        let size = core.size();
        for probe in &self.probes {
            probe.reposition(world, position, size);
        }

        if core.state() == LocomotionState::Jumping {
            return;
        }

        let platform = self
            .find_platform(core, world)
            .filter(|&p| is_standing_on(world, id, Some(p), low_tolerance(size)));

        let grounded = platform.and_then(|p| {
            let (character, platform_body) = (world.get(id)?, world.get(p)?);
            Some((p, platform_top_y(character, platform_body), platform_body.position))
        });

        match grounded {
            Some((platform, top, platform_position)) => {
                let carry = core.motion.ride(platform, platform_position);
                if let Some(body) = world.get_mut(id) {
                    body.position.y = top + size.y / 2.0;
                    body.position.x += carry;
                }
            }
            None => {
                if let Some(body) = world.get_mut(id) {
                    body.ignores_gravity = false;
                }
                core.motion.forget_platform_position();
                core.set_state(LocomotionState::Falling);
                core.show(AnimationSlot::Fall);
            }
        }
    }

    pub fn update(&mut self, core: &mut CharacterCore, world: &mut PhysicsWorld, dt: f32) {
        self.adjust_position(core, world);

        if core.config.ledge_lookahead
            && core.state() == LocomotionState::Idle
            && core.motion.is_walking()
            && self.is_about_to_fall(core, world)
        {
            if let Some(body) = core.body_mut(world) {
                body.ignores_gravity = false;
            }
            core.set_state(LocomotionState::Falling);
            core.show(AnimationSlot::Fall);
        }

        if !core.motion.settle(dt) {
            self.stop_walking(core, world);
        }

        core.tick_jump_poll(world, dt, UP);
    }

    /// Halt walking. Horizontal velocity is kept with `maintain_momentum`.
    pub fn stop_walking(&self, core: &mut CharacterCore, world: &mut PhysicsWorld) {
        if !core.config.maintain_momentum {
            if let Some(body) = core.body_mut(world) {
                body.stop_horizontal();
            }
        }
        if core.state() == LocomotionState::Idle {
            core.show(AnimationSlot::Idle);
        }
    }

    /// Walk at `velocity` (world units per second, negative is left).
    ///
    /// The body is nudged by the full frame displacement while its velocity
    /// is set to half the request. The halved velocity is not a physical
    /// model; existing level tuning depends on it.
    pub fn walk(&mut self, core: &mut CharacterCore, world: &mut PhysicsWorld, velocity: f32) {
        if core.config.turns_when_walking {
            if velocity > 0.0 {
                core.turn(Direction::Right);
            } else if velocity < 0.0 {
                core.turn(Direction::Left);
            }
        }

        let dx = velocity * core.motion.last_dt();
        if self.can_walk(core, world, dx) {
            if let Some(body) = core.body_mut(world) {
                body.velocity.x = velocity / 2.0;
                body.position.x += dx;
            }
        }
        core.motion.record_walk();

        if core.state() == LocomotionState::Idle || core.config.walk_on_air {
            core.show(AnimationSlot::Walk);
        }
    }

    /// Steer toward `velocity` by walking the horizontal difference.
    pub fn move_at(&mut self, core: &mut CharacterCore, world: &mut PhysicsWorld, velocity: Vec2) {
        let current = core.body(world).map_or(0.0, |b| b.velocity.x);
        self.walk(core, world, velocity.x - current);
    }

    pub fn can_walk(&self, core: &CharacterCore, world: &PhysicsWorld, dx: f32) -> bool {
        if !core.config.can_move_on_air && !self.any_probe_standing(core, world, low_tolerance(core.size())) {
            return false;
        }
        if core.config.can_walk_against_walls || dx.abs() < f32::EPSILON {
            return true;
        }
        let Some(id) = core.body else {
            return true;
        };
        let Some(body) = world.get(id) else {
            return true;
        };

        let leading = body.position + Vec2::new(dx.signum() * body.size.x / 2.0 + dx, 0.0);
        !world
            .objects_at(leading)
            .into_iter()
            .any(|other| !world.ignores_collision_between(id, other))
    }

    pub fn jump(&mut self, core: &mut CharacterCore, world: &mut PhysicsWorld, speed: f32) -> bool {
        if !self.any_probe_standing(core, world, high_tolerance(core.size())) {
            return false;
        }
        self.force_jump(core, world, speed);
        true
    }

    pub fn force_jump(&mut self, core: &mut CharacterCore, world: &mut PhysicsWorld, speed: f32) {
        core.set_state(LocomotionState::Jumping);
        if let Some(body) = core.body_mut(world) {
            body.ignores_gravity = false;
            let impulse = UP * (speed * body.mass);
            body.hit(impulse);
        }
        core.show(AnimationSlot::Jump);
        core.jump.arm();
        debug!(speed, "jump");
    }

    /// Whether the next step in the facing direction leaves solid ground.
    pub fn is_about_to_fall(&self, core: &CharacterCore, world: &PhysicsWorld) -> bool {
        let Some(id) = core.body else {
            return false;
        };
        let Some(body) = world.get(id) else {
            return false;
        };

        let leading_x = body.position.x + core.facing().unit().x * body.size.x / 2.0;
        let lowest = self
            .probes
            .iter()
            .filter_map(|p| p.bottom(world))
            .fold(body.bottom(), f32::min);

        if let Some(platform) = core.motion.last_platform().and_then(|p| world.get(p)) {
            if platform.left() < leading_x
                && leading_x < platform.right()
                && platform.bottom() < lowest
                && lowest < platform.top()
            {
                return false;
            }
        }

        let Some(below) = world.object_at(Vec2::new(leading_x, lowest - 1.0)).and_then(|b| world.get(b)) else {
            return true;
        };
        if below.ignores_collision_response {
            return true;
        }
        let group = body.collision_ignore_group;
        group != 0 && below.collision_ignore_group == group
    }
}
