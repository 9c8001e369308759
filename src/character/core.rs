//! State shared by both locomotion strategies: body handle, facing,
//! texture orientation, weapon, state machine, jump poll and animator.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::appearance::{AnimationSlot, Animator};
use super::jump::JumpController;
use super::motion::PendingMotion;
use super::state::{LocomotionState, LocomotionStateMachine, Transition};
use super::weapon::Weapon;
use crate::assets::AnimationSet;
use crate::config::CharacterConfig;
use crate::event::{ListenerId, Observers};
use crate::math::Vec2;
use crate::physics::{Body, BodyId, PhysicsWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::Y,
            Direction::Down => Vec2::NEG_Y,
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

#[derive(Debug)]
pub struct CharacterCore {
    pub(crate) body: Option<BodyId>,
    pub(crate) config: CharacterConfig,
    facing: Direction,
    /// Texture orientation; x is negated on every turn
    texture_wrap: Vec2,
    weapon: Option<Weapon>,
    machine: LocomotionStateMachine,
    pub(crate) jump: JumpController,
    pub(crate) animator: Animator,
    pub(crate) motion: PendingMotion,
    direction_changed: Observers<Direction>,
    destroyed: bool,
}

impl CharacterCore {
    pub fn new(config: CharacterConfig, animations: AnimationSet) -> Self {
        let jump = JumpController::new(config.jump_poll_interval);
        Self {
            body: None,
            config,
            facing: Direction::Right,
            texture_wrap: Vec2::ONE,
            weapon: None,
            machine: LocomotionStateMachine::new(),
            jump,
            animator: Animator::new(animations),
            motion: PendingMotion::new(),
            direction_changed: Observers::new(),
            destroyed: false,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.config.size()
    }

    pub fn state(&self) -> LocomotionState {
        self.machine.state()
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn texture_wrap(&self) -> Vec2 {
        self.texture_wrap
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.destroyed = true;
    }

    pub fn body<'w>(&self, world: &'w PhysicsWorld) -> Option<&'w Body> {
        world.get(self.body?)
    }

    pub fn body_mut<'w>(&self, world: &'w mut PhysicsWorld) -> Option<&'w mut Body> {
        world.get_mut(self.body?)
    }

    /// Change state. Leaving Jumping by any route cancels the apex poll.
    pub fn set_state(&mut self, to: LocomotionState) -> Option<Transition> {
        if to != LocomotionState::Jumping {
            self.jump.disarm();
        }
        self.machine.set(to)
    }

    pub fn show(&mut self, slot: AnimationSlot) -> bool {
        self.animator.show(slot)
    }

    /// Tick the apex poll; on descent along `up` switch to Falling.
    pub fn tick_jump_poll(&mut self, world: &PhysicsWorld, dt: f32, up: Vec2) {
        let Some(velocity) = self.body(world).map(|b| b.velocity) else {
            return;
        };
        if self.jump.tick(dt, || velocity.dot(up) <= 0.0) {
            self.set_state(LocomotionState::Falling);
            self.show(AnimationSlot::Fall);
        }
    }

    /// Face `direction`. Up, Down and the current direction are ignored.
    /// Returns true if the character turned.
    pub fn turn(&mut self, direction: Direction) -> bool {
        if direction == self.facing || !direction.is_horizontal() {
            return false;
        }

        self.texture_wrap.x = -self.texture_wrap.x;
        if let Some(weapon) = self.weapon.as_mut() {
            weapon.mirror();
        }
        self.facing = direction;
        debug!(?direction, "turned");
        self.direction_changed.notify(&direction);
        true
    }

    pub fn on_direction_changed(&mut self, listener: impl FnMut(&Direction) + 'static) -> ListenerId {
        self.direction_changed.subscribe(listener)
    }

    pub fn remove_direction_listener(&mut self, id: ListenerId) -> bool {
        self.direction_changed.unsubscribe(id)
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    pub fn weapon_mut(&mut self) -> Option<&mut Weapon> {
        self.weapon.as_mut()
    }

    /// Replace the weapon. The previous one is returned in its right-facing
    /// orientation; a new one is oriented to the current facing.
    pub fn set_weapon(&mut self, weapon: Option<Weapon>) -> Option<Weapon> {
        let facing_left = self.facing == Direction::Left;
        let previous = self.weapon.take().map(|mut w| {
            w.unmount(facing_left);
            w
        });

        self.weapon = weapon.map(|mut w| {
            if self.facing == Direction::Left {
                w.mount_facing_left();
            }
            w
        });
        previous
    }
}
