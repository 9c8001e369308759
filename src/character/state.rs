//! Locomotion state machine

use std::fmt;

use tracing::debug;

/// Where a character is relative to the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LocomotionState {
    /// Grounded, not moving under gravity
    #[default]
    Idle,
    /// Airborne and not ascending from a jump
    Falling,
    /// Ascending after a jump; landing is suppressed until the apex
    Jumping,
}

impl fmt::Display for LocomotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LocomotionState::Idle => "Idle",
            LocomotionState::Falling => "Falling",
            LocomotionState::Jumping => "Jumping",
        };
        f.write_str(name)
    }
}

/// A recorded state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: LocomotionState,
    pub to: LocomotionState,
}

#[derive(Debug, Default)]
pub struct LocomotionStateMachine {
    state: LocomotionState,
}

impl LocomotionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LocomotionState {
        self.state
    }

    /// Move to `to`. Returns the transition, or None if already there.
    pub fn set(&mut self, to: LocomotionState) -> Option<Transition> {
        if self.state == to {
            return None;
        }
        let transition = Transition { from: self.state, to };
        debug!(from = %transition.from, to = %transition.to, "locomotion transition");
        self.state = to;
        Some(transition)
    }
}
