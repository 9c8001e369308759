//! Move-to steering
//!
//! A character can be sent to a point at a given speed. The target is
//! polled from the character's update; once the remaining distance is less
//! than one poll step of travel the character stops and the arrival
//! callback runs.

use std::fmt;

use super::jump::DebouncePoll;
use crate::math::Vec2;

/// Seconds between steering corrections
pub const MOVE_POLL_INTERVAL: f32 = 0.01;

/// Runs once when a `move_to` target is reached.
pub type ArrivedCallback = Box<dyn FnOnce()>;

/// What the character should do this update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steer {
    /// No correction due yet
    Hold,
    /// Steer at this velocity
    Toward(Vec2),
    Arrived,
}

pub struct MoveTarget {
    target: Vec2,
    speed: f32,
    poll: DebouncePoll,
    on_arrived: Option<ArrivedCallback>,
}

impl MoveTarget {
    pub fn new(target: Vec2, speed: f32, on_arrived: Option<ArrivedCallback>) -> Self {
        Self {
            target,
            speed,
            poll: DebouncePoll::new(MOVE_POLL_INTERVAL),
            on_arrived,
        }
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Advance by `dt` from `position`. The arrival radius is one poll step
    /// of travel, or one frame of travel when frames are longer than that.
    pub fn tick(&mut self, dt: f32, position: Vec2) -> Steer {
        if !self.poll.tick(dt) {
            return Steer::Hold;
        }

        let offset = self.target - position;
        let radius = self.speed * MOVE_POLL_INTERVAL.max(dt);
        if offset.length() < radius {
            Steer::Arrived
        } else {
            Steer::Toward(offset.normalize() * self.speed)
        }
    }

    /// Consume the target, returning its arrival callback.
    pub fn into_callback(self) -> Option<ArrivedCallback> {
        self.on_arrived
    }
}

impl fmt::Debug for MoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveTarget")
            .field("target", &self.target)
            .field("speed", &self.speed)
            .field("has_callback", &self.on_arrived.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_steers_toward_target() {
        let mut target = MoveTarget::new(Vec2::new(100.0, 0.0), 50.0, None);
        assert_eq!(target.tick(DT, Vec2::ZERO), Steer::Toward(Vec2::new(50.0, 0.0)));
    }

    #[test]
    fn test_holds_between_polls() {
        let mut target = MoveTarget::new(Vec2::new(100.0, 0.0), 50.0, None);
        assert_eq!(target.tick(0.004, Vec2::ZERO), Steer::Hold);
        assert!(matches!(target.tick(0.008, Vec2::ZERO), Steer::Toward(_)));
    }

    #[test]
    fn test_arrives_within_one_frame_of_travel() {
        let mut target = MoveTarget::new(Vec2::new(100.0, 0.0), 60.0, None);
        // One frame at 60 units/s covers 1 unit
        assert!(matches!(target.tick(DT, Vec2::new(98.5, 0.0)), Steer::Toward(_)));
        assert_eq!(target.tick(DT, Vec2::new(99.5, 0.0)), Steer::Arrived);
    }
}
