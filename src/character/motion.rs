//! Pending motion
//!
//! Walk requests are collected during a frame and settled by the next
//! update. The accumulator also remembers where the platform under the
//! character was last frame, so riding it can carry the character along.

use crate::math::Vec2;
use crate::physics::BodyId;

#[derive(Debug, Default, Clone)]
pub struct PendingMotion {
    /// A walk was requested since the last update
    walking: bool,
    /// Outstanding walk requests (gravity-adapted locomotion consumes one per update)
    walk_steps: u32,
    /// Duration of the previous frame
    last_dt: f32,
    last_platform: Option<BodyId>,
    last_platform_position: Option<Vec2>,
}

impl PendingMotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_walk(&mut self) {
        self.walking = true;
    }

    pub fn is_walking(&self) -> bool {
        self.walking
    }

    /// End the frame: returns whether a walk was requested, and clears it.
    pub fn settle(&mut self, dt: f32) -> bool {
        let walked = self.walking;
        self.walking = false;
        self.last_dt = dt;
        walked
    }

    pub fn last_dt(&self) -> f32 {
        self.last_dt
    }

    pub fn add_walk_step(&mut self) {
        self.walk_steps += 1;
    }

    /// Consume one walk step. Returns false when none were pending.
    pub fn take_walk_step(&mut self) -> bool {
        if self.walk_steps == 0 {
            return false;
        }
        self.walk_steps -= 1;
        true
    }

    pub fn walk_steps(&self) -> u32 {
        self.walk_steps
    }

    pub fn clear_walk_steps(&mut self) {
        self.walk_steps = 0;
    }

    pub fn last_platform(&self) -> Option<BodyId> {
        self.last_platform
    }

    /// A different platform than last frame invalidates the cached position.
    pub fn track_platform(&mut self, platform: BodyId) {
        if self.last_platform != Some(platform) {
            self.last_platform_position = None;
        }
    }

    /// Horizontal carry since the previous frame, then remember this frame's position.
    pub fn ride(&mut self, platform: BodyId, position: Vec2) -> f32 {
        let carry = self
            .last_platform_position
            .map_or(0.0, |last| position.x - last.x);
        self.last_platform = Some(platform);
        self.last_platform_position = Some(position);
        carry
    }

    pub fn forget_platform_position(&mut self) {
        self.last_platform_position = None;
    }

    pub fn clear(&mut self) {
        *self = Self {
            last_dt: self.last_dt,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_resets_frame_state() {
        let mut motion = PendingMotion::new();
        motion.record_walk();
        motion.record_walk();
        assert!(motion.is_walking());

        assert!(motion.settle(0.016));
        assert!(!motion.is_walking());
        assert_eq!(motion.last_dt(), 0.016);
        assert!(!motion.settle(0.02));
    }

    #[test]
    fn test_ride_carries_platform_displacement() {
        let mut motion = PendingMotion::new();
        let platform = BodyId::new(1, 0);

        motion.track_platform(platform);
        assert_eq!(motion.ride(platform, Vec2::new(10.0, 0.0)), 0.0);
        motion.track_platform(platform);
        assert_eq!(motion.ride(platform, Vec2::new(13.0, 2.0)), 3.0);
    }

    #[test]
    fn test_switching_platform_drops_cache() {
        let mut motion = PendingMotion::new();
        let a = BodyId::new(1, 0);
        let b = BodyId::new(2, 0);

        motion.ride(a, Vec2::new(10.0, 0.0));
        motion.track_platform(b);
        assert_eq!(motion.ride(b, Vec2::new(500.0, 0.0)), 0.0);
        assert_eq!(motion.last_platform(), Some(b));
    }

    #[test]
    fn test_walk_steps() {
        let mut motion = PendingMotion::new();
        motion.add_walk_step();
        motion.add_walk_step();
        assert!(motion.take_walk_step());
        motion.clear_walk_steps();
        assert!(!motion.take_walk_step());
    }
}
