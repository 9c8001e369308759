//! Character brains
//!
//! `WandererBrain` walks a character back and forth. It turns around at
//! ledges (unless it is allowed to fall off) and when it stops making
//! progress. A jumping wanderer hops obstacles instead, and only turns when
//! a jump did not get it anywhere.
//!
//! `ShooterBrain` keeps a character's weapon aimed at a target and fires on
//! a fixed timer while the target is in range.

use tracing::debug;

use crate::character::jump::DebouncePoll;
use crate::character::{Drivable, PlatformCharacter};
use crate::config::{BrainConfig, ShooterConfig};
use crate::math::Vec2;
use crate::physics::{BodyId, PhysicsWorld};

/// Below this horizontal speed a jumper considers itself blocked
const BLOCKED_SPEED: f32 = 5.0;
/// Below this speed the character is treated as standing still
const STILL_SPEED: f32 = 10.0;
/// A jump that moved the character less than this did not clear anything
const STUCK_DISTANCE: f32 = 1.0;
/// Ledges are ignored for this long after a jump
const FALL_OFF_WINDOW: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct WandererBrain {
    config: BrainConfig,
    /// Signed walking speed; the sign is the patrol direction
    speed: f32,
    last_jump_position: Option<Vec2>,
    fall_off_window: f32,
}

impl Default for WandererBrain {
    fn default() -> Self {
        Self::new(BrainConfig::default())
    }
}

impl WandererBrain {
    pub fn new(config: BrainConfig) -> Self {
        Self {
            speed: config.speed,
            config,
            last_jump_position: None,
            fall_off_window: 0.0,
        }
    }

    pub fn config(&self) -> &BrainConfig {
        &self.config
    }

    /// Current signed walking speed.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    fn turn_around(&mut self) {
        self.speed = -self.speed;
        debug!(speed = self.speed, "wanderer turned around");
    }

    /// Drive `character` for one frame.
    ///
    /// A character that is not moving yet counts as blocked, so a
    /// non-jumping wanderer reverses on its very first update.
    pub fn update(&mut self, dt: f32, character: &mut impl Drivable, world: &mut PhysicsWorld) {
        self.fall_off_window = (self.fall_off_window - dt).max(0.0);
        let velocity = character.velocity(world);

        if self.config.tries_to_jump && velocity.x.abs() < BLOCKED_SPEED {
            let position = character.position(world);
            let stuck = self
                .last_jump_position
                .is_some_and(|last| last.distance(position) < STUCK_DISTANCE);

            if stuck {
                character.stop(world);
                self.last_jump_position = None;
                self.turn_around();
            } else if character.jump(world, self.config.jump_speed) {
                self.last_jump_position = Some(position);
                self.fall_off_window = FALL_OFF_WINDOW;
            }
        }

        if self.fall_off_window <= 0.0
            && !self.config.falls_off_platforms
            && velocity.y.abs() < STILL_SPEED
            && character.is_about_to_fall(world)
        {
            character.stop(world);
            if self.config.tries_to_jump && character.velocity(world).x.abs() < STILL_SPEED {
                self.turn_around();
            }
        }

        if !self.config.tries_to_jump && character.velocity(world).x.abs() < STILL_SPEED {
            self.turn_around();
        }

        character.walk(world, self.speed);
    }
}

#[derive(Debug, Clone)]
pub struct ShooterBrain {
    target: Option<BodyId>,
    max_distance: f32,
    timer: DebouncePoll,
}

impl ShooterBrain {
    /// The config's target name is resolved by the caller; see `set_target`.
    pub fn new(config: &ShooterConfig) -> Self {
        Self {
            target: None,
            max_distance: config.max_distance,
            timer: DebouncePoll::new(config.time_between_shots),
        }
    }

    pub fn target(&self) -> Option<BodyId> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<BodyId>) {
        self.target = target;
    }

    /// Offset to a live target within range.
    fn aim_offset(&self, character: &PlatformCharacter, world: &PhysicsWorld) -> Option<Vec2> {
        let target = world.get(self.target?)?.position;
        let offset = target - character.position(world)?;
        (offset.length() <= self.max_distance).then_some(offset)
    }

    /// Aim, and shoot when the timer comes due. Returns the projectile.
    pub fn update(&mut self, dt: f32, character: &mut PlatformCharacter, world: &mut PhysicsWorld) -> Option<BodyId> {
        let due = self.timer.tick(dt);
        if character.is_destroyed() {
            return None;
        }
        let offset = self.aim_offset(character, world)?;
        character.weapon_mut()?.aim(offset);

        if !due {
            return None;
        }
        let shot = character.shoot(world);
        if let Some(projectile) = shot {
            debug!(%projectile, distance = offset.length(), "shooter fired");
        }
        shot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AnimationLibrary;
    use crate::character::Weapon;
    use crate::config::CharacterConfig;
    use crate::physics::Body;

    #[derive(Default)]
    struct Dummy {
        position: Vec2,
        velocity: Vec2,
        about_to_fall: bool,
        grounded: bool,
        walks: Vec<f32>,
        jumps: u32,
        stops: u32,
    }

    impl Drivable for Dummy {
        fn position(&self, _: &PhysicsWorld) -> Vec2 {
            self.position
        }

        fn velocity(&self, _: &PhysicsWorld) -> Vec2 {
            self.velocity
        }

        fn walk(&mut self, _: &mut PhysicsWorld, velocity: f32) {
            self.walks.push(velocity);
        }

        fn jump(&mut self, _: &mut PhysicsWorld, _: f32) -> bool {
            if self.grounded {
                self.jumps += 1;
            }
            self.grounded
        }

        fn stop(&mut self, _: &mut PhysicsWorld) {
            self.velocity = Vec2::ZERO;
            self.stops += 1;
        }

        fn is_about_to_fall(&self, _: &PhysicsWorld) -> bool {
            self.about_to_fall
        }

        fn move_at(&mut self, _: &mut PhysicsWorld, velocity: Vec2) {
            self.walks.push(velocity.x);
        }

        fn stop_walking(&mut self, _: &mut PhysicsWorld) {}
    }

    const DT: f32 = 1.0 / 60.0;

    fn walking() -> Dummy {
        Dummy {
            velocity: Vec2::new(25.0, 0.0),
            grounded: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_reverses_on_first_update() {
        let mut world = PhysicsWorld::default();
        let mut brain = WandererBrain::default();
        let mut dummy = Dummy::default();

        brain.update(DT, &mut dummy, &mut world);
        assert_eq!(dummy.walks, vec![-50.0]);
    }

    #[test]
    fn test_keeps_walking_while_moving() {
        let mut world = PhysicsWorld::default();
        let mut brain = WandererBrain::default();
        let mut dummy = walking();

        brain.update(DT, &mut dummy, &mut world);
        brain.update(DT, &mut dummy, &mut world);
        assert_eq!(dummy.walks, vec![50.0, 50.0]);
        assert_eq!(dummy.stops, 0);
    }

    #[test]
    fn test_turns_at_ledge() {
        let mut world = PhysicsWorld::default();
        let mut brain = WandererBrain::default();
        let mut dummy = Dummy {
            about_to_fall: true,
            ..walking()
        };

        brain.update(DT, &mut dummy, &mut world);
        assert_eq!(dummy.stops, 1);
        assert_eq!(dummy.walks, vec![-50.0]);
    }

    #[test]
    fn test_falls_off_when_allowed() {
        let mut world = PhysicsWorld::default();
        let mut brain = WandererBrain::new(BrainConfig {
            falls_off_platforms: true,
            ..BrainConfig::default()
        });
        let mut dummy = Dummy {
            about_to_fall: true,
            ..walking()
        };

        brain.update(DT, &mut dummy, &mut world);
        assert_eq!(dummy.stops, 0);
        assert_eq!(dummy.walks, vec![50.0]);
    }

    #[test]
    fn test_jumper_turns_when_jump_gets_nowhere() {
        let mut world = PhysicsWorld::default();
        let mut brain = WandererBrain::new(BrainConfig {
            tries_to_jump: true,
            ..BrainConfig::default()
        });
        let mut dummy = Dummy {
            grounded: true,
            about_to_fall: true,
            ..Default::default()
        };

        // Blocked: jump, and ignore the ledge during the window
        brain.update(DT, &mut dummy, &mut world);
        assert_eq!(dummy.jumps, 1);
        assert_eq!(dummy.stops, 0);
        assert_eq!(dummy.walks, vec![50.0]);

        // Same spot after the jump: give up and turn
        dummy.about_to_fall = false;
        brain.update(DT, &mut dummy, &mut world);
        assert_eq!(dummy.jumps, 1);
        assert_eq!(dummy.stops, 1);
        assert_eq!(dummy.walks, vec![50.0, -50.0]);
    }

    #[test]
    fn test_jumper_keeps_direction_after_clearing_obstacle() {
        let mut world = PhysicsWorld::default();
        let mut brain = WandererBrain::new(BrainConfig {
            tries_to_jump: true,
            ..BrainConfig::default()
        });
        let mut dummy = Dummy {
            grounded: true,
            ..Default::default()
        };

        brain.update(DT, &mut dummy, &mut world);
        dummy.position = Vec2::new(30.0, 0.0);
        brain.update(DT, &mut dummy, &mut world);

        assert_eq!(dummy.jumps, 2);
        assert_eq!(dummy.walks, vec![50.0, 50.0]);
    }

    fn shooter_setup(max_distance: f32) -> (ShooterBrain, PlatformCharacter, PhysicsWorld, BodyId) {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let target = world.add(Body::fixed(40.0, 80.0).at(-200.0, 200.0));
        let mut character = PlatformCharacter::new(CharacterConfig::default(), &AnimationLibrary::new());
        character.spawn(&mut world, Vec2::ZERO).unwrap();
        let mut weapon = Weapon::new(30.0, 10.0);
        weapon.set_fire_rate(100.0).unwrap();
        character.set_weapon(Some(weapon));

        let mut shooter = ShooterBrain::new(&ShooterConfig {
            target: Some("target".into()),
            time_between_shots: 0.5,
            max_distance,
        });
        shooter.set_target(Some(target));
        (shooter, character, world, target)
    }

    #[test]
    fn test_shooter_aims_every_update_and_fires_on_timer() {
        let (mut shooter, mut character, mut world, _) = shooter_setup(f32::MAX);

        assert!(shooter.update(0.2, &mut character, &mut world).is_none());
        let angle = character.weapon().unwrap().angle;
        assert!((angle - 0.75 * std::f32::consts::PI).abs() < 1e-5);

        world.step(0.2);
        assert!(shooter.update(0.2, &mut character, &mut world).is_none());
        world.step(0.2);
        let shot = shooter.update(0.2, &mut character, &mut world).unwrap();
        let velocity = world.get(shot).unwrap().velocity;
        assert!(velocity.x < 0.0 && velocity.y > 0.0);
    }

    #[test]
    fn test_shooter_holds_fire_out_of_range() {
        let (mut shooter, mut character, mut world, target) = shooter_setup(100.0);

        assert!(shooter.update(1.0, &mut character, &mut world).is_none());
        assert_eq!(character.weapon().unwrap().angle, 0.0);

        world.get_mut(target).unwrap().position = Vec2::new(-50.0, 0.0);
        world.step(1.0);
        assert!(shooter.update(1.0, &mut character, &mut world).is_some());

        world.remove(target);
        world.step(1.0);
        assert!(shooter.update(1.0, &mut character, &mut world).is_none());
    }
}
