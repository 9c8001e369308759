//! Character and level configuration
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.
//! Every field has a default, so a config only needs to name what it changes:
//!
//! ```ron
//! (
//!     size: (40.0, 80.0),
//!     locomotion: Gravity,
//!     maintain_momentum: true,
//! )
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::math::Vec2;

/// Validation limits for loaded files
pub mod limits {
    /// Maximum number of platforms in a level
    pub const MAX_PLATFORMS: usize = 4096;
    /// Maximum number of characters in a level
    pub const MAX_CHARACTERS: usize = 256;
    /// Maximum coordinate value (prevents overflow issues)
    pub const MAX_COORD: f32 = 1_000_000.0;
}

fn is_valid_float(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

fn is_valid_pair(p: (f32, f32)) -> bool {
    is_valid_float(p.0) && is_valid_float(p.1)
}

pub(crate) fn vec2(p: (f32, f32)) -> Vec2 {
    Vec2::new(p.0, p.1)
}

/// Which locomotion strategy a character uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LocomotionKind {
    /// Three ground probes, gravity switched off while standing
    #[default]
    FixedGravity,
    /// Contact-normal based, works with any gravity direction
    Gravity,
}

/// Animation names looked up in the `AnimationLibrary`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub idle: Option<String>,
    pub walk: Option<String>,
    pub jump: Option<String>,
    pub fall: Option<String>,
    pub loop_jump: bool,
    pub loop_fall: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Full width and height
    pub size: (f32, f32),
    pub mass: f32,
    pub locomotion: LocomotionKind,
    pub turns_when_walking: bool,
    pub can_move_on_air: bool,
    /// Keep playing the walk animation while airborne
    pub walk_on_air: bool,
    pub maintain_momentum: bool,
    pub can_walk_against_walls: bool,
    /// Walking off a ledge switches Idle to Falling before contact is lost
    pub ledge_lookahead: bool,
    pub collision_ignore_group: u32,
    pub linear_damping: f32,
    /// Updates without floor contact before a gravity-adapted character falls
    pub platform_tolerance: u32,
    /// Walking acceleration for gravity-adapted characters
    pub acceleration: f32,
    /// Walking speed cap for gravity-adapted characters
    pub max_velocity: f32,
    /// Seconds between checks for the top of a jump
    pub jump_poll_interval: f32,
    pub animations: AnimationConfig,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            size: (40.0, 80.0),
            mass: 1.0,
            locomotion: LocomotionKind::FixedGravity,
            turns_when_walking: true,
            can_move_on_air: true,
            walk_on_air: false,
            maintain_momentum: false,
            can_walk_against_walls: false,
            ledge_lookahead: false,
            collision_ignore_group: 0,
            linear_damping: 0.96,
            platform_tolerance: 5,
            acceleration: 1000.0,
            max_velocity: 500.0,
            jump_poll_interval: 0.01,
            animations: AnimationConfig::default(),
        }
    }
}

impl CharacterConfig {
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_locomotion(mut self, kind: LocomotionKind) -> Self {
        self.locomotion = kind;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.size)
    }

    /// Check values that would break the character logic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (w, h) = self.size;
        if !is_valid_float(w) || !is_valid_float(h) || w <= 0.0 || h <= 0.0 {
            return Err(ConfigError::Validation(format!("invalid size ({}, {})", w, h)));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(ConfigError::Validation(format!("invalid mass {}", self.mass)));
        }
        if !(0.0..=1.0).contains(&self.linear_damping) {
            return Err(ConfigError::Validation(format!(
                "linear_damping {} outside 0..=1",
                self.linear_damping
            )));
        }
        if !self.jump_poll_interval.is_finite() || self.jump_poll_interval <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "invalid jump_poll_interval {}",
                self.jump_poll_interval
            )));
        }
        if self.locomotion == LocomotionKind::Gravity {
            if self.platform_tolerance == 0 {
                warn!("platform_tolerance 0 drops the floor on the first update without contact");
            }
            if self.max_velocity <= 0.0 || self.acceleration <= 0.0 {
                warn!(
                    acceleration = self.acceleration,
                    max_velocity = self.max_velocity,
                    "gravity-adapted character will not be able to walk"
                );
            }
        }
        Ok(())
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_ron_str(&read(path.as_ref())?)
    }
}

/// Sinusoidal motion for a kinematic platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoverConfig {
    /// Peak displacement from the start position
    pub amplitude: (f32, f32),
    /// Seconds per full cycle
    pub period: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub size: (f32, f32),
    pub position: (f32, f32),
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub collision_ignore_group: u32,
    #[serde(default)]
    pub mover: Option<MoverConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    pub speed: f32,
    pub jump_speed: f32,
    pub falls_off_platforms: bool,
    pub tries_to_jump: bool,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            speed: 50.0,
            jump_speed: 200.0,
            falls_off_platforms: false,
            tries_to_jump: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub size: (f32, f32),
    /// Mount point relative to the owner's center, for a right-facing owner
    pub offset: (f32, f32),
    /// Projectile launch impulse
    pub power: f32,
    /// Shots per second. 0 disables the weapon.
    pub fire_rate: f32,
    /// None means unlimited
    pub ammo: Option<u32>,
    pub projectile_size: (f32, f32),
    pub ammo_ignores_gravity: bool,
    pub can_hit_owner: bool,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            size: (30.0, 10.0),
            offset: (10.0, 0.0),
            power: 200.0,
            fire_rate: 4.0,
            ammo: None,
            projectile_size: (6.0, 6.0),
            ammo_ignores_gravity: true,
            can_hit_owner: false,
        }
    }
}

/// Automatic shooting at another character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    /// Name of the character to shoot at
    pub target: Option<String>,
    pub time_between_shots: f32,
    /// No aiming or shooting beyond this distance
    pub max_distance: f32,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            target: None,
            time_between_shots: 1.0,
            max_distance: f32::MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSpawn {
    pub name: String,
    pub position: (f32, f32),
    #[serde(default)]
    pub config: CharacterConfig,
    #[serde(default)]
    pub brain: Option<BrainConfig>,
    #[serde(default)]
    pub weapon: Option<WeaponConfig>,
    #[serde(default)]
    pub shooter: Option<ShooterConfig>,
    /// Controlled by the keyboard in the demo
    #[serde(default)]
    pub player: bool,
}

/// A level: gravity, platforms and characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default = "default_gravity")]
    pub gravity: (f32, f32),
    #[serde(default)]
    pub platforms: Vec<PlatformConfig>,
    #[serde(default)]
    pub characters: Vec<CharacterSpawn>,
}

fn default_gravity() -> (f32, f32) {
    (0.0, -1000.0)
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            platforms: Vec::new(),
            characters: Vec::new(),
        }
    }
}

impl LevelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_pair(self.gravity) {
            return Err(ConfigError::Validation(format!("invalid gravity {:?}", self.gravity)));
        }
        if self.platforms.len() > limits::MAX_PLATFORMS {
            return Err(ConfigError::Validation(format!(
                "too many platforms ({} > {})",
                self.platforms.len(),
                limits::MAX_PLATFORMS
            )));
        }
        if self.characters.len() > limits::MAX_CHARACTERS {
            return Err(ConfigError::Validation(format!(
                "too many characters ({} > {})",
                self.characters.len(),
                limits::MAX_CHARACTERS
            )));
        }

        for (i, p) in self.platforms.iter().enumerate() {
            if !is_valid_pair(p.size) || p.size.0 <= 0.0 || p.size.1 <= 0.0 {
                return Err(ConfigError::Validation(format!("platform {}: invalid size {:?}", i, p.size)));
            }
            if !is_valid_pair(p.position) || !p.angle.is_finite() {
                return Err(ConfigError::Validation(format!("platform {}: invalid placement", i)));
            }
            if let Some(mover) = &p.mover {
                if !is_valid_pair(mover.amplitude) || !mover.period.is_finite() || mover.period <= 0.0 {
                    return Err(ConfigError::Validation(format!("platform {}: invalid mover", i)));
                }
            }
        }

        for c in &self.characters {
            if !is_valid_pair(c.position) {
                return Err(ConfigError::Validation(format!("character '{}': invalid position", c.name)));
            }
            c.config.validate().map_err(|e| match e {
                ConfigError::Validation(msg) => {
                    ConfigError::Validation(format!("character '{}': {}", c.name, msg))
                }
                other => other,
            })?;
            if let Some(weapon) = &c.weapon {
                if !(weapon.fire_rate >= 0.0) || weapon.fire_rate.is_infinite() {
                    return Err(ConfigError::Validation(format!(
                        "character '{}': invalid fire rate {}",
                        c.name, weapon.fire_rate
                    )));
                }
            }
            if let Some(shooter) = &c.shooter {
                self.validate_shooter(&c.name, shooter)?;
            }
        }

        if !self.characters.iter().any(|c| c.player) && !self.characters.is_empty() {
            warn!("level has no player character");
        }
        Ok(())
    }

    fn validate_shooter(&self, name: &str, shooter: &ShooterConfig) -> Result<(), ConfigError> {
        if !shooter.time_between_shots.is_finite() || shooter.time_between_shots <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "character '{}': invalid time_between_shots {}",
                name, shooter.time_between_shots
            )));
        }
        if !(shooter.max_distance >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "character '{}': invalid max_distance {}",
                name, shooter.max_distance
            )));
        }
        if let Some(target) = &shooter.target {
            if !self.characters.iter().any(|c| &c.name == target) {
                return Err(ConfigError::Validation(format!(
                    "character '{}': unknown shooter target '{}'",
                    name, target
                )));
            }
        }
        Ok(())
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let level: Self = ron::from_str(text)?;
        level.validate()?;
        Ok(level)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let level = Self::from_ron_str(&read(path)?)?;
        info!(
            path = %path.display(),
            platforms = level.platforms.len(),
            characters = level.characters.len(),
            "loaded level"
        );
        Ok(level)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let config = ron::ser::PrettyConfig::new().depth_limit(4);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        fs::write(path, self.to_ron_string()?).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
