//! Weapons
//!
//! A weapon is mounted on a character at an offset from its center and
//! mirrors with the character when it turns. Shooting spawns a projectile
//! body in the world.

use std::f32::consts::{FRAC_PI_2, PI};

use tracing::{debug, warn};

use crate::config::{vec2, WeaponConfig};
use crate::error::ConfigError;
use crate::math::{supplement, unit_from_angle, Vec2};
use crate::physics::{Body, BodyId, PhysicsWorld};

#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub size: Vec2,
    /// Mount point relative to the owner's center
    pub offset: Vec2,
    /// Aim in radians; 0 points right
    pub angle: f32,
    pub texture_wrap: Vec2,
    /// Launch impulse given to each projectile
    pub power: f32,
    pub projectile_size: Vec2,
    pub ammo_ignores_gravity: bool,
    pub can_hit_owner: bool,
    /// Seconds between shots (infinite when the fire rate is 0)
    time_between_use: f32,
    /// World time of the last shot
    last_use: Option<f64>,
    /// None means unlimited
    ammo: Option<u32>,
}

impl Weapon {
    pub fn new(width: f32, height: f32) -> Self {
        Self::from_config(&WeaponConfig {
            size: (width, height),
            ..WeaponConfig::default()
        })
    }

    pub fn from_config(config: &WeaponConfig) -> Self {
        let mut weapon = Self {
            size: vec2(config.size),
            offset: vec2(config.offset),
            angle: 0.0,
            texture_wrap: Vec2::ONE,
            power: config.power,
            projectile_size: vec2(config.projectile_size),
            ammo_ignores_gravity: config.ammo_ignores_gravity,
            can_hit_owner: config.can_hit_owner,
            time_between_use: f32::INFINITY,
            last_use: None,
            ammo: config.ammo,
        };
        if let Err(e) = weapon.set_fire_rate(config.fire_rate) {
            warn!("{}, weapon disabled", e);
        }
        weapon
    }

    pub fn fire_rate(&self) -> f32 {
        1.0 / self.time_between_use
    }

    /// Shots per second. 0 disables the weapon; negative or NaN rates are an error.
    pub fn set_fire_rate(&mut self, rate: f32) -> Result<(), ConfigError> {
        if !(rate >= 0.0) {
            return Err(ConfigError::Validation(format!("invalid fire rate {}", rate)));
        }
        self.time_between_use = if rate == 0.0 { f32::INFINITY } else { 1.0 / rate };
        Ok(())
    }

    pub fn ammo(&self) -> Option<u32> {
        self.ammo
    }

    pub fn is_ready(&self, now: f64) -> bool {
        if self.ammo == Some(0) || self.time_between_use.is_infinite() {
            return false;
        }
        self.last_use
            .map_or(true, |t| now - t > self.time_between_use as f64)
    }

    /// Aimed into the right half-plane.
    pub fn is_facing_right(&self) -> bool {
        -FRAC_PI_2 < self.angle && self.angle < FRAC_PI_2
    }

    /// Mirror for an owner that turned around.
    pub(crate) fn mirror(&mut self) {
        self.texture_wrap = Vec2::new(1.0, -self.texture_wrap.y);
        self.angle = supplement(self.angle);
        self.offset.x = -self.offset.x;
    }

    /// Orient for an owner that is facing left when the weapon is mounted.
    pub(crate) fn mount_facing_left(&mut self) {
        self.offset.x = -self.offset.x;
        self.angle = PI;
        self.texture_wrap = Vec2::new(1.0, -1.0);
    }

    /// Restore the right-facing orientation when taken off an owner.
    pub(crate) fn unmount(&mut self, owner_facing_left: bool) {
        if owner_facing_left {
            self.offset.x = -self.offset.x;
        }
        self.texture_wrap = Vec2::ONE;
        self.angle = 0.0;
    }

    /// Point the weapon along `direction`. The texture is flipped when
    /// aiming into the left half-plane.
    pub fn aim(&mut self, direction: Vec2) {
        if direction.length_squared() == 0.0 {
            return;
        }
        self.angle = direction.y.atan2(direction.x);
        self.texture_wrap.y = if self.is_facing_right() { 1.0 } else { -1.0 };
    }

    /// World position of the weapon on an owner at `owner_position`.
    pub fn position(&self, owner_position: Vec2) -> Vec2 {
        owner_position + self.offset
    }

    /// Fire a projectile if ready. The projectile starts clear of the
    /// owner, 0.75 * max(width, height) along the aim direction.
    pub(crate) fn shoot(&mut self, world: &mut PhysicsWorld, owner: BodyId) -> Option<BodyId> {
        let now = world.elapsed();
        if !self.is_ready(now) {
            return None;
        }

        let (owner_position, owner_size, owner_group) = {
            let body = world.get(owner)?;
            (body.position, body.size, body.collision_ignore_group)
        };

        let direction = unit_from_angle(self.angle);
        let start = self.position(owner_position) + direction * (0.75 * owner_size.x.max(owner_size.y));

        let mut projectile = Body::dynamic(self.projectile_size.x, self.projectile_size.y)
            .at(start.x, start.y)
            .with_angle(self.angle);
        projectile.ignores_gravity = self.ammo_ignores_gravity;
        if !self.can_hit_owner {
            projectile.collision_ignore_group = owner_group;
        }

        let id = world.add(projectile);
        world.hit(id, direction * self.power);

        self.last_use = Some(now);
        if let Some(ammo) = self.ammo.as_mut() {
            *ammo -= 1;
        }
        debug!(%owner, projectile = %id, ammo = ?self.ammo, "weapon fired");
        Some(id)
    }
}
