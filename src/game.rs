//! Game hosts
//!
//! A character can only live in a game that owns a physics world. `Scene`
//! is the plain non-physics game; `PhysicsGame` owns a `PhysicsWorld`, the
//! characters in it (with optional brains) and any moving platforms, and
//! runs them in a fixed order each tick:
//!
//! 1. Movers reposition their platforms
//! 2. Brains steer their characters and shooters aim and fire
//! 3. Characters update (move targets, probes, contact, state, jump poll)
//! 4. The world steps
//! 5. Collision events go to the character owning each body

use std::collections::HashMap;
use std::f32::consts::TAU;

use tracing::{debug, info, trace};

use crate::assets::AnimationLibrary;
use crate::brain::{ShooterBrain, WandererBrain};
use crate::character::{PlatformCharacter, Weapon};
use crate::config::{vec2, CharacterConfig, LevelConfig, PlatformConfig};
use crate::error::{CharacterError, ConfigError};
use crate::math::Vec2;
use crate::physics::{Body, BodyId, PhysicsWorld};

/// Anything characters can be added to.
pub trait Game {
    fn physics(&self) -> Option<&PhysicsWorld>;
    fn physics_mut(&mut self) -> Option<&mut PhysicsWorld>;
}

/// A game without physics. Characters cannot be attached to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Scene;

impl Game for Scene {
    fn physics(&self) -> Option<&PhysicsWorld> {
        None
    }

    fn physics_mut(&mut self) -> Option<&mut PhysicsWorld> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(usize);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

#[derive(Debug)]
pub struct Actor {
    pub name: String,
    pub character: PlatformCharacter,
    pub brain: Option<WandererBrain>,
    pub shooter: Option<ShooterBrain>,
}

/// Moves a platform sinusoidally around its starting position.
#[derive(Debug, Clone)]
pub struct PlatformMover {
    platform: BodyId,
    origin: Vec2,
    amplitude: Vec2,
    period: f32,
    elapsed: f32,
}

impl PlatformMover {
    pub fn new(platform: BodyId, origin: Vec2, amplitude: Vec2, period: f32) -> Self {
        Self {
            platform,
            origin,
            amplitude,
            period,
            elapsed: 0.0,
        }
    }

    pub fn platform(&self) -> BodyId {
        self.platform
    }

    /// Offset from the origin at time `t`.
    pub fn offset_at(&self, t: f32) -> Vec2 {
        self.amplitude * (TAU * t / self.period).sin()
    }

    /// Advance and move the platform. Returns false once the platform is gone.
    pub fn update(&mut self, world: &mut PhysicsWorld, dt: f32) -> bool {
        self.elapsed += dt;
        let position = self.origin + self.offset_at(self.elapsed);
        match world.get_mut(self.platform) {
            Some(body) => {
                body.position = position;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct PhysicsGame {
    world: PhysicsWorld,
    animations: AnimationLibrary,
    actors: Vec<Actor>,
    /// Character bodies and probes of live actors
    owners: HashMap<BodyId, ActorId>,
    movers: Vec<PlatformMover>,
    player: Option<ActorId>,
}

impl Game for PhysicsGame {
    fn physics(&self) -> Option<&PhysicsWorld> {
        Some(&self.world)
    }

    fn physics_mut(&mut self) -> Option<&mut PhysicsWorld> {
        Some(&mut self.world)
    }
}

impl PhysicsGame {
    pub fn new(gravity: Vec2, animations: AnimationLibrary) -> Self {
        Self {
            world: PhysicsWorld::new(gravity),
            animations,
            ..Default::default()
        }
    }

    /// Build a game from a validated level.
    pub fn from_level(level: &LevelConfig, animations: AnimationLibrary) -> Result<Self, ConfigError> {
        level.validate()?;
        let mut game = Self::new(vec2(level.gravity), animations);

        for platform in &level.platforms {
            game.add_level_platform(platform);
        }

        for spawn in &level.characters {
            let id = game.add_character(&spawn.name, spawn.config.clone(), vec2(spawn.position))?;
            if let Some(brain) = &spawn.brain {
                game.set_brain(id, Some(WandererBrain::new(brain.clone())));
            }
            if let Some(weapon) = &spawn.weapon {
                if let Some(character) = game.character_mut(id) {
                    character.set_weapon(Some(Weapon::from_config(weapon)));
                }
            }
            if spawn.player && game.player.is_none() {
                game.player = Some(id);
            }
        }

        // Targets can name characters spawned later in the list
        for (index, spawn) in level.characters.iter().enumerate() {
            let Some(config) = &spawn.shooter else {
                continue;
            };
            let target = config
                .target
                .as_deref()
                .and_then(|name| game.find(name))
                .and_then(|id| game.character(id))
                .and_then(PlatformCharacter::body);
            let mut shooter = ShooterBrain::new(config);
            shooter.set_target(target);
            game.set_shooter(ActorId(index), Some(shooter));
        }

        info!(
            platforms = level.platforms.len(),
            characters = game.actors.len(),
            "level ready"
        );
        Ok(game)
    }

    fn add_level_platform(&mut self, config: &PlatformConfig) -> BodyId {
        let (w, h) = config.size;
        let position = vec2(config.position);
        let body = Body::fixed(w, h)
            .at(position.x, position.y)
            .with_angle(config.angle)
            .with_group(config.collision_ignore_group);

        match &config.mover {
            Some(mover) => self.add_moving_platform(body, vec2(mover.amplitude), mover.period),
            None => self.add_platform(body),
        }
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn animations(&self) -> &AnimationLibrary {
        &self.animations
    }

    pub fn add_platform(&mut self, body: Body) -> BodyId {
        self.world.add(body)
    }

    /// Add a platform that oscillates around its current position.
    pub fn add_moving_platform(&mut self, body: Body, amplitude: Vec2, period: f32) -> BodyId {
        let origin = body.position;
        let id = self.world.add(body);
        self.movers.push(PlatformMover::new(id, origin, amplitude, period));
        id
    }

    /// Create a character from `config` and attach it at `position`.
    pub fn add_character(
        &mut self,
        name: &str,
        config: CharacterConfig,
        position: Vec2,
    ) -> Result<ActorId, CharacterError> {
        let mut character = PlatformCharacter::new(config, &self.animations);
        character.attach(self, position)?;

        let id = ActorId(self.actors.len());
        let bodies = character.body().into_iter().chain(character.probes().iter().filter_map(|p| p.body()));
        self.owners.extend(bodies.map(|body| (body, id)));
        self.actors.push(Actor {
            name: name.to_string(),
            character,
            brain: None,
            shooter: None,
        });
        debug!(%id, name, "added character");
        Ok(id)
    }

    /// Give a character a brain (or take it away). Returns false for an unknown id.
    pub fn set_brain(&mut self, id: ActorId, brain: Option<WandererBrain>) -> bool {
        match self.actors.get_mut(id.0) {
            Some(actor) => {
                actor.brain = brain;
                true
            }
            None => false,
        }
    }

    /// Give a character a shooter (or take it away). Returns false for an unknown id.
    pub fn set_shooter(&mut self, id: ActorId, shooter: Option<ShooterBrain>) -> bool {
        match self.actors.get_mut(id.0) {
            Some(actor) => {
                actor.shooter = shooter;
                true
            }
            None => false,
        }
    }

    /// The live actor whose character owns `body` (its own body or a probe).
    pub fn owner_of(&self, body: BodyId) -> Option<ActorId> {
        self.owners.get(&body).copied()
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.0)
    }

    pub fn character(&self, id: ActorId) -> Option<&PlatformCharacter> {
        self.actors.get(id.0).map(|a| &a.character)
    }

    pub fn character_mut(&mut self, id: ActorId) -> Option<&mut PlatformCharacter> {
        self.actors.get_mut(id.0).map(|a| &mut a.character)
    }

    /// A character together with the world it lives in, for driving it
    /// from outside (player input).
    pub fn character_with_world(&mut self, id: ActorId) -> Option<(&mut PlatformCharacter, &mut PhysicsWorld)> {
        let actor = self.actors.get_mut(id.0)?;
        Some((&mut actor.character, &mut self.world))
    }

    /// Live actors with their ids.
    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.actors
            .iter()
            .enumerate()
            .filter(|(_, a)| !a.character.is_destroyed())
            .map(|(i, a)| (ActorId(i), a))
    }

    pub fn find(&self, name: &str) -> Option<ActorId> {
        self.actors().find(|(_, a)| a.name == name).map(|(id, _)| id)
    }

    /// The keyboard-controlled character, if any.
    pub fn player(&self) -> Option<ActorId> {
        self.player.filter(|id| self.character(*id).is_some_and(|c| !c.is_destroyed()))
    }

    pub fn set_player(&mut self, id: Option<ActorId>) {
        self.player = id;
    }

    /// Remove a character's bodies from the world. Returns false if it was
    /// unknown or already destroyed.
    pub fn destroy_character(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.actors.get_mut(id.0) else {
            return false;
        };
        if actor.character.is_destroyed() {
            return false;
        }
        actor.character.destroy(&mut self.world);
        actor.brain = None;
        actor.shooter = None;
        self.owners.retain(|_, owner| *owner != id);
        true
    }

    /// Run one tick.
    pub fn update(&mut self, dt: f32) {
        let world = &mut self.world;

        self.movers.retain_mut(|mover| mover.update(world, dt));

        for actor in self.actors.iter_mut().filter(|a| !a.character.is_destroyed()) {
            if let Some(brain) = actor.brain.as_mut() {
                brain.update(dt, &mut actor.character, world);
            }
            if let Some(shooter) = actor.shooter.as_mut() {
                shooter.update(dt, &mut actor.character, world);
            }
        }

        for actor in self.actors.iter_mut().filter(|a| !a.character.is_destroyed()) {
            actor.character.update(world, dt);
        }

        world.step(dt);

        for event in world.drain_collisions() {
            let Some(&id) = self.owners.get(&event.body) else {
                continue;
            };
            if let Some(actor) = self.actors.get_mut(id.0) {
                trace!(body = %event.body, other = %event.other, %id, "dispatch collision");
                actor.character.handle_collision(world, &event);
            }
        }
    }
}
