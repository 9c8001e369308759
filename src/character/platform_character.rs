//! Platform Character
//!
//! The public face of the locomotion subsystem. A character owns its
//! shared core plus one locomotion strategy, chosen from its config when
//! it is created. All physics goes through the world passed to each call.

use std::f32::consts::PI;

use tracing::{debug, info};

use super::appearance::{AppearanceChange, PlayedCallback};
use super::core::{CharacterCore, Direction};
use super::fixed::FixedGravity;
use super::gravity::{up_from_gravity, GravityAdapter};
use super::probe::GroundProbe;
use super::state::LocomotionState;
use super::steering::{ArrivedCallback, MoveTarget, Steer};
use super::weapon::Weapon;
use crate::assets::{Animation, AnimationLibrary};
use crate::config::{CharacterConfig, LocomotionKind};
use crate::error::CharacterError;
use crate::event::{CollisionEvent, ListenerId};
use crate::game::Game;
use crate::math::{right_normal, Vec2};
use crate::physics::{Body, BodyId, PhysicsWorld};

/// What a brain (or a player controller) needs to steer a character.
pub trait Drivable {
    fn position(&self, world: &PhysicsWorld) -> Vec2;
    fn velocity(&self, world: &PhysicsWorld) -> Vec2;
    fn walk(&mut self, world: &mut PhysicsWorld, velocity: f32);
    fn jump(&mut self, world: &mut PhysicsWorld, speed: f32) -> bool;
    fn stop(&mut self, world: &mut PhysicsWorld);
    fn is_about_to_fall(&self, world: &PhysicsWorld) -> bool;
    /// Steer toward a velocity, the way an analog stick would.
    fn move_at(&mut self, world: &mut PhysicsWorld, velocity: Vec2);
    fn stop_walking(&mut self, world: &mut PhysicsWorld);
}

#[derive(Debug, Clone)]
pub enum Locomotion {
    FixedGravity(FixedGravity),
    Gravity(GravityAdapter),
}

impl Locomotion {
    pub fn kind(&self) -> LocomotionKind {
        match self {
            Locomotion::FixedGravity(_) => LocomotionKind::FixedGravity,
            Locomotion::Gravity(_) => LocomotionKind::Gravity,
        }
    }
}

#[derive(Debug)]
pub struct PlatformCharacter {
    core: CharacterCore,
    locomotion: Locomotion,
    move_target: Option<MoveTarget>,
}

impl PlatformCharacter {
    /// Create an unattached character. Animation names in the config are
    /// resolved against `animations`.
    pub fn new(config: CharacterConfig, animations: &AnimationLibrary) -> Self {
        let set = animations.resolve(&config.animations);
        let locomotion = match config.locomotion {
            LocomotionKind::FixedGravity => Locomotion::FixedGravity(FixedGravity::new()),
            LocomotionKind::Gravity => Locomotion::Gravity(GravityAdapter::new()),
        };
        Self {
            core: CharacterCore::new(config, set),
            locomotion,
            move_target: None,
        }
    }

    /// Add the character to a running game.
    pub fn attach(&mut self, game: &mut dyn Game, position: Vec2) -> Result<BodyId, CharacterError> {
        let world = game.physics_mut().ok_or(CharacterError::NotPhysicsGame)?;
        self.spawn(world, position)
    }

    /// Create the character's bodies in `world`.
    pub fn spawn(&mut self, world: &mut PhysicsWorld, position: Vec2) -> Result<BodyId, CharacterError> {
        if self.core.is_destroyed() {
            return Err(CharacterError::Destroyed);
        }
        if self.core.body.is_some() {
            return Err(CharacterError::AlreadyAttached);
        }

        let config = &self.core.config;
        let (w, h) = config.size;
        let body = Body::dynamic(w, h)
            .at(position.x, position.y)
            .with_mass(config.mass)
            .with_damping(config.linear_damping)
            .with_group(config.collision_ignore_group);
        let id = world.add(body);
        self.core.body = Some(id);

        if let Locomotion::FixedGravity(fixed) = &mut self.locomotion {
            fixed.spawn_probes(&self.core, world, position);
        }
        if self.core.state() == LocomotionState::Idle {
            self.core.show(super::appearance::AnimationSlot::Idle);
        }

        info!(character = %id, kind = ?self.locomotion.kind(), x = position.x, y = position.y, "character attached");
        Ok(id)
    }

    /// Remove the character and its probes from the world. Any armed jump
    /// poll is cancelled.
    pub fn destroy(&mut self, world: &mut PhysicsWorld) {
        if self.core.is_destroyed() {
            return;
        }
        self.core.jump.disarm();
        self.move_target = None;
        if let Locomotion::FixedGravity(fixed) = &mut self.locomotion {
            fixed.despawn_probes(world);
        }
        if let Some(id) = self.core.body.take() {
            world.remove(id);
            info!(character = %id, "character destroyed");
        }
        self.core.motion.clear();
        self.core.mark_destroyed();
    }

    pub fn is_destroyed(&self) -> bool {
        self.core.is_destroyed()
    }

    pub fn body(&self) -> Option<BodyId> {
        self.core.body
    }

    pub fn kind(&self) -> LocomotionKind {
        self.locomotion.kind()
    }

    pub fn config(&self) -> &CharacterConfig {
        &self.core.config
    }

    pub fn size(&self) -> Vec2 {
        self.core.size()
    }

    pub fn state(&self) -> LocomotionState {
        self.core.state()
    }

    /// Ground probes (empty for gravity-adapted characters).
    pub fn probes(&self) -> &[GroundProbe] {
        match &self.locomotion {
            Locomotion::FixedGravity(fixed) => fixed.probes(),
            Locomotion::Gravity(_) => &[],
        }
    }

    /// The bound platform of a gravity-adapted character.
    pub fn platform(&self) -> Option<BodyId> {
        match &self.locomotion {
            Locomotion::FixedGravity(_) => None,
            Locomotion::Gravity(adapter) => adapter.platform(),
        }
    }

    /// Whether `body` is this character's body or one of its probes.
    pub fn owns_body(&self, body: BodyId) -> bool {
        self.core.body == Some(body) || self.probes().iter().any(|p| p.body() == Some(body))
    }

    /// Advance one frame. Called before the physics step.
    pub fn update(&mut self, world: &mut PhysicsWorld, dt: f32) {
        if self.core.is_destroyed() || self.core.body.is_none() {
            return;
        }
        self.steer(world, dt);
        match &mut self.locomotion {
            Locomotion::FixedGravity(fixed) => fixed.update(&mut self.core, world, dt),
            Locomotion::Gravity(adapter) => adapter.update(&mut self.core, world, dt),
        }
    }

    /// Route a collision event for the character's body or one of its probes.
    pub fn handle_collision(&mut self, world: &mut PhysicsWorld, event: &CollisionEvent) {
        if self.core.is_destroyed() {
            return;
        }
        let is_body = self.core.body == Some(event.body);

        match &mut self.locomotion {
            Locomotion::FixedGravity(fixed) => {
                if is_body {
                    fixed.on_body_collision(&mut self.core, world, event.other);
                } else if let Some(index) = fixed.probe_index(event.body) {
                    fixed.on_probe_collision(index, &self.core, world, event.other);
                }
            }
            Locomotion::Gravity(adapter) => {
                if is_body {
                    adapter.on_body_collision(&mut self.core, world, event.other, event.normal);
                }
            }
        }
    }

    /// Unit vector opposite gravity as this character sees it.
    fn up(&self, world: &PhysicsWorld) -> Vec2 {
        match self.locomotion {
            Locomotion::FixedGravity(_) => Vec2::Y,
            Locomotion::Gravity(_) => up_from_gravity(world.gravity),
        }
    }

    fn steer(&mut self, world: &mut PhysicsWorld, dt: f32) {
        let Some(position) = self.position(world) else {
            return;
        };
        let Some(steer) = self.move_target.as_mut().map(|t| t.tick(dt, position)) else {
            return;
        };

        match steer {
            Steer::Hold => {}
            Steer::Toward(velocity) => {
                let up = self.up(world);
                self.move_at(world, velocity - up * velocity.dot(up));
            }
            Steer::Arrived => {
                self.stop(world);
                let target = self.move_target.take();
                debug!("reached move target");
                if let Some(on_arrived) = target.and_then(MoveTarget::into_callback) {
                    on_arrived();
                }
            }
        }
    }

    /// Walk toward `target` at `speed`, replacing any earlier target.
    /// `on_arrived` runs once the character gets there.
    pub fn move_to(&mut self, target: Vec2, speed: f32, on_arrived: Option<ArrivedCallback>) {
        if self.core.is_destroyed() {
            return;
        }
        self.move_target = Some(MoveTarget::new(target, speed, on_arrived));
    }

    /// Forget the move target without running its callback. Returns false
    /// if there was none.
    pub fn stop_move_to(&mut self) -> bool {
        self.move_target.take().is_some()
    }

    pub fn move_target(&self) -> Option<Vec2> {
        self.move_target.as_ref().map(MoveTarget::target)
    }

    pub fn move_at(&mut self, world: &mut PhysicsWorld, velocity: Vec2) {
        if self.core.is_destroyed() {
            return;
        }
        match &mut self.locomotion {
            Locomotion::FixedGravity(fixed) => fixed.move_at(&mut self.core, world, velocity),
            Locomotion::Gravity(adapter) => adapter.move_at(&mut self.core, world, velocity),
        }
    }

    pub fn stop_walking(&mut self, world: &mut PhysicsWorld) {
        if self.core.is_destroyed() {
            return;
        }
        match &mut self.locomotion {
            Locomotion::FixedGravity(fixed) => fixed.stop_walking(&mut self.core, world),
            Locomotion::Gravity(adapter) => adapter.stop_walking(&mut self.core),
        }
    }

    /// Throw `object` from just in front of the character. `angle` is
    /// measured from the walking direction toward up and mirrored when
    /// facing left; `axial_offset` raises the start point along up.
    pub fn throw(
        &mut self,
        world: &mut PhysicsWorld,
        mut object: Body,
        angle: f32,
        force: f32,
        axial_offset: f32,
    ) -> Option<BodyId> {
        let (position, width) = self.core.body(world).map(|b| (b.position, b.size.x))?;
        let up = self.up(world);
        let right = right_normal(up);
        let facing = self.core.facing();

        let angle = if facing == Direction::Left { PI - angle } else { angle };
        let direction = right * angle.cos() + up * angle.sin();
        let distance = (width + object.size.x) / 2.0;

        object.position = position + right * (facing.unit().x * distance) + up * axial_offset;
        let id = world.add(object);
        world.hit(id, direction * force);
        debug!(thrown = %id, force, "threw object");
        Some(id)
    }

    pub fn walk(&mut self, world: &mut PhysicsWorld, velocity: f32) {
        if self.core.is_destroyed() {
            return;
        }
        match &mut self.locomotion {
            Locomotion::FixedGravity(fixed) => fixed.walk(&mut self.core, world, velocity),
            Locomotion::Gravity(adapter) => adapter.walk(&mut self.core, velocity),
        }
    }

    /// Jump if standing. Returns false when the jump was rejected.
    pub fn jump(&mut self, world: &mut PhysicsWorld, speed: f32) -> bool {
        if self.core.is_destroyed() {
            return false;
        }
        match &mut self.locomotion {
            Locomotion::FixedGravity(fixed) => fixed.jump(&mut self.core, world, speed),
            Locomotion::Gravity(adapter) => adapter.jump(&mut self.core, world, speed),
        }
    }

    /// Jump regardless of ground contact.
    pub fn force_jump(&mut self, world: &mut PhysicsWorld, speed: f32) {
        if self.core.is_destroyed() {
            return;
        }
        match &mut self.locomotion {
            Locomotion::FixedGravity(fixed) => fixed.force_jump(&mut self.core, world, speed),
            Locomotion::Gravity(adapter) => adapter.force_jump(&mut self.core, world, speed),
        }
    }

    pub fn is_about_to_fall(&self, world: &PhysicsWorld) -> bool {
        match &self.locomotion {
            Locomotion::FixedGravity(fixed) => fixed.is_about_to_fall(&self.core, world),
            Locomotion::Gravity(adapter) => adapter.is_about_to_fall(&self.core, world),
        }
    }

    pub fn facing(&self) -> Direction {
        self.core.facing()
    }

    /// Face `direction`. Up, Down and the current direction are ignored.
    pub fn turn(&mut self, direction: Direction) -> bool {
        let turned = self.core.turn(direction);
        if turned && matches!(self.locomotion, Locomotion::Gravity(_)) {
            self.core.motion.clear_walk_steps();
        }
        turned
    }

    pub fn texture_wrap(&self) -> Vec2 {
        self.core.texture_wrap()
    }

    pub fn on_direction_changed(&mut self, listener: impl FnMut(&Direction) + 'static) -> ListenerId {
        self.core.on_direction_changed(listener)
    }

    pub fn remove_direction_listener(&mut self, id: ListenerId) -> bool {
        self.core.remove_direction_listener(id)
    }

    pub fn on_appearance_changed(&mut self, listener: impl FnMut(&AppearanceChange) + 'static) -> ListenerId {
        self.core.animator.subscribe(listener)
    }

    pub fn remove_appearance_listener(&mut self, id: ListenerId) -> bool {
        self.core.animator.unsubscribe(id)
    }

    pub fn current_animation(&self) -> Option<&Animation> {
        self.core.animator.current()
    }

    pub fn play_animation(&mut self, animation: Animation, on_played: Option<PlayedCallback>) {
        self.core.animator.play_animation(animation, on_played);
    }

    pub fn animation_played(&mut self) {
        self.core.animator.animation_played();
    }

    /// Back to Idle, custom animation lock released.
    pub fn reset(&mut self) {
        self.core.set_state(LocomotionState::Idle);
        self.core.animator.reset();
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        self.core.weapon()
    }

    pub fn weapon_mut(&mut self) -> Option<&mut Weapon> {
        self.core.weapon_mut()
    }

    /// Attach a weapon (or none), returning the previous one.
    pub fn set_weapon(&mut self, weapon: Option<Weapon>) -> Option<Weapon> {
        self.core.set_weapon(weapon)
    }

    /// Fire the attached weapon. Returns the projectile body.
    pub fn shoot(&mut self, world: &mut PhysicsWorld) -> Option<BodyId> {
        let owner = self.core.body?;
        self.core.weapon_mut()?.shoot(world, owner)
    }

    pub fn position(&self, world: &PhysicsWorld) -> Option<Vec2> {
        self.core.body(world).map(|b| b.position)
    }

    pub fn velocity(&self, world: &PhysicsWorld) -> Option<Vec2> {
        self.core.body(world).map(|b| b.velocity)
    }

    pub fn stop(&mut self, world: &mut PhysicsWorld) {
        if let Some(body) = self.core.body_mut(world) {
            body.stop();
            debug!("stopped");
        }
    }
}

impl Drivable for PlatformCharacter {
    fn position(&self, world: &PhysicsWorld) -> Vec2 {
        PlatformCharacter::position(self, world).unwrap_or_default()
    }

    fn velocity(&self, world: &PhysicsWorld) -> Vec2 {
        PlatformCharacter::velocity(self, world).unwrap_or_default()
    }

    fn walk(&mut self, world: &mut PhysicsWorld, velocity: f32) {
        PlatformCharacter::walk(self, world, velocity);
    }

    fn jump(&mut self, world: &mut PhysicsWorld, speed: f32) -> bool {
        PlatformCharacter::jump(self, world, speed)
    }

    fn stop(&mut self, world: &mut PhysicsWorld) {
        PlatformCharacter::stop(self, world);
    }

    fn is_about_to_fall(&self, world: &PhysicsWorld) -> bool {
        PlatformCharacter::is_about_to_fall(self, world)
    }

    fn move_at(&mut self, world: &mut PhysicsWorld, velocity: Vec2) {
        PlatformCharacter::move_at(self, world, velocity);
    }

    fn stop_walking(&mut self, world: &mut PhysicsWorld) {
        PlatformCharacter::stop_walking(self, world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Scene;
    use std::cell::Cell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    fn library() -> AnimationLibrary {
        let mut library = AnimationLibrary::new();
        for name in ["idle", "walk", "jump", "fall", "wave"] {
            library.add(Animation::new(name, 4));
        }
        library
    }

    fn config(kind: LocomotionKind) -> CharacterConfig {
        let mut config = CharacterConfig::default().with_locomotion(kind);
        config.animations.idle = Some("idle".into());
        config.animations.walk = Some("walk".into());
        config.animations.jump = Some("jump".into());
        config.animations.fall = Some("fall".into());
        config
    }

    /// Character hovering 0.05 above a 400 wide floor whose top is at -40.05.
    fn setup(kind: LocomotionKind) -> (PlatformCharacter, PhysicsWorld, BodyId) {
        setup_with(config(kind))
    }

    fn setup_with(config: CharacterConfig) -> (PlatformCharacter, PhysicsWorld, BodyId) {
        let mut world = PhysicsWorld::default();
        let floor = world.add(Body::fixed(400.0, 20.0).at(0.0, -50.05));
        let mut character = PlatformCharacter::new(config, &library());
        character.spawn(&mut world, Vec2::ZERO).unwrap();
        (character, world, floor)
    }

    /// Character in a world without gravity, after one update.
    fn floating(config: CharacterConfig) -> (PlatformCharacter, PhysicsWorld) {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let mut character = PlatformCharacter::new(config, &library());
        character.spawn(&mut world, Vec2::ZERO).unwrap();
        character.update(&mut world, DT);
        (character, world)
    }

    fn body_mut<'w>(character: &PlatformCharacter, world: &'w mut PhysicsWorld) -> &'w mut Body {
        character.body().and_then(|id| world.get_mut(id)).unwrap()
    }

    fn frame(character: &mut PlatformCharacter, world: &mut PhysicsWorld) {
        character.update(world, DT);
        world.step(DT);
        for event in world.drain_collisions() {
            if character.owns_body(event.body) {
                character.handle_collision(world, &event);
            }
        }
    }

    #[test]
    fn test_lands_on_platform() {
        let (mut character, mut world, _) = setup(LocomotionKind::FixedGravity);

        frame(&mut character, &mut world);
        assert_eq!(character.state(), LocomotionState::Idle);
        assert_eq!(character.velocity(&world).unwrap().y, 0.0);

        for _ in 0..10 {
            frame(&mut character, &mut world);
        }
        assert_eq!(character.state(), LocomotionState::Idle);
        let y = character.position(&world).unwrap().y;
        assert!((y + 0.05).abs() < 1e-4, "resting at {}", y);
    }

    #[test]
    fn test_jump_cycle() {
        let (mut character, mut world, _) = setup(LocomotionKind::FixedGravity);
        frame(&mut character, &mut world);
        frame(&mut character, &mut world);

        assert!(character.jump(&mut world, 300.0));
        assert_eq!(character.velocity(&world).unwrap().y, 300.0);

        let mut states = vec![character.state()];
        for _ in 0..300 {
            frame(&mut character, &mut world);
            if states.last() != Some(&character.state()) {
                states.push(character.state());
            }
        }
        assert_eq!(
            states,
            vec![LocomotionState::Jumping, LocomotionState::Falling, LocomotionState::Idle]
        );
    }

    #[test]
    fn test_jump_rejected_in_air() {
        let mut world = PhysicsWorld::default();
        let mut character = PlatformCharacter::new(config(LocomotionKind::FixedGravity), &library());
        character.spawn(&mut world, Vec2::new(0.0, 500.0)).unwrap();
        frame(&mut character, &mut world);

        assert_eq!(character.state(), LocomotionState::Falling);
        assert!(!character.jump(&mut world, 300.0));
        assert_eq!(character.state(), LocomotionState::Falling);
    }

    #[test]
    fn test_force_jump_scales_with_mass() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let config = config(LocomotionKind::FixedGravity).with_mass(2.0);
        let mut character = PlatformCharacter::new(config, &library());
        character.spawn(&mut world, Vec2::ZERO).unwrap();

        character.force_jump(&mut world, 300.0);
        assert_eq!(character.velocity(&world).unwrap(), Vec2::new(0.0, 300.0));
        assert_eq!(character.state(), LocomotionState::Jumping);

        character.body().and_then(|id| world.get_mut(id)).unwrap().velocity.y = -1.0;
        character.update(&mut world, DT);
        assert_eq!(character.state(), LocomotionState::Falling);
    }

    #[test]
    fn test_walk_moves_and_wall_blocks() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let mut character = PlatformCharacter::new(config(LocomotionKind::FixedGravity), &library());
        character.spawn(&mut world, Vec2::ZERO).unwrap();
        character.update(&mut world, DT);

        let dx = 50.0 * DT;
        character.walk(&mut world, 50.0);
        assert!((character.position(&world).unwrap().x - dx).abs() < 1e-6);
        assert_eq!(character.velocity(&world).unwrap().x, 25.0);

        character.update(&mut world, DT);
        let x = character.position(&world).unwrap().x;
        world.add(Body::fixed(20.0, 200.0).at(x + 20.0 + dx * 0.5 + 10.0, 0.0));
        character.walk(&mut world, 50.0);
        assert_eq!(character.position(&world).unwrap().x, x);
    }

    #[test]
    fn test_rides_moving_platform() {
        let (mut character, mut world, floor) = setup(LocomotionKind::FixedGravity);
        for _ in 0..3 {
            frame(&mut character, &mut world);
        }

        for _ in 0..5 {
            let before = character.position(&world).unwrap().x;
            world.get_mut(floor).unwrap().position.x += 5.0;
            frame(&mut character, &mut world);
            let moved = character.position(&world).unwrap().x - before;
            assert!((moved - 5.0).abs() < 1e-3, "moved {}", moved);
        }
        assert_eq!(character.state(), LocomotionState::Idle);
    }

    #[test]
    fn test_about_to_fall_at_edge() {
        let (mut character, mut world, _) = setup(LocomotionKind::FixedGravity);
        for _ in 0..3 {
            frame(&mut character, &mut world);
        }
        assert!(!character.is_about_to_fall(&world));

        let id = character.body().unwrap();
        world.get_mut(id).unwrap().position.x = 190.0;
        frame(&mut character, &mut world);
        assert!(character.is_about_to_fall(&world));

        character.turn(Direction::Left);
        assert!(!character.is_about_to_fall(&world));
    }

    #[test]
    fn test_gravity_variant_binds_platform() {
        let (mut character, mut world, floor) = setup(LocomotionKind::Gravity);
        assert!(character.probes().is_empty());

        frame(&mut character, &mut world);
        assert_eq!(character.platform(), Some(floor));
        assert_eq!(character.state(), LocomotionState::Idle);
        assert!(character.jump(&mut world, 200.0));
        assert_eq!(character.platform(), None);
    }

    #[test]
    fn test_spawn_errors() {
        let (mut character, mut world, _) = setup(LocomotionKind::FixedGravity);
        assert_eq!(
            character.spawn(&mut world, Vec2::ZERO),
            Err(CharacterError::AlreadyAttached)
        );

        let mut other = PlatformCharacter::new(config(LocomotionKind::FixedGravity), &library());
        assert_eq!(
            other.attach(&mut Scene, Vec2::ZERO),
            Err(CharacterError::NotPhysicsGame)
        );
        assert!(other.body().is_none());
    }

    #[test]
    fn test_destroy_removes_bodies() {
        let (mut character, mut world, _) = setup(LocomotionKind::FixedGravity);
        assert_eq!(world.len(), 5);
        character.jump(&mut world, 100.0);

        character.destroy(&mut world);
        assert_eq!(world.len(), 1);
        assert!(character.is_destroyed());
        assert!(character.body().is_none());

        character.update(&mut world, DT);
        assert!(!character.jump(&mut world, 100.0));
        assert_eq!(
            character.spawn(&mut world, Vec2::ZERO),
            Err(CharacterError::Destroyed)
        );
    }

    #[test]
    fn test_spawn_shows_idle() {
        let mut world = PhysicsWorld::default();
        let mut character = PlatformCharacter::new(config(LocomotionKind::FixedGravity), &library());
        assert!(character.current_animation().is_none());

        character.spawn(&mut world, Vec2::ZERO).unwrap();
        assert_eq!(character.current_animation().unwrap().name, "idle");
    }

    #[test]
    fn test_reset_releases_custom_animation() {
        let (mut character, mut world, _) = setup(LocomotionKind::FixedGravity);
        let played = Rc::new(Cell::new(false));
        let flag = Rc::clone(&played);

        character.play_animation(Animation::new("wave", 8), Some(Box::new(move || flag.set(true))));
        frame(&mut character, &mut world);
        assert_eq!(character.current_animation().unwrap().name, "wave");

        character.reset();
        assert!(!played.get());
        assert_eq!(character.state(), LocomotionState::Idle);

        character.walk(&mut world, 50.0);
        assert_eq!(character.current_animation().unwrap().name, "walk");
    }

    #[test]
    fn test_turn_notifies_listeners() {
        let (mut character, _, _) = setup(LocomotionKind::Gravity);
        let turns = Rc::new(Cell::new(0));
        let counter = Rc::clone(&turns);
        let id = character.on_direction_changed(move |_| counter.set(counter.get() + 1));

        assert!(character.turn(Direction::Left));
        assert!(!character.turn(Direction::Left));
        assert_eq!(character.texture_wrap(), Vec2::new(-1.0, 1.0));
        assert!(character.remove_direction_listener(id));
        character.turn(Direction::Right);
        assert_eq!(turns.get(), 1);
    }

    #[test]
    fn test_shoot_uses_attached_weapon() {
        let (mut character, mut world, _) = setup(LocomotionKind::FixedGravity);
        assert!(character.shoot(&mut world).is_none());

        character.set_weapon(Some(Weapon::new(30.0, 10.0)));
        let projectile = character.shoot(&mut world).unwrap();
        assert!(world.get(projectile).unwrap().velocity.x > 0.0);
    }

    #[test]
    fn test_no_air_control_without_ground() {
        let mut no_air = config(LocomotionKind::FixedGravity);
        no_air.can_move_on_air = false;

        let mut world = PhysicsWorld::default();
        let mut character = PlatformCharacter::new(no_air.clone(), &library());
        character.spawn(&mut world, Vec2::new(0.0, 500.0)).unwrap();
        frame(&mut character, &mut world);
        assert_eq!(character.state(), LocomotionState::Falling);
        character.walk(&mut world, 50.0);
        assert_eq!(character.position(&world).unwrap().x, 0.0);

        let (mut character, mut world, _) = setup_with(no_air);
        for _ in 0..3 {
            frame(&mut character, &mut world);
        }
        character.walk(&mut world, 50.0);
        assert!(character.position(&world).unwrap().x > 0.0);
    }

    #[test]
    fn test_ledge_lookahead_falls_before_contact_is_lost() {
        for lookahead in [false, true] {
            let mut config = config(LocomotionKind::FixedGravity);
            config.ledge_lookahead = lookahead;
            let (mut character, mut world, _) = setup_with(config);
            for _ in 0..3 {
                frame(&mut character, &mut world);
            }

            body_mut(&character, &mut world).position.x = 190.0;
            character.walk(&mut world, 1.0);
            character.update(&mut world, DT);

            let expected = if lookahead { LocomotionState::Falling } else { LocomotionState::Idle };
            assert_eq!(character.state(), expected);
        }
    }

    #[test]
    fn test_momentum_survives_idle_updates() {
        for momentum in [false, true] {
            let mut config = config(LocomotionKind::FixedGravity);
            config.maintain_momentum = momentum;
            let (mut character, mut world) = floating(config);

            body_mut(&character, &mut world).velocity.x = 40.0;
            character.update(&mut world, DT);
            let expected = if momentum { 40.0 } else { 0.0 };
            assert_eq!(character.velocity(&world).unwrap().x, expected);

            body_mut(&character, &mut world).velocity.x = 40.0;
            character.stop_walking(&mut world);
            assert_eq!(character.velocity(&world).unwrap().x, expected);
        }
    }

    #[test]
    fn test_walk_through_walls_when_allowed() {
        let mut config = config(LocomotionKind::FixedGravity);
        config.can_walk_against_walls = true;
        let (mut character, mut world) = floating(config);

        let dx = 50.0 * DT;
        let x = character.position(&world).unwrap().x;
        world.add(Body::fixed(20.0, 200.0).at(x + 20.0 + dx * 0.5 + 10.0, 0.0));
        character.walk(&mut world, 50.0);
        assert!((character.position(&world).unwrap().x - (x + dx)).abs() < 1e-6);
    }

    #[test]
    fn test_walk_keeps_facing_without_turning() {
        let mut config = config(LocomotionKind::FixedGravity);
        config.turns_when_walking = false;
        let (mut character, mut world) = floating(config);

        character.walk(&mut world, -50.0);
        assert_eq!(character.facing(), Direction::Right);
        assert_eq!(character.texture_wrap(), Vec2::ONE);
        assert!(character.position(&world).unwrap().x < 0.0);
    }

    #[test]
    fn test_move_at_walks_the_velocity_difference() {
        let (mut character, mut world) = floating(config(LocomotionKind::FixedGravity));
        body_mut(&character, &mut world).velocity.x = 10.0;

        character.move_at(&mut world, Vec2::new(50.0, 99.0));
        let body = body_mut(&character, &mut world);
        assert_eq!(body.velocity.x, 20.0);
        assert!((body.position.x - 40.0 * DT).abs() < 1e-6);
    }

    #[test]
    fn test_stop_move_to_skips_callback() {
        let (mut character, _) = floating(config(LocomotionKind::FixedGravity));
        let arrived = Rc::new(Cell::new(false));
        let flag = Rc::clone(&arrived);

        character.move_to(Vec2::new(100.0, 0.0), 50.0, Some(Box::new(move || flag.set(true))));
        assert_eq!(character.move_target(), Some(Vec2::new(100.0, 0.0)));
        assert!(character.stop_move_to());
        assert!(!character.stop_move_to());
        assert!(!arrived.get());
    }

    #[test]
    fn test_throw_places_object_ahead() {
        let (mut character, mut world) = floating(config(LocomotionKind::FixedGravity));

        let id = character.throw(&mut world, Body::dynamic(10.0, 10.0), 0.0, 100.0, 0.0).unwrap();
        let thrown = world.get(id).unwrap();
        assert_eq!(thrown.position, Vec2::new(25.0, 0.0));
        assert_eq!(thrown.velocity, Vec2::new(100.0, 0.0));

        character.turn(Direction::Left);
        let angle = std::f32::consts::FRAC_PI_4;
        let id = character.throw(&mut world, Body::dynamic(10.0, 10.0), angle, 100.0, 5.0).unwrap();
        let thrown = world.get(id).unwrap();
        assert!((thrown.position - Vec2::new(-25.0, 5.0)).length() < 1e-4);
        let diagonal = 100.0 * angle.cos();
        assert!((thrown.velocity - Vec2::new(-diagonal, diagonal)).length() < 1e-3);

        character.destroy(&mut world);
        assert!(character.throw(&mut world, Body::dynamic(10.0, 10.0), 0.0, 100.0, 0.0).is_none());
    }
}
