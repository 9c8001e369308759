//! platformer-demo
//!
//! Renders a level with boxes and lets the player character walk, jump and
//! shoot. Other characters run their wanderer and shooter brains.
//!
//! Usage: platformer-demo [level.ron]
//!
//! Controls:
//! - A/D or arrows: walk
//! - Space/W/Up: jump
//! - F: shoot
//! - T: throw a crate
//! - Left click: walk to the clicked point
//! - Tab: control the next character
//! - G: rotate gravity by 90 degrees (only gravity-adapted characters follow)
//! - R: reload the level
//! - Esc: quit

use std::f32::consts::FRAC_PI_2;

use macroquad::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use platformer_kit::math::rotate;
use platformer_kit::{
    ActorId, AnimationLibrary, Body, ConfigError, LevelConfig, LocomotionKind, LocomotionState, PhysicsGame,
};

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const STEP: f32 = 1.0 / 60.0;
/// Longest frame fed to the fixed-step loop (avoids a spiral after a stall)
const MAX_FRAME: f32 = 0.25;
/// World units visible across the screen
const VIEW_WIDTH: f32 = 1400.0;
const WALK_SPEED: f32 = 200.0;
const JUMP_SPEED: f32 = 520.0;
const THROW_FORCE: f32 = 400.0;
const THROW_ANGLE: f32 = 0.6;
const CRATE_SIZE: f32 = 16.0;

const DEMO_LEVEL: &str = include_str!("../assets/levels/demo.ron");
const DEMO_ANIMATIONS: &str = include_str!("../assets/animations.ron");

fn window_conf() -> Conf {
    Conf {
        window_title: format!("platformer-kit demo v{}", VERSION),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_game(path: Option<&str>) -> Result<PhysicsGame, ConfigError> {
    let level = match path {
        Some(path) => LevelConfig::load(path)?,
        None => LevelConfig::from_ron_str(DEMO_LEVEL)?,
    };
    let animations = AnimationLibrary::from_ron_str(DEMO_ANIMATIONS).unwrap_or_else(|e| {
        warn!("demo animations unavailable: {}", e);
        AnimationLibrary::new()
    });
    PhysicsGame::from_level(&level, animations)
}

/// Player input. Sampled once per rendered frame; presses are held until
/// a physics step consumes them.
#[derive(Debug, Default)]
struct Controls {
    walk: f32,
    /// Walk direction applied by the last step
    walked: f32,
    jump: bool,
    shoot: bool,
    throw: bool,
    move_to: Option<Vec2>,
}

impl Controls {
    fn sample(&mut self) {
        let left = is_key_down(KeyCode::A) || is_key_down(KeyCode::Left);
        let right = is_key_down(KeyCode::D) || is_key_down(KeyCode::Right);
        self.walk = match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        self.jump |= is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::W) || is_key_pressed(KeyCode::Up);
        self.shoot |= is_key_pressed(KeyCode::F);
        self.throw |= is_key_pressed(KeyCode::T);
    }

    /// Apply to the player for one step. One-shot actions are consumed.
    fn drive(&mut self, game: &mut PhysicsGame) {
        let Some(id) = game.player() else {
            return;
        };
        let Some((character, world)) = game.character_with_world(id) else {
            return;
        };

        if let Some(target) = self.move_to.take() {
            character.move_to(target, WALK_SPEED, None);
        }
        if self.walk != 0.0 {
            character.stop_move_to();
            character.walk(world, self.walk * WALK_SPEED);
        } else if self.walked != 0.0 {
            character.stop_walking(world);
        }
        self.walked = self.walk;

        if std::mem::take(&mut self.jump) {
            character.jump(world, JUMP_SPEED);
        }
        if std::mem::take(&mut self.shoot) && character.shoot(world).is_none() {
            info!("weapon not ready");
        }
        if std::mem::take(&mut self.throw) {
            let crate_body = Body::dynamic(CRATE_SIZE, CRATE_SIZE).with_mass(0.5);
            character.throw(world, crate_body, THROW_ANGLE, THROW_FORCE, 0.0);
        }
    }
}

fn state_color(state: LocomotionState) -> Color {
    match state {
        LocomotionState::Idle => SKYBLUE,
        LocomotionState::Falling => ORANGE,
        LocomotionState::Jumping => RED,
    }
}

fn draw_box(position: Vec2, size: Vec2, angle: f32, color: Color) {
    draw_rectangle_ex(
        position.x,
        position.y,
        size.x,
        size.y,
        DrawRectangleParams {
            offset: vec2(0.5, 0.5),
            rotation: angle,
            color,
        },
    );
}

fn draw_body(body: &Body, color: Color) {
    draw_box(body.position, body.size, body.angle, color);
}

fn draw_world(game: &PhysicsGame) {
    let world = game.world();

    for (_, body) in world.iter() {
        let color = if body.is_static() {
            DARKGRAY
        } else if body.ignores_collision_response {
            Color::new(0.3, 0.9, 0.3, 0.25)
        } else {
            WHITE
        };
        draw_body(body, color);
    }

    let player = game.player();
    for (id, actor) in game.actors() {
        let character = &actor.character;
        let Some(body) = character.body().and_then(|b| world.get(b)) else {
            continue;
        };

        draw_body(body, state_color(character.state()));
        if Some(id) == player {
            let (x, y) = (body.position.x - body.size.x / 2.0, body.position.y - body.size.y / 2.0);
            draw_rectangle_lines(x, y, body.size.x, body.size.y, 3.0, YELLOW);
        }

        let facing = character.facing().unit() * (body.size.x / 2.0);
        draw_line(
            body.position.x,
            body.position.y,
            body.position.x + facing.x,
            body.position.y + facing.y,
            2.0,
            BLACK,
        );

        if let Some(weapon) = character.weapon() {
            draw_box(weapon.position(body.position), weapon.size, weapon.angle, LIGHTGRAY);
        }
    }
}

fn draw_hud(game: &PhysicsGame) {
    let mut lines = vec![format!("FPS {}", get_fps())];
    let world = game.world();
    lines.push(format!("gravity ({:.0}, {:.0})", world.gravity.x, world.gravity.y));

    if let Some(character) = game.player().and_then(|id| game.character(id)) {
        let kind = match character.kind() {
            LocomotionKind::FixedGravity => "fixed gravity",
            LocomotionKind::Gravity => "gravity adapted",
        };
        lines.push(format!("player: {} ({})", character.state(), kind));
        if let Some(animation) = character.current_animation() {
            lines.push(format!("animation: {}", animation.name));
        }
        if let Some(weapon) = character.weapon() {
            let ammo = weapon.ammo().map_or("inf".to_string(), |a| a.to_string());
            lines.push(format!("ammo: {}", ammo));
        }
    }
    lines.push("A/D walk  Space jump  F shoot  T throw  click go  Tab switch  G gravity  R reload".to_string());

    for (i, line) in lines.iter().enumerate() {
        draw_text(line, 12.0, 24.0 + i as f32 * 22.0, 22.0, WHITE);
    }
}

/// The character after the current player, wrapping around.
fn next_player(game: &PhysicsGame) -> Option<ActorId> {
    let ids: Vec<ActorId> = game
        .actors()
        .filter(|(_, actor)| !actor.character.is_destroyed())
        .map(|(id, _)| id)
        .collect();
    let current = game.player().and_then(|p| ids.iter().position(|&id| id == p));
    match current {
        Some(i) => ids.get((i + 1) % ids.len()).copied(),
        None => ids.first().copied(),
    }
}

fn camera_for(game: &PhysicsGame) -> Camera2D {
    let target = game
        .player()
        .and_then(|id| game.character(id))
        .and_then(|c| c.position(game.world()))
        .unwrap_or(Vec2::ZERO);
    let aspect = screen_width() / screen_height().max(1.0);

    // Positive y zoom keeps the world y-up
    Camera2D {
        target,
        zoom: vec2(2.0 / VIEW_WIDTH, 2.0 / VIEW_WIDTH * aspect),
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);
    init_logging();

    let level_path = std::env::args().nth(1);
    let mut game = match load_game(level_path.as_deref()) {
        Ok(game) => game,
        Err(e) => {
            error!("failed to load level: {}", e);
            return;
        }
    };
    info!("=== platformer-kit demo v{} ===", VERSION);

    let mut controls = Controls::default();
    let mut accumulator = 0.0;
    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if is_key_pressed(KeyCode::R) {
            match load_game(level_path.as_deref()) {
                Ok(reloaded) => {
                    game = reloaded;
                    info!("level reloaded");
                }
                Err(e) => error!("reload failed: {}", e),
            }
        }
        if is_key_pressed(KeyCode::G) {
            let world = game.world_mut();
            world.gravity = rotate(world.gravity, FRAC_PI_2);
            info!(x = world.gravity.x, y = world.gravity.y, "gravity rotated");
        }

        if is_key_pressed(KeyCode::Tab) {
            let next = next_player(&game);
            game.set_player(next);
            controls = Controls::default();
        }

        controls.sample();
        if is_mouse_button_pressed(MouseButton::Left) {
            controls.move_to = Some(camera_for(&game).screen_to_world(mouse_position().into()));
        }
        accumulator += get_frame_time().min(MAX_FRAME);
        while accumulator >= STEP {
            controls.drive(&mut game);
            game.update(STEP);
            accumulator -= STEP;
        }

        clear_background(Color::new(0.08, 0.09, 0.12, 1.0));
        set_camera(&camera_for(&game));
        draw_world(&game);
        set_default_camera();
        draw_hud(&game);

        next_frame().await;
    }
}
