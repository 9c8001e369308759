//! Development tasks for platformer-kit
//!
//! Usage:
//!   cargo xtask simulate <level.ron>          # Step a level headlessly, print state changes
//!   cargo xtask simulate <level.ron> -s 5     # ... for five simulated seconds
//!   cargo xtask check <level.ron>...          # Parse and validate level files

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use platformer_kit::{ActorId, AnimationLibrary, LevelConfig, LocomotionState, PhysicsGame};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for platformer-kit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a level without a window and report locomotion state changes
    Simulate {
        /// Level file (RON)
        level: PathBuf,
        /// Simulated seconds
        #[arg(short, long, default_value_t = 10.0)]
        seconds: f32,
        /// Updates per simulated second
        #[arg(long, default_value_t = 60)]
        rate: u32,
        /// Animation library (RON list) used to resolve animation names
        #[arg(long)]
        animations: Option<PathBuf>,
    },
    /// Parse and validate level files
    Check {
        #[arg(required = true)]
        levels: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            level,
            seconds,
            rate,
            animations,
        } => simulate(&level, seconds, rate, animations.as_deref()),
        Commands::Check { levels } => check(&levels),
    }
}

fn load_level(path: &Path) -> Result<LevelConfig> {
    LevelConfig::load(path).with_context(|| format!("Failed to load level {}", path.display()))
}

/// Step a level and print every locomotion state change
fn simulate(path: &Path, seconds: f32, rate: u32, animations: Option<&Path>) -> Result<()> {
    if rate == 0 {
        anyhow::bail!("Update rate must be positive");
    }
    let level = load_level(path)?;
    let library = match animations {
        Some(path) => AnimationLibrary::load(path)
            .with_context(|| format!("Failed to load animations {}", path.display()))?,
        None => AnimationLibrary::new(),
    };
    let mut game = PhysicsGame::from_level(&level, library).context("Failed to build level")?;

    let dt = 1.0 / rate as f32;
    let frames = (seconds * rate as f32).ceil() as u64;
    println!(
        "Simulating {} for {:.2}s ({} updates, {} characters)",
        path.display(),
        seconds,
        frames,
        game.actors().count()
    );

    let mut states: BTreeMap<ActorId, LocomotionState> = game
        .actors()
        .map(|(id, actor)| (id, actor.character.state()))
        .collect();

    for frame in 1..=frames {
        game.update(dt);

        for (id, actor) in game.actors() {
            let state = actor.character.state();
            let previous = states.insert(id, state);
            if previous != Some(state) {
                let position = actor.character.position(game.world()).unwrap_or_default();
                println!(
                    "{:>8.3}s  {:<12} {:>8} -> {:<8} at ({:.1}, {:.1})",
                    frame as f32 * dt,
                    actor.name,
                    previous.map_or("-".to_string(), |s| s.to_string()),
                    state,
                    position.x,
                    position.y
                );
            }
        }
    }

    println!("Final positions:");
    for (_, actor) in game.actors() {
        let position = actor.character.position(game.world()).unwrap_or_default();
        println!(
            "  {:<12} {:<8} ({:.1}, {:.1}) facing {:?}",
            actor.name,
            actor.character.state(),
            position.x,
            position.y,
            actor.character.facing()
        );
    }
    Ok(())
}

/// Validate each level file, failing on the first bad one
fn check(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        let level = load_level(path)?;
        println!(
            "{}: ok ({} platforms, {} characters)",
            path.display(),
            level.platforms.len(),
            level.characters.len()
        );
    }
    Ok(())
}
