//! platformer-kit: ground contact and locomotion for 2D platform characters
//!
//! Characters walk, jump and ride moving or angled platforms on top of a
//! small physics collaborator. Two locomotion strategies are available:
//! - Fixed gravity with three ground probes under the character
//! - Arbitrary gravity with a single bound platform and a tick tolerance
//!
//! Everything runs synchronously inside one `update` per frame.

pub mod assets;
pub mod brain;
pub mod character;
pub mod config;
pub mod error;
pub mod event;
pub mod game;
pub mod math;
pub mod physics;

pub use assets::{Animation, AnimationLibrary};
pub use brain::{ShooterBrain, WandererBrain};
pub use character::{Direction, Drivable, LocomotionState, PlatformCharacter, Weapon};
pub use config::{CharacterConfig, LevelConfig, LocomotionKind, ShooterConfig};
pub use error::{CharacterError, ConfigError};
pub use game::{ActorId, Game, PhysicsGame, Scene};
pub use physics::{Body, BodyId, PhysicsWorld};
