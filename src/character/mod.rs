//! Platform characters
//!
//! Ground contact, locomotion state and jumping for characters living in a
//! `PhysicsWorld`. `PlatformCharacter` is the entry point; the submodules
//! hold the pieces it is built from.

pub mod appearance;
pub mod contact;
pub mod core;
pub mod fixed;
pub mod gravity;
pub mod jump;
pub mod motion;
pub mod platform_character;
pub mod probe;
pub mod state;
pub mod steering;
pub mod weapon;

pub use appearance::{AnimationSlot, Animator, AppearanceChange, PlayedCallback};
pub use self::core::{CharacterCore, Direction};
pub use fixed::FixedGravity;
pub use gravity::GravityAdapter;
pub use jump::JumpController;
pub use motion::PendingMotion;
pub use platform_character::{Drivable, Locomotion, PlatformCharacter};
pub use probe::GroundProbe;
pub use state::{LocomotionState, LocomotionStateMachine, Transition};
pub use steering::{ArrivedCallback, MoveTarget, Steer};
pub use weapon::Weapon;
