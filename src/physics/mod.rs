//! Reference physics collaborator
//!
//! A small rigid-body world: oriented rectangles, gravity, impulses,
//! contact events and point queries. Characters only talk to it through
//! `BodyId` handles.

pub mod body;
pub mod handle;
pub mod storage;
pub mod world;

pub use body::{Body, BodyKind, Collidable, Positionable};
pub use handle::{BodyAllocator, BodyId};
pub use storage::BodySlots;
pub use world::{overlap, Contact, PhysicsWorld, DEFAULT_GRAVITY};
