//! Body handles with generational indices
//!
//! Probes, platforms and characters refer to each other through `BodyId`.
//! A handle never keeps a body alive:
//! - Removing a body bumps the generation of its slot
//! - A stale handle then fails every lookup, which reads as "destroyed"
//!
//! This is what lets a probe remember the last platform it touched without
//! resurrecting it after the platform is removed from the world.

use serde::{Deserialize, Serialize};

/// Non-owning reference to a body in a `PhysicsWorld`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId {
    index: u32,
    generation: u32,
}

impl BodyId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index (for storage access).
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Hands out body slots and tracks which handles are still alive.
#[derive(Debug, Default)]
pub struct BodyAllocator {
    generations: Vec<u32>,
    /// Freed slots, reused LIFO
    free_indices: Vec<u32>,
    alive_count: u32,
}

impl BodyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle, reusing a freed slot when one exists.
    pub fn allocate(&mut self) -> BodyId {
        self.alive_count += 1;

        if let Some(index) = self.free_indices.pop() {
            // Generation was already bumped when the slot was freed
            BodyId::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            BodyId::new(index, 0)
        }
    }

    /// Release a handle. Returns false if it was already stale.
    pub fn free(&mut self, id: BodyId) -> bool {
        if !self.is_alive(id) {
            return false;
        }

        self.generations[id.index as usize] += 1;
        self.free_indices.push(id.index);
        self.alive_count -= 1;
        true
    }

    pub fn is_alive(&self, id: BodyId) -> bool {
        self.generations
            .get(id.index as usize)
            .is_some_and(|&gen| gen == id.generation)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }
}
