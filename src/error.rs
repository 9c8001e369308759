//! Error types

use std::path::PathBuf;

use thiserror::Error;

/// Lifecycle errors for platform characters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CharacterError {
    /// The character was added to a game without a physics world.
    #[error("platform characters require a physics game")]
    NotPhysicsGame,
    #[error("character is already attached to a physics world")]
    AlreadyAttached,
    #[error("character has been destroyed")]
    Destroyed,
}

/// Errors from loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Character error: {0}")]
    Character(#[from] CharacterError),
}
