//! Animation Library
//!
//! Characters never load animations themselves. A library is built up
//! front (from code or a RON manifest) and handed to whoever constructs
//! characters, which resolve the names in their `AnimationConfig`.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AnimationConfig;
use crate::error::ConfigError;

/// A named frame sequence. Frame scheduling belongs to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    pub frame_count: u32,
    #[serde(default = "default_fps")]
    pub fps: f32,
}

fn default_fps() -> f32 {
    12.0
}

impl Animation {
    pub fn new(name: impl Into<String>, frame_count: u32) -> Self {
        Self {
            name: name.into(),
            frame_count,
            fps: default_fps(),
        }
    }

    /// Seconds for one pass through every frame
    pub fn duration(&self) -> f32 {
        if self.fps <= 0.0 {
            return 0.0;
        }
        self.frame_count as f32 / self.fps
    }
}

/// The four locomotion animation slots, resolved from a library.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationSet {
    pub idle: Option<Animation>,
    pub walk: Option<Animation>,
    pub jump: Option<Animation>,
    pub fall: Option<Animation>,
    pub loop_jump: bool,
    pub loop_fall: bool,
}

/// A library of animations keyed by name
#[derive(Debug, Default)]
pub struct AnimationLibrary {
    animations: HashMap<String, Animation>,
    /// Names in insertion order (for iteration order)
    names: Vec<String>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an animation
    pub fn add(&mut self, animation: Animation) {
        if !self.animations.contains_key(&animation.name) {
            self.names.push(animation.name.clone());
        }
        self.animations.insert(animation.name.clone(), animation);
    }

    pub fn get(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// Resolve a character's animation names. Unknown names leave the slot empty.
    pub fn resolve(&self, config: &AnimationConfig) -> AnimationSet {
        let lookup = |slot: &Option<String>| -> Option<Animation> {
            let name = slot.as_deref()?;
            let found = self.get(name).cloned();
            if found.is_none() {
                warn!(name, "animation not found in library");
            }
            found
        };

        AnimationSet {
            idle: lookup(&config.idle),
            walk: lookup(&config.walk),
            jump: lookup(&config.jump),
            fall: lookup(&config.fall),
            loop_jump: config.loop_jump,
            loop_fall: config.loop_fall,
        }
    }

    /// Parse a manifest: a RON list of animations
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let list: Vec<Animation> = ron::from_str(text)?;
        let mut library = Self::new();
        for animation in list {
            library.add(animation);
        }
        Ok(library)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_replaces_and_keeps_order() {
        let mut lib = AnimationLibrary::new();
        lib.add(Animation::new("walk", 4));
        lib.add(Animation::new("idle", 2));
        lib.add(Animation::new("walk", 6));

        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get("walk").unwrap().frame_count, 6);
        assert_eq!(lib.names().collect::<Vec<_>>(), vec!["walk", "idle"]);
    }

    #[test]
    fn test_resolve_skips_unknown_names() {
        let lib = AnimationLibrary::from_ron_str(
            r#"[(name: "idle", frame_count: 2), (name: "walk", frame_count: 4, fps: 8.0)]"#,
        )
        .unwrap();

        let config = AnimationConfig {
            idle: Some("idle".to_string()),
            walk: Some("walk".to_string()),
            jump: Some("missing".to_string()),
            fall: None,
            loop_jump: true,
            loop_fall: false,
        };
        let set = lib.resolve(&config);

        assert_eq!(set.idle.as_ref().map(|a| a.frame_count), Some(2));
        assert_eq!(set.walk.as_ref().map(|a| a.duration()), Some(0.5));
        assert!(set.jump.is_none());
        assert!(set.fall.is_none());
        assert!(set.loop_jump);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("animations.ron");
        std::fs::write(&path, r#"[(name: "fall", frame_count: 3)]"#).unwrap();

        let lib = AnimationLibrary::load(&path).unwrap();
        assert_eq!(lib.get("fall"), Some(&Animation::new("fall", 3)));
    }
}
