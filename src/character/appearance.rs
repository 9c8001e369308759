//! Appearance hook
//!
//! The character does not render. It requests animations, and listeners
//! (a renderer, a test) are told which one to show. A one-shot custom
//! animation locks out every locomotion request until `animation_played`.

use std::fmt;

use tracing::trace;

use crate::assets::{Animation, AnimationSet};
use crate::event::{ListenerId, Observers};

/// Locomotion animation slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationSlot {
    Idle,
    Walk,
    Jump,
    Fall,
}

/// Sent to appearance listeners when the shown animation changes.
#[derive(Debug, Clone, PartialEq)]
pub struct AppearanceChange {
    pub animation: Animation,
    /// False: play once and hold the last frame
    pub looping: bool,
    /// Requested through `play_animation` rather than by locomotion
    pub custom: bool,
}

/// Runs when a custom animation finishes.
pub type PlayedCallback = Box<dyn FnOnce()>;

#[derive(Default)]
pub struct Animator {
    set: AnimationSet,
    current: Option<Animation>,
    custom_playing: bool,
    on_played: Option<PlayedCallback>,
    listeners: Observers<AppearanceChange>,
}

impl Animator {
    pub fn new(set: AnimationSet) -> Self {
        Self {
            set,
            ..Default::default()
        }
    }

    pub fn current(&self) -> Option<&Animation> {
        self.current.as_ref()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&AppearanceChange) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Request a locomotion slot. Returns true if the shown animation changed.
    pub fn show(&mut self, slot: AnimationSlot) -> bool {
        let (animation, looping) = match slot {
            AnimationSlot::Idle => (self.set.idle.clone(), true),
            AnimationSlot::Walk => (self.set.walk.clone(), true),
            AnimationSlot::Jump => (self.set.jump.clone(), self.set.loop_jump),
            AnimationSlot::Fall => (self.set.fall.clone(), self.set.loop_fall),
        };
        self.request(animation, looping)
    }

    fn request(&mut self, animation: Option<Animation>, looping: bool) -> bool {
        let Some(animation) = animation else {
            return false;
        };
        if self.custom_playing || animation.frame_count == 0 || self.current.as_ref() == Some(&animation) {
            return false;
        }

        trace!(animation = %animation.name, looping, "appearance change");
        self.current = Some(animation.clone());
        self.listeners.notify(&AppearanceChange {
            animation,
            looping,
            custom: false,
        });
        true
    }

    /// Play a one-shot animation. Locomotion requests are ignored until
    /// `animation_played` is signalled, which then runs `on_played`.
    pub fn play_animation(&mut self, animation: Animation, on_played: Option<PlayedCallback>) {
        self.custom_playing = true;
        self.on_played = on_played;
        self.current = Some(animation.clone());
        self.listeners.notify(&AppearanceChange {
            animation,
            looping: false,
            custom: true,
        });
    }

    /// Signal that the custom animation finished.
    pub fn animation_played(&mut self) {
        if !self.custom_playing {
            return;
        }
        self.custom_playing = false;
        if let Some(callback) = self.on_played.take() {
            callback();
        }
    }

    /// Drop the custom-animation lock without running its callback.
    pub fn reset(&mut self) {
        self.custom_playing = false;
        self.on_played = None;
    }
}

impl fmt::Debug for Animator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("current", &self.current.as_ref().map(|a| a.name.as_str()))
            .field("custom_playing", &self.custom_playing)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn animator() -> (Animator, Rc<RefCell<Vec<String>>>) {
        let set = AnimationSet {
            idle: Some(Animation::new("idle", 2)),
            walk: Some(Animation::new("walk", 4)),
            jump: Some(Animation::new("jump", 3)),
            fall: Some(Animation::new("fall", 0)),
            loop_jump: false,
            loop_fall: true,
        };
        let mut animator = Animator::new(set);
        let shown = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&shown);
        animator.subscribe(move |change| log.borrow_mut().push(change.animation.name.clone()));
        (animator, shown)
    }

    #[test]
    fn test_duplicate_and_empty_requests_suppressed() {
        let (mut animator, shown) = animator();

        assert!(animator.show(AnimationSlot::Idle));
        assert!(!animator.show(AnimationSlot::Idle));
        // Zero frames
        assert!(!animator.show(AnimationSlot::Fall));
        assert!(animator.show(AnimationSlot::Jump));

        assert_eq!(*shown.borrow(), vec!["idle", "jump"]);
    }

    #[test]
    fn test_custom_animation_locks_requests() {
        let (mut animator, shown) = animator();
        let finished = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&finished);

        animator.play_animation(
            Animation::new("wave", 5),
            Some(Box::new(move || *flag.borrow_mut() = true)),
        );
        assert!(!animator.show(AnimationSlot::Walk));
        assert!(animator.custom_playing);

        animator.animation_played();
        assert!(*finished.borrow());
        assert!(animator.show(AnimationSlot::Walk));

        assert_eq!(*shown.borrow(), vec!["wave", "walk"]);
    }

    #[test]
    fn test_reset_unlocks_without_callback() {
        let (mut animator, _) = animator();
        let finished = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&finished);

        animator.play_animation(Animation::new("wave", 5), Some(Box::new(move || *flag.borrow_mut() = true)));
        animator.reset();
        animator.animation_played();

        assert!(!*finished.borrow());
        assert!(animator.show(AnimationSlot::Idle));
    }

    #[test]
    fn test_missing_slot_is_ignored() {
        let mut animator = Animator::default();
        assert!(!animator.show(AnimationSlot::Walk));
        assert!(animator.current().is_none());
    }
}
