//! Fading after-images left behind while dashing.
//!
//! A fixed arena of slots with a wrapping write cursor: the newest ghost
//! always overwrites the oldest slot, and no allocation happens after
//! construction.

use glam::Vec2;
use serde::Serialize;

use crate::animation::SpriteFrame;

pub const GHOST_CAPACITY: usize = 20;
pub const GHOST_START_OPACITY: f32 = 0.6;
/// Opacity lost per second.
pub const GHOST_FADE_RATE: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ghost {
    pub position: Vec2,
    pub frame: SpriteFrame,
    pub facing_right: bool,
    pub opacity: f32,
}

impl Ghost {
    const INERT: Self = Self {
        position: Vec2::ZERO,
        frame: SpriteFrame { x: 0, y: 0 },
        facing_right: true,
        opacity: 0.0,
    };

    pub fn is_live(&self) -> bool {
        self.opacity > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct GhostTrail {
    slots: [Ghost; GHOST_CAPACITY],
    head: usize,
}

impl GhostTrail {
    pub fn new() -> Self {
        Self {
            slots: [Ghost::INERT; GHOST_CAPACITY],
            head: 0,
        }
    }

    pub fn push(&mut self, position: Vec2, frame: SpriteFrame, facing_right: bool) {
        self.slots[self.head] = Ghost {
            position,
            frame,
            facing_right,
            opacity: GHOST_START_OPACITY,
        };
        self.head = (self.head + 1) % GHOST_CAPACITY;
    }

    pub fn fade(&mut self, dt: f32) {
        for ghost in self.slots.iter_mut().filter(|g| g.is_live()) {
            ghost.opacity -= GHOST_FADE_RATE * dt;
        }
    }

    pub fn live(&self) -> impl Iterator<Item = &Ghost> {
        self.slots.iter().filter(|g| g.is_live())
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    /// Slot the next `push` will overwrite.
    #[allow(dead_code)]
    pub fn head(&self) -> usize {
        self.head
    }

    #[allow(dead_code)]
    pub fn slots(&self) -> &[Ghost; GHOST_CAPACITY] {
        &self.slots
    }
}

impl Default for GhostTrail {
    fn default() -> Self {
        Self::new()
    }
}
