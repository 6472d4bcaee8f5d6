//! Maps the player's locomotion state to a sprite-sheet cell, and eases the
//! cosmetic squash/stretch scale back to rest.
//!
//! The knight sheet is laid out in 20 px cells. Looping clips (idle, run)
//! advance once the elapsed time *exceeds* the frame time; the one-shot
//! attack clip advances once it *reaches* it. Advancing resets the elapsed
//! time to zero rather than carrying the remainder.

use glam::Vec2;
use serde::Serialize;

use crate::controller::Locomotion;

pub const SPRITE_CELL: u32 = 20;

/// Source cell on the sprite sheet, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpriteFrame {
    pub x: u32,
    pub y: u32,
}

pub const DASH_FRAME: SpriteFrame = SpriteFrame { x: 340, y: 40 };

const AIR_ROW: u32 = 140;
const AIR_RISING_X: u32 = 200;
const AIR_APEX_X: u32 = 220;
const AIR_FALLING_X: u32 = 240;
/// Vertical speed separating the rising/falling poses from the apex pose.
const AIR_POSE_SPEED: f32 = 400.0;

/// Squash/stretch impulses, as (x, y) scale.
pub const JUMP_STRETCH: Vec2 = Vec2::new(0.7, 1.3);
pub const LAND_SQUASH: Vec2 = Vec2::new(1.3, 0.7);
pub const DASH_STRETCH: Vec2 = Vec2::new(1.4, 0.6);
pub const RESPAWN_STRETCH: Vec2 = Vec2::new(0.1, 2.0);
/// Exponential settle rate of the visual scale toward (1, 1).
pub const SCALE_SETTLE_RATE: f32 = 15.0;

#[derive(Debug, Clone, Copy)]
struct Clip {
    origin: SpriteFrame,
    frame_count: usize,
    frame_time: f32,
    looping: bool,
}

impl Clip {
    fn frame(&self, index: usize) -> SpriteFrame {
        SpriteFrame {
            x: self.origin.x + (index % self.frame_count) as u32 * SPRITE_CELL,
            y: self.origin.y,
        }
    }

    fn is_due(&self, elapsed: f32) -> bool {
        if self.looping {
            elapsed > self.frame_time
        } else {
            elapsed >= self.frame_time
        }
    }
}

const IDLE_CLIP: Clip = Clip {
    origin: SpriteFrame { x: 100, y: 40 },
    frame_count: 2,
    frame_time: 0.3,
    looping: true,
};

const RUN_CLIP: Clip = Clip {
    origin: SpriteFrame { x: 100, y: 140 },
    frame_count: 4,
    frame_time: 0.1,
    looping: true,
};

const ATTACK_CLIP: Clip = Clip {
    origin: SpriteFrame { x: 300, y: 40 },
    frame_count: 4,
    frame_time: 0.08,
    looping: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipProgress {
    Playing,
    /// A one-shot clip just played its last frame.
    Finished,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationCursor {
    pub elapsed: f32,
    pub frame: usize,
}

impl AnimationCursor {
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.frame = 0;
    }

    pub fn advance(&mut self, state: Locomotion, dt: f32) -> ClipProgress {
        let clip = match state {
            // The dash pose is a single held frame; its clock does not run.
            Locomotion::Dash => return ClipProgress::Playing,
            // Air poses are chosen by velocity; the clock runs but never wraps.
            Locomotion::Air => {
                self.elapsed += dt;
                return ClipProgress::Playing;
            }
            Locomotion::Idle => &IDLE_CLIP,
            Locomotion::Run => &RUN_CLIP,
            Locomotion::Attack => &ATTACK_CLIP,
        };

        self.elapsed += dt;
        if !clip.is_due(self.elapsed) {
            return ClipProgress::Playing;
        }

        self.elapsed = 0.0;
        self.frame += 1;
        if self.frame >= clip.frame_count {
            self.frame = 0;
            if !clip.looping {
                return ClipProgress::Finished;
            }
        }
        ClipProgress::Playing
    }
}

/// Sprite cell for a state, its clip frame, and the current vertical velocity.
pub fn sprite_frame(state: Locomotion, frame: usize, velocity_y: f32) -> SpriteFrame {
    match state {
        Locomotion::Dash => DASH_FRAME,
        Locomotion::Air => SpriteFrame {
            x: if velocity_y < -AIR_POSE_SPEED {
                AIR_RISING_X
            } else if velocity_y > AIR_POSE_SPEED {
                AIR_FALLING_X
            } else {
                AIR_APEX_X
            },
            y: AIR_ROW,
        },
        Locomotion::Idle => IDLE_CLIP.frame(frame),
        Locomotion::Run => RUN_CLIP.frame(frame),
        Locomotion::Attack => ATTACK_CLIP.frame(frame),
    }
}

/// The sheet draws the knight facing left, except the attack frames which
/// face right.
pub fn flip_horizontal(state: Locomotion, facing_right: bool) -> bool {
    match state {
        Locomotion::Attack => !facing_right,
        _ => facing_right,
    }
}

pub fn ease_scale(scale: Vec2, dt: f32) -> Vec2 {
    scale + (Vec2::ONE - scale) * (SCALE_SETTLE_RATE * dt)
}
