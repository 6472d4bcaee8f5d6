//! Collision against the level's single static platform.
//!
//! Only grounding is resolved: the player can land on the platform top, and
//! walks or falls off its edges freely. There are no walls or ceilings.
//!
//! World space is screen-like: `y` grows downward and rectangles are anchored
//! at their top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Drawn sprite size (square) in world units.
pub const DRAW_SIZE: f32 = 80.0;
/// Gap between the bottom of the drawn sprite and the character's feet.
pub const SPRITE_FOOT_OFFSET: f32 = 10.0;
pub const FOOT_BOX_WIDTH: f32 = 20.0;
pub const FOOT_BOX_HEIGHT: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// Half-open overlap test: touching edges do not count.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Foot hit-box derived from the character's draw position (top-left of the
/// drawn sprite). Narrower than the sprite and ending at the feet.
pub fn foot_box(draw_position: Vec2) -> Rect {
    let feet_y = draw_position.y + DRAW_SIZE - SPRITE_FOOT_OFFSET;
    Rect {
        x: draw_position.x + DRAW_SIZE / 2.0 - FOOT_BOX_WIDTH / 2.0,
        y: feet_y - FOOT_BOX_HEIGHT,
        w: FOOT_BOX_WIDTH,
        h: FOOT_BOX_HEIGHT,
    }
}

/// Draw-space `y` that puts the feet exactly at `feet_y`.
pub fn draw_y_for_feet(feet_y: f32) -> f32 {
    feet_y - (DRAW_SIZE - SPRITE_FOOT_OFFSET)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundContact {
    /// Feet come to rest at `ground_y`, the platform top.
    Landed { ground_y: f32 },
    /// Overlapping, but either too deep or moving upward; not a landing.
    Passing,
    /// No overlap at all.
    Clear,
}

/// Decide whether the foot box lands on `platform`.
///
/// A landing requires overlap, downward-or-still motion, and a penetration
/// below `tolerance`. Deeper overlaps are treated as a miss so a large frame
/// step that carried the feet far past the top does not teleport them back.
pub fn resolve_ground(foot: &Rect, platform: &Rect, velocity_y: f32, tolerance: f32) -> GroundContact {
    if !overlaps(foot, platform) {
        return GroundContact::Clear;
    }

    let penetration = foot.bottom() - platform.top();
    if velocity_y >= 0.0 && penetration < tolerance {
        GroundContact::Landed {
            ground_y: platform.top(),
        }
    } else {
        GroundContact::Passing
    }
}
