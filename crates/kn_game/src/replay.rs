//! Scripted input sequences.
//!
//! A replay lists held levels per frame, the way a polled keyboard reports
//! them, plus optional pointer events for the on-screen controls. `ReplayInput`
//! turns each expanded frame into the `InputSnapshot` the simulation expects.

use kn_core::input::{Directions, InputLatch, InputSnapshot};
use kn_core::touch::{PointerEvent, PointerId, PointerPhase, TouchControls};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ReplayFrame {
    /// Overrides `fixed_dt` for every repetition of this frame.
    pub dt: Option<f32>,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub attack: bool,
    pub dash: bool,
    /// Delivered once, on the first repetition.
    pub touches: Vec<ReplayTouch>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ReplayTouch {
    pub id: PointerId,
    pub phase: ReplayTouchPhase,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplayTouchPhase {
    Down,
    Moved,
    Up,
}

impl From<ReplayTouch> for PointerEvent {
    fn from(touch: ReplayTouch) -> Self {
        PointerEvent {
            id: touch.id,
            phase: match touch.phase {
                ReplayTouchPhase::Down => PointerPhase::Down,
                ReplayTouchPhase::Moved => PointerPhase::Moved,
                ReplayTouchPhase::Up => PointerPhase::Up,
            },
            x: touch.x,
            y: touch.y,
        }
    }
}

/// One simulation frame worth of replay input.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayStep {
    pub dt: f32,
    pub directions: Directions,
    pub jump: bool,
    pub attack: bool,
    pub dash: bool,
    pub touches: Vec<PointerEvent>,
}

impl ReplaySequence {
    pub fn expanded_steps(&self) -> Vec<ReplayStep> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let dt = frame.dt.unwrap_or(self.fixed_dt);
            let directions = Directions {
                left: frame.left,
                right: frame.right,
                up: frame.up,
                down: frame.down,
            };
            for i in 0..frame.repeat.max(1) {
                let touches = if i == 0 {
                    frame.touches.iter().copied().map(PointerEvent::from).collect()
                } else {
                    Vec::new()
                };
                out.push(ReplayStep {
                    dt,
                    directions,
                    jump: frame.jump,
                    attack: frame.attack,
                    dash: frame.dash,
                    touches,
                });
            }
        }
        out
    }

    pub fn total_duration(&self) -> f32 {
        self.frames
            .iter()
            .map(|f| f.dt.unwrap_or(self.fixed_dt) * f.repeat.max(1) as f32)
            .sum()
    }
}

/// Feeds replay steps through the same latching and touch handling a live
/// input source would use.
#[derive(Debug, Clone)]
pub struct ReplayInput {
    latch: InputLatch,
    touch: TouchControls,
}

impl ReplayInput {
    pub fn new(game_w: u32, game_h: u32) -> Self {
        Self {
            latch: InputLatch::default(),
            touch: TouchControls::new(game_w, game_h),
        }
    }

    pub fn snapshot(&mut self, step: &ReplayStep) -> InputSnapshot {
        for event in &step.touches {
            self.touch.handle(*event);
        }
        let keys = self
            .latch
            .snapshot(step.directions, step.jump, step.attack, step.dash);
        keys.merged(self.touch.snapshot())
    }

    /// Call once the frame's snapshot has been consumed.
    pub fn end_frame(&mut self, dt: f32) {
        self.touch.update_feedback(dt);
        self.touch.end_frame();
    }

    #[allow(dead_code)]
    pub fn touch(&self) -> &TouchControls {
        &self.touch
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read replay file {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if !(replay.fixed_dt.is_finite() && replay.fixed_dt > 0.0) {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    for (index, frame) in replay.frames.iter().enumerate() {
        if let Some(dt) = frame.dt {
            if !(dt.is_finite() && dt >= 0.0) {
                return Err(format!(
                    "Replay validation failed: frame {index} has invalid dt {dt}"
                ));
            }
        }
        if frame
            .touches
            .iter()
            .any(|t| !(t.x.is_finite() && t.y.is_finite()))
        {
            return Err(format!(
                "Replay validation failed: frame {index} has a non-finite touch position"
            ));
        }
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}
