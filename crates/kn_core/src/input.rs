//! Per-frame logical input consumed by the simulation.
//!
//! Input sources (touch controls, scripted replays) are drained into one
//! `InputSnapshot` before the simulation step runs, so the step never observes
//! input changing underneath it.
//!
//! - **Level-triggered (held):** true every frame the button or direction is
//!   down. Used for movement and for the variable jump height check.
//! - **Edge-triggered (just_pressed):** true only on the frame the press
//!   happened. Used for ability triggers.

/// State of one action button for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub held: bool,
    pub just_pressed: bool,
}

impl ButtonState {
    pub const RELEASED: Self = Self {
        held: false,
        just_pressed: false,
    };

    /// A button that went down this frame.
    pub const fn pressed() -> Self {
        Self {
            held: true,
            just_pressed: true,
        }
    }

    /// A button that has been down since an earlier frame.
    pub const fn held() -> Self {
        Self {
            held: true,
            just_pressed: false,
        }
    }
}

/// Directional booleans. They are not mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directions {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub directions: Directions,
    pub jump: ButtonState,
    pub attack: ButtonState,
    pub dash: ButtonState,
}

impl InputSnapshot {
    /// Horizontal intent in {-1, 0, 1}. Left and right together cancel out.
    pub fn horizontal_intent(&self) -> f32 {
        match (self.directions.left, self.directions.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    /// Whether a jump is being sustained, either via the button or by holding up.
    pub fn jump_held(&self) -> bool {
        self.jump.held || self.directions.up
    }

    /// Combine two sources; a direction or button is active if either source has it.
    pub fn merged(self, other: InputSnapshot) -> InputSnapshot {
        InputSnapshot {
            directions: Directions {
                left: self.directions.left || other.directions.left,
                right: self.directions.right || other.directions.right,
                up: self.directions.up || other.directions.up,
                down: self.directions.down || other.directions.down,
            },
            jump: merge_button(self.jump, other.jump),
            attack: merge_button(self.attack, other.attack),
            dash: merge_button(self.dash, other.dash),
        }
    }
}

fn merge_button(a: ButtonState, b: ButtonState) -> ButtonState {
    ButtonState {
        held: a.held || b.held,
        just_pressed: a.just_pressed || b.just_pressed,
    }
}

/// Turns a stream of held levels into edge-aware `ButtonState`s.
///
/// Sources that only report "is it down right now" (keyboard polling, scripted
/// replays) feed one level per frame; the latch reports `just_pressed` on the
/// first frame of every press.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonLatch {
    was_held: bool,
}

impl ButtonLatch {
    pub fn update(&mut self, held: bool) -> ButtonState {
        let just_pressed = held && !self.was_held;
        self.was_held = held;
        ButtonState { held, just_pressed }
    }
}

/// Latches all three action buttons at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputLatch {
    jump: ButtonLatch,
    attack: ButtonLatch,
    dash: ButtonLatch,
}

impl InputLatch {
    pub fn snapshot(
        &mut self,
        directions: Directions,
        jump: bool,
        attack: bool,
        dash: bool,
    ) -> InputSnapshot {
        InputSnapshot {
            directions,
            jump: self.jump.update(jump),
            attack: self.attack.update(attack),
            dash: self.dash.update(dash),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_dirs(left: bool, right: bool) -> InputSnapshot {
        InputSnapshot {
            directions: Directions {
                left,
                right,
                ..Directions::default()
            },
            ..InputSnapshot::default()
        }
    }

    #[test]
    fn horizontal_intent_maps_directions() {
        assert_eq!(with_dirs(false, false).horizontal_intent(), 0.0);
        assert_eq!(with_dirs(true, false).horizontal_intent(), -1.0);
        assert_eq!(with_dirs(false, true).horizontal_intent(), 1.0);
    }

    #[test]
    fn left_and_right_cancel() {
        assert_eq!(with_dirs(true, true).horizontal_intent(), 0.0);
    }

    #[test]
    fn jump_held_accepts_button_or_up() {
        let mut input = InputSnapshot::default();
        assert!(!input.jump_held());
        input.jump = ButtonState::held();
        assert!(input.jump_held());

        let mut input = InputSnapshot::default();
        input.directions.up = true;
        assert!(input.jump_held());
    }

    #[test]
    fn merged_sources_combine_per_field() {
        let keys = with_dirs(true, false);
        let touch = InputSnapshot {
            jump: ButtonState::pressed(),
            ..with_dirs(false, true)
        };
        let merged = keys.merged(touch);
        assert_eq!(merged.horizontal_intent(), 0.0);
        assert_eq!(merged.jump, ButtonState::pressed());
        assert_eq!(merged.dash, ButtonState::RELEASED);
    }

    #[test]
    fn latch_reports_press_only_on_first_frame() {
        let mut latch = ButtonLatch::default();
        assert_eq!(latch.update(true), ButtonState::pressed());
        assert_eq!(latch.update(true), ButtonState::held());
        assert_eq!(latch.update(false), ButtonState::RELEASED);
        assert_eq!(latch.update(true), ButtonState::pressed());
    }

    #[test]
    fn input_latch_tracks_buttons_independently() {
        let mut latch = InputLatch::default();
        let first = latch.snapshot(Directions::default(), true, false, false);
        assert!(first.jump.just_pressed);
        assert!(!first.attack.held);

        let second = latch.snapshot(Directions::default(), true, true, false);
        assert!(!second.jump.just_pressed);
        assert!(second.jump.held);
        assert!(second.attack.just_pressed);
        assert!(!second.dash.held);
    }
}
