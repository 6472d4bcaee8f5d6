//! On-screen touch controls: a directional pad and three action buttons.
//!
//! Pointer events must already be expressed in logical game coordinates; the
//! window-to-game mapping is done by the platform layer. Every control binds
//! to the first pointer that goes down inside its hit area and ignores all
//! other pointers until that one is lifted, so multi-touch (run + jump) works
//! without controls stealing each other's fingers.

use crate::input::{ButtonState, Directions, InputSnapshot};

/// Logical screen height. The logical width follows the display aspect ratio.
pub const LOGICAL_HEIGHT: u32 = 360;

const UI_MARGIN: i32 = 20;
const BUTTON_SIZE: i32 = 90;
const BUTTON_GAP: i32 = 10;
const DPAD_SIZE: i32 = 165;
const DPAD_DEADZONE_FRACTION: f32 = 0.10;

const BUTTON_PRESSED_SCALE: f32 = 0.85;
const DPAD_PRESSED_SCALE: f32 = 0.95;
const PRESS_FEEDBACK_RATE: f32 = 25.0;

pub type PointerId = i64;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl HitRect {
    fn from_ints(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x: x as f32,
            y: y as f32,
            w: w as f32,
            h: h as f32,
        }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Moved,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
}

/// Logical (width, height) for a physical screen size.
pub fn logical_size(screen_w: u32, screen_h: u32) -> (u32, u32) {
    if screen_h == 0 {
        return (0, LOGICAL_HEIGHT);
    }
    let width = u64::from(LOGICAL_HEIGHT) * u64::from(screen_w) / u64::from(screen_h);
    (width as u32, LOGICAL_HEIGHT)
}

fn ease(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (rate * dt)
}

/// Edge-triggered button bound to a hit area and at most one pointer.
#[derive(Debug, Clone)]
pub struct TouchButton {
    pub area: HitRect,
    pointer: Option<PointerId>,
    just_pressed: bool,
    just_released: bool,
    /// Draw scale for press feedback, eased every frame.
    pub press_scale: f32,
}

impl TouchButton {
    pub fn new(area: HitRect) -> Self {
        Self {
            area,
            pointer: None,
            just_pressed: false,
            just_released: false,
            press_scale: 1.0,
        }
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event.phase {
            PointerPhase::Down => {
                if self.pointer.is_none() && self.area.contains(event.x, event.y) {
                    self.pointer = Some(event.id);
                    self.just_pressed = true;
                }
            }
            PointerPhase::Up => {
                if self.pointer == Some(event.id) {
                    self.pointer = None;
                    self.just_released = true;
                }
            }
            PointerPhase::Moved => {}
        }
    }

    pub fn is_held(&self) -> bool {
        self.pointer.is_some()
    }

    pub fn is_just_pressed(&self) -> bool {
        self.just_pressed
    }

    pub fn is_just_released(&self) -> bool {
        self.just_released
    }

    pub fn state(&self) -> ButtonState {
        ButtonState {
            held: self.is_held(),
            just_pressed: self.just_pressed,
        }
    }

    pub fn update_feedback(&mut self, dt: f32) {
        let target = if self.is_held() {
            BUTTON_PRESSED_SCALE
        } else {
            1.0
        };
        self.press_scale = ease(self.press_scale, target, PRESS_FEEDBACK_RATE, dt);
    }

    pub fn end_frame(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
    }
}

/// Four-way pad resolved from the bound pointer's offset to the pad centre.
#[derive(Debug, Clone)]
pub struct DirectionalPad {
    pub area: HitRect,
    pointer: Option<PointerId>,
    directions: Directions,
    pub press_scale: f32,
}

impl DirectionalPad {
    pub fn new(area: HitRect) -> Self {
        Self {
            area,
            pointer: None,
            directions: Directions::default(),
            press_scale: 1.0,
        }
    }

    pub fn handle(&mut self, event: PointerEvent) {
        if event.phase == PointerPhase::Down
            && self.pointer.is_none()
            && self.area.contains(event.x, event.y)
        {
            self.pointer = Some(event.id);
        }
        if self.pointer != Some(event.id) {
            return;
        }

        if event.phase == PointerPhase::Up {
            self.pointer = None;
            self.directions = Directions::default();
            return;
        }

        let (cx, cy) = self.area.center();
        let dx = event.x - cx;
        let dy = event.y - cy;
        let deadzone = self.area.w * DPAD_DEADZONE_FRACTION;
        self.directions = Directions {
            left: dx < -deadzone,
            right: dx > deadzone,
            up: dy < -deadzone,
            down: dy > deadzone,
        };
    }

    pub fn is_active(&self) -> bool {
        self.pointer.is_some()
    }

    pub fn directions(&self) -> Directions {
        self.directions
    }

    pub fn update_feedback(&mut self, dt: f32) {
        let target = if self.is_active() {
            DPAD_PRESSED_SCALE
        } else {
            1.0
        };
        self.press_scale = ease(self.press_scale, target, PRESS_FEEDBACK_RATE, dt);
    }
}

/// Full on-screen control set.
#[derive(Debug, Clone)]
pub struct TouchControls {
    pub dpad: DirectionalPad,
    pub jump: TouchButton,
    pub attack: TouchButton,
    pub dash: TouchButton,
}

impl TouchControls {
    pub fn new(game_w: u32, game_h: u32) -> Self {
        let mut controls = Self {
            dpad: DirectionalPad::new(HitRect::default()),
            jump: TouchButton::new(HitRect::default()),
            attack: TouchButton::new(HitRect::default()),
            dash: TouchButton::new(HitRect::default()),
        };
        controls.layout(game_w, game_h);
        controls
    }

    /// Re-anchor every control for a new logical screen size. Bindings survive.
    pub fn layout(&mut self, game_w: u32, game_h: u32) {
        let w = game_w as i32;
        let h = game_h as i32;
        self.dpad.area =
            HitRect::from_ints(UI_MARGIN, h - DPAD_SIZE - UI_MARGIN, DPAD_SIZE, DPAD_SIZE);

        let start_x = w - UI_MARGIN - BUTTON_SIZE;
        let start_y = h - UI_MARGIN - BUTTON_SIZE;
        let attack_x = start_x - BUTTON_SIZE - BUTTON_GAP;
        self.jump.area = HitRect::from_ints(start_x, start_y, BUTTON_SIZE, BUTTON_SIZE);
        self.attack.area = HitRect::from_ints(attack_x, start_y, BUTTON_SIZE, BUTTON_SIZE);

        // Dash sits centred above the jump/attack pair.
        let pair_span = start_x + BUTTON_SIZE - attack_x;
        let mid_x = attack_x + pair_span / 2 - BUTTON_SIZE / 2;
        self.dash.area = HitRect::from_ints(
            mid_x,
            start_y - BUTTON_SIZE - BUTTON_GAP,
            BUTTON_SIZE,
            BUTTON_SIZE,
        );
        log::debug!(
            "Touch controls laid out for {}x{} logical screen",
            game_w,
            game_h
        );
    }

    pub fn handle(&mut self, event: PointerEvent) {
        self.dpad.handle(event);
        self.jump.handle(event);
        self.attack.handle(event);
        self.dash.handle(event);
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            directions: self.dpad.directions(),
            jump: self.jump.state(),
            attack: self.attack.state(),
            dash: self.dash.state(),
        }
    }

    pub fn update_feedback(&mut self, dt: f32) {
        self.dpad.update_feedback(dt);
        self.jump.update_feedback(dt);
        self.attack.update_feedback(dt);
        self.dash.update_feedback(dt);
    }

    pub fn end_frame(&mut self) {
        self.jump.end_frame();
        self.attack.end_frame();
        self.dash.end_frame();
    }
}
