use glam::Vec2;
use serde::Serialize;

use kn_core::input::InputSnapshot;
use kn_core::timer::Countdown;

use crate::animation::{
    ease_scale, sprite_frame, AnimationCursor, ClipProgress, SpriteFrame, DASH_FRAME,
    DASH_STRETCH, JUMP_STRETCH, LAND_SQUASH, RESPAWN_STRETCH,
};
use crate::collision::{draw_y_for_feet, foot_box, resolve_ground, GroundContact, Rect};
use crate::ghost::GhostTrail;
use crate::tuning::MovementTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Locomotion {
    #[default]
    Idle,
    Run,
    Air,
    Dash,
    Attack,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerTimers {
    pub coyote: Countdown,
    pub jump_buffer: Countdown,
    pub dash: Countdown,
    pub dash_cooldown: Countdown,
    pub idle_death: Countdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnCause {
    /// Stood still for too long.
    Idle,
    /// Dropped below the level.
    FellOut,
}

/// What happened during one step, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepEvents {
    pub attacked: bool,
    pub dashed: bool,
    pub jumped: bool,
    pub landed: bool,
    /// Both can fire in one frame when the spawn point lies below the fall limit.
    pub idle_respawn: bool,
    pub fell_out: bool,
}

impl StepEvents {
    /// Cause of the last respawn this frame, if any.
    #[allow(dead_code)]
    pub fn respawned(&self) -> Option<RespawnCause> {
        if self.fell_out {
            Some(RespawnCause::FellOut)
        } else if self.idle_respawn {
            Some(RespawnCause::Idle)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left of the drawn sprite.
    pub position: Vec2,
    pub spawn: Vec2,
    pub velocity: Vec2,
    pub facing_right: bool,
    pub state: Locomotion,
    previous_state: Locomotion,
    pub on_ground: bool,
    pub timers: PlayerTimers,
    pub is_dashing: bool,
    pub is_attacking: bool,
    pub animation: AnimationCursor,
    /// Sprite cell selected by the last step.
    pub sprite: SpriteFrame,
    /// Cosmetic squash/stretch; (1, 1) at rest.
    pub scale: Vec2,
    pub tuning: MovementTuning,
}

impl Player {
    pub fn new(spawn: Vec2, tuning: MovementTuning) -> Self {
        Self {
            position: spawn,
            spawn,
            velocity: Vec2::ZERO,
            facing_right: true,
            state: Locomotion::Idle,
            previous_state: Locomotion::Idle,
            on_ground: false,
            timers: PlayerTimers {
                idle_death: Countdown::armed(tuning.idle_death_time),
                ..PlayerTimers::default()
            },
            is_dashing: false,
            is_attacking: false,
            animation: AnimationCursor::default(),
            sprite: sprite_frame(Locomotion::Idle, 0, 0.0),
            scale: Vec2::ONE,
            tuning,
        }
    }

    /// Advance the player by one frame. `dt` must already be clamped by the caller.
    pub fn step(
        &mut self,
        input: &InputSnapshot,
        dt: f32,
        platform: &Rect,
        ghosts: &mut GhostTrail,
    ) -> StepEvents {
        let mut events = StepEvents::default();

        // Squash/stretch settles before this frame's impulses so they show at full strength.
        self.scale = ease_scale(self.scale, dt);
        self.tick_timers(dt);

        if self.update_idle_death(dt) {
            events.idle_respawn = true;
        }

        // Ability triggers, in priority order.
        if input.attack.just_pressed && !self.is_dashing && !self.is_attacking {
            self.start_attack();
            events.attacked = true;
        }
        if input.dash.just_pressed && self.timers.dash_cooldown.is_ready() && !self.is_attacking {
            self.start_dash();
            events.dashed = true;
        }

        // Holding up on the ground keeps re-requesting a jump once the buffer drains.
        let jump_requested = input.jump.just_pressed
            || (input.directions.up && self.on_ground && self.timers.jump_buffer.is_ready());
        if jump_requested {
            self.timers.jump_buffer.arm(self.tuning.jump_buffer_time);
        }

        if self.is_attacking {
            self.velocity.x = lerp(self.velocity.x, 0.0, self.tuning.attack_drift_rate * dt);
            self.velocity.y += self.tuning.gravity * dt;
        } else if self.is_dashing {
            self.velocity.x = self.facing_sign() * self.tuning.dash_speed;
            self.velocity.y = 0.0;
            ghosts.push(self.position, DASH_FRAME, self.facing_right);
        } else {
            events.jumped = self.step_locomotion(input, dt);
        }

        self.position += self.velocity * dt;

        events.landed = self.resolve_platform(platform);

        if self.position.y > self.tuning.fall_limit_y {
            log::debug!("Player fell out of the level at y={:.1}", self.position.y);
            self.respawn();
            events.fell_out = true;
        }

        if self.state != self.previous_state {
            // Air poses are velocity-driven, so entering Air keeps the clip clock.
            if self.state != Locomotion::Air {
                self.animation.reset();
            }
            self.previous_state = self.state;
        }

        let progress = self.animation.advance(self.state, dt);
        self.sprite = sprite_frame(self.state, self.animation.frame, self.velocity.y);
        if progress == ClipProgress::Finished && self.state == Locomotion::Attack {
            self.is_attacking = false;
            self.state = Locomotion::Idle;
        }

        events
    }

    /// Put the player back at the spawn point. Session time is untouched.
    pub fn respawn(&mut self) {
        self.position = self.spawn;
        self.velocity = Vec2::ZERO;
        self.timers.idle_death.arm(self.tuning.idle_death_time);
        self.scale = RESPAWN_STRETCH;
    }

    pub fn facing_sign(&self) -> f32 {
        if self.facing_right {
            1.0
        } else {
            -1.0
        }
    }

    fn tick_timers(&mut self, dt: f32) {
        self.timers.coyote.tick(dt);
        self.timers.jump_buffer.tick(dt);
        self.timers.dash_cooldown.tick(dt);
        self.timers.dash.tick(dt);
        if self.timers.dash.is_ready() {
            self.is_dashing = false;
        }
    }

    /// Counts down while the player stands still; returns true when it respawned.
    fn update_idle_death(&mut self, dt: f32) -> bool {
        let moving = self.velocity.x.abs() > self.tuning.moving_speed
            || self.is_dashing
            || self.is_attacking
            || !self.on_ground;
        if moving {
            self.timers.idle_death.arm(self.tuning.idle_death_time);
            return false;
        }

        self.timers.idle_death.tick(dt);
        if self.timers.idle_death.is_ready() {
            log::debug!("Idle timer expired, respawning");
            self.respawn();
            return true;
        }
        false
    }

    fn start_attack(&mut self) {
        self.is_attacking = true;
        self.state = Locomotion::Attack;
        self.animation.reset();
        self.velocity.x = 0.0;
    }

    fn start_dash(&mut self) {
        self.is_dashing = true;
        self.timers.dash.arm(self.tuning.dash_duration);
        self.timers.dash_cooldown.arm(self.tuning.dash_cooldown);
        self.velocity.x = self.facing_sign() * self.tuning.dash_speed;
        self.velocity.y = 0.0;
        self.state = Locomotion::Dash;
        self.scale = DASH_STRETCH;
    }

    /// Run/jump/fall. Returns true when a jump fired this frame.
    fn step_locomotion(&mut self, input: &InputSnapshot, dt: f32) -> bool {
        let intent = input.horizontal_intent();
        self.apply_horizontal(intent, dt);

        // Buffered press meets coyote window.
        let jumped = self.timers.jump_buffer.is_active() && self.timers.coyote.is_active();
        if jumped {
            self.velocity.y = self.tuning.jump_velocity;
            self.on_ground = false;
            self.timers.coyote.clear();
            self.timers.jump_buffer.clear();
            self.scale = JUMP_STRETCH;
        }

        // Releasing early cuts the ascent; applied every frame the condition holds.
        if self.velocity.y < self.tuning.jump_cut_speed && !input.jump_held() {
            self.velocity.y *= self.tuning.jump_cut_multiplier;
        }

        self.state = if !self.on_ground {
            Locomotion::Air
        } else if self.velocity.x.abs() > self.tuning.run_speed {
            Locomotion::Run
        } else {
            Locomotion::Idle
        };

        self.velocity.y += self.tuning.gravity * dt;
        jumped
    }

    fn apply_horizontal(&mut self, intent: f32, dt: f32) {
        let t = &self.tuning;
        let target = intent * t.max_speed;
        let (accel, friction) = if self.on_ground {
            (t.accel_ground, t.friction_ground)
        } else {
            (t.accel_air, t.friction_air)
        };

        let mut vx = self.velocity.x;
        if intent != 0.0 {
            if vx * intent < 0.0 {
                // Reversing: blend instead of accelerating for a snappier turn.
                vx = lerp(vx, target, t.reverse_blend_rate * dt);
            } else if intent > 0.0 && vx < target {
                vx += accel * dt;
            } else if intent < 0.0 && vx > target {
                vx -= accel * dt;
            }
            self.facing_right = intent > 0.0;
        } else {
            vx = move_towards(vx, 0.0, friction * dt);
        }

        self.velocity.x = vx.clamp(-t.max_speed, t.max_speed);
    }

    /// Ground resolution against the level platform. Returns true on landing.
    fn resolve_platform(&mut self, platform: &Rect) -> bool {
        let was_on_ground = self.on_ground;
        self.on_ground = false;

        let foot = foot_box(self.position);
        match resolve_ground(
            &foot,
            platform,
            self.velocity.y,
            self.tuning.ground_snap_tolerance,
        ) {
            GroundContact::Landed { ground_y } => {
                self.position.y = draw_y_for_feet(ground_y);
                self.velocity.y = 0.0;
                self.on_ground = true;
                // Re-armed on every grounded frame so it only starts draining after leaving.
                self.timers.coyote.arm(self.tuning.coyote_time);
                if !was_on_ground {
                    self.scale = LAND_SQUASH;
                    return true;
                }
            }
            GroundContact::Clear => {
                // Walked off a ledge.
                if was_on_ground && self.velocity.y >= 0.0 && !self.is_dashing {
                    self.timers.coyote.arm(self.tuning.coyote_time);
                }
            }
            GroundContact::Passing => {}
        }
        false
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else if target > current {
        current + max_delta
    } else {
        current - max_delta
    }
}
