//! Simulation context owned by the frame loop.
//!
//! Everything a frame touches lives in `Simulation`: the player, the level
//! platform, the ghost trail and the session clock. The driver calls `step`
//! exactly once per rendered frame and then reads a `RenderSnapshot`.

use glam::Vec2;
use serde::Serialize;

use kn_core::input::InputSnapshot;

use crate::animation::{flip_horizontal, SpriteFrame};
use crate::collision::{Rect, DRAW_SIZE};
use crate::controller::{Locomotion, Player, StepEvents};
use crate::ghost::{Ghost, GhostTrail};
use crate::level::LevelFile;
use crate::tuning::MovementTuning;

#[derive(Debug, Clone)]
pub struct Simulation {
    pub player: Player,
    pub platform: Rect,
    pub ghosts: GhostTrail,
    /// Seconds of simulated play. Survives respawns.
    pub session_time: f32,
    pub frame_count: u64,
    pub idle_respawns: u32,
    pub fall_respawns: u32,
    pub clamped_frames: u32,
}

impl Simulation {
    pub fn new(level: &LevelFile, tuning: MovementTuning) -> Self {
        Self {
            player: Player::new(level.spawn.position(), tuning),
            platform: level.platform,
            ghosts: GhostTrail::new(),
            session_time: 0.0,
            frame_count: 0,
            idle_respawns: 0,
            fall_respawns: 0,
            clamped_frames: 0,
        }
    }

    /// Bound a raw frame time to `[0, max_frame_dt]`.
    pub fn clamp_dt(&self, raw_dt: f32) -> f32 {
        if raw_dt.is_nan() {
            return 0.0;
        }
        raw_dt.clamp(0.0, self.player.tuning.max_frame_dt)
    }

    pub fn step(&mut self, raw_dt: f32, input: &InputSnapshot) -> StepEvents {
        let dt = self.clamp_dt(raw_dt);
        if dt < raw_dt {
            self.clamped_frames += 1;
            log::debug!("Frame hitch: clamped dt {:.4}s to {:.4}s", raw_dt, dt);
        }

        self.frame_count += 1;
        self.session_time += dt;
        self.ghosts.fade(dt);

        let events = self.player.step(input, dt, &self.platform, &mut self.ghosts);
        if events.idle_respawn {
            self.idle_respawns += 1;
        }
        if events.fell_out {
            self.fall_respawns += 1;
        }
        events
    }

    pub fn render_snapshot(&self) -> RenderSnapshot {
        let player = &self.player;
        let idle_remaining = player.timers.idle_death.remaining();
        RenderSnapshot {
            frame: self.frame_count,
            position: player.position,
            scale: player.scale,
            facing_right: player.facing_right,
            state: player.state,
            sprite: player.sprite,
            flip_horizontal: flip_horizontal(player.state, player.facing_right),
            draw_rect: scaled_draw_rect(player.position, player.scale),
            ghosts: self.ghosts.live().copied().collect(),
            session_time: self.session_time,
            clock_text: format_session_clock(self.session_time),
            idle_remaining,
            idle_warning: idle_warning(idle_remaining, player.tuning.idle_death_time),
        }
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub frame: u64,
    pub position: Vec2,
    pub scale: Vec2,
    pub facing_right: bool,
    pub state: Locomotion,
    pub sprite: SpriteFrame,
    pub flip_horizontal: bool,
    pub draw_rect: Rect,
    pub ghosts: Vec<Ghost>,
    pub session_time: f32,
    pub clock_text: String,
    pub idle_remaining: f32,
    pub idle_warning: Option<String>,
}

/// Sprite rectangle after squash/stretch: anchored at the bottom edge and
/// centred horizontally on the unscaled sprite.
pub fn scaled_draw_rect(position: Vec2, scale: Vec2) -> Rect {
    let w = DRAW_SIZE * scale.x;
    let h = DRAW_SIZE * scale.y;
    Rect {
        x: position.x + (DRAW_SIZE - w) / 2.0,
        y: position.y + (DRAW_SIZE - h),
        w,
        h,
    }
}

/// `MM:SS:CC` with centiseconds truncated.
pub fn format_session_clock(seconds: f32) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0) as u32;
    let whole = seconds as u32;
    let centis = ((seconds - whole as f32) * 100.0) as u32;
    format!("{:02}:{:02}:{:02}", minutes, whole % 60, centis)
}

/// Countdown text, shown only once the idle timer has started draining.
pub fn idle_warning(remaining: f32, full: f32) -> Option<String> {
    (remaining < full).then(|| format!("{:.2}", remaining.max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kn_core::input::ButtonState;
    use kn_core::timer::Countdown;

    const DT: f32 = 1.0 / 60.0;

    fn sim() -> Simulation {
        Simulation::new(&LevelFile::default(), MovementTuning::default())
    }

    #[test]
    fn dt_is_clamped_to_fifty_ms() {
        let s = sim();
        assert_eq!(s.clamp_dt(0.5), 0.05);
        assert_eq!(s.clamp_dt(-0.1), 0.0);
        assert_eq!(s.clamp_dt(f32::NAN), 0.0);
        assert_eq!(s.clamp_dt(0.01), 0.01);
    }

    #[test]
    fn hitch_frame_advances_session_by_clamped_dt() {
        let mut s = sim();
        s.step(1.0, &InputSnapshot::default());
        assert!((s.session_time - 0.05).abs() < 1e-6);
        assert_eq!(s.clamped_frames, 1);
        assert_eq!(s.frame_count, 1);
    }

    #[test]
    fn session_clock_formats_minutes_seconds_centis() {
        assert_eq!(format_session_clock(0.0), "00:00:00");
        assert_eq!(format_session_clock(75.5), "01:15:50");
        assert_eq!(format_session_clock(3599.25), "59:59:25");
    }

    #[test]
    fn idle_warning_only_while_draining() {
        assert_eq!(idle_warning(1.5, 1.5), None);
        assert_eq!(idle_warning(0.75, 1.5).as_deref(), Some("0.75"));
        assert_eq!(idle_warning(-0.01, 1.5).as_deref(), Some("0.00"));
    }

    #[test]
    fn draw_rect_is_bottom_anchored_and_centred() {
        let rect = scaled_draw_rect(Vec2::new(100.0, 200.0), Vec2::new(1.5, 0.5));
        assert_eq!(rect, Rect::new(80.0, 240.0, 120.0, 40.0));
        let rest = scaled_draw_rect(Vec2::new(100.0, 200.0), Vec2::ONE);
        assert_eq!(rest, Rect::new(100.0, 200.0, 80.0, 80.0));
    }

    #[test]
    fn dash_leaves_fading_ghosts() {
        let mut s = sim();
        for _ in 0..30 {
            s.step(DT, &InputSnapshot::default());
        }
        assert!(s.player.on_ground);

        let dash = InputSnapshot {
            dash: ButtonState::pressed(),
            ..InputSnapshot::default()
        };
        s.step(DT, &dash);
        let snapshot = s.render_snapshot();
        assert_eq!(snapshot.ghosts.len(), 1);
        assert_eq!(snapshot.ghosts[0].opacity, 0.6);
        assert_eq!(snapshot.state, Locomotion::Dash);

        for _ in 0..60 {
            s.step(DT, &InputSnapshot::default());
        }
        assert_eq!(s.render_snapshot().ghosts.len(), 0);
    }

    #[test]
    fn respawns_are_counted_by_cause() {
        let mut s = sim();
        // Lands within a few frames, then idles for 1.5 s.
        for _ in 0..120 {
            s.step(DT, &InputSnapshot::default());
        }
        assert_eq!(s.idle_respawns, 1);
        assert_eq!(s.fall_respawns, 0);
        assert!(s.session_time > 1.9, "respawn must not reset the session clock");
    }

    #[test]
    fn double_respawn_counts_both_causes() {
        let mut s = sim();
        for _ in 0..10 {
            s.step(DT, &InputSnapshot::default());
        }
        assert!(s.player.on_ground);
        s.player.spawn = Vec2::new(50.0, 700.0);
        s.player.timers.idle_death = Countdown::armed(0.001);

        s.step(DT, &InputSnapshot::default());
        assert_eq!(s.idle_respawns, 1);
        assert_eq!(s.fall_respawns, 1);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let s = sim();
        let json = serde_json::to_string(&s.render_snapshot()).expect("serialize snapshot");
        assert!(json.contains("\"clock_text\":\"00:00:00\""));
        assert!(json.contains("\"idle_warning\":null"));
    }
}
