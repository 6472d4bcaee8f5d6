//! Movement tuning loaded from JSON.
//!
//! Every field has a default, so a tuning file only needs to list the values
//! it overrides. Units are world units and seconds; `y` grows downward, so
//! gravity is positive and the jump velocity is negative.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct MovementTuning {
    pub gravity: f32,
    pub jump_velocity: f32,
    pub max_speed: f32,
    pub accel_ground: f32,
    pub friction_ground: f32,
    pub accel_air: f32,
    pub friction_air: f32,
    /// Exponential blend rate used when input opposes the current velocity.
    pub reverse_blend_rate: f32,

    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    /// Upward speed past which a released jump gets cut.
    pub jump_cut_speed: f32,
    pub jump_cut_multiplier: f32,

    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,

    /// Rate at which horizontal drift is blended out during an attack.
    pub attack_drift_rate: f32,

    pub idle_death_time: f32,
    /// Horizontal speed above which the player counts as moving (idle death).
    pub moving_speed: f32,
    /// Horizontal speed above which a grounded player animates as running.
    pub run_speed: f32,

    pub ground_snap_tolerance: f32,
    /// Falling below this `y` respawns the player.
    pub fall_limit_y: f32,
    /// Longest frame the simulation will integrate in one step.
    pub max_frame_dt: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            gravity: 3200.0,
            jump_velocity: -960.0,
            max_speed: 300.0,
            accel_ground: 2500.0,
            friction_ground: 1800.0,
            accel_air: 1500.0,
            friction_air: 500.0,
            reverse_blend_rate: 10.0,
            coyote_time: 0.1,
            jump_buffer_time: 0.1,
            jump_cut_speed: -200.0,
            jump_cut_multiplier: 0.6,
            dash_speed: 1000.0,
            dash_duration: 0.15,
            dash_cooldown: 0.6,
            attack_drift_rate: 10.0,
            idle_death_time: 1.5,
            moving_speed: 10.0,
            run_speed: 20.0,
            ground_snap_tolerance: 50.0,
            fall_limit_y: 600.0,
            max_frame_dt: 0.05,
        }
    }
}

pub fn load_tuning_from_path(path: &Path) -> Result<MovementTuning, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read tuning file {}: {e}", path.display()))?;
    let tuning: MovementTuning = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse tuning JSON {}: {e}", path.display()))?;
    validate_tuning(&tuning)?;
    Ok(tuning)
}

fn validate_tuning(tuning: &MovementTuning) -> Result<(), String> {
    let positive = [
        ("gravity", tuning.gravity),
        ("max_speed", tuning.max_speed),
        ("accel_ground", tuning.accel_ground),
        ("accel_air", tuning.accel_air),
        ("dash_speed", tuning.dash_speed),
        ("dash_duration", tuning.dash_duration),
        ("idle_death_time", tuning.idle_death_time),
        ("ground_snap_tolerance", tuning.ground_snap_tolerance),
        ("max_frame_dt", tuning.max_frame_dt),
    ];
    for (name, value) in positive {
        if !(value > 0.0) {
            return Err(format!(
                "Tuning validation failed: {name} must be > 0 (got {value})"
            ));
        }
    }

    let non_negative = [
        ("friction_ground", tuning.friction_ground),
        ("friction_air", tuning.friction_air),
        ("coyote_time", tuning.coyote_time),
        ("jump_buffer_time", tuning.jump_buffer_time),
        ("dash_cooldown", tuning.dash_cooldown),
        ("reverse_blend_rate", tuning.reverse_blend_rate),
        ("attack_drift_rate", tuning.attack_drift_rate),
    ];
    for (name, value) in non_negative {
        if !(value >= 0.0) {
            return Err(format!(
                "Tuning validation failed: {name} must be >= 0 (got {value})"
            ));
        }
    }

    if tuning.jump_velocity >= 0.0 {
        return Err("Tuning validation failed: jump_velocity must be negative (upward)".to_string());
    }
    if !(0.0..=1.0).contains(&tuning.jump_cut_multiplier) {
        return Err("Tuning validation failed: jump_cut_multiplier must be in [0, 1]".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "kn_tuning_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn defaults_pass_validation() {
        validate_tuning(&MovementTuning::default()).expect("defaults should be valid");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_file_path("partial");
        fs::write(&path, r#"{ "max_speed": 250.0, "dash_speed": 800.0 }"#)
            .expect("write tuning file");

        let tuning = load_tuning_from_path(&path).expect("tuning should load");
        assert_eq!(tuning.max_speed, 250.0);
        assert_eq!(tuning.dash_speed, 800.0);
        assert_eq!(tuning.gravity, MovementTuning::default().gravity);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_downward_jump() {
        let path = temp_file_path("bad_jump");
        fs::write(&path, r#"{ "jump_velocity": 400.0 }"#).expect("write tuning file");
        let err = load_tuning_from_path(&path).expect_err("downward jump should fail");
        assert!(err.contains("jump_velocity"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_non_positive_frame_cap() {
        let path = temp_file_path("bad_dt");
        fs::write(&path, r#"{ "max_frame_dt": 0.0 }"#).expect("write tuning file");
        let err = load_tuning_from_path(&path).expect_err("zero frame cap should fail");
        assert!(err.contains("max_frame_dt"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_reports_path() {
        let path = temp_file_path("missing");
        let err = load_tuning_from_path(&path).expect_err("missing file should fail");
        assert!(err.contains("Failed to read tuning file"));
    }
}
