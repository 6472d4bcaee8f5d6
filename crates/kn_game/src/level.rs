use serde::Deserialize;
use std::fs;
use std::path::Path;

use glam::Vec2;

use crate::collision::Rect;

/// A level is one spawn point and one static platform.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LevelFile {
    pub version: String,
    pub level_id: String,
    pub spawn: SpawnPoint,
    pub platform: Rect,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}

impl SpawnPoint {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl Default for LevelFile {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            level_id: "training_ground".to_string(),
            spawn: SpawnPoint { x: 50.0, y: 200.0 },
            platform: Rect::new(-50.0, 280.0, 2000.0, 80.0),
        }
    }
}

pub fn load_level_from_path(path: &Path) -> Result<LevelFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level file {}: {e}", path.display()))?;
    let level: LevelFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse level JSON {}: {e}", path.display()))?;
    validate_level(&level)?;
    Ok(level)
}

fn validate_level(level: &LevelFile) -> Result<(), String> {
    if level.version != "0.1" {
        return Err(format!(
            "Level validation failed: unsupported version '{}'",
            level.version
        ));
    }
    if level.level_id.is_empty() {
        return Err("Level validation failed: level_id is empty".to_string());
    }
    let platform = &level.platform;
    if ![platform.x, platform.y, platform.w, platform.h]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err("Level validation failed: platform must be finite".to_string());
    }
    if !(level.platform.w > 0.0 && level.platform.h > 0.0) {
        return Err(format!(
            "Level validation failed: platform size must be positive (got {}x{})",
            level.platform.w, level.platform.h
        ));
    }
    if !(level.spawn.x.is_finite() && level.spawn.y.is_finite()) {
        return Err("Level validation failed: spawn must be finite".to_string());
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
            "kn_level_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn parses_valid_level() {
        let path = temp_file_path("valid");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "level_id": "ledge",
              "spawn": { "x": 10.0, "y": 100.0 },
              "platform": { "x": 0.0, "y": 300.0, "w": 400.0, "h": 40.0 }
            }"#,
        )
        .expect("write level file");

        let level = load_level_from_path(&path).expect("level should load");
        assert_eq!(level.level_id, "ledge");
        assert_eq!(level.spawn.position(), Vec2::new(10.0, 100.0));
        assert_eq!(level.platform, Rect::new(0.0, 300.0, 400.0, 40.0));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_empty_platform() {
        let path = temp_file_path("empty_platform");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "level_id": "broken",
              "spawn": { "x": 0.0, "y": 0.0 },
              "platform": { "x": 0.0, "y": 300.0, "w": 0.0, "h": 40.0 }
            }"#,
        )
        .expect("write level file");

        let err = load_level_from_path(&path).expect_err("zero width should fail");
        assert!(err.contains("platform size"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_unknown_version() {
        let path = temp_file_path("bad_version");
        fs::write(
            &path,
            r#"{
              "version": "2.0",
              "level_id": "future",
              "spawn": { "x": 0.0, "y": 0.0 },
              "platform": { "x": 0.0, "y": 300.0, "w": 10.0, "h": 10.0 }
            }"#,
        )
        .expect("write level file");

        let err = load_level_from_path(&path).expect_err("bad version should fail");
        assert!(err.contains("unsupported version"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_non_finite_platform_origin() {
        let mut level = LevelFile::default();
        level.platform.x = f32::INFINITY;
        let err = validate_level(&level).expect_err("infinite platform x should fail");
        assert!(err.contains("platform must be finite"));

        let mut level = LevelFile::default();
        level.platform.y = f32::NAN;
        assert!(validate_level(&level).is_err());
    }

    #[test]
    fn default_level_is_valid() {
        validate_level(&LevelFile::default()).expect("default level should validate");
    }
}
