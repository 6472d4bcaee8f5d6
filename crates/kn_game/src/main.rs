//! Knight platformer -- headless frame loop driver.
//!
//! One simulation step per frame, with a variable timestep:
//!
//!   1. Measure the frame time, either from the wall clock (`--realtime`) or
//!      from the replay's scripted dt.
//!   2. Latch the frame's input levels and touch events into one snapshot.
//!   3. `Simulation::step` clamps the dt, fades ghosts and moves the player.
//!   4. Build the render snapshot and optionally append it to a JSON-lines trace.
//!
//! Rendering is left to whatever consumes the trace; this binary owns no window.

mod animation;
mod collision;
mod controller;
mod ghost;
mod level;
mod replay;
mod sim;
mod tuning;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use kn_core::time::FrameClock;
use kn_core::touch::logical_size;

use controller::RespawnCause;
use level::{load_level_from_path, LevelFile};
use replay::{load_replay_from_path, ReplayInput, ReplaySequence};
use sim::{format_session_clock, Simulation};
use tuning::{load_tuning_from_path, MovementTuning};

const TUNING_PATH: &str = "assets/tuning.json";
const LEVEL_PATH: &str = "assets/level.json";
const DEFAULT_REPLAY_PATH: &str = "assets/replays/demo.json";
/// Physical screen the touch layout is computed for.
const REFERENCE_SCREEN: (u32, u32) = (1280, 720);

#[derive(Debug, Clone, PartialEq)]
struct DriverArgs {
    replay_path: PathBuf,
    trace_path: Option<PathBuf>,
    realtime: bool,
}

fn usage() -> String {
    "Usage: cargo run -p kn_game -- [replay.json] [trace_output.jsonl] [--realtime]\nExample: cargo run -p kn_game -- assets/replays/demo.json /tmp/trace.jsonl".to_string()
}

fn parse_args<I>(args: I) -> Result<DriverArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut realtime = false;
    let mut positional = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--realtime" => realtime = true,
            "-h" | "--help" => return Err(usage()),
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown flag '{flag}'\n{}", usage()));
            }
            path => positional.push(PathBuf::from(path)),
        }
    }
    if positional.len() > 2 {
        return Err(usage());
    }

    let mut positional = positional.into_iter();
    Ok(DriverArgs {
        replay_path: positional
            .next()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPLAY_PATH)),
        trace_path: positional.next(),
        realtime,
    })
}

/// Load an optional config file. A missing file falls back to defaults; a
/// present but broken one is an error.
fn load_or_default<T: Default>(
    path: &Path,
    what: &str,
    load: impl FnOnce(&Path) -> Result<T, String>,
) -> Result<T, String> {
    if path.exists() {
        let value = load(path)?;
        log::info!("Loaded {what} from {}", path.display());
        Ok(value)
    } else {
        log::warn!(
            "{what} file '{}' not found, using built-in defaults",
            path.display()
        );
        Ok(T::default())
    }
}

struct RunSummary {
    frames: u64,
    jumps: u32,
    dashes: u32,
    attacks: u32,
    landings: u32,
}

fn run(
    sim: &mut Simulation,
    input: &mut ReplayInput,
    replay: &ReplaySequence,
    realtime: bool,
    mut trace: Option<&mut dyn Write>,
) -> Result<RunSummary, String> {
    let mut clock = FrameClock::new();
    let mut summary = RunSummary {
        frames: 0,
        jumps: 0,
        dashes: 0,
        attacks: 0,
        landings: 0,
    };

    for step in replay.expanded_steps() {
        let raw_dt = if realtime {
            // Pace to the scripted frame time, then measure what actually elapsed.
            std::thread::sleep(Duration::from_secs_f32(step.dt));
            clock.begin_frame()
        } else {
            clock.advance(step.dt)
        };

        let snapshot = input.snapshot(&step);
        let events = sim.step(raw_dt, &snapshot);
        // Touch feedback eases with the same bounded dt the simulation used.
        input.end_frame(sim.clamp_dt(raw_dt));

        if events.jumped {
            summary.jumps += 1;
            log::debug!("Frame {}: jump", sim.frame_count);
        }
        if events.dashed {
            summary.dashes += 1;
            log::debug!("Frame {}: dash", sim.frame_count);
        }
        if events.attacked {
            summary.attacks += 1;
            log::debug!("Frame {}: attack", sim.frame_count);
        }
        if events.landed {
            summary.landings += 1;
            log::debug!("Frame {}: landed", sim.frame_count);
        }
        for (fired, cause) in [
            (events.idle_respawn, RespawnCause::Idle),
            (events.fell_out, RespawnCause::FellOut),
        ] {
            if fired {
                log::info!(
                    "Frame {}: respawned ({:?}) at {} session time",
                    sim.frame_count,
                    cause,
                    format_session_clock(sim.session_time)
                );
            }
        }

        if let Some(out) = trace.as_deref_mut() {
            let line = serde_json::to_string(&sim.render_snapshot())
                .map_err(|e| format!("Failed to serialize frame {}: {e}", sim.frame_count))?;
            writeln!(out, "{line}")
                .map_err(|e| format!("Failed to write trace frame {}: {e}", sim.frame_count))?;
        }
        summary.frames += 1;
    }

    if realtime {
        log::info!(
            "Realtime pacing: {:.1} fps ({:.2} ms/frame) over {} frames",
            clock.smoothed_fps,
            clock.smoothed_frame_time_ms,
            clock.frame_count
        );
    }
    Ok(summary)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = parse_args(std::env::args().skip(1)).and_then(run_driver) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run_driver(args: DriverArgs) -> Result<(), String> {
    log::info!("Knight platformer simulation starting...");

    let tuning: MovementTuning =
        load_or_default(Path::new(TUNING_PATH), "Tuning", load_tuning_from_path)?;
    let level: LevelFile = load_or_default(Path::new(LEVEL_PATH), "Level", load_level_from_path)?;
    let replay = load_replay_from_path(&args.replay_path)?;
    log::info!(
        "Level '{}' ({}), replay '{}': {} frames, {:.2}s scripted",
        level.level_id,
        level.version,
        args.replay_path.display(),
        replay.expanded_steps().len(),
        replay.total_duration()
    );

    let mut sim = Simulation::new(&level, tuning);

    let mut trace_writer = match &args.trace_path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| format!("Failed to create trace file {}: {e}", path.display()))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    let (game_w, game_h) = logical_size(REFERENCE_SCREEN.0, REFERENCE_SCREEN.1);
    let mut input = ReplayInput::new(game_w, game_h);
    let summary = run(
        &mut sim,
        &mut input,
        &replay,
        args.realtime,
        trace_writer.as_mut().map(|w| w as &mut dyn Write),
    )?;

    if let Some(mut writer) = trace_writer {
        writer
            .flush()
            .map_err(|e| format!("Failed to flush trace file: {e}"))?;
        if let Some(path) = &args.trace_path {
            log::info!("Wrote {} trace frames to {}", summary.frames, path.display());
        }
    }

    let player = &sim.player;
    log::info!(
        "Finished {} frames in {}: {} jumps, {} dashes, {} attacks, {} landings, {} idle respawns, {} fall respawns, {} clamped frames",
        summary.frames,
        format_session_clock(sim.session_time),
        summary.jumps,
        summary.dashes,
        summary.attacks,
        summary.landings,
        sim.idle_respawns,
        sim.fall_respawns,
        sim.clamped_frames
    );
    log::info!(
        "Final player state: {:?} at ({:.1}, {:.1}), velocity ({:.1}, {:.1}), grounded={}, {} live ghosts",
        player.state,
        player.position.x,
        player.position.y,
        player.velocity.x,
        player.velocity.y,
        player.on_ground,
        sim.ghosts.live_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn args_default_to_demo_replay() {
        let parsed = parse_args(args(&[])).expect("empty args are valid");
        assert_eq!(parsed.replay_path, PathBuf::from(DEFAULT_REPLAY_PATH));
        assert_eq!(parsed.trace_path, None);
        assert!(!parsed.realtime);
    }

    #[test]
    fn args_accept_paths_and_realtime_flag_in_any_order() {
        let parsed = parse_args(args(&["--realtime", "r.json", "t.jsonl"])).expect("valid args");
        assert_eq!(parsed.replay_path, PathBuf::from("r.json"));
        assert_eq!(parsed.trace_path, Some(PathBuf::from("t.jsonl")));
        assert!(parsed.realtime);
    }

    #[test]
    fn args_reject_unknown_flags_and_extra_paths() {
        assert!(parse_args(args(&["--fast"])).is_err());
        assert!(parse_args(args(&["a", "b", "c"])).is_err());
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let missing = std::env::temp_dir().join("kn_game_missing_tuning_does_not_exist.json");
        let tuning = load_or_default(&missing, "Tuning", load_tuning_from_path)
            .expect("missing file should fall back");
        assert_eq!(tuning, MovementTuning::default());
    }

    #[test]
    fn run_writes_one_trace_line_per_frame() {
        let replay: ReplaySequence = serde_json::from_str(
            r#"{ "frames": [ { "right": true, "repeat": 10 }, { "jump": true }, { "dt": 0.5 } ] }"#,
        )
        .expect("inline replay parses");
        let mut sim = Simulation::new(&LevelFile::default(), MovementTuning::default());
        let mut input = ReplayInput::new(640, 360);
        let mut trace = Vec::new();

        let summary = run(
            &mut sim,
            &mut input,
            &replay,
            false,
            Some(&mut trace as &mut dyn Write),
        )
        .expect("run should succeed");

        let text = String::from_utf8(trace).expect("trace is utf-8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(summary.frames, 12);
        assert_eq!(lines.len(), 12);
        let last: serde_json::Value = serde_json::from_str(lines[11]).expect("trace line is JSON");
        assert_eq!(last["frame"], 12);
        assert_eq!(sim.clamped_frames, 1);
    }

    #[test]
    fn touch_feedback_stays_bounded_through_a_hitch() {
        // Finger held on the jump button (530, 250, 90x90) across 0.5 s frames.
        let replay: ReplaySequence = serde_json::from_str(
            r#"{
              "frames": [
                { "touches": [ { "id": 1, "phase": "down", "x": 575.0, "y": 295.0 } ] },
                { "dt": 0.5, "repeat": 3 }
              ]
            }"#,
        )
        .expect("inline replay parses");
        let mut sim = Simulation::new(&LevelFile::default(), MovementTuning::default());
        let mut input = ReplayInput::new(640, 360);

        run(&mut sim, &mut input, &replay, false, None).expect("run should succeed");

        let jump = &input.touch().jump;
        assert!(jump.is_held());
        assert!(
            (0.8..=1.0).contains(&jump.press_scale),
            "press scale {} left its range",
            jump.press_scale
        );
        assert_eq!(sim.clamped_frames, 3);
    }
}
