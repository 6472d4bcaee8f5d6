use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// Wall-clock frame timing for a variable-timestep loop.
///
/// The clock reports raw elapsed seconds. Bounding that value against frame
/// hitches is the simulation's job, not the clock's.
pub struct FrameClock {
    pub frame_count: u64,
    pub real_dt: f32,
    last_instant: Instant,

    fps_samples: [f32; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f32,
    pub smoothed_frame_time_ms: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    /// Measure elapsed wall-clock time since the previous frame.
    pub fn begin_frame(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_instant).as_secs_f32();
        self.last_instant = now;
        self.advance(elapsed)
    }

    /// Record a frame whose elapsed time is supplied by the caller (replays,
    /// tests). Negative input counts as zero.
    pub fn advance(&mut self, elapsed: f32) -> f32 {
        self.real_dt = elapsed.max(0.0);
        self.frame_count += 1;

        // FPS smoothing
        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f32 = self.fps_samples.iter().sum::<f32>() / FPS_SAMPLE_COUNT as f32;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };

        self.real_dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_counts_frames_and_reports_dt() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(0.02), 0.02);
        assert_eq!(clock.advance(0.03), 0.03);
        assert_eq!(clock.frame_count, 2);
    }

    #[test]
    fn negative_elapsed_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(-1.0), 0.0);
    }

    #[test]
    fn smoothed_fps_converges_to_steady_rate() {
        let mut clock = FrameClock::new();
        for _ in 0..FPS_SAMPLE_COUNT {
            clock.advance(1.0 / 30.0);
        }
        assert!((clock.smoothed_fps - 30.0).abs() < 0.1);
        assert!((clock.smoothed_frame_time_ms - 33.333).abs() < 0.1);
    }

    #[test]
    fn begin_frame_measures_non_negative_time() {
        let mut clock = FrameClock::new();
        let dt = clock.begin_frame();
        assert!(dt >= 0.0);
        assert_eq!(clock.frame_count, 1);
    }
}
