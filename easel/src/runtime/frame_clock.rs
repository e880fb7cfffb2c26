use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Interval between firings for a given target rate. The rate is clamped to
/// at least 1 fps so the interval is always positive and finite.
pub fn interval_for(fps: f32) -> Duration {
    Duration::from_secs_f32(1.0 / fps.max(1.0))
}

/// Measures the achieved draw cadence. Pacing itself lives in the scheduler;
/// the clock only records when draws actually happened.
#[derive(Debug)]
pub struct FrameClock {
    measured_fps: f32,
    last_draw: Option<Instant>,
    intervals: VecDeque<Duration>,
    max_intervals: usize,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            measured_fps: 0.0,
            last_draw: None,
            intervals: VecDeque::new(),
            max_intervals: 90,
        }
    }

    /// Records a draw invocation at `now` and recomputes the instantaneous
    /// rate from the elapsed time since the previous draw. A zero-length
    /// interval (two draws in the same timer-resolution instant) is skipped
    /// rather than producing a non-finite rate; the previous sample stands.
    pub fn record_draw(&mut self, now: Instant) {
        let Some(last_draw) = self.last_draw else {
            self.last_draw = Some(now);
            return;
        };

        let elapsed = now.saturating_duration_since(last_draw);
        self.last_draw = Some(now);

        if elapsed.is_zero() {
            return;
        }

        self.measured_fps = 1.0 / elapsed.as_secs_f32();
        self.intervals.push_back(elapsed);
        if self.intervals.len() > self.max_intervals {
            self.intervals.pop_front();
        }
    }

    pub fn measured_fps(&self) -> f32 {
        self.measured_fps
    }

    pub fn average_fps(&self) -> f32 {
        if self.intervals.is_empty() {
            return 0.0;
        }

        let sum: Duration = self.intervals.iter().copied().sum();
        let avg = sum / self.intervals.len() as u32;

        if avg.is_zero() {
            return 0.0;
        }

        1.0 / avg.as_secs_f32()
    }

    pub fn reset(&mut self) {
        self.measured_fps = 0.0;
        self.last_draw = None;
        self.intervals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_reciprocal_of_rate() {
        assert_eq!(interval_for(60.0), Duration::from_secs_f32(1.0 / 60.0));
        assert_eq!(interval_for(30.0), Duration::from_secs_f32(1.0 / 30.0));
    }

    #[test]
    fn interval_clamps_non_positive_rates() {
        assert_eq!(interval_for(0.0), Duration::from_secs(1));
        assert_eq!(interval_for(-5.0), Duration::from_secs(1));
    }

    #[test]
    fn first_draw_produces_no_sample() {
        let mut clock = FrameClock::new();
        clock.record_draw(Instant::now());
        assert_eq!(clock.measured_fps(), 0.0);
        assert_eq!(clock.average_fps(), 0.0);
    }

    #[test]
    fn measures_rate_from_elapsed_interval() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.record_draw(start);
        clock.record_draw(start + Duration::from_millis(20));

        let measured = clock.measured_fps();
        assert!((measured - 50.0).abs() < 0.5, "measured {measured}");
    }

    #[test]
    fn zero_elapsed_sample_is_skipped() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.record_draw(start);
        clock.record_draw(start + Duration::from_millis(10));
        let before = clock.measured_fps();

        clock.record_draw(start + Duration::from_millis(10));
        assert_eq!(clock.measured_fps(), before);
        assert!(clock.measured_fps().is_finite());
    }

    #[test]
    fn average_spans_recent_intervals() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        for i in 0..4 {
            clock.record_draw(start + Duration::from_millis(10 * i));
        }

        let average = clock.average_fps();
        assert!((average - 100.0).abs() < 1.0, "average {average}");
    }

    #[test]
    fn reset_clears_samples() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.record_draw(start);
        clock.record_draw(start + Duration::from_millis(10));

        clock.reset();
        assert_eq!(clock.measured_fps(), 0.0);
        assert_eq!(clock.average_fps(), 0.0);
    }
}
