use std::time::{Duration, Instant};

use crate::config::ConfigError;

/// Converts wall-clock frame time into the ratio the movement integrator
/// scales sub-stepping by, and keeps a short history for instrumentation.
#[derive(Debug)]
pub struct FrameClock {
    ideal: Duration,
    last: Instant,
    history: Vec<Duration>,
    index: usize,
    filled: bool,
}

impl FrameClock {
    /// `ideal` is the frame time that maps to a ratio of exactly 1.
    pub fn new(ideal: Duration, history: usize) -> Self {
        Self {
            ideal,
            last: Instant::now(),
            history: vec![Duration::ZERO; history.max(1)],
            index: 0,
            filled: false,
        }
    }

    /// Like [`FrameClock::new`], for the `ideal_frame_time` config value.
    pub fn from_seconds(ideal_frame_time: f32, history: usize) -> Result<Self, ConfigError> {
        let ideal = Duration::try_from_secs_f32(ideal_frame_time)
            .ok()
            .filter(|ideal| !ideal.is_zero())
            .ok_or(ConfigError::NotPositive {
                field: "ideal_frame_time",
                value: ideal_frame_time,
            })?;
        Ok(Self::new(ideal, history))
    }

    pub fn ideal(&self) -> Duration {
        self.ideal
    }

    /// Ratio of time since the previous call (or restart) to the ideal frame time.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        self.record(elapsed)
    }

    /// Record an externally measured frame and return its ratio.
    pub fn record(&mut self, elapsed: Duration) -> f32 {
        self.history[self.index] = elapsed;
        self.index = (self.index + 1) % self.history.len();
        if self.index == 0 {
            self.filled = true;
        }
        self.ratio(elapsed)
    }

    pub fn ratio(&self, elapsed: Duration) -> f32 {
        elapsed.as_secs_f32() / self.ideal.as_secs_f32()
    }

    /// Forget time spent while paused so the next frame is not one huge step.
    pub fn restart(&mut self) {
        self.last = Instant::now();
    }

    fn recorded(&self) -> &[Duration] {
        if self.filled {
            &self.history
        } else {
            &self.history[..self.index]
        }
    }

    pub fn count(&self) -> usize {
        self.recorded().len()
    }

    pub fn average(&self) -> Duration {
        let recorded = self.recorded();
        if recorded.is_empty() {
            return Duration::ZERO;
        }
        recorded.iter().sum::<Duration>() / recorded.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.recorded().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.recorded().iter().copied().min().unwrap_or(Duration::ZERO)
    }
}
