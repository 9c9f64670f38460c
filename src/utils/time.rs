use std::time::{Duration, Instant};

/// Frame clock for hosts driving [`Showcase::tick`](crate::app::Showcase::tick).
///
/// [`tick`](Self::tick) measures wall time; [`advance`](Self::advance) steps
/// a fixed amount, which is what headless runs and tests use.
pub struct Timer {
    last_update: Instant,
    /// Time since last tick
    pub delta: Duration,
    /// Total time accumulated by ticks and advances
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
    /// Upper bound applied to `delta`, so a stalled frame cannot skip a whole transition.
    pub max_delta: Duration,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            max_delta: Duration::from_millis(250),
        }
    }

    /// Measures the wall time since the previous tick.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now - self.last_update;
        self.last_update = now;
        self.record(delta)
    }

    /// Steps the clock by exactly `delta`.
    pub fn advance(&mut self, delta: Duration) -> f32 {
        self.last_update = Instant::now();
        self.record(delta)
    }

    fn record(&mut self, delta: Duration) -> f32 {
        self.delta = delta.min(self.max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;
        self.dt_seconds()
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}
