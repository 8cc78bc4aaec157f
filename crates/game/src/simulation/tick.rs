pub const DEFAULT_TICK_RATE: u32 = 60;

const DEFAULT_MAX_FRAME: f32 = 0.25;

/// Fixed-rate tick accumulator. A single frame never contributes more than
/// `max_frame` seconds, so a stall does not turn into a burst of catch-up ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick_rate: u32,
    dt: f32,
    accumulator: f32,
    max_frame: f32,
    ticks: u64,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE)
    }
}

impl FixedTimestep {
    pub fn new(tick_rate: u32) -> Self {
        let tick_rate = tick_rate.max(1);
        Self {
            tick_rate,
            dt: 1.0 / tick_rate as f32,
            accumulator: 0.0,
            max_frame: DEFAULT_MAX_FRAME,
            ticks: 0,
        }
    }

    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Ticks consumed since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed(&self) -> f64 {
        self.ticks as f64 / self.tick_rate as f64
    }

    pub fn accumulate(&mut self, delta: f32) {
        self.accumulator += delta.clamp(0.0, self.max_frame);
    }

    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator < self.dt {
            return false;
        }
        self.accumulator -= self.dt;
        self.ticks += 1;
        true
    }

    /// Accumulates `delta` and returns how many ticks are now due.
    pub fn advance(&mut self, delta: f32) -> u32 {
        self.accumulate(delta);
        let mut due = 0;
        while self.consume_tick() {
            due += 1;
        }
        due
    }

    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }
}
