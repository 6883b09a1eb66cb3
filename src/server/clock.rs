use std::time::Instant;

/// Monotonic millisecond tick count.
///
/// The counter may wrap; the engine only ever looks at wrapping differences
/// between two readings.
pub trait TimeSource {
    fn millis(&self) -> u64;
}

/// Milliseconds since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}
