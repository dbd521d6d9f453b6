//! Monotonic time source.

use std::time::{Duration, Instant};

/// Monotonic time elapsed since the clock was created.
///
/// The idle watchdog compares these readings, so they must never go
/// backwards.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall-clock implementation backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
