//! Time sources for the sampler session

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Monotonic millisecond clock used to timestamp edges and reaction trials.
pub trait Clock: Send {
    fn now_ms(&self) -> f64;
}

/// Wall-independent clock measuring milliseconds since construction.
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

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock advanced explicitly, shared between clones.
///
/// Replays and tests drive it from recorded frame deltas.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Arc::new(Mutex::new(start_ms)),
        }
    }

    pub fn advance(&self, delta_ms: f64) {
        *self.now.lock() += delta_ms;
    }

    pub fn set(&self, now_ms: f64) {
        *self.now.lock() = now_ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        *self.now.lock()
    }
}
