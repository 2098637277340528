use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Trait for session clocks. Timing is wall-clock with millisecond
/// resolution, sampled synchronously at arm time and click time.
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Send + Sync;
    fn now(&self) -> Self::Timestamp;
    fn elapsed_ms(&self, ts: Self::Timestamp) -> u64;
}

/// Wall-clock timer backed by a monotonic `Instant`
#[derive(Debug, Clone)]
pub struct WallClockTimer {
    start: Instant,
}

impl WallClockTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for WallClockTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for WallClockTimer {
    type Timestamp = u64;

    /// Milliseconds since the timer was created
    fn now(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn elapsed_ms(&self, ts: u64) -> u64 {
        self.now().saturating_sub(ts)
    }
}

/// Hand-advanced clock for simulated sessions
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ms: Arc<AtomicU64>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    type Timestamp = u64;

    fn now(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn elapsed_ms(&self, ts: u64) -> u64 {
        self.now().saturating_sub(ts)
    }
}
