//! Telemetry FIFO Buffer
//!
//! Single producer (the reader thread), single consumer (the sampling loop).
//! `pop_oldest` polls at a short fixed interval instead of blocking on a
//! condvar: the wait stays bounded even if the reader thread is stalled or
//! was never started.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Poll interval while waiting for a sample
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One captured telemetry line, timestamped at arrival.
#[derive(Debug, Clone)]
pub struct TelemetrySample {
    pub captured_at: Instant,
    pub line: String,
}

impl TelemetrySample {
    pub fn new(line: String) -> Self {
        Self {
            captured_at: Instant::now(),
            line,
        }
    }
}

/// Thread-safe FIFO of telemetry samples. Each sample is consumed at most
/// once; unconsumed samples stay available for the next iteration.
#[derive(Debug, Default)]
pub struct TelemetryBuffer {
    queue: Mutex<VecDeque<TelemetrySample>>,
}

impl TelemetryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample. Called only by the reader thread.
    pub fn push(&self, sample: TelemetrySample) {
        self.queue.lock().push_back(sample);
    }

    /// Pop the oldest sample, waiting up to `timeout` for one to arrive.
    pub fn pop_oldest(&self, timeout: Duration) -> Option<TelemetrySample> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(sample) = self.queue.lock().pop_front() {
                return Some(sample);
            }
            if Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
