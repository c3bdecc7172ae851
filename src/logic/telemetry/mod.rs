//! Device Telemetry
//!
//! The device reports resource state over a serial line, one comma-separated
//! record per line, independently of the signing exchanges. A single
//! background thread feeds captured lines into a FIFO buffer
//! ([`TelemetryBuffer`]); the sampling loop drains it with a bounded wait.
//!
//! ## Structure
//! - `buffer.rs` - thread-safe FIFO with polling pop
//! - `reader.rs` - background line reader with a cooperative stop flag

pub mod buffer;
pub mod reader;

pub use buffer::{TelemetryBuffer, TelemetrySample};
pub use reader::TelemetryReader;

// ============================================================================
// LINE FORMAT
// ============================================================================

/// One parsed telemetry record. Lines carry
/// `timestamp,free_heap_kb,stack_hwm_bytes,net_activity[,...]`; only the
/// first four fields are consumed, extras are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReading {
    pub device_timestamp: f64,
    pub free_heap_kb: f64,
    pub stack_hwm_bytes: u32,
    pub net_activity: u32,
}

impl TelemetryReading {
    /// Parse a raw telemetry line. Returns `None` for short or non-numeric
    /// records; the caller skips the sample rather than aborting.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split(',');
        let device_timestamp = fields.next()?.trim().parse().ok()?;
        let free_heap_kb = fields.next()?.trim().parse().ok()?;
        let stack_hwm_bytes = fields.next()?.trim().parse().ok()?;
        let net_activity = fields.next()?.trim().parse().ok()?;
        Some(Self {
            device_timestamp,
            free_heap_kb,
            stack_hwm_bytes,
            net_activity,
        })
    }
}
