//! Dataset Module - Training Data Collection
//!
//! Builds the labeled latency/telemetry dataset consumed by the offline
//! classifier training pipeline. One CSV row per accepted sampling iteration,
//! appended and flushed immediately.
//!
//! ## Structure
//! - `record.rs` - row type + the fixed labeling rule
//! - `writer.rs` - append-only CSV writer
//! - `collector.rs` - the sampling loop driving device exchanges

pub mod collector;
pub mod record;
pub mod writer;

#[cfg(test)]
mod tests;

pub use collector::{CollectorConfig, CollectorStats};
pub use record::SampleRecord;
pub use writer::DatasetWriter;
