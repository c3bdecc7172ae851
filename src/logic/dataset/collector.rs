//! Sampling Collector
//!
//! Drives the dataset loop: one device exchange per iteration, correlated
//! with the oldest available telemetry sample. Correlation is best-effort
//! near-coincidence in time; there is no causal link between a popped sample
//! and the exchange that just completed. Iteration failures are absorbed so
//! a multi-hour run survives device resets and serial glitches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::{Rng, RngCore};
use serde::Serialize;

use super::record::{rule_label, SampleRecord};
use super::writer::DatasetWriter;
use crate::constants;
use crate::logic::session;
use crate::logic::telemetry::{TelemetryBuffer, TelemetryReading};

// ============================================================================
// CONFIG & STATS
// ============================================================================

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub device_addr: String,
    pub device_port: u16,
    /// Sample budget for the run
    pub samples: u64,
    /// Delay between iterations
    pub interval: Duration,
    /// Per-exchange timeout
    pub exchange_timeout: Duration,
    /// How long to wait for a telemetry line before skipping the row
    pub telemetry_wait: Duration,
    /// Candidate payload sizes, picked uniformly per iteration
    pub msg_sizes: Vec<usize>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            device_addr: constants::get_device_addr(),
            device_port: constants::get_device_port(),
            samples: constants::get_sample_count(),
            interval: Duration::from_secs_f64(constants::get_sample_interval_secs()),
            exchange_timeout: constants::COLLECT_EXCHANGE_TIMEOUT,
            telemetry_wait: constants::TELEMETRY_WAIT,
            msg_sizes: constants::MSG_SIZES.to_vec(),
        }
    }
}

/// Run totals, reported at the end of a collection run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CollectorStats {
    pub attempted: u64,
    pub persisted: u64,
    pub exchange_failures: u64,
    pub skipped_no_telemetry: u64,
    pub skipped_malformed: u64,
    pub persist_failures: u64,
}

enum Outcome {
    Persisted { label: u8 },
    SkippedNoTelemetry,
    SkippedMalformed,
    PersistFailed,
}

// ============================================================================
// SAMPLING LOOP
// ============================================================================

/// Run the sampling loop until the budget is exhausted or `stop` is set.
pub fn run(
    cfg: &CollectorConfig,
    buffer: &TelemetryBuffer,
    writer: &DatasetWriter,
    stop: &AtomicBool,
) -> anyhow::Result<CollectorStats> {
    anyhow::ensure!(
        !cfg.msg_sizes.is_empty(),
        "at least one candidate payload size is required"
    );

    let mut stats = CollectorStats::default();

    for i in 0..cfg.samples {
        if stop.load(Ordering::SeqCst) {
            log::info!("stop requested, ending collection after {i} iterations");
            break;
        }

        stats.attempted += 1;
        match run_iteration(cfg, buffer, writer, &mut stats) {
            Outcome::Persisted { label } => {
                log::info!(
                    "saved sample {}/{} label={label} (total persisted: {})",
                    i + 1,
                    cfg.samples,
                    stats.persisted
                );
            }
            Outcome::SkippedNoTelemetry => {
                log::warn!("sample {}/{}: no telemetry within bound, row skipped", i + 1, cfg.samples);
            }
            Outcome::SkippedMalformed => {
                log::warn!("sample {}/{}: malformed telemetry, row skipped", i + 1, cfg.samples);
            }
            Outcome::PersistFailed => {}
        }

        if i + 1 < cfg.samples && !stop.load(Ordering::SeqCst) {
            std::thread::sleep(cfg.interval);
        }
    }

    Ok(stats)
}

fn run_iteration(
    cfg: &CollectorConfig,
    buffer: &TelemetryBuffer,
    writer: &DatasetWriter,
    stats: &mut CollectorStats,
) -> Outcome {
    let payload = random_payload(&cfg.msg_sizes);

    let started = Instant::now();
    let sign_time_ms = match session::exchange(
        &cfg.device_addr,
        cfg.device_port,
        &payload,
        cfg.exchange_timeout,
    ) {
        Ok(response) => {
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            log::debug!(
                "exchange ok: {} response bytes in {elapsed_ms:.1} ms",
                response.len()
            );
            elapsed_ms
        }
        Err(e) => {
            // Failed exchange still produces a row; the sentinel keeps the
            // sample usable as a "device overloaded" data point.
            log::warn!("device exchange failed: {e}");
            stats.exchange_failures += 1;
            constants::SIGN_TIME_SENTINEL_MS
        }
    };

    let Some(sample) = buffer.pop_oldest(cfg.telemetry_wait) else {
        stats.skipped_no_telemetry += 1;
        return Outcome::SkippedNoTelemetry;
    };
    log::debug!(
        "correlating telemetry captured {:?} ago",
        sample.captured_at.elapsed()
    );

    let Some(reading) = TelemetryReading::parse(&sample.line) else {
        stats.skipped_malformed += 1;
        return Outcome::SkippedMalformed;
    };

    let record = assemble_record(&reading, payload.len(), sign_time_ms);
    if let Err(e) = writer.append(&record) {
        log::error!("failed to persist dataset row: {e}");
        stats.persist_failures += 1;
        return Outcome::PersistFailed;
    }

    stats.persisted += 1;
    Outcome::Persisted {
        label: record.label,
    }
}

/// Build one row from a parsed reading and the measured latency.
pub(crate) fn assemble_record(
    reading: &TelemetryReading,
    msg_size: usize,
    sign_time_ms: f64,
) -> SampleRecord {
    let sign_time_ms = (sign_time_ms * 100.0).round() / 100.0;
    SampleRecord {
        timestamp: Utc::now().timestamp_millis(),
        free_heap_kb: reading.free_heap_kb,
        stack_hwm_bytes: reading.stack_hwm_bytes,
        net_activity: reading.net_activity,
        msg_size,
        sign_time_ms,
        label: rule_label(reading.free_heap_kb, sign_time_ms, reading.stack_hwm_bytes),
    }
}

fn random_payload(sizes: &[usize]) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let size = sizes[rng.gen_range(0..sizes.len())];
    let mut payload = vec![0u8; size];
    rng.fill_bytes(&mut payload);
    payload
}
