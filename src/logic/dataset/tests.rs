use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

use tempfile::tempdir;

use super::collector::{self, CollectorConfig};
use super::record::{SampleRecord, CSV_HEADER};
use super::writer::DatasetWriter;
use crate::constants;
use crate::logic::telemetry::{TelemetryBuffer, TelemetrySample};

fn sample_record() -> SampleRecord {
    SampleRecord {
        timestamp: 1_712_000_000_000,
        free_heap_kb: 245.57,
        stack_hwm_bytes: 10268,
        net_activity: 3,
        msg_size: 128,
        sign_time_ms: 150.25,
        label: 1,
    }
}

#[test]
fn writer_writes_header_once_and_appends() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dataset.csv");

    let writer = DatasetWriter::open(&path).unwrap();
    writer.append(&sample_record()).unwrap();
    assert_eq!(writer.rows_written(), 1);
    drop(writer);

    // Reopen: header must not be duplicated, rows keep appending.
    let writer = DatasetWriter::open(&path).unwrap();
    writer.append(&sample_record()).unwrap();
    drop(writer);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines[1], lines[2]);
    assert!(lines[1].starts_with("1712000000000,245.57,"));
}

/// Device stand-in accepting `connections` exchanges: read to EOF, answer,
/// close. The response body is irrelevant to collect mode, which only
/// measures latency.
fn spawn_collect_device(connections: usize) -> (u16, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        for _ in 0..connections {
            let (mut sock, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            sock.read_to_end(&mut request).unwrap();
            sock.write_all(b"ALG:ML-DSA-44|SIG:ab|PK:cd").unwrap();
        }
    });
    (port, handle)
}

fn test_config(port: u16, samples: u64) -> CollectorConfig {
    CollectorConfig {
        device_addr: "127.0.0.1".to_string(),
        device_port: port,
        samples,
        interval: Duration::ZERO,
        exchange_timeout: Duration::from_secs(2),
        telemetry_wait: Duration::from_millis(100),
        msg_sizes: vec![32, 64],
    }
}

#[test]
fn collect_persists_one_row_per_iteration() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dataset.csv");
    let writer = DatasetWriter::open(&path).unwrap();

    let buffer = TelemetryBuffer::new();
    buffer.push(TelemetrySample::new("1,245.57,10268,3".to_string()));
    buffer.push(TelemetrySample::new("2,150.0,10268,4".to_string()));

    let (port, device) = spawn_collect_device(2);
    let stats = collector::run(
        &test_config(port, 2),
        &buffer,
        &writer,
        &AtomicBool::new(false),
    )
    .unwrap();
    device.join().unwrap();

    assert_eq!(stats.attempted, 2);
    assert_eq!(stats.persisted, 2);
    assert_eq!(stats.exchange_failures, 0);
    assert_eq!(writer.rows_written(), 2);

    let content = std::fs::read_to_string(&path).unwrap();
    let rows: Vec<&str> = content.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    // Local exchange is fast, so the first sample clears every threshold.
    assert!(rows[0].ends_with(",1"), "row: {}", rows[0]);
    // Second sample fails the heap threshold.
    assert!(rows[1].ends_with(",0"), "row: {}", rows[1]);
}

#[test]
fn failed_exchange_records_sentinel_latency() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dataset.csv");
    let writer = DatasetWriter::open(&path).unwrap();

    // Bind-then-drop: nothing listens on this port.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let buffer = TelemetryBuffer::new();
    buffer.push(TelemetrySample::new("1,245.57,10268,3".to_string()));

    let stats = collector::run(
        &test_config(port, 1),
        &buffer,
        &writer,
        &AtomicBool::new(false),
    )
    .unwrap();

    assert_eq!(stats.exchange_failures, 1);
    assert_eq!(stats.persisted, 1);

    let content = std::fs::read_to_string(&path).unwrap();
    let row = content.lines().nth(1).unwrap();
    let sentinel = format!(",{:.2},", constants::SIGN_TIME_SENTINEL_MS);
    assert!(row.contains(&sentinel), "row: {row}");
    assert!(row.ends_with(",0"), "sentinel latency must label low: {row}");
}

#[test]
fn missing_telemetry_skips_the_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dataset.csv");
    let writer = DatasetWriter::open(&path).unwrap();

    let (port, device) = spawn_collect_device(1);
    let buffer = TelemetryBuffer::new(); // stays empty
    let stats = collector::run(
        &test_config(port, 1),
        &buffer,
        &writer,
        &AtomicBool::new(false),
    )
    .unwrap();
    device.join().unwrap();

    assert_eq!(stats.persisted, 0);
    assert_eq!(stats.skipped_no_telemetry, 1);
    assert_eq!(writer.rows_written(), 0);

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1); // header only
}

#[test]
fn malformed_telemetry_skips_the_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dataset.csv");
    let writer = DatasetWriter::open(&path).unwrap();

    let (port, device) = spawn_collect_device(1);
    let buffer = TelemetryBuffer::new();
    buffer.push(TelemetrySample::new("1,not-a-number,10268,3".to_string()));

    let stats = collector::run(
        &test_config(port, 1),
        &buffer,
        &writer,
        &AtomicBool::new(false),
    )
    .unwrap();
    device.join().unwrap();

    assert_eq!(stats.persisted, 0);
    assert_eq!(stats.skipped_malformed, 1);
}

#[test]
fn stop_flag_ends_the_run_before_the_budget() {
    let dir = tempdir().unwrap();
    let writer = DatasetWriter::open(&dir.path().join("dataset.csv")).unwrap();
    let buffer = TelemetryBuffer::new();

    let stop = AtomicBool::new(true);
    let stats = collector::run(&test_config(1, 100), &buffer, &writer, &stop).unwrap();
    assert_eq!(stats.attempted, 0);
}
