//! Background Telemetry Reader
//!
//! One long-lived thread reads lines from the telemetry source and appends
//! the ones that look like records into the shared buffer. The source must
//! enforce its own bounded read timeout; that bound is also the worst-case
//! latency for the thread to observe the stop flag.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use super::buffer::{TelemetryBuffer, TelemetrySample};
use crate::constants::TELEMETRY_READ_TIMEOUT;

/// Cheap structural filter against partial or garbled lines: a record is
/// non-empty, comma-separated, and starts with a digit (the device-side
/// timestamp field).
pub fn is_telemetry_line(line: &str) -> bool {
    !line.is_empty()
        && line.contains(',')
        && line.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Open the device's serial telemetry port with the standard read timeout.
pub fn open_serial(port: &str, baud: u32) -> anyhow::Result<Box<dyn Read + Send>> {
    let port = serialport::new(port, baud)
        .timeout(TELEMETRY_READ_TIMEOUT)
        .open()?;
    Ok(Box::new(SerialSource(port)))
}

// serialport hands back Box<dyn SerialPort>; wrap it so the reader only sees
// a plain byte stream.
struct SerialSource(Box<dyn serialport::SerialPort>);

impl Read for SerialSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

/// Handle to the background reader thread.
pub struct TelemetryReader {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TelemetryReader {
    /// Spawn the reader over `source`, appending accepted lines to `buffer`.
    pub fn spawn(source: Box<dyn Read + Send>, buffer: Arc<TelemetryBuffer>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = std::thread::Builder::new()
            .name("telemetry-reader".to_string())
            .spawn(move || read_loop(source, buffer, flag))
            .expect("failed to spawn telemetry reader thread");
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signal the thread to stop and wait for it to exit. Shutdown latency is
    /// bounded by the source's read timeout.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_loop(source: Box<dyn Read + Send>, buffer: Arc<TelemetryBuffer>, stop: Arc<AtomicBool>) {
    let mut reader = BufReader::new(source);
    let mut line = String::new();
    let mut accepted: u64 = 0;

    while !stop.load(Ordering::SeqCst) {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => {
                // Source closed. Serial ports time out instead of reaching
                // EOF, so this mostly happens with file-backed sources.
                log::warn!("telemetry source closed after {accepted} accepted lines");
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if is_telemetry_line(trimmed) {
                    buffer.push(TelemetrySample::new(trimmed.to_string()));
                    accepted += 1;
                } else if !trimmed.is_empty() {
                    log::debug!("discarding garbled telemetry line: {trimmed:?}");
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                // Idle line; loop around and re-check the stop flag.
                continue;
            }
            Err(e) => {
                // Keep the reader alive across transient I/O faults.
                log::debug!("telemetry read error (ignored): {e}");
            }
        }
    }

    log::info!("telemetry reader stopped, {accepted} lines accepted");
}
