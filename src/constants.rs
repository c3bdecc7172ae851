//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! CLI flags override environment variables, which override these values.

use std::time::Duration;

/// Default signing device address
pub const DEFAULT_DEVICE_ADDR: &str = "192.168.137.200";

/// Default signing device TCP port
pub const DEFAULT_DEVICE_PORT: u16 = 8000;

/// Default serial port carrying device telemetry
#[cfg(windows)]
pub const DEFAULT_TELEMETRY_PORT: &str = "COM7";
#[cfg(not(windows))]
pub const DEFAULT_TELEMETRY_PORT: &str = "/dev/ttyUSB0";

/// Default telemetry baud rate
pub const DEFAULT_TELEMETRY_BAUD: u32 = 115_200;

/// Default dataset output path
pub const DEFAULT_DATASET_PATH: &str = "dataset_raw.csv";

/// Default number of samples per collection run
pub const DEFAULT_SAMPLE_COUNT: u64 = 10_000;

/// Default delay between samples (seconds)
pub const DEFAULT_SAMPLE_INTERVAL_SECS: f64 = 2.0;

/// Per-exchange timeout in collect mode
pub const COLLECT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(3);

/// Per-exchange timeout in sign mode (one-shot, operator is watching)
pub const SIGN_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(15);

/// How long one iteration waits for a telemetry line before skipping the row
pub const TELEMETRY_WAIT: Duration = Duration::from_secs(1);

/// Serial read timeout; also bounds how fast the reader sees the stop flag
pub const TELEMETRY_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Latency sentinel recorded when the device exchange fails
pub const SIGN_TIME_SENTINEL_MS: f64 = 9999.0;

/// Candidate payload sizes for collect mode
pub const MSG_SIZES: [usize; 6] = [32, 64, 128, 256, 512, 1024];

/// App name
pub const APP_NAME: &str = "pqsign-host";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get device address from environment or use default
pub fn get_device_addr() -> String {
    std::env::var("DEVICE_ADDR").unwrap_or_else(|_| DEFAULT_DEVICE_ADDR.to_string())
}

/// Get device port from environment or use default
pub fn get_device_port() -> u16 {
    std::env::var("DEVICE_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_DEVICE_PORT)
}

/// Get telemetry serial port from environment or use default
pub fn get_telemetry_port() -> String {
    std::env::var("TELEMETRY_PORT").unwrap_or_else(|_| DEFAULT_TELEMETRY_PORT.to_string())
}

/// Get telemetry baud rate from environment or use default
pub fn get_telemetry_baud() -> u32 {
    std::env::var("TELEMETRY_BAUD")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TELEMETRY_BAUD)
}

/// Get dataset output path from environment or use default
pub fn get_dataset_path() -> String {
    std::env::var("DATASET_PATH").unwrap_or_else(|_| DEFAULT_DATASET_PATH.to_string())
}

/// Get sample budget from environment or use default
pub fn get_sample_count() -> u64 {
    std::env::var("SAMPLE_COUNT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SAMPLE_COUNT)
}

/// Get inter-sample interval from environment or use default
pub fn get_sample_interval_secs() -> f64 {
    std::env::var("SAMPLE_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SAMPLE_INTERVAL_SECS)
}
