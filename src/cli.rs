//! Command-line surface.
//!
//! Flags override environment variables, which override the defaults in
//! `constants.rs`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::constants;

#[derive(Parser)]
#[command(name = constants::APP_NAME, version, about = "Host controller for an embedded PQC signing device")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Send one message to the device and verify the returned signature
    Sign {
        /// Message text to sign
        #[arg(long, conflicts_with = "random")]
        message: Option<String>,
        /// Sign this many random bytes instead of a text message
        #[arg(long, value_name = "BYTES")]
        random: Option<usize>,
        /// Device address (overrides DEVICE_ADDR)
        #[arg(long)]
        device: Option<String>,
        /// Device TCP port (overrides DEVICE_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Exchange timeout in seconds
        #[arg(long, default_value_t = constants::SIGN_EXCHANGE_TIMEOUT.as_secs())]
        timeout: u64,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Collect a labeled latency/telemetry dataset
    Collect {
        /// Number of samples to collect (overrides SAMPLE_COUNT)
        #[arg(long)]
        samples: Option<u64>,
        /// Seconds between samples (overrides SAMPLE_INTERVAL_SECS)
        #[arg(long)]
        interval: Option<f64>,
        /// Dataset output path (overrides DATASET_PATH)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Telemetry serial port (overrides TELEMETRY_PORT)
        #[arg(long)]
        telemetry_port: Option<String>,
        /// Telemetry baud rate (overrides TELEMETRY_BAUD)
        #[arg(long)]
        baud: Option<u32>,
        /// Device address (overrides DEVICE_ADDR)
        #[arg(long)]
        device: Option<String>,
        /// Device TCP port (overrides DEVICE_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
}
