//! PQC Signing Host - Main Entry Point

mod cli;
pub mod constants;
mod logic;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use cli::{Cli, Command};
use logic::dataset::{collector, CollectorConfig, DatasetWriter};
use logic::telemetry::{reader, TelemetryBuffer, TelemetryReader};
use logic::verify::Verdict;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    match Cli::parse().cmd {
        Command::Sign {
            message,
            random,
            device,
            port,
            timeout,
            json,
        } => run_sign(message, random, device, port, timeout, json),
        Command::Collect {
            samples,
            interval,
            out,
            telemetry_port,
            baud,
            device,
            port,
        } => run_collect(samples, interval, out, telemetry_port, baud, device, port),
    }
}

fn run_sign(
    message: Option<String>,
    random: Option<usize>,
    device: Option<String>,
    port: Option<u16>,
    timeout_secs: u64,
    json: bool,
) -> anyhow::Result<()> {
    let payload = match (message, random) {
        (Some(text), _) => text.into_bytes(),
        (None, Some(len)) => {
            let payload = logic::client::random_bytes(len);
            log::info!("random payload: {}", hex::encode(&payload));
            payload
        }
        (None, None) => anyhow::bail!("provide --message or --random"),
    };

    let addr = device.unwrap_or_else(constants::get_device_addr);
    let port = port.unwrap_or_else(constants::get_device_port);

    let report = logic::client::sign_once(&addr, port, &payload, Duration::from_secs(timeout_secs))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Payload size:       {} bytes", report.payload_size);
        println!("Round-trip time:    {:.1} ms", report.round_trip_ms);
        println!(
            "Reported algorithm: {}",
            report.reported_algorithm.as_deref().unwrap_or("(none)")
        );
        println!("Public key length:  {} bytes", report.public_key_len);
        println!("Signature length:   {} bytes", report.signature_len);
        match &report.verdict {
            Verdict::Valid { scheme } => println!("Verdict:            VALID ({scheme})"),
            Verdict::Invalid { reason } => println!("Verdict:            INVALID - {reason}"),
        }
    }

    if !report.verdict.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_collect(
    samples: Option<u64>,
    interval: Option<f64>,
    out: Option<PathBuf>,
    telemetry_port: Option<String>,
    baud: Option<u32>,
    device: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let cfg = CollectorConfig {
        device_addr: device.unwrap_or_else(constants::get_device_addr),
        device_port: port.unwrap_or_else(constants::get_device_port),
        samples: samples.unwrap_or_else(constants::get_sample_count),
        interval: Duration::from_secs_f64(
            interval.unwrap_or_else(constants::get_sample_interval_secs),
        ),
        ..CollectorConfig::default()
    };
    let out = out.unwrap_or_else(|| PathBuf::from(constants::get_dataset_path()));

    let tty = telemetry_port.unwrap_or_else(constants::get_telemetry_port);
    let baud = baud.unwrap_or_else(constants::get_telemetry_baud);
    let source = reader::open_serial(&tty, baud)
        .with_context(|| format!("cannot open telemetry port {tty} at {baud} baud"))?;

    let writer = DatasetWriter::open(&out)
        .with_context(|| format!("cannot open dataset file {}", out.display()))?;

    let buffer = Arc::new(TelemetryBuffer::new());
    let telemetry = TelemetryReader::spawn(source, buffer.clone());

    log::info!(
        "collecting {} samples from {}:{} into {}",
        cfg.samples,
        cfg.device_addr,
        cfg.device_port,
        out.display()
    );

    let stop = AtomicBool::new(false);
    let stats = collector::run(&cfg, &buffer, &writer, &stop);
    telemetry.stop();
    let stats = stats?;

    log::info!(
        "run complete: {}/{} rows persisted ({} exchange failures, {} no-telemetry skips, {} malformed skips)",
        stats.persisted,
        stats.attempted,
        stats.exchange_failures,
        stats.skipped_no_telemetry,
        stats.skipped_malformed
    );
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
