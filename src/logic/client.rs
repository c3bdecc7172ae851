//! One-Shot Signing Client
//!
//! Sign mode: send a single payload to the device, verify the returned
//! signature, and report the verdict plus the round-trip time. Unlike
//! collect mode, every failure here surfaces directly to the operator.

use std::time::{Duration, Instant};

use anyhow::Context;
use rand::RngCore;
use serde::Serialize;

use crate::logic::verify::Verdict;
use crate::logic::{session, verify, wire};

/// Outcome of one sign-and-verify exchange, printable as text or JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SignReport {
    pub payload_size: usize,
    pub round_trip_ms: f64,
    pub reported_algorithm: Option<String>,
    pub public_key_len: usize,
    pub signature_len: usize,
    pub verdict: Verdict,
}

/// Send `payload` to the device and verify the signature it returns.
pub fn sign_once(
    addr: &str,
    port: u16,
    payload: &[u8],
    timeout: Duration,
) -> anyhow::Result<SignReport> {
    log::info!("sending {} byte payload to {addr}:{port}", payload.len());

    let started = Instant::now();
    let raw = session::exchange(addr, port, wire::encode(payload), timeout)
        .context("device exchange failed")?;
    let round_trip_ms = started.elapsed().as_secs_f64() * 1000.0;
    log::info!("round-trip {round_trip_ms:.1} ms, {} response bytes", raw.len());

    let reply = wire::DeviceReply::parse(&raw).with_context(|| {
        format!(
            "invalid device response: {:?}",
            String::from_utf8_lossy(&raw)
        )
    })?;

    let verdict = verify::verify(
        &reply.public_key,
        payload,
        &reply.signature,
        reply.algorithm.as_deref(),
    );
    match &verdict {
        Verdict::Valid { scheme } => log::info!("signature valid ({scheme})"),
        Verdict::Invalid { reason } => log::warn!("signature invalid: {reason}"),
    }

    Ok(SignReport {
        payload_size: payload.len(),
        round_trip_ms,
        reported_algorithm: reply.algorithm,
        public_key_len: reply.public_key.len(),
        signature_len: reply.signature.len(),
        verdict,
    })
}

/// Random payload for "sign random data" runs. Not key material; only the
/// size distribution matters.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut payload = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut payload);
    payload
}
