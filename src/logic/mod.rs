//! Logic Module - Device Protocol & Collection Engines
//!
//! - `wire` - device request/response wire format
//! - `verify` - ML-DSA signature verification and scheme dispatch
//! - `session` - one TCP exchange with the signing device
//! - `telemetry` - serial telemetry capture (buffer + background reader)
//! - `dataset` - labeled dataset rows, writer, and the sampling collector
//! - `client` - the one-shot sign-and-verify flow

pub mod client;
pub mod dataset;
pub mod session;
pub mod telemetry;
pub mod verify;
pub mod wire;
