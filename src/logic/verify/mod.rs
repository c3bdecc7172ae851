//! Signature Verification
//!
//! Scheme selection and dispatch for the three ML-DSA variants the device can
//! sign with. The public-key length is a structural invariant of each
//! fixed-parameter scheme and is the authoritative discriminator; the
//! device-reported algorithm tag is attacker-supplied and only consulted when
//! the length matches no known scheme.

pub mod ml_dsa;

use serde::Serialize;

// ============================================================================
// SCHEME REGISTRY
// ============================================================================

/// Supported signature schemes, in decreasing security level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchemeId {
    MlDsa87,
    MlDsa65,
    MlDsa44,
}

impl SchemeId {
    /// Resolution order. Mirrors the device's preference for the strongest
    /// scheme it can run.
    pub const ALL: [SchemeId; 3] = [SchemeId::MlDsa87, SchemeId::MlDsa65, SchemeId::MlDsa44];

    /// Canonical algorithm name, as it appears in the `ALG` response field.
    pub fn name(self) -> &'static str {
        match self {
            SchemeId::MlDsa87 => "ML-DSA-87",
            SchemeId::MlDsa65 => "ML-DSA-65",
            SchemeId::MlDsa44 => "ML-DSA-44",
        }
    }

    /// Public key length in bytes (FIPS 204 fixed parameter).
    pub fn pk_len(self) -> usize {
        match self {
            SchemeId::MlDsa87 => 2592,
            SchemeId::MlDsa65 => 1952,
            SchemeId::MlDsa44 => 1312,
        }
    }

    /// Look up a scheme by its exact public-key length.
    pub fn for_pk_len(len: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.pk_len() == len)
    }

    /// Look up a scheme by algorithm name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Resolve the scheme for a response: exact key length wins, the reported
    /// tag is the fallback for lengths we do not recognize.
    pub fn resolve(hint: Option<&str>, pk_len: usize) -> Option<Self> {
        Self::for_pk_len(pk_len).or_else(|| hint.and_then(Self::from_name))
    }

    fn verify_detached(self, pk: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), String> {
        match self {
            SchemeId::MlDsa87 => ml_dsa::verify_mldsa87(pk, msg, sig),
            SchemeId::MlDsa65 => ml_dsa::verify_mldsa65(pk, msg, sig),
            SchemeId::MlDsa44 => ml_dsa::verify_mldsa44(pk, msg, sig),
        }
    }
}

impl std::fmt::Display for SchemeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// VERDICT
// ============================================================================

/// Outcome of a verification attempt. A failed cryptographic check is a
/// verdict, never an error that aborts the surrounding flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Valid { scheme: SchemeId },
    Invalid { reason: String },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid { .. })
    }
}

/// Verify `sig` over `msg` with `pk`, selecting the scheme from the key
/// length with `hint` as the fallback discriminator.
pub fn verify(pk: &[u8], msg: &[u8], sig: &[u8], hint: Option<&str>) -> Verdict {
    let scheme = match SchemeId::resolve(hint, pk.len()) {
        Some(scheme) => scheme,
        None => {
            return Verdict::Invalid {
                reason: format!(
                    "unknown algorithm or invalid public key length = {}",
                    pk.len()
                ),
            }
        }
    };

    log::debug!(
        "verifying {} byte message with {} (pk {} bytes, sig {} bytes)",
        msg.len(),
        scheme,
        pk.len(),
        sig.len()
    );

    match scheme.verify_detached(pk, msg, sig) {
        Ok(()) => Verdict::Valid { scheme },
        Err(reason) => Verdict::Invalid { reason },
    }
}
