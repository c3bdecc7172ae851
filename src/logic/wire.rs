//! Device Wire Format
//!
//! Requests are raw payload bytes with no framing; the transport's half-close
//! marks end-of-message. Responses are UTF-8 text of the form
//! `KEY:VALUE|KEY:VALUE|...` with keys `ALG`, `SIG` (hex), `PK` (hex).

use std::collections::HashMap;
use std::str::Utf8Error;
use thiserror::Error;

/// Response field carrying the algorithm tag (optional)
pub const FIELD_ALG: &str = "ALG";
/// Response field carrying the hex-encoded signature (required)
pub const FIELD_SIG: &str = "SIG";
/// Response field carrying the hex-encoded public key (required)
pub const FIELD_PK: &str = "PK";

/// Decode failure for a device response. Terminal for that exchange.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response is not UTF-8 text: {0}")]
    NotText(#[from] Utf8Error),

    #[error("device response missing required field {0}")]
    MissingField(&'static str),

    #[error("field {field} is not valid hex: {source}")]
    BadHex {
        field: &'static str,
        source: hex::FromHexError,
    },
}

/// Encode an outbound payload. The wire format is "whatever bytes are written
/// are the whole message", so this is the identity.
pub fn encode(payload: &[u8]) -> &[u8] {
    payload
}

/// Split a response string into a field map.
///
/// Parts without a `:` are dropped; keys and values are trimmed; duplicate
/// keys overwrite (last wins).
pub fn decode_fields(text: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for part in text.split('|') {
        if let Some((key, value)) = part.split_once(':') {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    fields
}

/// Parsed signing response from the device.
#[derive(Debug, Clone)]
pub struct DeviceReply {
    /// Algorithm tag as reported by the device. Advisory only; key length is
    /// the authoritative scheme discriminator.
    pub algorithm: Option<String>,
    pub signature: Vec<u8>,
    pub public_key: Vec<u8>,
}

impl DeviceReply {
    /// Parse raw response bytes into a typed reply.
    pub fn parse(raw: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(raw)?;
        let fields = decode_fields(text.trim());

        let sig_hex = fields
            .get(FIELD_SIG)
            .filter(|v| !v.is_empty())
            .ok_or(DecodeError::MissingField(FIELD_SIG))?;
        let pk_hex = fields
            .get(FIELD_PK)
            .filter(|v| !v.is_empty())
            .ok_or(DecodeError::MissingField(FIELD_PK))?;

        let signature = hex::decode(sig_hex).map_err(|source| DecodeError::BadHex {
            field: FIELD_SIG,
            source,
        })?;
        let public_key = hex::decode(pk_hex).map_err(|source| DecodeError::BadHex {
            field: FIELD_PK,
            source,
        })?;

        Ok(Self {
            algorithm: fields.get(FIELD_ALG).cloned(),
            signature,
            public_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_identity() {
        let payload = b"raw bytes \x00\xff";
        assert_eq!(encode(payload), payload);
    }

    #[test]
    fn decode_well_formed() {
        let fields = decode_fields("ALG:X|SIG:ab|PK:cd");
        assert_eq!(fields.get("ALG").map(String::as_str), Some("X"));
        assert_eq!(fields.get("SIG").map(String::as_str), Some("ab"));
        assert_eq!(fields.get("PK").map(String::as_str), Some("cd"));
    }

    #[test]
    fn decode_drops_malformed_parts() {
        let fields = decode_fields("ALG:X|garbage|PK:cd");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("ALG").map(String::as_str), Some("X"));
        assert_eq!(fields.get("PK").map(String::as_str), Some("cd"));
        assert!(!fields.contains_key("garbage"));
    }

    #[test]
    fn decode_trims_whitespace() {
        let fields = decode_fields(" ALG : ML-DSA-44 | SIG :ab ");
        assert_eq!(fields.get("ALG").map(String::as_str), Some("ML-DSA-44"));
        assert_eq!(fields.get("SIG").map(String::as_str), Some("ab"));
    }

    #[test]
    fn decode_duplicate_key_last_wins() {
        let fields = decode_fields("ALG:first|ALG:second");
        assert_eq!(fields.get("ALG").map(String::as_str), Some("second"));
    }

    #[test]
    fn decode_splits_value_on_first_colon_only() {
        let fields = decode_fields("ALG:ML-DSA:44");
        assert_eq!(fields.get("ALG").map(String::as_str), Some("ML-DSA:44"));
    }

    #[test]
    fn reply_parse_happy_path() {
        let reply = DeviceReply::parse(b"ALG:ML-DSA-44|SIG:deadbeef|PK:0102").unwrap();
        assert_eq!(reply.algorithm.as_deref(), Some("ML-DSA-44"));
        assert_eq!(reply.signature, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(reply.public_key, vec![0x01, 0x02]);
    }

    #[test]
    fn reply_parse_missing_sig() {
        let err = DeviceReply::parse(b"ALG:ML-DSA-44|PK:0102").unwrap_err();
        assert!(matches!(err, DecodeError::MissingField(FIELD_SIG)));
    }

    #[test]
    fn reply_parse_empty_pk_counts_as_missing() {
        let err = DeviceReply::parse(b"SIG:ab|PK:").unwrap_err();
        assert!(matches!(err, DecodeError::MissingField(FIELD_PK)));
    }

    #[test]
    fn reply_parse_bad_hex() {
        let err = DeviceReply::parse(b"SIG:zz|PK:0102").unwrap_err();
        assert!(matches!(err, DecodeError::BadHex { field: FIELD_SIG, .. }));
    }

    #[test]
    fn reply_parse_rejects_non_utf8() {
        let err = DeviceReply::parse(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, DecodeError::NotText(_)));
    }

    #[test]
    fn reply_parse_without_alg_tag() {
        let reply = DeviceReply::parse(b"SIG:ab|PK:cd").unwrap();
        assert!(reply.algorithm.is_none());
    }
}
