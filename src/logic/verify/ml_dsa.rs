//! ML-DSA (FIPS 204) verification backends.
//!
//! Thin wrappers over the `pqcrypto-mldsa` parameter sets. Each returns
//! `Err(reason)` for malformed inputs or a failed check so the caller can
//! fold the detail into an `Invalid` verdict.

use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _};

macro_rules! mldsa_verify {
    ($fn_name:ident, $module:ident, $label:literal) => {
        /// Verify one detached signature with the fixed parameter set.
        pub fn $fn_name(pk: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), String> {
            use pqcrypto_mldsa::$module::{verify_detached_signature, DetachedSignature, PublicKey};

            let pk = PublicKey::from_bytes(pk)
                .map_err(|e| format!(concat!($label, ": malformed public key: {}"), e))?;
            let sig = DetachedSignature::from_bytes(sig)
                .map_err(|e| format!(concat!($label, ": malformed signature: {}"), e))?;

            verify_detached_signature(&sig, msg, &pk)
                .map_err(|e| format!(concat!($label, ": verification failed: {}"), e))
        }
    };
}

mldsa_verify!(verify_mldsa44, mldsa44, "ML-DSA-44");
mldsa_verify!(verify_mldsa65, mldsa65, "ML-DSA-65");
mldsa_verify!(verify_mldsa87, mldsa87, "ML-DSA-87");

#[cfg(test)]
mod tests {
    use super::*;
    use pqcrypto_mldsa::mldsa65;

    #[test]
    fn roundtrip_mldsa65() {
        let (pk, sk) = mldsa65::keypair();
        let sig = mldsa65::detached_sign(b"abc", &sk);
        assert!(verify_mldsa65(pk.as_bytes(), b"abc", sig.as_bytes()).is_ok());
        assert!(verify_mldsa65(pk.as_bytes(), b"abd", sig.as_bytes()).is_err());
    }

    #[test]
    fn wrong_length_key_is_rejected() {
        let err = verify_mldsa44(&[0u8; 10], b"abc", &[0u8; 10]).unwrap_err();
        assert!(err.contains("ML-DSA-44"));
    }
}
