//! Shared-secret generation.
//!
//! Secrets are drawn from a [`RandomSource`]; production code uses the
//! operating system CSPRNG, tests can plug in a deterministic source.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::totp::base32;
use crate::totp::types::*;

/// Default secret strength in bits.
pub const DEFAULT_SECRET_BITS: u32 = 80;

/// Source of secret key material.
pub trait RandomSource: Send + Sync {
    /// Fill `buf` entirely with random bytes.
    fn fill(&self, buf: &mut [u8]) -> Result<(), TotpError>;
}

/// Operating-system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), TotpError> {
        OsRng.try_fill_bytes(buf).map_err(|e| {
            TotpError::new(TotpErrorKind::RandomSourceFailed, "OS random source failed")
                .with_detail(e.to_string())
        })
    }
}

/// Number of random bytes needed for `bits` bits of entropy.
pub fn secret_byte_len(bits: u32) -> usize {
    (bits as usize + 7) / 8
}

/// Generate a base-32 secret with at least `bits` bits of entropy.
pub fn create_secret_with(source: &dyn RandomSource, bits: u32) -> Result<String, TotpError> {
    if bits == 0 {
        return Err(TotpError::invalid_configuration("Secret must have at least 1 bit"));
    }
    let mut buf = vec![0u8; secret_byte_len(bits)];
    source.fill(&mut buf)?;
    Ok(base32::encode(&buf))
}

/// Generate a secret from the OS random source.
pub fn create_secret(bits: u32) -> Result<String, TotpError> {
    create_secret_with(&OsRandom, bits)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn byte_len_rounds_up() {
        assert_eq!(secret_byte_len(1), 1);
        assert_eq!(secret_byte_len(8), 1);
        assert_eq!(secret_byte_len(9), 2);
        assert_eq!(secret_byte_len(80), 10);
        assert_eq!(secret_byte_len(160), 20);
    }

    #[test]
    fn incrementing_source_encodes_known_value() {
        let src = IncrementingRandom::default();
        // bytes 00 01 02 03 04 05 06 07 08 09
        let s = create_secret_with(&src, 80).unwrap();
        assert_eq!(s, "AAAQEAYEAUDAOCAJ");
        assert_eq!(base32::decode(&s).unwrap(), (0u8..10).collect::<Vec<_>>());
    }

    #[test]
    fn output_length_follows_bits() {
        for bits in [1u32, 7, 8, 9, 40, 64, 80, 100, 128, 160, 256] {
            let src = IncrementingRandom::default();
            let s = create_secret_with(&src, bits).unwrap();
            let bytes = secret_byte_len(bits);
            assert_eq!(s.len(), (bytes * 8 + 4) / 5, "bits = {}", bits);
            assert_eq!(base32::decode(&s).unwrap().len(), bytes);
        }
    }

    #[test]
    fn zero_bits_rejected() {
        let err = create_secret(0).unwrap_err();
        assert_eq!(err.kind, TotpErrorKind::InvalidConfiguration);
    }

    #[test]
    fn source_failure_propagates() {
        let err = create_secret_with(&BrokenRandom, 80).unwrap_err();
        assert_eq!(err.kind, TotpErrorKind::RandomSourceFailed);
    }

    #[test]
    fn os_random_secrets_differ() {
        let a = create_secret(DEFAULT_SECRET_BITS).unwrap();
        let b = create_secret(DEFAULT_SECRET_BITS).unwrap();
        assert_eq!(a.len(), 16);
        assert!(base32::is_valid(&a));
        assert_ne!(a, b);
    }
}
