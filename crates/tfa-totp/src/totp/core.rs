//! Core OTP generation — RFC 4226 (HOTP) and RFC 6238 (TOTP).
//!
//! Implements HMAC-based One-Time Password with SHA-1, SHA-256, and SHA-512,
//! time-step calculation, and window verification that always evaluates
//! every candidate before reporting.

use crate::totp::base32;
use crate::totp::compare::codes_equal;
use crate::totp::types::*;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Raw HMAC-OTP (RFC 4226 §5.3)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Compute an HOTP code for the given raw key bytes and counter.
pub fn hotp_raw(key: &[u8], counter: u64, digits: u32, algo: Algorithm) -> Result<String, TotpError> {
    let digest = compute_hmac(key, &counter.to_be_bytes(), algo)?;
    debug_assert_eq!(digest.len(), algo.digest_len());
    Ok(truncate(&digest, digits))
}

/// Compute HMAC(key, message) using the specified algorithm.
fn compute_hmac(key: &[u8], data: &[u8], algo: Algorithm) -> Result<Vec<u8>, TotpError> {
    fn run<M: Mac + hmac::digest::KeyInit>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, TotpError> {
        let mut mac = <M as Mac>::new_from_slice(key)
            .map_err(|e| TotpError::invalid_secret("HMAC rejected key").with_detail(e.to_string()))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    match algo {
        Algorithm::Sha1 => run::<Hmac<Sha1>>(key, data),
        Algorithm::Sha256 => run::<Hmac<Sha256>>(key, data),
        Algorithm::Sha512 => run::<Hmac<Sha512>>(key, data),
    }
}

/// Dynamic truncation per RFC 4226 §5.3.
fn truncate(digest: &[u8], digits: u32) -> String {
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        digest[offset],
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]) & 0x7fff_ffff;

    // Past 10^19 the modulus no longer fits, and a 31-bit value is already
    // smaller than it anyway.
    let code = match 10u64.checked_pow(digits) {
        Some(modulus) => u64::from(binary) % modulus,
        None => u64::from(binary),
    };
    format!("{:0>width$}", code, width = digits as usize)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  HOTP (counter-based, RFC 4226)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Generate an HOTP code from a base-32 encoded secret.
pub fn generate_hotp(secret_b32: &str, counter: u64, digits: u32, algo: Algorithm) -> Result<String, TotpError> {
    let key = base32::decode_secret(secret_b32)?;
    hotp_raw(&key, counter, digits, algo)
}

/// Verify a counter-based code, looking `look_ahead` counters past `counter`.
///
/// Returns the counter that matched so the caller can resynchronise.
/// Every counter in the window is evaluated.
pub fn verify_hotp(
    secret_b32: &str,
    code: &str,
    counter: u64,
    look_ahead: u32,
    digits: u32,
    algo: Algorithm,
) -> Result<Option<u64>, TotpError> {
    let key = base32::decode_secret(secret_b32)?;
    let mut matched = None;
    for step in 0..=u64::from(look_ahead) {
        let Some(c) = counter.checked_add(step) else {
            break;
        };
        let hit = codes_equal(&hotp_raw(&key, c, digits, algo)?, code);
        if hit && matched.is_none() {
            matched = Some(c);
        }
    }
    Ok(matched)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TOTP (time-based, RFC 6238)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Compute the time-step counter for a given unix timestamp.
pub fn time_step_at(unix_seconds: u64, period: u32) -> u64 {
    unix_seconds / u64::from(period)
}

/// Time-step shifted by `offset` whole periods.
///
/// `None` when the shifted step would be negative or overflow.
pub fn counter_from_time(unix_seconds: u64, period: u32, offset: i64) -> Option<u64> {
    time_step_at(unix_seconds, period).checked_add_signed(offset)
}

/// Seconds remaining until the time-step containing `unix_seconds` expires.
pub fn seconds_remaining_at(unix_seconds: u64, period: u32) -> u32 {
    let p = u64::from(period);
    (p - (unix_seconds % p)) as u32
}

/// Generate a TOTP code at an explicit unix timestamp.
pub fn generate_totp_at(
    secret_b32: &str,
    digits: u32,
    period: u32,
    algo: Algorithm,
    unix_seconds: u64,
) -> Result<String, TotpError> {
    generate_hotp(secret_b32, time_step_at(unix_seconds, period), digits, algo)
}

/// Verify a TOTP code over `[-discrepancy, +discrepancy]` time-steps.
///
/// All `2 * discrepancy + 1` candidates are computed and compared and the
/// outcomes are OR-ed, so timing does not depend on which step matched.
/// Steps before the epoch never match but are still computed (as step 0).
pub fn verify_totp_at(
    key: &[u8],
    code: &str,
    discrepancy: u32,
    digits: u32,
    period: u32,
    algo: Algorithm,
    unix_seconds: u64,
) -> Result<VerifyResult, TotpError> {
    let window = i64::from(discrepancy);
    let mut valid = false;
    let mut drift = 0i64;

    for offset in -window..=window {
        let counter = counter_from_time(unix_seconds, period, offset);
        let expected = hotp_raw(key, counter.unwrap_or(0), digits, algo)?;
        let hit = codes_equal(&expected, code) & counter.is_some();
        // Keep the first (oldest) match without leaving the loop.
        drift = if hit && !valid { offset } else { drift };
        valid |= hit;
    }

    Ok(VerifyResult { valid, drift })
}

/// Current unix timestamp in seconds.
pub(crate) fn current_unix_time() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
