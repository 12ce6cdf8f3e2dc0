//! Strict RFC 4648 Base32 for shared secrets.
//!
//! Encoding never pads. Decoding accepts optional trailing `=` and is
//! case-sensitive: only `A-Z` and `2-7` are legal, so lowercase input or the
//! digits `0`, `1`, `8`, `9` are rejected instead of being normalised.

use crate::totp::types::*;

const ALPHABET: ::base32::Alphabet = ::base32::Alphabet::Rfc4648 { padding: false };

/// Encode raw bytes to unpadded Base32.
pub fn encode(bytes: &[u8]) -> String {
    ::base32::encode(ALPHABET, bytes)
}

/// Decode Base32 text into raw bytes.
pub fn decode(text: &str) -> Result<Vec<u8>, TotpError> {
    let body = text.trim_end_matches('=');

    if let Some((pos, c)) = body.char_indices().find(|&(_, c)| !is_alphabet_char(c)) {
        return Err(TotpError::invalid_secret("Invalid base-32 secret")
            .with_detail(format!("illegal character {:?} at offset {}", c, pos)));
    }

    ::base32::decode(ALPHABET, body)
        .ok_or_else(|| TotpError::invalid_secret("Invalid base-32 secret"))
}

/// Decode a secret that must yield key material.
pub fn decode_secret(text: &str) -> Result<Vec<u8>, TotpError> {
    let key = decode(text)?;
    if key.is_empty() {
        return Err(TotpError::invalid_secret("Secret decodes to zero bytes"));
    }
    Ok(key)
}

/// Check if a string is a usable Base32 secret.
pub fn is_valid(text: &str) -> bool {
    decode_secret(text).is_ok()
}

fn is_alphabet_char(c: char) -> bool {
    matches!(c, 'A'..='Z' | '2'..='7')
}
