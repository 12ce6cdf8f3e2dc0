//! Constant-time comparison of OTP codes.

/// Compare two byte strings without leaking where they differ.
///
/// Every position up to the longer length is visited; bytes past the end of
/// the shorter input read as zero and the length difference is folded into
/// the accumulator, so there is a single branch on the final value only.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut diff = (a.len() ^ b.len()) as u64;
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= u64::from(x ^ y);
    }
    diff == 0
}

/// String convenience wrapper over [`constant_time_eq`].
pub fn codes_equal(expected: &str, candidate: &str) -> bool {
    constant_time_eq(expected.as_bytes(), candidate.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_inputs() {
        assert!(constant_time_eq(b"543160", b"543160"));
        assert!(constant_time_eq(b"", b""));
        assert!(codes_equal("94287082", "94287082"));
    }

    #[test]
    fn mismatch_anywhere_in_equal_length() {
        assert!(!constant_time_eq(b"543160", b"043160"));
        assert!(!constant_time_eq(b"543160", b"543100"));
        assert!(!constant_time_eq(b"543160", b"543161"));
    }

    #[test]
    fn different_lengths_never_match() {
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(!constant_time_eq(b"ab", b"abc"));
        assert!(!constant_time_eq(b"", b"0"));
        // Trailing NULs must not be mistaken for the zero fill.
        assert!(!constant_time_eq(b"12\0", b"12"));
        assert!(!codes_equal("543160", "5431600"));
    }

    #[test]
    fn not_lexicographic() {
        assert!(!codes_equal("000001", "000002"));
        assert!(!codes_equal("999999", "000000"));
    }
}
