//! # tfa-totp – Two-Factor Authentication Core
//!
//! Time-based one-time passwords for a second login factor:
//!
//! - **RFC 4226 / 6238** – HOTP & TOTP generation with SHA-1, SHA-256, SHA-512
//! - **Verification** – constant-time comparison over a ±discrepancy window
//! - **Base32** – strict RFC 4648 secrets (upper-case alphabet only)
//! - **Secrets** – CSPRNG-backed generation with a swappable random source
//! - **otpauth:// URIs** – key-URI building and parsing for authenticator apps
//! - **QR Codes** – pluggable provider trait, PNG renderer behind `png-qr`
//!
//! ```
//! use tfa_totp::totp::TwoFactorAuth;
//!
//! let tfa = TwoFactorAuth::new(Some("Example"), 6, 30, "sha1").unwrap();
//! let code = tfa.get_code_at("VMR466AB62ZBOKHE", 1426847216).unwrap();
//! assert_eq!(code, "543160");
//! assert!(tfa.verify_code_at("VMR466AB62ZBOKHE", &code, 1, 1426847190).unwrap());
//! ```

pub mod totp;
