//! High-level authenticator — validated configuration plus the TOTP
//! operations that delegate to `core`, `secret`, `uri` and `qr`.

use std::fmt;
use std::sync::Arc;

use crate::totp::base32;
use crate::totp::config::TwoFactorSettings;
use crate::totp::core;
use crate::totp::qr::{self, QrCodeProvider};
use crate::totp::secret::{self, OsRandom, RandomSource};
use crate::totp::types::*;
use crate::totp::uri;

/// A configured TOTP authenticator.
///
/// Immutable after construction; every operation takes `&self`, so one
/// instance can be shared across threads behind an `Arc`.
#[derive(Clone)]
pub struct TwoFactorAuth {
    issuer: Option<String>,
    digits: u32,
    period: u32,
    algorithm: Algorithm,
    random: Arc<dyn RandomSource>,
    qr_provider: Option<Arc<dyn QrCodeProvider>>,
}

impl fmt::Debug for TwoFactorAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwoFactorAuth")
            .field("issuer", &self.issuer)
            .field("digits", &self.digits)
            .field("period", &self.period)
            .field("algorithm", &self.algorithm)
            .field("qr_provider", &self.qr_provider.as_ref().map(|p| p.mime_type().to_string()))
            .finish_non_exhaustive()
    }
}

impl TwoFactorAuth {
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Construction
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Create an authenticator, rejecting non-positive `digits`/`period` and
    /// unknown algorithm names with `InvalidConfiguration`.
    pub fn new(
        issuer: Option<&str>,
        digits: i64,
        period: i64,
        algorithm: &str,
    ) -> Result<Self, TotpError> {
        let digits = positive_u32("Digits", digits)?;
        let period = positive_u32("Period", period)?;
        let algorithm: Algorithm = algorithm.parse().inspect_err(|e| {
            log::warn!("rejected authenticator configuration: {}", e);
        })?;

        log::debug!(
            "authenticator configured: digits={} period={}s algorithm={}",
            digits,
            period,
            algorithm
        );

        Ok(Self {
            issuer: issuer.map(str::to_string),
            digits,
            period,
            algorithm,
            random: Arc::new(OsRandom),
            qr_provider: default_qr_provider(),
        })
    }

    /// Create an authenticator from loaded settings.
    pub fn from_settings(settings: &TwoFactorSettings) -> Result<Self, TotpError> {
        Self::new(
            settings.issuer.as_deref(),
            settings.digits,
            settings.period,
            &settings.algorithm,
        )
    }

    /// Builder: replace the random source used by [`Self::create_secret`].
    pub fn with_random_source(mut self, source: Arc<dyn RandomSource>) -> Self {
        self.random = source;
        self
    }

    /// Builder: replace the QR renderer.
    pub fn with_qr_provider(mut self, provider: Arc<dyn QrCodeProvider>) -> Self {
        self.qr_provider = Some(provider);
        self
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Secrets
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Generate a new base-32 secret with `bits` bits of entropy
    /// ([`secret::DEFAULT_SECRET_BITS`] is the usual choice).
    pub fn create_secret(&self, bits: u32) -> Result<String, TotpError> {
        secret::create_secret_with(self.random.as_ref(), bits)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Codes
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Code for the current time.
    pub fn get_code(&self, secret: &str) -> Result<String, TotpError> {
        self.get_code_at(secret, core::current_unix_time())
    }

    /// Code for an explicit unix timestamp.
    pub fn get_code_at(&self, secret: &str, unix_seconds: u64) -> Result<String, TotpError> {
        let key = self.decode_key(secret)?;
        core::hotp_raw(
            &key,
            core::time_step_at(unix_seconds, self.period),
            self.digits,
            self.algorithm,
        )
    }

    /// Seconds until the current code expires.
    pub fn seconds_remaining(&self) -> u32 {
        core::seconds_remaining_at(core::current_unix_time(), self.period)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Verification
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Verify `code` against the current time.
    ///
    /// Accepts codes from `discrepancy * period` seconds ago up to
    /// `discrepancy * period` seconds ahead. The usual `discrepancy` is 1.
    pub fn verify_code(&self, secret: &str, code: &str, discrepancy: u32) -> Result<bool, TotpError> {
        self.verify_code_at(secret, code, discrepancy, core::current_unix_time())
    }

    /// Verify `code` against an explicit unix timestamp.
    pub fn verify_code_at(
        &self,
        secret: &str,
        code: &str,
        discrepancy: u32,
        unix_seconds: u64,
    ) -> Result<bool, TotpError> {
        Ok(self
            .verify_code_detailed_at(secret, code, discrepancy, unix_seconds)?
            .valid)
    }

    /// Like [`Self::verify_code_at`] but also reports the matching drift.
    pub fn verify_code_detailed_at(
        &self,
        secret: &str,
        code: &str,
        discrepancy: u32,
        unix_seconds: u64,
    ) -> Result<VerifyResult, TotpError> {
        let key = self.decode_key(secret)?;
        core::verify_totp_at(
            &key,
            code,
            discrepancy,
            self.digits,
            self.period,
            self.algorithm,
            unix_seconds,
        )
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Enrollment
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `otpauth://` key URI for `label` with this authenticator's settings.
    pub fn get_qr_text(&self, label: &str, secret: &str) -> String {
        uri::build_otpauth_uri(
            label,
            secret,
            self.issuer.as_deref(),
            self.period,
            self.algorithm,
            self.digits,
        )
    }

    /// QR image of the key URI as a `data:` URI.
    ///
    /// `size` is checked before the provider is consulted.
    pub fn get_qr_code_data_uri(&self, label: &str, secret: &str, size: i64) -> Result<String, TotpError> {
        if size <= 0 {
            return Err(TotpError::new(TotpErrorKind::InvalidSize, "Size must be int > 0")
                .with_detail(format!("got {}", size)));
        }
        let provider = self.qr_provider.as_deref().ok_or_else(|| {
            TotpError::new(TotpErrorKind::QrEncodeFailed, "No QR code provider configured")
        })?;
        qr::qr_code_data_uri(provider, &self.get_qr_text(label, secret), size)
    }

    /// [`TwoFactorAuth::get_qr_code_data_uri`] at [`qr::DEFAULT_QR_SIZE`] pixels.
    pub fn get_qr_code_data_uri_default(&self, label: &str, secret: &str) -> Result<String, TotpError> {
        self.get_qr_code_data_uri(label, secret, qr::DEFAULT_QR_SIZE)
    }

    fn decode_key(&self, secret: &str) -> Result<Vec<u8>, TotpError> {
        base32::decode_secret(secret).inspect_err(|e| {
            log::warn!("rejected shared secret: {}", e);
        })
    }
}

fn positive_u32(name: &str, value: i64) -> Result<u32, TotpError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            let err = TotpError::invalid_configuration(format!("{} must be int > 0", name))
                .with_detail(format!("got {}", value));
            log::warn!("rejected authenticator configuration: {}", err);
            err
        })
}

#[cfg(feature = "png-qr")]
fn default_qr_provider() -> Option<Arc<dyn QrCodeProvider>> {
    Some(Arc::new(crate::totp::png::PngQrCodeProvider))
}

#[cfg(not(feature = "png-qr"))]
fn default_qr_provider() -> Option<Arc<dyn QrCodeProvider>> {
    None
}
