//! Authenticator settings as they arrive from callers or config files.
//!
//! Values are kept loosely typed here (signed integers, free-text algorithm)
//! so that bad input reaches [`crate::totp::TwoFactorAuth::from_settings`]
//! and is rejected there with `InvalidConfiguration`.

use serde::{Deserialize, Serialize};

use crate::totp::types::*;

/// Default number of digits in a generated code.
pub const DEFAULT_DIGITS: i64 = 6;
/// Default time-step length in seconds.
pub const DEFAULT_PERIOD: i64 = 30;
/// Default hash algorithm name.
pub const DEFAULT_ALGORITHM: &str = "sha1";

/// Unvalidated authenticator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoFactorSettings {
    /// Shown by authenticator apps next to the account label.
    pub issuer: Option<String>,
    pub digits: i64,
    pub period: i64,
    /// `sha1`, `sha256` or `sha512`, any case.
    pub algorithm: String,
}

impl Default for TwoFactorSettings {
    fn default() -> Self {
        Self {
            issuer: None,
            digits: DEFAULT_DIGITS,
            period: DEFAULT_PERIOD,
            algorithm: DEFAULT_ALGORITHM.to_string(),
        }
    }
}

impl TwoFactorSettings {
    /// Builder: set issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Builder: set digit count.
    pub fn with_digits(mut self, digits: i64) -> Self {
        self.digits = digits;
        self
    }

    /// Builder: set time period.
    pub fn with_period(mut self, period: i64) -> Self {
        self.period = period;
        self
    }

    /// Builder: set algorithm name.
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Deserialize from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, TotpError> {
        serde_json::from_str(json).map_err(|e| {
            TotpError::invalid_configuration("Malformed authenticator settings")
                .with_detail(e.to_string())
        })
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, TotpError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            TotpError::invalid_configuration("Failed to serialize settings")
                .with_detail(e.to_string())
        })
    }
}
