//! TOTP crate: sub-modules.

pub mod types;
pub mod base32;
pub mod compare;
pub mod core;
pub mod secret;
pub mod uri;
pub mod qr;
#[cfg(feature = "png-qr")]
pub mod png;
pub mod config;
pub mod service;

// Re-export top-level items for convenience.
pub use types::*;
pub use config::TwoFactorSettings;
pub use qr::QrCodeProvider;
pub use secret::{OsRandom, RandomSource, DEFAULT_SECRET_BITS};
pub use service::TwoFactorAuth;
#[cfg(feature = "png-qr")]
pub use png::PngQrCodeProvider;
