//! QR-code provider contract and `data:` URI wrapping.
//!
//! Rendering is delegated entirely to a [`QrCodeProvider`]; this module only
//! validates the requested size and packages the result.

use base64::Engine;

use crate::totp::types::*;

/// Pixel size used when the caller does not pick one.
pub const DEFAULT_QR_SIZE: i64 = 200;

/// Something that can turn text into a QR image.
pub trait QrCodeProvider: Send + Sync {
    /// Render `text` as an image roughly `size` pixels wide.
    fn image(&self, text: &str, size: u32) -> Result<Vec<u8>, TotpError>;

    /// MIME type of the bytes returned by [`QrCodeProvider::image`].
    fn mime_type(&self) -> &str;
}

/// Render `text` through `provider` and wrap it as
/// `data:{mime};base64,{image}`.
pub fn qr_code_data_uri(
    provider: &dyn QrCodeProvider,
    text: &str,
    size: i64,
) -> Result<String, TotpError> {
    let size = u32::try_from(size)
        .ok()
        .filter(|s| *s > 0)
        .ok_or_else(|| {
            TotpError::new(TotpErrorKind::InvalidSize, "Size must be int > 0")
                .with_detail(format!("got {}", size))
        })?;

    let image = provider.image(text, size)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(image);
    Ok(format!("data:{};base64,{}", provider.mime_type(), b64))
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingProvider;
    use super::*;

    #[test]
    fn data_uri_format() {
        let provider = RecordingProvider::default();
        let uri = qr_code_data_uri(&provider, "otpauth://totp/x?secret=AB", 150).unwrap();
        // base64("qr-bytes")
        assert_eq!(uri, "data:image/x-test;base64,cXItYnl0ZXM=");
        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("otpauth://totp/x?secret=AB".to_string(), 150)]);
    }

    #[test]
    fn non_positive_size_rejected_before_rendering() {
        let provider = RecordingProvider::default();
        for size in [0, -1, -200] {
            let err = qr_code_data_uri(&provider, "x", size).unwrap_err();
            assert_eq!(err.kind, TotpErrorKind::InvalidSize);
        }
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn oversized_request_rejected() {
        let provider = RecordingProvider::default();
        let err = qr_code_data_uri(&provider, "x", i64::from(u32::MAX) + 1).unwrap_err();
        assert_eq!(err.kind, TotpErrorKind::InvalidSize);
    }
}
