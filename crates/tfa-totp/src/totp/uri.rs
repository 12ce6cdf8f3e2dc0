//! `otpauth://` key URIs per the Google Authenticator key-URI format:
//! <https://github.com/google/google-authenticator/wiki/Key-Uri-Format>
//!
//! Format: `otpauth://totp/LABEL?secret=BASE32&issuer=ISSUER&period=30&algorithm=SHA1&digits=6`
//!
//! The parameter order and the upper-case algorithm are what existing
//! authenticator apps expect, so [`build_otpauth_uri`] always emits every
//! parameter in that order.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::totp::types::*;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Generate
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build a TOTP key URI. A missing issuer is emitted as `issuer=`.
pub fn build_otpauth_uri(
    label: &str,
    secret: &str,
    issuer: Option<&str>,
    period: u32,
    algorithm: Algorithm,
    digits: u32,
) -> String {
    format!(
        "otpauth://totp/{}?secret={}&issuer={}&period={}&algorithm={}&digits={}",
        url_encode(label),
        url_encode(secret),
        url_encode(issuer.unwrap_or("")),
        period,
        algorithm.uri_name(),
        digits
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Parse
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Fields carried by a TOTP key URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpAuthUri {
    pub label: String,
    pub issuer: Option<String>,
    pub secret: String,
    pub algorithm: Algorithm,
    pub digits: u32,
    pub period: u32,
}

impl OtpAuthUri {
    /// Render back to the canonical URI form.
    pub fn to_uri(&self) -> String {
        build_otpauth_uri(
            &self.label,
            &self.secret,
            self.issuer.as_deref(),
            self.period,
            self.algorithm,
            self.digits,
        )
    }
}

/// Parse an `otpauth://totp/` URI.
///
/// Missing `algorithm`, `digits` and `period` fall back to SHA1, 6 and 30.
/// Present but invalid values are rejected rather than silently replaced.
pub fn parse_otpauth_uri(uri: &str) -> Result<OtpAuthUri, TotpError> {
    let url = url::Url::parse(uri).map_err(|e| invalid_uri(format!("Invalid URI: {}", e)))?;

    if url.scheme() != "otpauth" {
        return Err(invalid_uri(format!(
            "Expected scheme 'otpauth', got '{}'",
            url.scheme()
        )));
    }
    if url.host_str() != Some("totp") {
        return Err(invalid_uri(format!(
            "Unsupported OTP type: {:?}",
            url.host_str()
        )));
    }

    // Path is "/LABEL" or "/ISSUER:LABEL"
    let path = url.path();
    let path = url_decode(path.strip_prefix('/').unwrap_or(path));
    let (path_issuer, label) = match path.split_once(':') {
        Some((iss, label)) => (Some(iss.trim().to_string()), label.trim().to_string()),
        None => (None, path),
    };

    let mut secret = None;
    let mut param_issuer = None;
    let mut algorithm = Algorithm::default();
    let mut digits = 6u32;
    let mut period = 30u32;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "secret" => secret = Some(value.to_string()),
            "issuer" => param_issuer = Some(value.to_string()),
            "algorithm" => {
                algorithm = value
                    .parse()
                    .map_err(|_| invalid_uri(format!("Unsupported algorithm: {}", value)))?;
            }
            "digits" => digits = parse_positive(&key, &value)?,
            "period" => period = parse_positive(&key, &value)?,
            _ => log::debug!("ignoring otpauth parameter '{}'", key),
        }
    }

    let secret = secret
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid_uri("Missing 'secret' parameter"))?;

    // Prefer issuer from query param, then from path prefix
    let issuer = param_issuer.or(path_issuer).filter(|i| !i.is_empty());

    Ok(OtpAuthUri {
        label,
        issuer,
        secret,
        algorithm,
        digits,
        period,
    })
}

fn parse_positive(key: &str, value: &str) -> Result<u32, TotpError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| invalid_uri(format!("'{}' must be a positive integer, got '{}'", key, value)))
}

fn invalid_uri(msg: impl Into<String>) -> TotpError {
    TotpError::new(TotpErrorKind::InvalidUri, msg)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  URL encoding helpers (RFC 3986)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything outside the RFC 3986 unreserved set (`A-Za-z0-9-_.~`).
/// Non-ASCII bytes are always escaped by `percent_encoding`.
const RFC3986_UNRESERVED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode everything except the RFC 3986 unreserved set.
pub fn url_encode(s: &str) -> String {
    utf8_percent_encode(s, RFC3986_UNRESERVED).to_string()
}

fn url_decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Generate URI ─────────────────────────────────────────────

    #[test]
    fn build_exact_field_order() {
        let uri = build_otpauth_uri(
            "alice@example.com",
            "JBSWY3DPEHPK3PXP",
            Some("Example"),
            30,
            Algorithm::Sha1,
            6,
        );
        assert_eq!(
            uri,
            "otpauth://totp/alice%40example.com?secret=JBSWY3DPEHPK3PXP&issuer=Example&period=30&algorithm=SHA1&digits=6"
        );
    }

    #[test]
    fn build_uppercases_algorithm() {
        let uri = build_otpauth_uri("u", "ABC", Some("X"), 60, Algorithm::Sha512, 8);
        assert!(uri.ends_with("&period=60&algorithm=SHA512&digits=8"));
    }

    #[test]
    fn build_encodes_reserved_characters() {
        let uri = build_otpauth_uri("Me & You", "AB", Some("Acme Corp/EU"), 30, Algorithm::Sha256, 6);
        assert_eq!(
            uri,
            "otpauth://totp/Me%20%26%20You?secret=AB&issuer=Acme%20Corp%2FEU&period=30&algorithm=SHA256&digits=6"
        );
    }

    #[test]
    fn build_without_issuer_keeps_empty_param() {
        let uri = build_otpauth_uri("u", "AB", None, 30, Algorithm::Sha1, 6);
        assert!(uri.contains("?secret=AB&issuer=&period=30"));
    }

    // ── URL encoding helpers ─────────────────────────────────────

    #[test]
    fn url_encode_unreserved_passthrough() {
        assert_eq!(url_encode("AZaz09-_.~"), "AZaz09-_.~");
        assert_eq!(url_encode("hello world"), "hello%20world");
        assert_eq!(url_encode("a@b:c"), "a%40b%3Ac");
        assert_eq!(url_encode("é"), "%C3%A9");
        assert_eq!(url_encode("a/b?c=d#e"), "a%2Fb%3Fc%3Dd%23e");
        assert_eq!(url_encode("!$'()*+,;[]"), "%21%24%27%28%29%2A%2B%2C%3B%5B%5D");
        assert_eq!(url_encode("tab\there"), "tab%09here");
    }

    #[test]
    fn url_decode_basic() {
        assert_eq!(url_decode("hello%20world"), "hello world");
        assert_eq!(url_decode("a%40b"), "a@b");
        assert_eq!(url_decode("%C3%A9"), "é");
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
    }

    // ── Parse ────────────────────────────────────────────────────

    #[test]
    fn parse_basic_totp() {
        let uri = "otpauth://totp/Example:alice@example.com?secret=JBSWY3DPEHPK3PXP&issuer=Example";
        let parsed = parse_otpauth_uri(uri).unwrap();
        assert_eq!(parsed.label, "alice@example.com");
        assert_eq!(parsed.issuer.as_deref(), Some("Example"));
        assert_eq!(parsed.secret, "JBSWY3DPEHPK3PXP");
        assert_eq!(parsed.algorithm, Algorithm::Sha1);
        assert_eq!(parsed.digits, 6);
        assert_eq!(parsed.period, 30);
    }

    #[test]
    fn parse_all_params() {
        let uri = "otpauth://totp/GitHub:user?secret=ABC&algorithm=SHA256&digits=8&period=60&issuer=GitHub";
        let parsed = parse_otpauth_uri(uri).unwrap();
        assert_eq!(parsed.algorithm, Algorithm::Sha256);
        assert_eq!(parsed.digits, 8);
        assert_eq!(parsed.period, 60);
        assert_eq!(parsed.issuer.as_deref(), Some("GitHub"));
    }

    #[test]
    fn parse_encoded_chars() {
        let uri = "otpauth://totp/My%20Corp:my%20user?secret=JBSWY3DPEHPK3PXP&issuer=My%20Corp";
        let parsed = parse_otpauth_uri(uri).unwrap();
        assert_eq!(parsed.issuer.as_deref(), Some("My Corp"));
        assert_eq!(parsed.label, "my user");
    }

    #[test]
    fn parse_empty_issuer_is_none() {
        let parsed = parse_otpauth_uri("otpauth://totp/acct?secret=AB&issuer=").unwrap();
        assert!(parsed.issuer.is_none());
        assert_eq!(parsed.label, "acct");
    }

    #[test]
    fn parse_errors() {
        let kind = |u: &str| parse_otpauth_uri(u).unwrap_err().kind;
        assert_eq!(kind("https://example.com"), TotpErrorKind::InvalidUri);
        assert_eq!(kind("otpauth://totp/Test?issuer=X"), TotpErrorKind::InvalidUri);
        assert_eq!(kind("otpauth://hotp/Test?secret=ABC"), TotpErrorKind::InvalidUri);
        assert_eq!(kind("not a url at all"), TotpErrorKind::InvalidUri);
        assert_eq!(kind("otpauth://totp/T?secret=AB&digits=0"), TotpErrorKind::InvalidUri);
        assert_eq!(kind("otpauth://totp/T?secret=AB&period=-5"), TotpErrorKind::InvalidUri);
        assert_eq!(kind("otpauth://totp/T?secret=AB&algorithm=MD5"), TotpErrorKind::InvalidUri);
    }

    #[test]
    fn build_parse_roundtrip() {
        let original = OtpAuthUri {
            label: "user@mail.com".into(),
            issuer: Some("Git Hub".into()),
            secret: "JBSWY3DPEHPK3PXP".into(),
            algorithm: Algorithm::Sha256,
            digits: 8,
            period: 60,
        };
        let parsed = parse_otpauth_uri(&original.to_uri()).unwrap();
        assert_eq!(parsed, original);
    }
}
