//! Object storage clients.
//!
//! [`S3ProxyStore`] talks to the instance's storage proxy, which needs no request
//! signing. [`S3Store`] talks to an S3 bucket directly and delegates signatures to a
//! [`RequestSigner`](crate::signing::RequestSigner).

mod proxy;
mod signed;

pub use proxy::S3ProxyStore;
pub use signed::S3Store;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{ClientError, Result};

/// MD5 digests of an upload body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BodyDigest {
    /// Lowercase hex, compared against the returned ETag.
    pub hex: String,
    /// Base64, sent as `Content-MD5`.
    pub base64: String,
}

impl BodyDigest {
    pub fn of(bytes: &[u8]) -> Self {
        let digest = md5::compute(bytes);
        Self {
            hex: format!("{digest:x}"),
            base64: STANDARD.encode(digest.0),
        }
    }
}

/// Checks the ETag returned for an upload against the local MD5.
pub(crate) fn verify_etag(filename: &str, expected_hex: &str, etag: Option<&str>) -> Result<()> {
    let actual = etag.map(|e| e.trim().trim_matches('"')).unwrap_or_default();
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(ClientError::EtagMismatch {
            filename: filename.to_string(),
            expected: expected_hex.to_string(),
            actual: actual.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_digest() {
        let digest = BodyDigest::of(b"hello");
        assert_eq!(digest.hex, "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(digest.base64, "XUFAKrxLKna5cZ2REBfFkg==");
    }

    #[test]
    fn test_verify_etag_strips_quotes() {
        assert!(verify_etag("a.zip", "abc123", Some("\"abc123\"")).is_ok());
        assert!(verify_etag("a.zip", "abc123", Some("ABC123")).is_ok());
    }

    #[test]
    fn test_verify_etag_mismatch() {
        let err = verify_etag("a.zip", "abc123", Some("\"zzz\"")).unwrap_err();
        match err {
            ClientError::EtagMismatch {
                filename, actual, ..
            } => {
                assert_eq!(filename, "a.zip");
                assert_eq!(actual, "zzz");
            }
            other => panic!("Expected EtagMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_etag_missing_header() {
        assert!(verify_etag("a.zip", "abc123", None).is_err());
    }
}
