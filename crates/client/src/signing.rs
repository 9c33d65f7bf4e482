//! Request signing.
//!
//! Two schemes are in use:
//!
//! - Flow API queries carry a `ts` timestamp and an `h` HMAC-SHA1 of the query string,
//!   keyed with the instance API key.
//! - Direct S3 requests carry an `Authorization: AWS <access>:<signature>` header where
//!   the signature is an HMAC-SHA1 over a canonical string built from the request.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::{ClientError, Result};

type HmacSha1 = Hmac<Sha1>;

/// Timestamp format of the `ts` query parameter, always GMT.
const QUERY_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// RFC 1123 date used in S3 `Date` headers.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Base64 HMAC-SHA1 of `payload` keyed with `key`.
pub fn hmac_sha1_base64(key: &[u8], payload: &str) -> Result<String> {
    let mut mac =
        HmacSha1::new_from_slice(key).map_err(|e| ClientError::Signing(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Formats a date for the S3 `Date` header.
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format(HTTP_DATE_FORMAT).to_string()
}

/// Appends the timestamp and HMAC parameters to Flow API queries.
#[derive(Debug, Clone)]
pub struct QuerySigner {
    api_key: String,
}

impl QuerySigner {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Signs `query` (without the leading `?`) at the current time.
    pub fn sign(&self, query: &str) -> Result<String> {
        self.sign_at(query, Utc::now())
    }

    /// Signs `query` as of `now`.
    ///
    /// The HMAC covers the query including the `ts` parameter.
    pub fn sign_at(&self, query: &str, now: DateTime<Utc>) -> Result<String> {
        let timestamp = now.format(QUERY_TIMESTAMP_FORMAT).to_string();
        let signed = if query.is_empty() {
            format!("ts={}", urlencoding::encode(&timestamp))
        } else {
            format!("{query}&ts={}", urlencoding::encode(&timestamp))
        };
        let hash = hmac_sha1_base64(self.api_key.as_bytes(), &signed)?;
        Ok(format!("{signed}&h={}", urlencoding::encode(&hash)))
    }
}

/// HTTP method of a signed storage request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedMethod {
    Get,
    Put,
}

/// Canonical description of a storage request, turned into the string to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRequest<'a> {
    pub method: SignedMethod,
    pub bucket: &'a str,
    pub key: &'a str,
    pub date: &'a str,
    /// Base64 MD5 of the body, PUT only.
    pub content_md5: &'a str,
    pub content_type: &'a str,
    /// Adds the `x-amz-acl:public-read` header to the signature.
    pub public: bool,
}

impl StorageRequest<'_> {
    /// The string covered by the signature.
    pub fn string_to_sign(&self) -> String {
        match self.method {
            SignedMethod::Get => format!("GET\n\n\n{}\n/{}/{}", self.date, self.bucket, self.key),
            SignedMethod::Put if self.public => format!(
                "PUT\n{}\n{}\n{}\nx-amz-acl:public-read\n/{}/{}",
                self.content_md5, self.content_type, self.date, self.bucket, self.key
            ),
            SignedMethod::Put => format!(
                "PUT\n{}\n{}\n{}\n/{}/{}",
                self.content_md5, self.content_type, self.date, self.bucket, self.key
            ),
        }
    }
}

/// Supplies the date and authorization headers of signed storage requests.
pub trait RequestSigner: Send + Sync {
    /// Value of the `Date` header for a request issued now.
    fn date(&self) -> String;

    /// Value of the `Authorization` header for `request`.
    fn authorization(&self, request: &StorageRequest<'_>) -> Result<String>;
}

/// Signs storage requests with an access key pair.
#[derive(Debug, Clone)]
pub struct HmacRequestSigner {
    access_key: String,
    secret_key: String,
}

impl HmacRequestSigner {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl RequestSigner for HmacRequestSigner {
    fn date(&self) -> String {
        http_date(Utc::now())
    }

    fn authorization(&self, request: &StorageRequest<'_>) -> Result<String> {
        let signature = hmac_sha1_base64(self.secret_key.as_bytes(), &request.string_to_sign())?;
        Ok(format!("AWS {}:{}", self.access_key, signature))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 5, 3).unwrap()
    }

    #[test]
    fn test_hmac_sha1_known_vector() {
        // RFC 2202 test case 2
        let signature = hmac_sha1_base64(b"Jefe", "what do ya want for nothing?").unwrap();
        assert_eq!(signature, "7/zfauXrL6LSdBbV8YTfnCWafHk=");
    }

    #[test]
    fn test_http_date_format() {
        assert_eq!(http_date(fixed_time()), "Wed, 01 May 2024 09:05:03 GMT");
    }

    #[test]
    fn test_query_signer_appends_ts_then_h() {
        let signer = QuerySigner::new("secret");
        let signed = signer.sign_at("androidId=abc&surveyId=7", fixed_time()).unwrap();

        let expected_prefix = "androidId=abc&surveyId=7&ts=2024%2F05%2F01%2009%3A05%3A03";
        assert!(signed.starts_with(expected_prefix));

        let hash = hmac_sha1_base64(b"secret", expected_prefix).unwrap();
        assert!(signed.ends_with(&format!("&h={}", urlencoding::encode(&hash))));
    }

    #[test]
    fn test_query_signer_with_empty_query() {
        let signed = QuerySigner::new("k").sign_at("", fixed_time()).unwrap();
        assert!(signed.starts_with("ts=2024%2F05%2F01"));
    }

    #[test]
    fn test_string_to_sign_variants() {
        let base = StorageRequest {
            method: SignedMethod::Put,
            bucket: "flow-bucket",
            key: "images/a.jpg",
            date: "Wed, 01 May 2024 09:05:03 GMT",
            content_md5: "md5==",
            content_type: "image/jpeg",
            public: true,
        };
        assert_eq!(
            base.string_to_sign(),
            "PUT\nmd5==\nimage/jpeg\nWed, 01 May 2024 09:05:03 GMT\nx-amz-acl:public-read\n/flow-bucket/images/a.jpg"
        );

        let private = StorageRequest {
            public: false,
            key: "devicezip/a.zip",
            content_type: "application/zip",
            ..base.clone()
        };
        assert_eq!(
            private.string_to_sign(),
            "PUT\nmd5==\napplication/zip\nWed, 01 May 2024 09:05:03 GMT\n/flow-bucket/devicezip/a.zip"
        );

        let get = StorageRequest {
            method: SignedMethod::Get,
            ..base
        };
        assert_eq!(
            get.string_to_sign(),
            "GET\n\n\nWed, 01 May 2024 09:05:03 GMT\n/flow-bucket/images/a.jpg"
        );
    }

    #[test]
    fn test_authorization_header_shape() {
        let signer = HmacRequestSigner::new("AKIA", "secret");
        let request = StorageRequest {
            method: SignedMethod::Get,
            bucket: "b",
            key: "k",
            date: "d",
            content_md5: "",
            content_type: "",
            public: false,
        };
        let expected = hmac_sha1_base64(b"secret", "GET\n\n\nd\n/b/k").unwrap();
        assert_eq!(
            signer.authorization(&request).unwrap(),
            format!("AWS AKIA:{expected}")
        );
    }
}
