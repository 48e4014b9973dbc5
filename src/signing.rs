//! Signed request construction for the vendor update-check API.
//!
//! The service authenticates a request by recomputing an HMAC-SHA256 over a
//! canonical description of it:
//!
//! ```text
//! {"host":"<host>","request_uri":"<path>","method":"<METHOD>","body":"<body>"}
//! ```
//!
//! encoded with [`EncodeOptions::CANONICAL`] and keyed by the access token
//! secret. The hex digest travels both as a `signature` query parameter and
//! in the signature header. Because the server recomputes it independently,
//! the signature must be a pure function of host, path, method, body, and
//! secret, and must be recomputed whenever any of them changes. A
//! [`SignedRequest`] owns its body for that reason.

use hmac::{Hmac, Mac};
use reqwest::{Method, Url};
use serde::Serialize;
use sha2::Sha256;

use crate::core::MirrorError;
use crate::json::{self, EncodeOptions};

type HmacSha256 = Hmac<Sha256>;

/// Canonical request description, serialized in field order.
#[derive(Serialize)]
struct CanonicalRequest<'a> {
    host: &'a str,
    request_uri: &'a str,
    method: &'a str,
    body: &'a str,
}

/// A request whose body is frozen and whose signature covers it.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    url: Url,
    host: String,
    path: String,
    method: Method,
    body: String,
    signature: String,
}

impl SignedRequest {
    /// Sign `body` sent with `method` to `url`.
    ///
    /// # Errors
    ///
    /// [`MirrorError::InvalidUrl`] when `url` does not parse or has no host.
    pub fn new(
        url: &str,
        method: Method,
        body: impl Into<String>,
        secret: &str,
    ) -> Result<Self, MirrorError> {
        let url = Url::parse(url).map_err(|e| MirrorError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let host = url
            .host_str()
            .ok_or_else(|| MirrorError::InvalidUrl {
                url: url.to_string(),
                reason: "URL has no host".to_string(),
            })?
            .to_string();
        let path = url.path().to_string();
        let body = body.into();
        let signature = sign(&host, &path, method.as_str(), &body, secret)?;

        Ok(Self {
            url,
            host,
            path,
            method,
            body,
            signature,
        })
    }

    /// Target URL without authentication parameters.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Host the signature covers.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path the signature covers.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP method the signature covers.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request body the signature covers.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Lowercase hex HMAC-SHA256 signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Target URL with `token` and `signature` query parameters appended.
    pub fn signed_url(&self, token: &str) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("token", token)
            .append_pair("signature", &self.signature);
        url
    }
}

/// Canonical encoding of a request, the exact bytes that get signed.
pub fn canonical_request(
    host: &str,
    path: &str,
    method: &str,
    body: &str,
) -> Result<String, MirrorError> {
    let canonical = CanonicalRequest {
        host,
        request_uri: path,
        method,
        body,
    };
    Ok(json::encode(&canonical, EncodeOptions::CANONICAL)?)
}

/// Signature over the canonical encoding of a request.
pub fn sign(
    host: &str,
    path: &str,
    method: &str,
    body: &str,
    secret: &str,
) -> Result<String, MirrorError> {
    let message = canonical_request(host, path, method, body)?;
    hmac_sha256_hex(secret.as_bytes(), message.as_bytes())
}

/// Lowercase hex HMAC-SHA256 of `message` keyed by `key`.
pub fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> Result<String, MirrorError> {
    let mac = HmacSha256::new_from_slice(key).map_err(|e| MirrorError::InvalidInput {
        name: "woo-access-token-secret".to_string(),
        reason: e.to_string(),
    })?;
    Ok(hex::encode(mac.chain_update(message).finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://woocommerce.com/wp-json/helper/1.0/update-check";
    const BODY: &str = r#"{"products":{"18734":{"product_id":"18734","file_id":""}}}"#;

    #[test]
    fn test_hmac_rfc4231_case_2() {
        let digest = hmac_sha256_hex(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(digest, "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843");
    }

    #[test]
    fn test_canonical_request_encoding() {
        let canonical =
            canonical_request("woocommerce.com", "/wp-json/helper/1.0/update-check", "POST", r#"{"a":""}"#)
                .unwrap();
        assert_eq!(
            canonical,
            r#"{"host":"woocommerce.com","request_uri":"\/wp-json\/helper\/1.0\/update-check","method":"POST","body":"{\"a\":\"\"}"}"#
        );
    }

    #[test]
    fn test_signature_is_hmac_of_canonical_request() {
        let request = SignedRequest::new(URL, Method::POST, BODY, "secret").unwrap();
        let expected = hmac_sha256_hex(
            b"secret",
            canonical_request(request.host(), request.path(), "POST", BODY).unwrap().as_bytes(),
        )
        .unwrap();
        assert_eq!(request.signature(), expected);
        assert_eq!(request.signature().len(), 64);
        assert_eq!(request.host(), "woocommerce.com");
        assert_eq!(request.path(), "/wp-json/helper/1.0/update-check");
    }

    #[test]
    fn test_signing_is_deterministic() {
        let first = SignedRequest::new(URL, Method::POST, BODY, "secret").unwrap();
        let second = SignedRequest::new(URL, Method::POST, BODY, "secret").unwrap();
        assert_eq!(first.signature(), second.signature());
    }

    #[test]
    fn test_each_input_changes_signature() {
        let base = sign("woocommerce.com", "/a", "POST", BODY, "secret").unwrap();
        let variants = [
            sign("example.com", "/a", "POST", BODY, "secret").unwrap(),
            sign("woocommerce.com", "/b", "POST", BODY, "secret").unwrap(),
            sign("woocommerce.com", "/a", "GET", BODY, "secret").unwrap(),
            sign("woocommerce.com", "/a", "POST", "{}", "secret").unwrap(),
            sign("woocommerce.com", "/a", "POST", BODY, "other").unwrap(),
        ];
        for variant in variants {
            assert_ne!(variant, base);
        }
    }

    #[test]
    fn test_query_string_is_not_signed() {
        let plain = SignedRequest::new(URL, Method::POST, BODY, "secret").unwrap();
        let with_query =
            SignedRequest::new(&format!("{URL}?lang=en"), Method::POST, BODY, "secret").unwrap();
        assert_eq!(plain.signature(), with_query.signature());
    }

    #[test]
    fn test_signed_url_carries_token_and_signature() {
        let request = SignedRequest::new(URL, Method::POST, BODY, "secret").unwrap();
        let url = request.signed_url("ck_a+b");
        let pairs: Vec<(String, String)> =
            url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
        assert_eq!(
            pairs,
            vec![
                ("token".to_string(), "ck_a+b".to_string()),
                ("signature".to_string(), request.signature().to_string()),
            ]
        );
        assert!(url.as_str().starts_with(URL));
        assert!(url.as_str().contains("token=ck_a%2Bb"));
    }

    #[test]
    fn test_url_without_host_is_rejected() {
        let err = SignedRequest::new("not a url", Method::POST, BODY, "secret").unwrap_err();
        assert!(matches!(err, MirrorError::InvalidUrl { .. }));
    }
}
