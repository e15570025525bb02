//! cloud::signer
//!
//! OCI HTTP Signature request signing.
//!
//! # Scheme
//!
//! Every OCI API request carries an `Authorization` header of the form:
//!
//! ```text
//! Signature version="1",keyId="<tenancy>/<user>/<fingerprint>",algorithm="rsa-sha256",
//!           headers="date (request-target) host",signature="<base64>"
//! ```
//!
//! The signature is RSA PKCS#1 v1.5 over SHA-256 of the signing string,
//! which is one `name: value` line per signed header. Requests with a body
//! (POST/PUT) additionally sign `content-length`, `content-type` and
//! `x-content-sha256` (base64 SHA-256 of the body).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, DATE};
use reqwest::{Method, Url};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::traits::CloudError;
use crate::core::config::{ConfigError, OciProfile};

/// Headers signed on every request.
const BASE_HEADERS: [&str; 3] = ["date", "(request-target)", "host"];

/// Additional headers signed on requests with a body.
const BODY_HEADERS: [&str; 3] = ["content-length", "content-type", "x-content-sha256"];

/// Signs OCI API requests with one API key.
pub struct RequestSigner {
    key_id: String,
    signing_key: SigningKey<Sha256>,
}

// Custom Debug to avoid exposing key material
impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    /// Load the profile's private key and build a signer.
    ///
    /// # Errors
    ///
    /// - `ConfigError::KeyFileError` if the key file cannot be read
    /// - `ConfigError::InvalidKey` if the key is encrypted or not an RSA PEM key
    pub fn from_profile(profile: &OciProfile) -> Result<Self, ConfigError> {
        let path = profile.key_file.as_path();
        if profile.pass_phrase.is_some() {
            return Err(ConfigError::InvalidKey {
                path: path.to_path_buf(),
                message: "encrypted keys (pass_phrase) are not supported".into(),
            });
        }

        let pem = fs::read_to_string(path).map_err(|e| ConfigError::KeyFileError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_pem(profile.key_id(), &pem, path)
    }

    /// Build a signer from PEM text (PKCS#1 or PKCS#8).
    ///
    /// `path` is only used in error messages.
    pub fn from_pem(key_id: String, pem: &str, path: &Path) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidKey {
            path: path.to_path_buf(),
            message,
        };

        if pem.contains("ENCRYPTED") {
            return Err(invalid("encrypted keys are not supported".into()));
        }

        let key = if pem.contains("BEGIN RSA PRIVATE KEY") {
            RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| invalid(e.to_string()))?
        } else {
            RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| invalid(e.to_string()))?
        };

        Ok(Self {
            key_id,
            signing_key: SigningKey::<Sha256>::new(key),
        })
    }

    /// The `keyId` this signer uses.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Produce the headers that sign a request sent now.
    ///
    /// The returned map holds `date`, `authorization` and, when `body` is
    /// given, `content-type`, `content-length` and `x-content-sha256`.
    pub fn sign(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&[u8]>,
    ) -> Result<HeaderMap, CloudError> {
        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        self.sign_at(method, url, body, &date)
    }

    /// Like [`sign`](Self::sign) with a fixed `date` header value.
    pub fn sign_at(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&[u8]>,
        date: &str,
    ) -> Result<HeaderMap, CloudError> {
        let host = host_header(url)?;
        let mut lines = vec![
            format!("date: {date}"),
            format!("(request-target): {}", request_target(method, url)),
            format!("host: {host}"),
        ];
        let mut signed: Vec<&str> = BASE_HEADERS.to_vec();
        let mut headers = HeaderMap::new();

        let body_headers = body.map(|b| {
            let digest = BASE64.encode(Sha256::digest(b));
            (b.len().to_string(), digest)
        });
        if let Some((length, digest)) = &body_headers {
            lines.push(format!("content-length: {length}"));
            lines.push("content-type: application/json".to_string());
            lines.push(format!("x-content-sha256: {digest}"));
            signed.extend(BODY_HEADERS);

            headers.insert(CONTENT_LENGTH, header_value(length)?);
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            headers.insert("x-content-sha256", header_value(digest)?);
        }

        let signing_string = lines.join("\n");
        let signature = self.signing_key.sign(signing_string.as_bytes());
        let authorization = format!(
            "Signature version=\"1\",keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"{}\",signature=\"{}\"",
            self.key_id,
            signed.join(" "),
            BASE64.encode(signature.to_bytes())
        );

        headers.insert(DATE, header_value(date)?);
        headers.insert(AUTHORIZATION, header_value(&authorization)?);
        Ok(headers)
    }
}

/// The `(request-target)` pseudo-header: lowercase method, path and query.
fn request_target(method: &Method, url: &Url) -> String {
    let method = method.as_str().to_ascii_lowercase();
    match url.query() {
        Some(query) => format!("{} {}?{}", method, url.path(), query),
        None => format!("{} {}", method, url.path()),
    }
}

/// Host header as the HTTP client sends it (port only when non-default).
fn host_header(url: &Url) -> Result<String, CloudError> {
    let host = url
        .host_str()
        .ok_or_else(|| CloudError::Signing(format!("URL has no host: {url}")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn header_value(value: &str) -> Result<HeaderValue, CloudError> {
    HeaderValue::from_str(value).map_err(|e| CloudError::Signing(e.to_string()))
}
