//! Handshake authentication
//!
//! Ascendex authenticates the WebSocket upgrade with three headers. The
//! signature is `base64(HMAC-SHA256(secret, "<timestamp>+<path>"))`.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio_tungstenite::tungstenite::http::{HeaderMap, HeaderValue};

use crate::error::{ClientError, Result};

type HmacSha256 = Hmac<Sha256>;

pub const AUTH_KEY_HEADER: &str = "x-auth-key";
pub const AUTH_SIGNATURE_HEADER: &str = "x-auth-signature";
pub const AUTH_TIMESTAMP_HEADER: &str = "x-auth-timestamp";

/// API credentials used to sign the handshake
#[derive(Clone)]
pub struct Credentials {
    pub key: String,
    secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Sign a message with this secret
    pub fn sign(&self, message: &str) -> String {
        sign(message, &self.secret)
    }
}

/// Compute the base64 encoded HMAC-SHA256 of `message` keyed by `secret`
pub fn sign(message: &str, secret: &str) -> String {
    // HMAC accepts keys of any length
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC can take key of any size"),
    };
    mac.update(message.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Message covered by the handshake signature
pub fn signing_message(timestamp: i64, path: &str) -> String {
    format!("{timestamp}+{path}")
}

/// Headers attached to the WebSocket upgrade request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeHeaders {
    pub key: String,
    pub signature: String,
    pub timestamp: String,
}

impl HandshakeHeaders {
    /// Build headers for a given millisecond timestamp
    pub fn new(credentials: &Credentials, path: &str, timestamp: i64) -> Self {
        Self {
            key: credentials.key.clone(),
            signature: credentials.sign(&signing_message(timestamp, path)),
            timestamp: timestamp.to_string(),
        }
    }

    /// Build headers stamped with the current time
    pub fn now(credentials: &Credentials, path: &str) -> Self {
        Self::new(credentials, path, chrono::Utc::now().timestamp_millis())
    }

    /// Insert the three auth headers into a request header map
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        headers.insert(AUTH_KEY_HEADER, header_value(AUTH_KEY_HEADER, &self.key)?);
        headers.insert(
            AUTH_SIGNATURE_HEADER,
            header_value(AUTH_SIGNATURE_HEADER, &self.signature)?,
        );
        headers.insert(
            AUTH_TIMESTAMP_HEADER,
            header_value(AUTH_TIMESTAMP_HEADER, &self.timestamp)?,
        );
        Ok(())
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ClientError::Connection(format!("Invalid {} header: {}", name, e)))
}
