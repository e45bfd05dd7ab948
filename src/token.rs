// src/token.rs

//! `Authorization` header parsing for the Negotiate scheme.

use base64::Engine as _;
use bytes::Bytes;
use http::HeaderValue;

/// Result of examining the request's `Authorization` header.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Extracted {
    /// No header present. The expected first leg of the RFC 4559 flow; the
    /// caller answers with a `401` challenge, not an error.
    Missing,
    /// Header present but not a well-formed `Negotiate <base64>` value.
    /// Carries the raw header for server-side logging only.
    Malformed(String),
    /// The decoded negotiation token.
    Token(Bytes),
}

const SCHEME_PREFIX: &str = "Negotiate ";

/// Parse the `Authorization` header into a negotiation token or a terminal
/// outcome. No engine call is made on the `Missing` and `Malformed` paths.
pub(crate) fn extract(header: Option<&HeaderValue>) -> Extracted {
    let value = match header {
        Some(value) => value,
        None => return Extracted::Missing,
    };

    let raw = match value.to_str() {
        Ok(raw) => raw,
        Err(_) => return Extracted::Malformed(String::from_utf8_lossy(value.as_bytes()).into_owned()),
    };

    let payload = match raw.strip_prefix(SCHEME_PREFIX) {
        Some(payload) => payload,
        None => return Extracted::Malformed(raw.to_owned()),
    };

    match base64::engine::general_purpose::STANDARD.decode(payload.trim()) {
        Ok(decoded) => Extracted::Token(Bytes::from(decoded)),
        Err(_) => Extracted::Malformed(raw.to_owned()),
    }
}
