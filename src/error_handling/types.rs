//! Error type definitions.
//!
//! This module defines the error types returned by the request pipeline, the
//! file store and initialization code.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Errors produced while building, sending or decoding a request.
#[derive(Error, Debug)]
pub enum HttpToolError {
    /// The request URL could not be parsed.
    #[error("Invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A header name or value is not a valid HTTP token.
    #[error("Invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The caller declared a `Content-Type` the encoder cannot produce.
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// The body shape cannot be encoded (with the declared or inferred content type).
    #[error("Body cannot be encoded: {0}")]
    UnencodableBody(String),

    /// The round trip failed at the transport level.
    #[error("Network error ({kind}) for {url}: {source}")]
    Network {
        kind: NetworkErrorKind,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Reading the response body failed; any partial data was discarded.
    #[error("Failed to read response body: {0}")]
    Read(#[source] std::io::Error),

    /// The response body is not a JSON object.
    #[error("Failed to decode response body as a JSON object: {0}")]
    Decode(String),

    /// The HTML parser reported errors (strict decoding only).
    #[error("Failed to parse HTML document: {0}")]
    Parse(String),

    /// The client backed by a cookie jar could not be constructed.
    #[error("Cookie jar client initialization error: {0}")]
    JarInit(#[source] reqwest::Error),

    /// The client could not be constructed.
    #[error("HTTP client initialization error: {0}")]
    ClientInit(#[source] reqwest::Error),

    /// The response body was already consumed by an earlier decode.
    #[error("Response body stream already consumed")]
    StreamClosed,
}

/// Transport failure categories surfaced by `HttpToolError::Network`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum NetworkErrorKind {
    Timeout,
    ConnectionRefused,
    TlsFailure,
    Other,
}

impl std::fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NetworkErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::ConnectionRefused => "connection refused",
            NetworkErrorKind::TlsFailure => "TLS failure",
            NetworkErrorKind::Other => "other",
        }
    }
}

/// Errors from the file store helpers.
#[derive(Error, Debug)]
pub enum FileStoreError {
    /// Filesystem access failed.
    #[error("File I/O error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid JSON for the requested type, or the value
    /// could not be serialized.
    #[error("JSON error for {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}
