//! Error types for each pipeline stage.
//!
//! Only [`DeliveryError`] escapes a pipeline run. The other stage errors are
//! absorbed by the driver, tallied and logged.

use thiserror::Error;

/// A transport record whose payload could not be unwrapped.
#[derive(Debug, Error)]
pub enum DecompressionError {
    #[error("Failed to decode base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to decompress gzip payload: {0}")]
    Gzip(#[from] std::io::Error),

    #[error("Decompressed payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A decompressed batch that is not a log subscription document.
#[derive(Debug, Error)]
#[error("Failed to parse log batch: {source}")]
pub struct BatchParseError {
    #[from]
    source: serde_json::Error,
}

/// A log line that could not be turned into a span.
///
/// Every variant keeps the original message so the driver can log it.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The line is not JSON at all (runtime START/END lines, plain prints).
    #[error("Log line is not JSON: {reason}")]
    NotJson { message: String, reason: String },

    /// The line is JSON but does not have the shape of a span.
    #[error("Log line is not a span: {reason}")]
    NotSpan { message: String, reason: String },

    /// The line has the shape of a span but a field holds an unusable value.
    #[error("Invalid span field `{field}`: {reason}")]
    InvalidField {
        message: String,
        field: &'static str,
        reason: String,
    },
}

impl TransformError {
    /// The log line that failed to transform.
    pub fn message(&self) -> &str {
        match self {
            Self::NotJson { message, .. }
            | Self::NotSpan { message, .. }
            | Self::InvalidField { message, .. } => message,
        }
    }
}

/// The export could not be delivered. Fatal for the run.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Failed to build export headers: {0}")]
    Headers(String),

    #[error("Failed to compress export payload: {0}")]
    Compression(#[source] std::io::Error),

    #[error("Failed to send export request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Export rejected. Status: {status}, Error: {body}")]
    Status { status: u16, body: String },
}

/// Missing or unusable configuration at bootstrap.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
