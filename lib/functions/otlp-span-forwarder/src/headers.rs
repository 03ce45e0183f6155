//! Header management for export requests.
//!
//! Every export carries the content headers of the encoded payload and the
//! backend credential.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::str::FromStr;

use crate::error::DeliveryError;
use crate::telemetry::TelemetryData;

pub const CONTENT_TYPE_HEADER: &str = "content-type";
pub const CONTENT_ENCODING_HEADER: &str = "content-encoding";

/// Headers builder for outgoing export requests.
#[derive(Debug, Default)]
pub struct ExportHeaders(HeaderMap);

impl ExportHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds content-type and content-encoding from the encoded payload.
    pub fn with_telemetry(mut self, telemetry: &TelemetryData) -> Result<Self, DeliveryError> {
        if !telemetry.content_type.is_empty() {
            self.0.insert(
                HeaderName::from_static(CONTENT_TYPE_HEADER),
                header_value(&telemetry.content_type)?,
            );
        }
        if let Some(content_encoding) = &telemetry.content_encoding {
            self.0.insert(
                HeaderName::from_static(CONTENT_ENCODING_HEADER),
                header_value(content_encoding)?,
            );
        }
        Ok(self)
    }

    /// Adds the backend credential under the configured header name.
    pub fn with_api_key(mut self, header: &str, api_key: &str) -> Result<Self, DeliveryError> {
        let name = HeaderName::from_str(header)
            .map_err(|e| DeliveryError::Headers(format!("Invalid header name {}: {}", header, e)))?;
        let mut value = header_value(api_key)?;
        value.set_sensitive(true);
        self.0.insert(name, value);
        Ok(self)
    }

    /// Finalizes the headers and returns the underlying HeaderMap.
    pub fn build(self) -> HeaderMap {
        self.0
    }
}

fn header_value(value: &str) -> Result<HeaderValue, DeliveryError> {
    HeaderValue::from_str(value)
        .map_err(|e| DeliveryError::Headers(format!("Invalid header value: {}", e)))
}
