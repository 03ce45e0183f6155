//! Environment-driven configuration.
//!
//! Read once at cold start and kept in [`crate::AppState`] for the lifetime
//! of the execution environment.

use std::env;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const ENDPOINT_VAR: &str = "HONEYCOMB_ENDPOINT";
pub const KEY_VAR: &str = "HONEYCOMB_KEY";
pub const KEY_SECRET_VAR: &str = "HONEYCOMB_KEY_SECRET";
pub const KEY_HEADER_VAR: &str = "HONEYCOMB_KEY_HEADER";
pub const COMPRESSION_VAR: &str = "EXPORT_COMPRESSION";
pub const TIMEOUT_VAR: &str = "EXPORT_TIMEOUT_MS";

pub const DEFAULT_KEY_HEADER: &str = "x-honeycomb-team";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Where the delivery credential comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    /// The credential itself, injected through the environment.
    Inline(String),
    /// The id of a Secrets Manager secret holding the credential.
    Secret(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportCompression {
    #[default]
    None,
    Gzip,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwarderConfig {
    pub endpoint: Url,
    pub credential: CredentialSource,
    pub key_header: String,
    pub compression: ExportCompression,
    pub timeout: Duration,
}

impl ForwarderConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let endpoint = get(ENDPOINT_VAR).ok_or(ConfigError::Missing(ENDPOINT_VAR))?;
        let endpoint = Url::parse(&endpoint).map_err(|e| ConfigError::Invalid {
            name: ENDPOINT_VAR,
            reason: e.to_string(),
        })?;

        let credential = match (get(KEY_VAR), get(KEY_SECRET_VAR)) {
            (Some(key), _) => CredentialSource::Inline(key),
            (None, Some(secret_id)) => CredentialSource::Secret(secret_id),
            (None, None) => return Err(ConfigError::Missing(KEY_SECRET_VAR)),
        };

        let key_header = get(KEY_HEADER_VAR)
            .map(|header| header.to_lowercase())
            .unwrap_or_else(|| DEFAULT_KEY_HEADER.to_string());

        let compression = match get(COMPRESSION_VAR).map(|v| v.to_lowercase()).as_deref() {
            None | Some("none") | Some("identity") => ExportCompression::None,
            Some("gzip") => ExportCompression::Gzip,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: COMPRESSION_VAR,
                    reason: format!("unsupported compression {:?}", other),
                });
            }
        };

        let timeout_ms = match get(TIMEOUT_VAR) {
            Some(value) => value.parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: TIMEOUT_VAR,
                reason: e.to_string(),
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        tracing::debug!(
            "Export endpoint {}, compression {:?}, timeout {} ms",
            endpoint,
            compression,
            timeout_ms
        );

        Ok(Self {
            endpoint,
            credential,
            key_header,
            compression,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}
