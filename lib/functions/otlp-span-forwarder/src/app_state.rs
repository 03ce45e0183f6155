//! Process-lifetime state.
//!
//! Built once per execution environment and passed by reference into every
//! invocation. Nothing in here changes between invocations.

use anyhow::{Context, Result};
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use reqwest::Client as ReqwestClient;
use tracing::instrument;

use crate::config::{CredentialSource, ForwarderConfig};

pub struct AppState {
    pub http_client: ReqwestClient,
    pub config: ForwarderConfig,
    pub api_key: String,
}

impl AppState {
    /// Loads configuration and resolves the delivery credential.
    pub async fn new() -> Result<Self> {
        let config = ForwarderConfig::from_env()?;

        let api_key = match &config.credential {
            CredentialSource::Inline(key) => {
                tracing::info!("Using delivery credential from the environment");
                key.clone()
            }
            CredentialSource::Secret(secret_id) => {
                let aws_config = aws_config::load_from_env().await;
                let client = SecretsManagerClient::new(&aws_config);
                fetch_api_key(&client, secret_id).await?
            }
        };

        Self::with_api_key(config, api_key)
    }

    /// Builds the state from an already resolved credential.
    pub fn with_api_key(config: ForwarderConfig, api_key: String) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            config,
            api_key,
        })
    }
}

/// Fetches the delivery credential from AWS Secrets Manager.
#[instrument(skip(client))]
async fn fetch_api_key(client: &SecretsManagerClient, secret_id: &str) -> Result<String> {
    tracing::info!("Loading delivery credential from secret: {}", secret_id);

    let response = client
        .get_secret_value()
        .secret_id(secret_id)
        .send()
        .await
        .with_context(|| format!("Failed to fetch secret {}", secret_id))?;

    let api_key = response
        .secret_string()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .with_context(|| format!("Secret {} has no string value", secret_id))?;

    Ok(api_key.to_string())
}
