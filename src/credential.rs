//! Ephemeral session credentials
//!
//! The credential fetcher is an external collaborator: a token-issuing
//! endpoint that mints a short-lived credential scoped to one session,
//! together with the target model identifier.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// Short-lived credential plus the model it is scoped to
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Bearer-style authorization value
    pub credential: String,

    /// Target model identifier for negotiation
    pub model_id: String,
}

/// Source of ephemeral credentials
#[async_trait::async_trait]
pub trait CredentialFetcher: Send + Sync {
    /// Obtain a fresh credential for one session
    async fn fetch(&self) -> Result<Credential>;
}

/// Fetches credentials from a token-issuing HTTP endpoint
pub struct HttpCredentialFetcher {
    client: reqwest::Client,
    token_url: String,
}

impl HttpCredentialFetcher {
    pub fn new(token_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: token_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl CredentialFetcher for HttpCredentialFetcher {
    async fn fetch(&self) -> Result<Credential> {
        info!("Fetching ephemeral credential from {}", self.token_url);

        let response = self
            .client
            .get(&self.token_url)
            .send()
            .await
            .context("Failed to reach token endpoint")?;

        if !response.status().is_success() {
            anyhow::bail!("Token endpoint returned status {}", response.status());
        }

        let credential: Credential = response
            .json()
            .await
            .context("Failed to parse credential response")?;

        info!("Obtained credential for model {}", credential.model_id);

        Ok(credential)
    }
}

/// Fixed credential, for tests and loopback runs
pub struct StaticCredentialFetcher {
    credential: Credential,
}

impl StaticCredentialFetcher {
    pub fn new(credential: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            credential: Credential {
                credential: credential.into(),
                model_id: model_id.into(),
            },
        }
    }
}

#[async_trait::async_trait]
impl CredentialFetcher for StaticCredentialFetcher {
    async fn fetch(&self) -> Result<Credential> {
        Ok(self.credential.clone())
    }
}
