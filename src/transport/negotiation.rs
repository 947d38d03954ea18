use super::Negotiator;
use crate::credential::Credential;
use anyhow::{Context, Result};
use tracing::info;

/// Offer/answer exchange over HTTP: POST the offer body to
/// `{base_url}?model={model_id}` with the bearer credential and receive the
/// answer body back.
pub struct HttpNegotiator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNegotiator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl Negotiator for HttpNegotiator {
    async fn exchange(&self, offer: &str, credential: &Credential) -> Result<String> {
        let url = format!("{}?model={}", self.base_url, credential.model_id);

        info!("Negotiating session with {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", credential.credential))
            .header("Content-Type", "application/sdp")
            .body(offer.to_string())
            .send()
            .await
            .context("Failed to reach negotiation endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Negotiation endpoint returned status {}: {}", status, body);
        }

        response
            .text()
            .await
            .context("Failed to read negotiation answer")
    }
}
