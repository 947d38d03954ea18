use crate::protocol::VoiceDetection;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub credential: CredentialConfig,
    pub realtime: RealtimeConfig,
    pub transport: TransportConfig,
    pub vad: VoiceDetection,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct CredentialConfig {
    /// Token-issuing endpoint minting ephemeral session credentials
    pub token_url: String,
}

#[derive(Debug, Deserialize)]
pub struct RealtimeConfig {
    /// Negotiation endpoint of the remote realtime service
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct TransportConfig {
    /// Media transport backend ("loopback")
    pub mode: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
