use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info};
use voice_orchestrator::{
    create_router, AppState, Config, HttpCredentialFetcher, HttpNegotiator, LoopbackFactory,
    SessionConfig, SessionController, ToolRegistry,
};

#[derive(Debug, Parser)]
#[command(name = "voice-orchestrator")]
#[command(about = "Realtime voice session orchestrator")]
struct Args {
    /// Config file, without extension (resolved by the config crate)
    #[arg(long, default_value = "config/voice-orchestrator")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v0.1.0", cfg.service.name);
    info!("Token endpoint: {}", cfg.credential.token_url);
    info!("Realtime endpoint: {}", cfg.realtime.base_url);

    let fetcher = Arc::new(HttpCredentialFetcher::new(cfg.credential.token_url.clone()));
    let negotiator = Arc::new(HttpNegotiator::new(cfg.realtime.base_url.clone()));

    let (factory, mut peers) = match cfg.transport.mode.as_str() {
        "loopback" => LoopbackFactory::with_negotiator(negotiator),
        other => anyhow::bail!("Unsupported transport mode: {}", other),
    };

    // Surface each session's outbound control traffic in the logs
    tokio::spawn(async move {
        while let Some(mut peer) = peers.recv().await {
            tokio::spawn(async move {
                while let Some(message) = peer.recv().await {
                    debug!("Outbound control message: {}", message);
                }
            });
        }
    });

    let session_config = SessionConfig {
        voice_detection: cfg.vad.clone(),
        ..Default::default()
    };

    let controller = Arc::new(SessionController::new(
        session_config,
        fetcher,
        Arc::new(factory),
        Arc::new(ToolRegistry::builtin()),
    ));

    let state = AppState::new(controller);
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP control API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
