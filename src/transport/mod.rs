//! Media transport and control channel
//!
//! The orchestration logic never touches a concrete media stack. It depends
//! on two narrow capabilities:
//!
//! - `MediaTransport`: generate a connection offer, accept the remote
//!   answer, and expose the bidirectional control channel.
//! - `Negotiator`: exchange the offer for an answer with the remote service
//!   (bearer-authorized request/response).
//!
//! `TransportSession` composes the two and owns the connection lifecycle, so
//! the session controller can be exercised with the loopback transport in
//! tests exactly like a real one.

mod loopback;
mod negotiation;

pub use loopback::{LoopbackFactory, LoopbackNegotiator, LoopbackTransport, RemotePeer};
pub use negotiation::HttpNegotiator;

use crate::credential::Credential;
use crate::protocol::ClientEvent;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Buffered messages per channel direction
pub const CONTROL_CHANNEL_CAPACITY: usize = 64;

/// Sending half of the control channel.
///
/// Cloneable, but all clones belong to one session's dispatch path: the
/// controller, router and dispatcher are the channel's single logical
/// writer. Sends after the transport is gone are silently dropped so that
/// late handler completions never error against a destroyed channel.
#[derive(Clone)]
pub struct ControlSender {
    tx: mpsc::Sender<String>,
}

impl ControlSender {
    /// Serialize and send one control event
    pub async fn send_event(&self, event: &ClientEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Failed to serialize control event: {}", e);
                return;
            }
        };

        if self.tx.send(payload).await.is_err() {
            debug!("Control channel closed; dropping outbound message");
        }
    }
}

/// Receiving half of the control channel
pub struct ControlReceiver {
    rx: mpsc::Receiver<String>,
}

impl ControlReceiver {
    /// Next inbound raw message; `None` once the channel is closed
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

/// Build a paired sender/receiver over raw `String` endpoints.
///
/// `outbound` carries messages toward the remote peer, `inbound` delivers
/// messages from it.
pub fn control_channel(
    outbound: mpsc::Sender<String>,
    inbound: mpsc::Receiver<String>,
) -> (ControlSender, ControlReceiver) {
    (ControlSender { tx: outbound }, ControlReceiver { rx: inbound })
}

/// Media-layer capability: offer/answer handling plus the message channel
#[async_trait::async_trait]
pub trait MediaTransport: Send {
    /// Generate the local connection offer
    async fn create_offer(&mut self) -> Result<String>;

    /// Apply the remote answer
    async fn accept_answer(&mut self, answer: &str) -> Result<()>;

    /// Open the bidirectional control channel (valid once per connection)
    async fn open_control_channel(&mut self) -> Result<(ControlSender, ControlReceiver)>;

    /// Tear the connection down
    async fn close(&mut self) -> Result<()>;
}

/// Offer/answer exchange with the remote service
#[async_trait::async_trait]
pub trait Negotiator: Send + Sync {
    /// Exchange the local offer for the remote answer
    async fn exchange(&self, offer: &str, credential: &Credential) -> Result<String>;
}

/// Owns one negotiated connection: media endpoint + negotiation strategy
pub struct TransportSession {
    media: Box<dyn MediaTransport>,
    negotiator: Arc<dyn Negotiator>,
}

impl TransportSession {
    pub fn new(media: Box<dyn MediaTransport>, negotiator: Arc<dyn Negotiator>) -> Self {
        Self { media, negotiator }
    }

    /// Run the offer/answer exchange and open the control channel
    pub async fn negotiate(
        &mut self,
        credential: &Credential,
    ) -> Result<(ControlSender, ControlReceiver)> {
        let offer = self
            .media
            .create_offer()
            .await
            .context("Failed to create connection offer")?;

        let answer = self
            .negotiator
            .exchange(&offer, credential)
            .await
            .context("Offer/answer exchange failed")?;

        self.media
            .accept_answer(&answer)
            .await
            .context("Failed to accept connection answer")?;

        info!("Transport negotiated for model {}", credential.model_id);

        self.media
            .open_control_channel()
            .await
            .context("Failed to open control channel")
    }

    /// Release the connection; safe to call on a never-negotiated session
    pub async fn close(&mut self) {
        if let Err(e) = self.media.close().await {
            debug!("Transport close reported: {}", e);
        }
    }
}

/// Creates a fresh transport for each session start
#[async_trait::async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(&self) -> Result<TransportSession>;
}
