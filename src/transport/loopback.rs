use super::{
    control_channel, ControlReceiver, ControlSender, MediaTransport, Negotiator, TransportFactory,
    TransportSession, CONTROL_CHANNEL_CAPACITY,
};
use crate::credential::Credential;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

/// In-process media transport backed by channel pairs.
///
/// Plays the remote service's side of the connection so the orchestration
/// logic can be exercised end to end without any media stack: tests and
/// local runs drive the session through the returned `RemotePeer`.
pub struct LoopbackTransport {
    answer: Option<String>,
    channel: Option<(ControlSender, ControlReceiver)>,
}

impl LoopbackTransport {
    pub fn new() -> (Self, RemotePeer) {
        let (out_tx, out_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
        let (in_tx, in_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);

        let transport = Self {
            answer: None,
            channel: Some(control_channel(out_tx, in_rx)),
        };

        let peer = RemotePeer {
            outbound: out_rx,
            inbound: in_tx,
        };

        (transport, peer)
    }
}

#[async_trait::async_trait]
impl MediaTransport for LoopbackTransport {
    async fn create_offer(&mut self) -> Result<String> {
        Ok("v=0 loopback-offer".to_string())
    }

    async fn accept_answer(&mut self, answer: &str) -> Result<()> {
        self.answer = Some(answer.to_string());
        Ok(())
    }

    async fn open_control_channel(&mut self) -> Result<(ControlSender, ControlReceiver)> {
        self.channel
            .take()
            .ok_or_else(|| anyhow::anyhow!("Control channel already opened"))
    }

    async fn close(&mut self) -> Result<()> {
        // Dropping the channel halves is all the teardown there is
        self.channel = None;
        Ok(())
    }
}

/// The remote side of a loopback connection
pub struct RemotePeer {
    outbound: mpsc::Receiver<String>,
    inbound: mpsc::Sender<String>,
}

impl RemotePeer {
    /// Next message the session sent toward the remote service
    pub async fn recv(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    /// Next outbound message parsed as JSON
    pub async fn recv_json(&mut self) -> Option<serde_json::Value> {
        let raw = self.outbound.recv().await?;
        serde_json::from_str(&raw).ok()
    }

    /// Inject a raw inbound message, as if the remote service sent it
    pub async fn push(&self, raw: impl Into<String>) {
        let _ = self.inbound.send(raw.into()).await;
    }

    /// Inject a JSON inbound message
    pub async fn push_json(&self, value: &serde_json::Value) {
        self.push(value.to_string()).await;
    }
}

/// Negotiator that answers offers locally
pub struct LoopbackNegotiator;

#[async_trait::async_trait]
impl Negotiator for LoopbackNegotiator {
    async fn exchange(&self, _offer: &str, credential: &Credential) -> Result<String> {
        Ok(format!("v=0 loopback-answer model={}", credential.model_id))
    }
}

/// Factory producing loopback transports; the matching `RemotePeer` for each
/// created session is delivered on the handle returned by `new`.
pub struct LoopbackFactory {
    peers: mpsc::UnboundedSender<RemotePeer>,
    negotiator: Arc<dyn Negotiator>,
}

impl LoopbackFactory {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RemotePeer>) {
        Self::with_negotiator(Arc::new(LoopbackNegotiator))
    }

    /// Loopback media with a caller-supplied negotiation strategy
    pub fn with_negotiator(
        negotiator: Arc<dyn Negotiator>,
    ) -> (Self, mpsc::UnboundedReceiver<RemotePeer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                peers: tx,
                negotiator,
            },
            rx,
        )
    }
}

#[async_trait::async_trait]
impl TransportFactory for LoopbackFactory {
    async fn create(&self) -> Result<TransportSession> {
        let (media, peer) = LoopbackTransport::new();
        // Nobody holding the peer handle just means outbound messages go
        // unobserved; sends stay silently dropped either way.
        let _ = self.peers.send(peer);
        Ok(TransportSession::new(
            Box::new(media),
            Arc::clone(&self.negotiator),
        ))
    }
}
