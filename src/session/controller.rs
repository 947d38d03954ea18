use super::{SessionConfig, SessionState};
use crate::credential::CredentialFetcher;
use crate::dispatcher::FunctionCallDispatcher;
use crate::error::SessionError;
use crate::protocol::ClientEvent;
use crate::router::ControlRouter;
use crate::tools::ToolRegistry;
use crate::transcript::{TranscriptEntry, TranscriptLog};
use crate::transport::{TransportFactory, TransportSession};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Resources of one active session
struct ActiveSession {
    transport: TransportSession,

    /// Event-loop task draining the inbound control channel
    task: JoinHandle<()>,
}

/// Top-level session state machine.
///
/// Owns the transcript log (which survives session teardown) and at most one
/// non-terminal session at a time. All inbound control messages are handled
/// by a single event-loop task in arrival order.
pub struct SessionController {
    config: SessionConfig,
    fetcher: Arc<dyn CredentialFetcher>,
    factory: Arc<dyn TransportFactory>,
    registry: Arc<ToolRegistry>,
    transcript: Arc<TranscriptLog>,
    state: Arc<RwLock<SessionState>>,
    active: Mutex<Option<ActiveSession>>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        fetcher: Arc<dyn CredentialFetcher>,
        factory: Arc<dyn TransportFactory>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            config,
            fetcher,
            factory,
            registry,
            transcript: Arc::new(TranscriptLog::new()),
            state: Arc::new(RwLock::new(SessionState::Idle)),
            active: Mutex::new(None),
        }
    }

    /// Start a session: fetch a credential, negotiate the transport, send
    /// the one-shot configuration message and spawn the event loop.
    ///
    /// A no-op when a session is already underway. On failure the state is
    /// `Failed` and everything acquired so far has been released.
    pub async fn start(&self) -> Result<(), SessionError> {
        {
            let mut state = self.state.write().await;
            if !state.can_start() {
                info!("start() ignored; session already underway ({:?})", *state);
                return Ok(());
            }
            *state = SessionState::AwaitingCredential;
        }

        info!("Starting session {}", self.config.session_id);

        let credential = match self.fetcher.fetch().await {
            Ok(credential) => credential,
            Err(e) => {
                self.fail_from(SessionState::AwaitingCredential).await;
                return Err(SessionError::Credential(format!("{:#}", e)));
            }
        };

        // Every transition below is compare-and-set: stop() may run while
        // start() is awaiting a collaborator, and the Closed it sets must
        // never be overwritten
        if !self
            .advance(SessionState::AwaitingCredential, SessionState::Negotiating)
            .await
        {
            info!("stop() intervened during credential fetch; start aborted");
            return Ok(());
        }

        let mut transport = match self.factory.create().await {
            Ok(transport) => transport,
            Err(e) => {
                self.fail_from(SessionState::Negotiating).await;
                return Err(SessionError::Negotiation(format!("{:#}", e)));
            }
        };

        let (sender, mut receiver) = match transport.negotiate(&credential).await {
            Ok(channel) => channel,
            Err(e) => {
                transport.close().await;
                self.fail_from(SessionState::Negotiating).await;
                return Err(SessionError::Negotiation(format!("{:#}", e)));
            }
        };

        if !self
            .advance(SessionState::Negotiating, SessionState::Active)
            .await
        {
            info!("stop() intervened during negotiation; start aborted");
            transport.close().await;
            return Ok(());
        }

        // One configuration message per session, on channel open
        sender
            .send_event(&ClientEvent::configure(
                self.config.voice_detection.clone(),
                self.registry.catalog(),
            ))
            .await;

        let dispatcher = Arc::new(FunctionCallDispatcher::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.transcript),
            sender.clone(),
        ));
        let router = ControlRouter::new(Arc::clone(&self.transcript), dispatcher);

        let state = Arc::clone(&self.state);
        let session_id = self.config.session_id.clone();
        let task = tokio::spawn(async move {
            info!("Event loop started for {}", session_id);

            while let Some(raw) = receiver.recv().await {
                router.handle_raw(&raw).await;
            }

            // Channel ended without stop(): the transport failed under us
            let mut state = state.write().await;
            if *state == SessionState::Active {
                warn!("Control channel closed by remote; session {} failed", session_id);
                *state = SessionState::Failed;
            }
        });

        {
            let mut active = self.active.lock().await;
            *active = Some(ActiveSession { transport, task });
        }

        // stop() may have raced the handoff above
        if *self.state.read().await == SessionState::Closed {
            self.release().await;
        } else {
            info!("Session {} active", self.config.session_id);
        }

        Ok(())
    }

    /// Tear the session down. Never fails, idempotent, legal from any state;
    /// always leaves the state `Closed`. The transcript stays readable.
    pub async fn stop(&self) {
        {
            let mut state = self.state.write().await;
            if *state == SessionState::Closed {
                return;
            }
            *state = SessionState::Closed;
        }

        self.release().await;

        info!("Session {} stopped", self.config.session_id);
    }

    /// Current lifecycle state
    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// Shared handle to the transcript log
    pub fn transcript(&self) -> Arc<TranscriptLog> {
        Arc::clone(&self.transcript)
    }

    /// Snapshot of the transcript in sequence order
    pub async fn transcript_entries(&self) -> Vec<TranscriptEntry> {
        self.transcript.entries().await
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Compare-and-set transition; false when stop() changed the state
    /// underneath a waiting `start()`
    async fn advance(&self, from: SessionState, to: SessionState) -> bool {
        let mut state = self.state.write().await;
        if *state == from {
            *state = to;
            true
        } else {
            false
        }
    }

    /// Mark the startup as failed, unless stop() already closed the session
    async fn fail_from(&self, expected: SessionState) {
        let mut state = self.state.write().await;
        if *state == expected {
            *state = SessionState::Failed;
        }
    }

    /// Abort the event loop and close the transport, if any
    async fn release(&self) {
        if let Some(mut active) = self.active.lock().await.take() {
            active.task.abort();
            active.transport.close().await;
        }
    }
}
