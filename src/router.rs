//! Control channel router
//!
//! Parses inbound control messages, classifies them by event kind and hands
//! them to the transcript log or the function call dispatcher. A message
//! that fails to parse is logged and dropped; unknown event kinds are
//! ignored. Neither ever terminates the session.

use crate::dispatcher::FunctionCallDispatcher;
use crate::error::MalformedEventError;
use crate::protocol::{FunctionCallRequest, ServerEvent};
use crate::transcript::{Speaker, TranscriptLog};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ControlRouter {
    transcript: Arc<TranscriptLog>,
    dispatcher: Arc<FunctionCallDispatcher>,
}

impl ControlRouter {
    pub fn new(transcript: Arc<TranscriptLog>, dispatcher: Arc<FunctionCallDispatcher>) -> Self {
        Self {
            transcript,
            dispatcher,
        }
    }

    /// Parse one raw control message
    pub fn parse(raw: &str) -> Result<ServerEvent, MalformedEventError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Handle one raw inbound message; malformed payloads are dropped
    pub async fn handle_raw(&self, raw: &str) {
        match Self::parse(raw) {
            Ok(event) => self.handle_event(event).await,
            Err(e) => warn!("Dropping malformed control message: {}", e),
        }
    }

    /// Dispatch one parsed event to its handling path
    pub async fn handle_event(&self, event: ServerEvent) {
        match event {
            ServerEvent::TranscriptionCompleted { transcript } => {
                self.transcript.append(Speaker::Human, transcript).await;
            }

            ServerEvent::UtteranceCompleted { transcript } => {
                self.transcript.append(Speaker::Assistant, transcript).await;
            }

            ServerEvent::TurnCompleted { id, output } => {
                // Each turn gets its own identity so pending-result counters
                // never collide across turns
                let turn_id = id.unwrap_or_else(|| format!("turn-{}", uuid::Uuid::new_v4()));

                let requests: Vec<FunctionCallRequest> = output
                    .into_iter()
                    .filter(|item| item.is_function_call())
                    .map(|item| FunctionCallRequest::new(turn_id.clone(), item.name, item.arguments))
                    .collect();

                if requests.is_empty() {
                    debug!("Turn {} completed with no function calls", turn_id);
                    return;
                }

                self.dispatcher.dispatch_turn(&turn_id, requests).await;
            }

            ServerEvent::Unknown => {
                debug!("Ignoring unrecognized control event kind");
            }
        }
    }
}
