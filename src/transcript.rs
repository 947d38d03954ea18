//! Ordered conversation transcript
//!
//! The transcript is an append-only log of speaker-tagged utterances. It is
//! owned by the `SessionController` and outlives the sessions that feed it:
//! entries stay readable after the session is closed or has failed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::warn;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The human on the microphone side
    Human,
    /// The remote speech model
    Assistant,
    /// Orchestrator-generated observability lines (function calls, results)
    System,
}

/// A single immutable transcript entry
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,

    /// Utterance text (never empty)
    pub text: String,

    /// Monotonically increasing, assigned at append time; orders entries by
    /// arrival of the underlying events, not per speaker
    pub sequence: u64,

    /// When the entry was appended
    pub timestamp: DateTime<Utc>,
}

/// Append-only transcript log shared between the router, the dispatcher and
/// HTTP readers.
#[derive(Debug, Default)]
pub struct TranscriptLog {
    entries: RwLock<Vec<TranscriptEntry>>,
    next_sequence: AtomicU64,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an utterance, assigning the next sequence number.
    ///
    /// Empty text is rejected (entries must be non-empty); returns the
    /// assigned sequence number otherwise.
    pub async fn append(&self, speaker: Speaker, text: impl Into<String>) -> Option<u64> {
        let text = text.into();
        if text.is_empty() {
            warn!("Dropping empty transcript entry for {:?}", speaker);
            return None;
        }

        let mut entries = self.entries.write().await;
        // Sequence is assigned under the write lock so it matches arrival order
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        entries.push(TranscriptEntry {
            speaker,
            text,
            sequence,
            timestamp: Utc::now(),
        });

        Some(sequence)
    }

    /// Snapshot of all entries in sequence order
    pub async fn entries(&self) -> Vec<TranscriptEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
