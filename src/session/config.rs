use crate::protocol::VoiceDetection;
use serde::{Deserialize, Serialize};

/// Configuration for a voice session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g. "session-2a61...")
    pub session_id: String,

    /// Voice-activity detection parameters declared to the remote model
    pub voice_detection: VoiceDetection,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            voice_detection: VoiceDetection::default(),
        }
    }
}
