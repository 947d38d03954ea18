use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Instructions carried by the resume signal
pub const RESUME_INSTRUCTIONS: &str = "continue";

/// Wire item kind marking a function call inside a completed turn
pub const FUNCTION_CALL_KIND: &str = "function_call";

// ============================================================================
// Outbound (orchestrator -> remote model)
// ============================================================================

/// Messages sent to the remote model over the control channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ClientEvent {
    /// Session configuration, sent exactly once when the channel opens
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionSettings },

    /// Conversation item creation (function call results)
    #[serde(rename = "item.create")]
    ItemCreate { item: ConversationItem },

    /// Resume signal instructing the model to continue generating
    #[serde(rename = "response.create")]
    ResponseCreate { response: ResponseRequest },
}

impl ClientEvent {
    /// Build the one-shot configuration message for a session
    pub fn configure(voice_detection: VoiceDetection, tools: Vec<ToolDescriptor>) -> Self {
        Self::SessionUpdate {
            session: SessionSettings {
                voice_detection,
                tools,
            },
        }
    }

    /// Build a function result message carrying a serialized payload
    pub fn function_result(name: String, payload: String) -> Self {
        Self::ItemCreate {
            item: ConversationItem::FunctionCallResult {
                name,
                content: vec![ContentPart::FunctionResult { text: payload }],
            },
        }
    }

    /// Build the resume signal for a completed turn
    pub fn resume() -> Self {
        Self::ResponseCreate {
            response: ResponseRequest {
                instructions: RESUME_INSTRUCTIONS.to_string(),
            },
        }
    }
}

/// Session configuration body: voice-activity detection + tool catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub voice_detection: VoiceDetection,
    pub tools: Vec<ToolDescriptor>,
}

/// Voice-activity detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceDetection {
    /// Detection mode (e.g. "server_vad")
    pub mode: String,

    /// Energy threshold (0.0 to 1.0)
    pub threshold: f32,

    /// Audio padding kept before detected speech
    pub prefix_padding_ms: u64,

    /// Silence duration that ends an utterance
    pub silence_duration_ms: u64,

    /// Whether the model responds automatically at end of speech
    pub create_response: bool,
}

impl Default for VoiceDetection {
    fn default() -> Self {
        Self {
            mode: "server_vad".to_string(),
            threshold: 0.5,
            prefix_padding_ms: 300,
            silence_duration_ms: 800,
            create_response: true,
        }
    }
}

/// One tool catalog entry as declared to the remote model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameter_schema: Value,
    pub required_argument_names: Vec<String>,
}

/// Conversation items the orchestrator creates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ConversationItem {
    #[serde(rename = "function_call_result")]
    FunctionCallResult {
        name: String,
        content: Vec<ContentPart>,
    },
}

/// Content parts inside a conversation item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ContentPart {
    #[serde(rename = "function_result")]
    FunctionResult { text: String },
}

/// Body of the resume signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRequest {
    pub instructions: String,
}

// ============================================================================
// Inbound (remote model -> orchestrator)
// ============================================================================

/// Messages received from the remote model.
///
/// Unrecognized kinds deserialize into `Unknown` so that new server events
/// never break an active session.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum ServerEvent {
    /// Human speech transcription finished
    #[serde(rename = "transcription.completed")]
    TranscriptionCompleted {
        #[serde(default)]
        transcript: String,
    },

    /// Assistant utterance finished
    #[serde(rename = "utterance.completed")]
    UtteranceCompleted {
        #[serde(default)]
        transcript: String,
    },

    /// Response turn finished, possibly carrying function-call items
    #[serde(rename = "turn.completed")]
    TurnCompleted {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        output: Vec<TurnItem>,
    },

    #[serde(other)]
    Unknown,
}

/// One output item of a completed turn
#[derive(Debug, Clone, Deserialize)]
pub struct TurnItem {
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

impl TurnItem {
    pub fn is_function_call(&self) -> bool {
        self.kind == FUNCTION_CALL_KIND
    }
}
