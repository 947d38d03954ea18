//! Control channel protocol
//!
//! This module defines the JSON wire messages exchanged with the remote
//! speech model over the control channel, plus the in-memory function-call
//! types that flow between the router and the dispatcher.

mod messages;

pub use messages::{
    ClientEvent, ContentPart, ConversationItem, ResponseRequest, ServerEvent, SessionSettings,
    ToolDescriptor, TurnItem, VoiceDetection, FUNCTION_CALL_KIND, RESUME_INSTRUCTIONS,
};

use serde_json::{Map, Value};

/// A function call surfaced by a completed response turn.
///
/// `parsed_arguments` is best-effort: if `raw_arguments` is not a JSON
/// object the map is left empty rather than failing the call.
#[derive(Debug, Clone)]
pub struct FunctionCallRequest {
    /// Correlates the call to its originating response turn
    pub call_id: String,

    /// Registered tool name
    pub name: String,

    /// Argument string exactly as received
    pub raw_arguments: String,

    /// Arguments parsed as a JSON object (empty on parse failure)
    pub parsed_arguments: Map<String, Value>,
}

impl FunctionCallRequest {
    pub fn new(call_id: String, name: String, raw_arguments: String) -> Self {
        let parsed_arguments = match serde_json::from_str::<Value>(&raw_arguments) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        Self {
            call_id,
            name,
            raw_arguments,
            parsed_arguments,
        }
    }
}

/// The transmitted outcome of one function call.
#[derive(Debug, Clone)]
pub struct FunctionCallResult {
    pub call_id: String,
    pub name: String,

    /// Serialized payload exactly as sent over the control channel
    pub result_payload: String,
}
