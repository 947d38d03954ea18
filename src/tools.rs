//! Tool registry and built-in tools
//!
//! Tools are configured at session start: each one pairs a static
//! `ToolDefinition` (declared to the remote model in the session
//! configuration message) with a handler that produces a result payload for
//! the dispatcher. Dispatch is a name lookup, so tools can be registered and
//! tested independently of the control-channel plumbing.

use crate::protocol::ToolDescriptor;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Static description of a registered tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,

    pub description: String,

    /// Structural description of the expected argument shape
    pub parameter_schema: Value,

    /// Argument names the model must supply
    pub required: Vec<String>,
}

/// Produces a result payload for a function call
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: &Map<String, Value>) -> Result<String>;
}

/// Name-keyed registry of tool definitions and handlers
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<(ToolDefinition, Arc<dyn ToolHandler>)>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; re-registering a name replaces its handler
    pub fn register(&mut self, definition: ToolDefinition, handler: Arc<dyn ToolHandler>) {
        let name = definition.name.clone();
        if let Some(&slot) = self.index.get(&name) {
            warn!("Replacing already-registered tool {}", name);
            self.tools[slot] = (definition, handler);
            return;
        }

        self.index.insert(name, self.tools.len());
        self.tools.push((definition, handler));
    }

    /// Look up the handler for a tool name
    pub fn handler(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.index
            .get(name)
            .map(|&slot| Arc::clone(&self.tools[slot].1))
    }

    /// Tool catalog for the session configuration message, in registration
    /// order
    pub fn catalog(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|(definition, _)| ToolDescriptor {
                name: definition.name.clone(),
                description: definition.description.clone(),
                parameter_schema: definition.parameter_schema.clone(),
                required_argument_names: definition.required.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registry with the built-in demo tools
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.register(
            ToolDefinition {
                name: "getPatientSummary".to_string(),
                description: "Retrieve a summary for a patient on a given date.".to_string(),
                parameter_schema: json!({
                    "type": "object",
                    "properties": {
                        "patientId": { "type": "number" },
                        "date": { "type": "string" },
                    },
                }),
                required: vec!["patientId".to_string(), "date".to_string()],
            },
            Arc::new(PatientSummaryTool),
        );

        registry.register(
            ToolDefinition {
                name: "getClientSince".to_string(),
                description: "Get the date a patient first joined the clinic.".to_string(),
                parameter_schema: json!({
                    "type": "object",
                    "properties": {
                        "patientId": { "type": "number" },
                    },
                }),
                required: vec!["patientId".to_string()],
            },
            Arc::new(ClientSinceTool),
        );

        registry.register(
            ToolDefinition {
                name: "getTranscriptQuotes".to_string(),
                description: "Retrieve quotes from transcripts for a query.".to_string(),
                parameter_schema: json!({
                    "type": "object",
                    "properties": {
                        "patientId": { "type": "number" },
                        "query": { "type": "string" },
                        "date": { "type": "string" },
                    },
                }),
                required: vec!["patientId".to_string(), "query".to_string()],
            },
            Arc::new(TranscriptQuotesTool),
        );

        registry
    }
}

// ============================================================================
// Built-in handlers (placeholder payloads)
// ============================================================================

fn argument_text(arguments: &Map<String, Value>, key: &str) -> String {
    match arguments.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
        None => "null".to_string(),
    }
}

struct PatientSummaryTool;

#[async_trait::async_trait]
impl ToolHandler for PatientSummaryTool {
    async fn call(&self, arguments: &Map<String, Value>) -> Result<String> {
        let patient_id = argument_text(arguments, "patientId");
        let date = argument_text(arguments, "date");
        Ok(format!("#summary for patient {} on {}", patient_id, date))
    }
}

struct ClientSinceTool;

#[async_trait::async_trait]
impl ToolHandler for ClientSinceTool {
    async fn call(&self, arguments: &Map<String, Value>) -> Result<String> {
        let patient_id = argument_text(arguments, "patientId");
        Ok(format!(
            "#patient {} joined on 2022-10-10 (placeholder)",
            patient_id
        ))
    }
}

struct TranscriptQuotesTool;

#[async_trait::async_trait]
impl ToolHandler for TranscriptQuotesTool {
    async fn call(&self, arguments: &Map<String, Value>) -> Result<String> {
        let patient_id = argument_text(arguments, "patientId");
        let query = argument_text(arguments, "query");

        let mut payload = format!("#quotes for patient {}, query=\"{}\"", patient_id, query);
        if let Some(Value::String(date)) = arguments.get("date") {
            payload.push_str(&format!(", date={}", date));
        }

        Ok(payload)
    }
}
