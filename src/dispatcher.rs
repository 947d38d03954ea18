//! Function call dispatcher
//!
//! Executes registered tool handlers for the function-call items of a
//! response turn, transmits one result per call, and fires exactly one
//! resume signal per turn once every sibling result has been flushed. The
//! resume is acknowledgment-counted: each turn carries a pending-result
//! counter that is decremented as results go out, and the resume fires when
//! it reaches zero. No wall-clock delays are involved.

use crate::error::DispatchError;
use crate::protocol::{ClientEvent, FunctionCallRequest, FunctionCallResult};
use crate::tools::ToolRegistry;
use crate::transcript::{Speaker, TranscriptLog};
use crate::transport::ControlSender;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub struct FunctionCallDispatcher {
    registry: Arc<ToolRegistry>,
    transcript: Arc<TranscriptLog>,
    sender: ControlSender,

    /// Pending result count per in-flight turn
    pending: Mutex<HashMap<String, usize>>,

    /// Log of every transmitted result
    results: Mutex<Vec<FunctionCallResult>>,
}

impl FunctionCallDispatcher {
    pub fn new(
        registry: Arc<ToolRegistry>,
        transcript: Arc<TranscriptLog>,
        sender: ControlSender,
    ) -> Self {
        Self {
            registry,
            transcript,
            sender,
            pending: Mutex::new(HashMap::new()),
            results: Mutex::new(Vec::new()),
        }
    }

    /// Handle all function-call items of one response turn, in item order.
    ///
    /// Transmits one result message per request and exactly one resume
    /// signal after the last of them.
    pub async fn dispatch_turn(&self, turn_id: &str, requests: Vec<FunctionCallRequest>) {
        if requests.is_empty() {
            return;
        }

        info!(
            "Dispatching turn {} with {} function call(s)",
            turn_id,
            requests.len()
        );

        {
            let mut pending = self.pending.lock().await;
            pending.insert(turn_id.to_string(), requests.len());
        }

        for request in requests {
            self.transcript
                .append(
                    Speaker::System,
                    format!(
                        "Called {}({})",
                        request.name,
                        Value::Object(request.parsed_arguments.clone())
                    ),
                )
                .await;

            let payload = match self.execute(&request).await {
                Ok(result) => json!({ "result": result }).to_string(),
                Err(DispatchError::UnknownTool) => {
                    warn!("No handler registered for tool {}", request.name);
                    json!({ "result": DispatchError::UnknownTool.to_string() }).to_string()
                }
                Err(error) => {
                    warn!("Tool {} failed: {}", request.name, error);
                    json!({ "error": error.to_string() }).to_string()
                }
            };

            self.transcript
                .append(Speaker::System, format!("Result: {}", payload))
                .await;

            self.sender
                .send_event(&ClientEvent::function_result(
                    request.name.clone(),
                    payload.clone(),
                ))
                .await;

            {
                let mut results = self.results.lock().await;
                results.push(FunctionCallResult {
                    call_id: request.call_id.clone(),
                    name: request.name.clone(),
                    result_payload: payload,
                });
            }

            if self.complete_item(turn_id).await {
                self.sender.send_event(&ClientEvent::resume()).await;
                info!("Turn {} complete; resume signal sent", turn_id);
            }
        }
    }

    /// Run the registered handler for one request
    async fn execute(&self, request: &FunctionCallRequest) -> Result<String, DispatchError> {
        let handler = self
            .registry
            .handler(&request.name)
            .ok_or(DispatchError::UnknownTool)?;

        handler
            .call(&request.parsed_arguments)
            .await
            .map_err(|e| DispatchError::ToolExecution(e.to_string()))
    }

    /// Mark one result as transmitted; true when the turn has none left
    async fn complete_item(&self, turn_id: &str) -> bool {
        let mut pending = self.pending.lock().await;
        match pending.get_mut(turn_id) {
            Some(count) => {
                *count -= 1;
                if *count == 0 {
                    pending.remove(turn_id);
                    true
                } else {
                    false
                }
            }
            None => {
                warn!("Completed item for untracked turn {}", turn_id);
                false
            }
        }
    }

    /// Snapshot of all transmitted results, in transmission order
    pub async fn results(&self) -> Vec<FunctionCallResult> {
        self.results.lock().await.clone()
    }
}
