use anyhow::Result;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use voice_orchestrator::dispatcher::FunctionCallDispatcher;
use voice_orchestrator::protocol::FunctionCallRequest;
use voice_orchestrator::tools::{ToolDefinition, ToolHandler, ToolRegistry};
use voice_orchestrator::transcript::{Speaker, TranscriptLog};
use voice_orchestrator::transport::control_channel;

struct FailingTool;

#[async_trait::async_trait]
impl ToolHandler for FailingTool {
    async fn call(&self, _arguments: &Map<String, Value>) -> Result<String> {
        anyhow::bail!("backend unavailable")
    }
}

fn harness(
    registry: ToolRegistry,
) -> (
    FunctionCallDispatcher,
    Arc<TranscriptLog>,
    mpsc::Receiver<String>,
) {
    let (out_tx, out_rx) = mpsc::channel(64);
    let (_in_tx, in_rx) = mpsc::channel::<String>(64);
    let (sender, _receiver) = control_channel(out_tx, in_rx);

    let transcript = Arc::new(TranscriptLog::new());
    let dispatcher =
        FunctionCallDispatcher::new(Arc::new(registry), Arc::clone(&transcript), sender);

    (dispatcher, transcript, out_rx)
}

fn request(turn_id: &str, name: &str, arguments: &str) -> FunctionCallRequest {
    FunctionCallRequest::new(turn_id.to_string(), name.to_string(), arguments.to_string())
}

async fn next_kind(out_rx: &mut mpsc::Receiver<String>) -> (String, Value) {
    let raw = out_rx.recv().await.expect("expected outbound message");
    let value: Value = serde_json::from_str(&raw).unwrap();
    (value["kind"].as_str().unwrap().to_string(), value)
}

#[tokio::test]
async fn test_single_call_result_then_one_resume() {
    let (dispatcher, transcript, mut out_rx) = harness(ToolRegistry::builtin());

    dispatcher
        .dispatch_turn(
            "turn-1",
            vec![request("turn-1", "getClientSince", "{\"patientId\":7}")],
        )
        .await;

    let (kind, value) = next_kind(&mut out_rx).await;
    assert_eq!(kind, "item.create");
    let text = value["item"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("patient 7"), "payload was {}", text);

    let (kind, _) = next_kind(&mut out_rx).await;
    assert_eq!(kind, "response.create");

    // Nothing after the resume
    assert!(out_rx.try_recv().is_err());

    // Observability entries around the invocation
    let entries = transcript.entries().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].speaker, Speaker::System);
    assert!(entries[0].text.starts_with("Called getClientSince("));
    assert!(entries[0].text.contains("patientId"));
    assert!(entries[1].text.starts_with("Result: "));
}

#[tokio::test]
async fn test_two_calls_results_in_item_order_then_one_resume() {
    let (dispatcher, _transcript, mut out_rx) = harness(ToolRegistry::builtin());

    dispatcher
        .dispatch_turn(
            "turn-2",
            vec![
                request(
                    "turn-2",
                    "getPatientSummary",
                    "{\"patientId\":7,\"date\":\"2025-01-01\"}",
                ),
                request("turn-2", "getClientSince", "{\"patientId\":7}"),
            ],
        )
        .await;

    let (kind, first) = next_kind(&mut out_rx).await;
    assert_eq!(kind, "item.create");
    assert_eq!(first["item"]["name"], "getPatientSummary");

    let (kind, second) = next_kind(&mut out_rx).await;
    assert_eq!(kind, "item.create");
    assert_eq!(second["item"]["name"], "getClientSince");

    let (kind, _) = next_kind(&mut out_rx).await;
    assert_eq!(kind, "response.create");
    assert!(out_rx.try_recv().is_err());

    let results = dispatcher.results().await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "getPatientSummary");
    assert_eq!(results[1].name, "getClientSince");
    assert_eq!(results[0].call_id, "turn-2");
}

#[tokio::test]
async fn test_unknown_tool_fallback_is_deterministic() {
    let (dispatcher, _transcript, mut out_rx) = harness(ToolRegistry::builtin());

    dispatcher
        .dispatch_turn(
            "turn-3",
            vec![request("turn-3", "noSuchTool", "{\"patientId\":1}")],
        )
        .await;
    dispatcher
        .dispatch_turn(
            "turn-4",
            vec![request("turn-4", "noSuchTool", "{\"query\":\"different\"}")],
        )
        .await;

    let (_, first) = next_kind(&mut out_rx).await;
    let (kind, _) = next_kind(&mut out_rx).await;
    assert_eq!(kind, "response.create");
    let (_, second) = next_kind(&mut out_rx).await;
    let (kind, _) = next_kind(&mut out_rx).await;
    assert_eq!(kind, "response.create");

    let first_payload = first["item"]["content"][0]["text"].as_str().unwrap();
    let second_payload = second["item"]["content"][0]["text"].as_str().unwrap();
    assert_eq!(first_payload, second_payload);
    assert_eq!(
        serde_json::from_str::<Value>(first_payload).unwrap(),
        json!({"result": "unknown function"})
    );
}

#[tokio::test]
async fn test_handler_failure_becomes_error_payload_and_turn_resumes() {
    let mut registry = ToolRegistry::new();
    registry.register(
        ToolDefinition {
            name: "flaky".to_string(),
            description: "Always fails.".to_string(),
            parameter_schema: json!({"type": "object"}),
            required: vec![],
        },
        Arc::new(FailingTool),
    );

    let (dispatcher, transcript, mut out_rx) = harness(registry);

    dispatcher
        .dispatch_turn("turn-5", vec![request("turn-5", "flaky", "{}")])
        .await;

    let (kind, value) = next_kind(&mut out_rx).await;
    assert_eq!(kind, "item.create");
    let payload: Value =
        serde_json::from_str(value["item"]["content"][0]["text"].as_str().unwrap()).unwrap();
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .contains("backend unavailable"));

    // The turn still resumes exactly once
    let (kind, _) = next_kind(&mut out_rx).await;
    assert_eq!(kind, "response.create");
    assert!(out_rx.try_recv().is_err());

    assert_eq!(transcript.len().await, 2);
}

#[tokio::test]
async fn test_closed_channel_drops_writes_without_error() {
    let (dispatcher, transcript, out_rx) = harness(ToolRegistry::builtin());
    drop(out_rx);

    dispatcher
        .dispatch_turn(
            "turn-6",
            vec![request("turn-6", "getClientSince", "{\"patientId\":7}")],
        )
        .await;

    // Effects other than transmission still happen
    assert_eq!(transcript.len().await, 2);
    assert_eq!(dispatcher.results().await.len(), 1);
}

#[tokio::test]
async fn test_empty_turn_transmits_nothing() {
    let (dispatcher, transcript, mut out_rx) = harness(ToolRegistry::builtin());

    dispatcher.dispatch_turn("turn-7", vec![]).await;

    assert!(out_rx.try_recv().is_err());
    assert!(transcript.is_empty().await);
    assert!(dispatcher.results().await.is_empty());
}
