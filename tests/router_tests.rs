use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use voice_orchestrator::dispatcher::FunctionCallDispatcher;
use voice_orchestrator::router::ControlRouter;
use voice_orchestrator::tools::ToolRegistry;
use voice_orchestrator::transcript::{Speaker, TranscriptLog};
use voice_orchestrator::transport::control_channel;

fn harness() -> (ControlRouter, Arc<TranscriptLog>, mpsc::Receiver<String>) {
    let (out_tx, out_rx) = mpsc::channel(64);
    let (_in_tx, in_rx) = mpsc::channel::<String>(64);
    let (sender, _receiver) = control_channel(out_tx, in_rx);

    let transcript = Arc::new(TranscriptLog::new());
    let dispatcher = Arc::new(FunctionCallDispatcher::new(
        Arc::new(ToolRegistry::builtin()),
        Arc::clone(&transcript),
        sender,
    ));

    (
        ControlRouter::new(Arc::clone(&transcript), dispatcher),
        transcript,
        out_rx,
    )
}

#[tokio::test]
async fn test_transcription_events_append_tagged_entries() {
    let (router, transcript, _out_rx) = harness();

    router
        .handle_raw(r#"{"kind": "transcription.completed", "transcript": "Hello"}"#)
        .await;
    router
        .handle_raw(r#"{"kind": "utterance.completed", "transcript": "Hi! How can I help?"}"#)
        .await;

    let entries = transcript.entries().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].speaker, Speaker::Human);
    assert_eq!(entries[0].text, "Hello");
    assert_eq!(entries[1].speaker, Speaker::Assistant);
    assert_eq!(entries[1].text, "Hi! How can I help?");
}

#[tokio::test]
async fn test_malformed_message_is_dropped_and_session_continues() {
    let (router, transcript, _out_rx) = harness();

    router.handle_raw("{not json").await;
    router.handle_raw("").await;
    assert!(transcript.is_empty().await);

    // A well-formed message afterwards is still processed
    router
        .handle_raw(r#"{"kind": "transcription.completed", "transcript": "still alive"}"#)
        .await;
    assert_eq!(transcript.len().await, 1);
}

#[tokio::test]
async fn test_unknown_event_kind_is_ignored() {
    let (router, transcript, mut out_rx) = harness();

    router
        .handle_raw(r#"{"kind": "audio.delta", "delta": "AAAA"}"#)
        .await;

    assert!(transcript.is_empty().await);
    assert!(out_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_turn_without_function_calls_transmits_nothing() {
    let (router, transcript, mut out_rx) = harness();

    router
        .handle_raw(r#"{"kind": "turn.completed", "id": "t1", "output": [{"kind": "message"}]}"#)
        .await;

    assert!(transcript.is_empty().await);
    assert!(out_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_turn_function_calls_forwarded_in_item_order() {
    let (router, _transcript, mut out_rx) = harness();

    router
        .handle_raw(
            r#"{
                "kind": "turn.completed",
                "id": "t2",
                "output": [
                    {"kind": "function_call", "name": "getPatientSummary",
                     "arguments": "{\"patientId\":7,\"date\":\"2025-01-01\"}"},
                    {"kind": "message"},
                    {"kind": "function_call", "name": "getClientSince",
                     "arguments": "{\"patientId\":7}"}
                ]
            }"#,
        )
        .await;

    let first: Value = serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
    assert_eq!(first["item"]["name"], "getPatientSummary");

    let second: Value = serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
    assert_eq!(second["item"]["name"], "getClientSince");

    let third: Value = serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
    assert_eq!(third["kind"], "response.create");
    assert!(out_rx.try_recv().is_err());
}

#[test]
fn test_parse_reports_malformed_events() {
    assert!(ControlRouter::parse("{broken").is_err());
    assert!(ControlRouter::parse(r#"{"kind": "utterance.completed"}"#).is_ok());
}
