use serde_json::json;
use voice_orchestrator::credential::{Credential, CredentialFetcher, HttpCredentialFetcher};
use voice_orchestrator::transport::{HttpNegotiator, Negotiator};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credential() -> Credential {
    serde_json::from_value(json!({
        "credential": "ek_test",
        "modelId": "model-test"
    }))
    .unwrap()
}

#[tokio::test]
async fn test_credential_fetch_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "credential": "ek_abc123",
            "modelId": "model-test"
        })))
        .mount(&server)
        .await;

    let fetcher = HttpCredentialFetcher::new(format!("{}/token", server.uri()));
    let credential = fetcher.fetch().await.unwrap();

    assert_eq!(credential.credential, "ek_abc123");
    assert_eq!(credential.model_id, "model-test");
}

#[tokio::test]
async fn test_credential_fetch_non_success_status_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Missing API key in environment."
        })))
        .mount(&server)
        .await;

    let fetcher = HttpCredentialFetcher::new(format!("{}/token", server.uri()));
    let err = fetcher.fetch().await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_credential_fetch_malformed_body_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let fetcher = HttpCredentialFetcher::new(format!("{}/token", server.uri()));
    assert!(fetcher.fetch().await.is_err());
}

#[tokio::test]
async fn test_negotiation_posts_offer_with_bearer_credential() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/realtime"))
        .and(query_param("model", "model-test"))
        .and(header("Authorization", "Bearer ek_test"))
        .and(header("Content-Type", "application/sdp"))
        .respond_with(ResponseTemplate::new(200).set_body_string("v=0 remote-answer"))
        .mount(&server)
        .await;

    let negotiator = HttpNegotiator::new(format!("{}/realtime", server.uri()));
    let answer = negotiator
        .exchange("v=0 local-offer", &credential())
        .await
        .unwrap();

    assert_eq!(answer, "v=0 remote-answer");
}

#[tokio::test]
async fn test_negotiation_non_success_status_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/realtime"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid session token"))
        .mount(&server)
        .await;

    let negotiator = HttpNegotiator::new(format!("{}/realtime", server.uri()));
    let err = negotiator
        .exchange("v=0 local-offer", &credential())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("401"), "message was: {}", message);
}
