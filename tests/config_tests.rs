use std::fs;
use voice_orchestrator::Config;

#[test]
fn test_load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orchestrator.toml");

    fs::write(
        &path,
        r#"
[service]
name = "voice-orchestrator"

[service.http]
bind = "127.0.0.1"
port = 8080

[credential]
token_url = "http://localhost:3000/token"

[realtime]
base_url = "https://api.openai.com/v1/realtime"

[transport]
mode = "loopback"

[vad]
mode = "server_vad"
threshold = 0.5
prefix_padding_ms = 300
silence_duration_ms = 800
create_response = true
"#,
    )
    .unwrap();

    let stem = dir.path().join("orchestrator");
    let cfg = Config::load(stem.to_str().unwrap()).unwrap();

    assert_eq!(cfg.service.name, "voice-orchestrator");
    assert_eq!(cfg.service.http.port, 8080);
    assert_eq!(cfg.credential.token_url, "http://localhost:3000/token");
    assert_eq!(cfg.realtime.base_url, "https://api.openai.com/v1/realtime");
    assert_eq!(cfg.transport.mode, "loopback");
    assert_eq!(cfg.vad.mode, "server_vad");
    assert_eq!(cfg.vad.threshold, 0.5);
    assert!(cfg.vad.create_response);
}

#[test]
fn test_missing_config_file_fails() {
    assert!(Config::load("does/not/exist").is_err());
}
