//! End-to-end integration tests for the cardchat assistant.
//!
//! These tests exercise the full pipeline from config to transcript:
//! provider construction, prompt rendering, the Gemini wire format,
//! failure classification, and the bounded history.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use cardchat_agent::{
    ChatSession, ConsoleSink, ExchangeOutcome, RecordingSink, SinkEvent, demo_script,
};
use cardchat_config::{AppConfig, ProviderConfig};
use cardchat_core::error::ProviderError;
use cardchat_core::message::{Message, Role};
use cardchat_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use cardchat_core::FailureKind;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// ── Mock Provider ────────────────────────────────────────────────────────

/// Replies with a numbered answer; fails on the call indexes in `fail_on`.
struct NumberedProvider {
    fail_on: Vec<(usize, ProviderError)>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl NumberedProvider {
    fn new(fail_on: Vec<(usize, ProviderError)>) -> Self {
        Self {
            fail_on,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for NumberedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };

        if let Some((_, e)) = self.fail_on.iter().find(|(i, _)| *i == call) {
            return Err(e.clone());
        }

        Ok(ProviderResponse {
            message: Message::assistant(format!("Respuesta {call}")),
            usage: Some(Usage {
                prompt_tokens: 20,
                completion_tokens: 10,
                total_tokens: 30,
            }),
            model: request.model,
        })
    }
}

// ── Mock Gemini HTTP server ──────────────────────────────────────────────

/// One canned HTTP response.
struct Canned {
    status: u16,
    body: String,
}

impl Canned {
    fn reply(text: &str) -> Self {
        Self {
            status: 200,
            body: serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": text}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {
                    "promptTokenCount": 40,
                    "candidatesTokenCount": 12,
                    "totalTokenCount": 52
                },
                "modelVersion": "gemini-2.0-flash-lite"
            })
            .to_string(),
        }
    }

    fn error(status: u16, api_status: &str, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({
                "error": {"code": status, "message": message, "status": api_status}
            })
            .to_string(),
        }
    }
}

/// A captured request: head (request line and headers) and body.
#[derive(Debug, Clone)]
struct Captured {
    head: String,
    body: serde_json::Value,
}

/// Serve the canned responses in order, one per connection.
async fn spawn_gemini(responses: Vec<Canned>) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let log = captured.clone();

    tokio::spawn(async move {
        for canned in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };

            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let head_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break None;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break Some(pos + 4);
                }
            };
            let Some(head_end) = head_end else { continue };

            let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);

            while buf.len() < head_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let body = serde_json::from_slice(&buf[head_end..]).unwrap_or(serde_json::Value::Null);
            log.lock().unwrap().push(Captured { head, body });

            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                canned.status,
                canned.body.len(),
                canned.body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    (format!("http://{addr}"), captured)
}

fn google_config(base_url: &str, max_turns: usize) -> AppConfig {
    let mut config = AppConfig::default();
    config.history.max_turns = max_turns;
    config.providers.insert(
        "google".into(),
        ProviderConfig {
            api_key: Some("test-key".into()),
            api_url: Some(base_url.into()),
            default_model: None,
        },
    );
    config
}

fn google_session(config: &AppConfig) -> ChatSession<RecordingSink> {
    let router = cardchat_providers::build_from_config(config).unwrap();
    let provider = router.default().unwrap();
    ChatSession::from_config(config, provider, RecordingSink::new())
}

// ── Scripted demo ────────────────────────────────────────────────────────

#[tokio::test]
async fn demo_script_runs_every_turn() {
    let provider = Arc::new(NumberedProvider::new(vec![(
        4,
        ProviderError::RateLimited("quota exceeded".into()),
    )]));
    let config = AppConfig::default();
    let mut session = ChatSession::from_config(&config, provider.clone(), RecordingSink::new());

    let report = session.run_script(demo_script(), Duration::ZERO).await;

    assert_eq!(report.total(), 12);
    assert_eq!(report.replied, 11);
    assert_eq!(report.rate_limited, 1);
    assert_eq!(report.total_tokens, 11 * 30);
    assert_eq!(provider.requests().len(), 12);

    // 11 successful exchanges, window of 10 turns
    assert_eq!(session.history().len(), 10);

    let notices = session.sink().notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].0, FailureKind::RateLimited);
}

#[tokio::test]
async fn demo_requests_carry_persona_and_window() {
    let provider = Arc::new(NumberedProvider::new(Vec::new()));
    let config = AppConfig::default();
    let mut session = ChatSession::from_config(&config, provider.clone(), RecordingSink::new());

    session.run_script(demo_script(), Duration::ZERO).await;

    for (i, request) in provider.requests().iter().enumerate() {
        assert_eq!(request.model, "gemini-2.0-flash-lite");
        assert_eq!(request.max_tokens, Some(2048));
        assert_eq!(request.messages[0].role(), Role::System);
        assert!(request.messages[0].content().contains("tarjetas"));

        // system + min(2i, 10) history turns + current input
        let expected_history = (2 * i).min(10);
        assert_eq!(request.messages.len(), expected_history + 2);
        assert_eq!(request.messages.last().unwrap().content(), demo_script()[i]);
    }
}

#[tokio::test]
async fn console_transcript_format() {
    let provider = Arc::new(NumberedProvider::new(vec![(
        1,
        ProviderError::AuthenticationFailed("API key not valid".into()),
    )]));
    let config = AppConfig::default();
    let mut session = ChatSession::from_config(&config, provider, ConsoleSink::new(Vec::new()));

    session.run_script(["Hola", "¿Meta diaria?"], Duration::ZERO).await;

    let out = String::from_utf8(session.into_sink().into_inner()).unwrap();
    assert_eq!(
        out,
        "\nUsuario: Hola\nAsistente: Respuesta 0\n\
         \nUsuario: ¿Meta diaria?\nAsistente: La clave API no es válida. Verifica tu configuración (.env).\n"
    );
}

// ── Gemini over HTTP ─────────────────────────────────────────────────────

#[tokio::test]
async fn gemini_exchange_over_http() {
    let (base_url, captured) = spawn_gemini(vec![
        Canned::reply("Ofrecemos Clásica, Oro, Platino y Black."),
        Canned::reply("La Oro da acceso a salas VIP."),
    ])
    .await;
    let config = google_config(&base_url, 10);
    let mut session = google_session(&config);

    let first = session.converse("¿Qué tarjetas ofrecen?").await;
    assert_eq!(first.reply(), Some("Ofrecemos Clásica, Oro, Platino y Black."));
    let second = session.converse("¿Beneficios de la Oro?").await;
    assert!(second.is_success());
    assert_eq!(session.history().len(), 4);

    let captured = captured.lock().unwrap().clone();
    assert_eq!(captured.len(), 2);

    let head = captured[0].head.to_lowercase();
    assert!(head.starts_with("post /v1beta/models/gemini-2.0-flash-lite:generatecontent"));
    assert!(head.contains("x-goog-api-key: test-key"));

    let body = &captured[1].body;
    assert!(body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("tarjetas"));
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[0]["role"], "user");
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(contents[2]["parts"][0]["text"], "¿Beneficios de la Oro?");
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);

    match second {
        ExchangeOutcome::Replied { usage, .. } => {
            assert_eq!(usage.map(|u| u.total_tokens), Some(52));
        }
        other => panic!("expected reply, got {other:?}"),
    }
}

#[tokio::test]
async fn gemini_rate_limit_keeps_history() {
    let (base_url, _) = spawn_gemini(vec![
        Canned::reply("Hola, ¿en qué te ayudo?"),
        Canned::error(429, "RESOURCE_EXHAUSTED", "Resource has been exhausted"),
    ])
    .await;
    let config = google_config(&base_url, 10);
    let mut session = google_session(&config);

    session.converse("Hola").await;
    let before = session.history().snapshot();

    let outcome = session.converse("¿Cuál es mi meta?").await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::RateLimited));
    assert_eq!(session.history().snapshot(), before);

    assert_eq!(
        session.sink().events.last(),
        Some(&SinkEvent::Notice(
            FailureKind::RateLimited,
            FailureKind::RateLimited.notice().to_string()
        ))
    );
}

#[tokio::test]
async fn gemini_invalid_key_is_reported() {
    let (base_url, _) = spawn_gemini(vec![Canned::error(
        400,
        "INVALID_ARGUMENT",
        "API key not valid. Please pass a valid API key.",
    )])
    .await;
    let config = google_config(&base_url, 10);
    let mut session = google_session(&config);

    let outcome = session.converse("Hola").await;
    assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidCredential));
    assert!(session.history().is_empty());
    assert_eq!(
        session.sink().notices(),
        vec![(
            FailureKind::InvalidCredential,
            "La clave API de Google no es válida. Verifica tu archivo .env.".to_string()
        )]
    );
}

#[tokio::test]
async fn gemini_server_error_is_generic_failure() {
    let (base_url, _) = spawn_gemini(vec![
        Canned::error(500, "INTERNAL", "Internal error encountered."),
        Canned::reply("Ya estoy de vuelta."),
    ])
    .await;
    let config = google_config(&base_url, 10);
    let mut session = google_session(&config);

    let report = session.run_script(["Hola", "¿Sigues ahí?"], Duration::ZERO).await;
    assert_eq!(report.other_failures, 1);
    assert_eq!(report.replied, 1);
    assert_eq!(session.sink().replies(), vec!["Ya estoy de vuelta."]);
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn zero_window_sends_no_history() {
    let (base_url, captured) = spawn_gemini(vec![
        Canned::reply("Uno"),
        Canned::reply("Dos"),
    ])
    .await;
    let config = google_config(&base_url, 0);
    let mut session = google_session(&config);

    session.run_script(["a", "b"], Duration::ZERO).await;
    assert!(session.history().is_empty());

    let captured = captured.lock().unwrap().clone();
    assert_eq!(captured[1].body["contents"].as_array().unwrap().len(), 1);
}
