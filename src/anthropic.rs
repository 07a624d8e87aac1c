//! Minimal Anthropic Messages client for challenge generation.
//!
//! One non-streaming request per call: system prompt + a single user message.
//! Calls are instrumented and log model names, latencies, and token usage (not contents).
//!
//! NOTE: We never log the API key. Failures are classified, never retried here.

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::ModelSettings;
use crate::error::GenerationError;
use crate::util::trunc_for_log;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const TEMPERATURE: f32 = 0.8;
pub const MAX_TOKENS: u32 = 1024;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anything that turns a (system, user) prompt pair into raw model text.
pub trait TextGenerator: Send + Sync {
  fn generate(&self, system: &str, user: &str) -> impl Future<Output = Result<String, GenerationError>> + Send;

  /// Credential probe: a trivial generation through the same path.
  fn validate_credential(&self) -> impl Future<Output = Result<(), GenerationError>> + Send {
    async {
      self.generate("Reply with the single word OK.", "Ping").await.map(|_| ())
    }
  }
}

#[derive(Clone)]
pub struct AnthropicClient {
  client: reqwest::Client,
  api_key: String,
  timeout: Duration,
  pub base_url: String,
  pub model: String,
}

impl AnthropicClient {
  pub fn new(settings: ModelSettings) -> Result<Self, GenerationError> {
    Self::with_timeout(settings, REQUEST_TIMEOUT)
  }

  pub(crate) fn with_timeout(settings: ModelSettings, timeout: Duration) -> Result<Self, GenerationError> {
    let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| GenerationError::Transport {
      status: None,
      message: format!("failed to build HTTP client: {e}"),
      body: String::new(),
    })?;
    Ok(Self {
      client,
      api_key: settings.api_key,
      timeout,
      base_url: settings.base_url.trim_end_matches('/').to_string(),
      model: settings.model,
    })
  }

  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model, system_len = system.len(), user_len = user.len()))]
  async fn messages(&self, system: &str, user: &str) -> Result<String, GenerationError> {
    let url = format!("{}/v1/messages", self.base_url);
    let req = MessagesRequest {
      model: &self.model,
      max_tokens: MAX_TOKENS,
      temperature: TEMPERATURE,
      system,
      messages: vec![MessageReq { role: "user", content: user }],
    };

    let start = Instant::now();
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "trivia-forge/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header("x-api-key", &self.api_key)
      .header("anthropic-version", ANTHROPIC_VERSION)
      .json(&req)
      .send()
      .await
      .map_err(|e| {
        let message = if e.is_timeout() {
          format!("request timed out after {:?}", self.timeout)
        } else if e.is_connect() {
          format!("connection failed: {e}")
        } else {
          e.to_string()
        };
        error!(elapsed = ?start.elapsed(), error = %message, "Generation request failed");
        GenerationError::Transport { status: None, message, body: String::new() }
      })?;

    let status = res.status();
    let body = res.text().await.map_err(|e| GenerationError::Transport {
      status: Some(status.as_u16()),
      message: format!("failed to read response body: {e}"),
      body: String::new(),
    })?;

    if !status.is_success() {
      let message = extract_api_error(&body).unwrap_or_else(|| format!("HTTP {}", status));
      error!(elapsed = ?start.elapsed(), %status, error = %message, "Generation endpoint returned an error");
      return Err(GenerationError::Transport { status: Some(status.as_u16()), message, body });
    }

    let envelope: MessagesResponse = serde_json::from_str(&body).map_err(|e| {
      error!(error = %e, body = %trunc_for_log(&body, 200), "Malformed response envelope");
      GenerationError::Transport {
        status: Some(status.as_u16()),
        message: format!("malformed response envelope: {e}"),
        body: body.clone(),
      }
    })?;

    if let Some(usage) = &envelope.usage {
      info!(input_tokens = ?usage.input_tokens, output_tokens = ?usage.output_tokens, "Anthropic usage");
    }

    let text = envelope
      .content
      .into_iter()
      .find(|b| b.kind == "text")
      .and_then(|b| b.text)
      .ok_or(GenerationError::EmptyResponse)?;

    info!(elapsed = ?start.elapsed(), text_len = text.len(), "Model response received");
    Ok(text)
  }
}

impl TextGenerator for AnthropicClient {
  fn generate(&self, system: &str, user: &str) -> impl Future<Output = Result<String, GenerationError>> + Send {
    self.messages(system, user)
  }
}

// --- Messages DTOs ---

#[derive(Serialize)]
struct MessagesRequest<'a> {
  model: &'a str,
  max_tokens: u32,
  temperature: f32,
  system: &'a str,
  messages: Vec<MessageReq<'a>>,
}
#[derive(Serialize)]
struct MessageReq<'a> { role: &'a str, content: &'a str }

#[derive(Deserialize)]
struct MessagesResponse {
  #[serde(default)] content: Vec<ContentBlock>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")] kind: String,
  #[serde(default)] text: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] input_tokens: Option<u32>,
  #[serde(default)] output_tokens: Option<u32>,
}

/// Try to extract a clean error message from an Anthropic error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use wiremock::matchers::{body_partial_json, header, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn settings(server: &MockServer) -> ModelSettings {
    ModelSettings { api_key: "test-key".into(), model: "test-model".into(), base_url: server.uri() }
  }

  #[tokio::test]
  async fn returns_first_text_block() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/messages"))
      .and(header("x-api-key", "test-key"))
      .and(header("anthropic-version", ANTHROPIC_VERSION))
      .and(body_partial_json(json!({
        "model": "test-model",
        "max_tokens": MAX_TOKENS,
        "system": "sys",
        "messages": [{"role": "user", "content": "hello"}]
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "content": [{"type": "thinking"}, {"type": "text", "text": "{\"a\":1}"}, {"type": "text", "text": "ignored"}],
        "usage": {"input_tokens": 10, "output_tokens": 5}
      })))
      .expect(1)
      .mount(&server)
      .await;

    let client = AnthropicClient::new(settings(&server)).expect("client");
    let text = client.generate("sys", "hello").await.expect("text");
    assert_eq!(text, "{\"a\":1}");
  }

  #[tokio::test]
  async fn non_success_status_is_transport_error_with_body() {
    let server = MockServer::start().await;
    let body = json!({"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}});
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(401).set_body_json(body.clone()))
      .mount(&server)
      .await;

    let client = AnthropicClient::new(settings(&server)).expect("client");
    match client.generate("sys", "hello").await {
      Err(GenerationError::Transport { status, message, body: raw }) => {
        assert_eq!(status, Some(401));
        assert_eq!(message, "invalid x-api-key");
        assert_eq!(serde_json::from_str::<serde_json::Value>(&raw).expect("json"), body);
      }
      other => panic!("expected transport error, got {other:?}"),
    }
    assert!(client.validate_credential().await.is_err());
  }

  #[tokio::test]
  async fn empty_content_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
      .mount(&server)
      .await;

    let client = AnthropicClient::new(settings(&server)).expect("client");
    assert!(matches!(client.generate("s", "u").await, Err(GenerationError::EmptyResponse)));
  }

  #[tokio::test]
  async fn malformed_envelope_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
      .mount(&server)
      .await;

    let client = AnthropicClient::new(settings(&server)).expect("client");
    match client.generate("s", "u").await {
      Err(GenerationError::Transport { status, body, .. }) => {
        assert_eq!(status, Some(200));
        assert_eq!(body, "<html>gateway</html>");
      }
      other => panic!("expected transport error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn timeout_is_transport_error_without_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)).set_body_json(json!({"content": []})))
      .mount(&server)
      .await;

    let client = AnthropicClient::with_timeout(settings(&server), Duration::from_millis(50)).expect("client");
    match client.generate("s", "u").await {
      Err(GenerationError::Transport { status, .. }) => assert_eq!(status, None),
      other => panic!("expected transport error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn credential_probe_succeeds_on_any_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": [{"type": "text", "text": "OK"}]})))
      .expect(1)
      .mount(&server)
      .await;

    let client = AnthropicClient::new(settings(&server)).expect("client");
    assert!(client.validate_credential().await.is_ok());
  }
}
