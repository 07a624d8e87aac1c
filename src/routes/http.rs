//! HTTP endpoint handlers. These are thin wrappers that forward to the pipeline and store.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::anthropic::TextGenerator;
use crate::domain::GenerationRequest;
use crate::error::GenerationError;
use crate::protocol::*;
use crate::state::AppState;

fn generator_unavailable() -> Response {
  (
    StatusCode::SERVICE_UNAVAILABLE,
    Json(GenerationErrorOut {
      kind: "unavailable",
      message: "generation is disabled: ANTHROPIC_API_KEY is not configured".into(),
      rejection: None,
    }),
  )
    .into_response()
}

fn error_response(e: GenerationError) -> Response {
  let status = match &e {
    GenerationError::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    _ => StatusCode::BAD_GATEWAY,
  };
  let kind = e.kind();
  let message = e.to_string();
  let rejection = match e {
    GenerationError::Rejected { report } => Some(*report),
    _ => None,
  };
  (status, Json(GenerationErrorOut { kind, message, rejection })).into_response()
}

#[instrument(level = "info", skip(state))]
pub async fn http_health<G: TextGenerator + 'static>(State(state): State<Arc<AppState<G>>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, generator_configured: state.pipeline.is_some() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_validate_credential<G: TextGenerator + 'static>(State(state): State<Arc<AppState<G>>>) -> Response {
  match state.validate_credential().await {
    None => generator_unavailable(),
    Some(Ok(())) => Json(CredentialOut { ok: true, error: None }).into_response(),
    Some(Err(e)) => {
      warn!(target: "trivia_forge", error = %e, "Credential probe failed");
      Json(CredentialOut { ok: false, error: Some(e.to_string()) }).into_response()
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(category = %body.category, difficulty = %body.difficulty, challenge_type = %body.challenge_type))]
pub async fn http_generate_one<G: TextGenerator + 'static>(
  State(state): State<Arc<AppState<G>>>,
  Json(body): Json<GenerationRequest>,
) -> Response {
  match state.generate_and_store(&body).await {
    None => generator_unavailable(),
    Some(Ok((stored, result))) => {
      info!(target: "pipeline", id = %stored.id, needs_review = stored.needs_review, "HTTP challenge generated");
      Json(GeneratedOut { stored, validation: result.validation, quality_issues: result.quality_issues }).into_response()
    }
    Some(Err(e)) => {
      info!(target: "pipeline", kind = e.kind(), "HTTP challenge generation failed");
      error_response(e)
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(items = body.items.len()))]
pub async fn http_generate_batch<G: TextGenerator + 'static>(
  State(state): State<Arc<AppState<G>>>,
  Json(body): Json<BatchIn>,
) -> Response {
  match state.generate_batch_and_store(&body.items).await {
    None => generator_unavailable(),
    Some((report, stored)) => {
      info!(target: "pipeline", succeeded = report.succeeded, failed = report.failed, "HTTP batch generated");
      Json(BatchOut { succeeded: report.succeeded, failed: report.failed, outcomes: report.outcomes, stored })
        .into_response()
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_challenges<G: TextGenerator + 'static>(
  State(state): State<Arc<AppState<G>>>,
  Query(q): Query<ListQuery>,
) -> impl IntoResponse {
  let challenges = state.store.list(&q.category, q.tier).await;
  Json(ListOut { challenges })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_challenge<G: TextGenerator + 'static>(
  State(state): State<Arc<AppState<G>>>,
  Path(id): Path<String>,
) -> Response {
  match state.store.get(&id).await {
    Some(c) => Json(c).into_response(),
    None => StatusCode::NOT_FOUND.into_response(),
  }
}

#[cfg(test)]
mod tests {
  use axum::body::{to_bytes, Body};
  use axum::http::Request;
  use serde_json::{json, Value};
  use tower::ServiceExt;

  use crate::config::GeneratorConfig;
  use crate::pipeline::tests::{ScriptedGenerator, AFROBEATS_JSON};
  use crate::routes::build_router;

  use super::*;

  fn app(script: Vec<Result<String, GenerationError>>) -> (Arc<AppState<ScriptedGenerator>>, axum::Router) {
    let state = Arc::new(AppState::with_generator(&GeneratorConfig::default(), Some(ScriptedGenerator::new(script))));
    (state.clone(), build_router(state))
  }

  async fn call(router: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = router.oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).expect("json") };
    (status, value)
  }

  fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .expect("request")
  }

  fn item(tier: i64) -> Value {
    json!({"category": "Afrobeats (2010s)", "difficulty": tier, "challenge_type": "multiple_choice"})
  }

  #[tokio::test]
  async fn generate_one_stores_accepted_challenge() {
    let (state, router) = app(vec![Ok(AFROBEATS_JSON.to_string())]);
    let (status, body) = call(router, post("/api/v1/admin/challenges/generate", item(2))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["validation"]["is_valid"], true);
    assert_eq!(body["stored"]["challenge"]["correct_answer"], "b");
    assert_eq!(state.store.list("Afrobeats (2010s)", None).await.len(), 1);
  }

  #[tokio::test]
  async fn out_of_range_tiers_generate_with_generic_difficulty() {
    let (state, router) = app(vec![Ok(AFROBEATS_JSON.to_string()), Ok(AFROBEATS_JSON.to_string())]);
    for tier in [-1, 300] {
      let (status, body) = call(router.clone(), post("/api/v1/admin/challenges/generate", item(tier))).await;
      assert_eq!(status, StatusCode::OK, "{tier}: {body}");
      assert_eq!(body["stored"]["difficulty"], tier);
    }
    assert_eq!(state.store.list("Afrobeats (2010s)", Some(crate::domain::DifficultyTier(300))).await.len(), 1);
  }

  #[tokio::test]
  async fn rejected_challenge_is_422_and_not_stored() {
    let winning = AFROBEATS_JSON.replace("Afrobeats Hitmakers", "Winner Takes All");
    let (state, router) = app(vec![Ok(winning)]);
    let (status, body) = call(router, post("/api/v1/admin/challenges/generate", item(2))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "rejected");
    let errors = body["rejection"]["errors"].as_array().cloned().unwrap_or_default();
    assert!(errors.iter().any(|e| e.as_str().unwrap_or_default().contains("'win'")), "{body}");
    assert!(state.store.list("Afrobeats (2010s)", None).await.is_empty());
  }

  #[tokio::test]
  async fn batch_reports_each_item() {
    let timeout = GenerationError::Transport { status: None, message: "timed out".into(), body: String::new() };
    let (state, router) = app(vec![Ok(AFROBEATS_JSON.to_string()), Err(timeout), Ok(AFROBEATS_JSON.to_string())]);
    let (status, body) =
      call(router, post("/api/v1/admin/challenges/batch", json!({"items": [item(1), item(2), item(3)]}))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["succeeded"], 2);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["outcomes"][1]["status"], "failed");
    assert_eq!(body["outcomes"][1]["kind"], "transport");
    assert_eq!(body["stored"].as_array().map(Vec::len), Some(2));
    assert_eq!(state.store.list("Afrobeats (2010s)", None).await.len(), 2);
  }

  #[tokio::test]
  async fn disabled_generator_is_503() {
    let state: Arc<AppState<ScriptedGenerator>> = Arc::new(AppState::with_generator(&GeneratorConfig::default(), None));
    let router = build_router(state);
    let (status, body) = call(router.clone(), post("/api/v1/admin/challenges/generate", item(2))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "unavailable");

    let (status, body) = call(router, Request::get("/api/v1/health").body(Body::empty()).expect("request")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generator_configured"], false);
  }

  #[tokio::test]
  async fn credential_probe_reports_failure_as_value() {
    let (_, router) = app(vec![Err(GenerationError::Transport {
      status: Some(401),
      message: "invalid x-api-key".into(),
      body: String::new(),
    })]);
    let (status, body) = call(router, Request::get("/api/v1/admin/credential").body(Body::empty()).expect("request")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap_or_default().contains("invalid x-api-key"));
  }

  #[tokio::test]
  async fn stored_challenge_is_readable_by_id() {
    let (state, router) = app(vec![]);
    let stored = state
      .store
      .insert(
        "Afrobeats (2010s)",
        crate::domain::DifficultyTier(2),
        false,
        crate::parser::parse(AFROBEATS_JSON, crate::domain::ChallengeType::MultipleChoice).expect("parse"),
      )
      .await;
    let uri = format!("/api/v1/admin/challenges/{}", stored.id);
    let (status, body) = call(router.clone(), Request::get(uri).body(Body::empty()).expect("request")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], stored.id);

    let (status, _) = call(router, Request::get("/api/v1/admin/challenges/missing").body(Body::empty()).expect("request")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
