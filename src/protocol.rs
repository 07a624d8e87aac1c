//! Public protocol structs for the admin HTTP endpoints (serde ready).
//! Keep this small and stable so the calling service can evolve independently.

use serde::{Deserialize, Serialize};

use crate::domain::{DifficultyTier, GenerationRequest, RejectionReport, ValidationResult};
use crate::pipeline::BatchOutcome;
use crate::store::StoredChallenge;

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
  pub generator_configured: bool,
}

#[derive(Serialize)]
pub struct CredentialOut {
  pub ok: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

/// Accepted single generation.
#[derive(Serialize)]
pub struct GeneratedOut {
  pub stored: StoredChallenge,
  pub validation: ValidationResult,
  pub quality_issues: Vec<String>,
}

/// Any failed single generation. `rejection` is only set for compliance/structure failures.
#[derive(Serialize)]
pub struct GenerationErrorOut {
  pub kind: &'static str,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rejection: Option<RejectionReport>,
}

#[derive(Deserialize)]
pub struct BatchIn {
  pub items: Vec<GenerationRequest>,
}

#[derive(Serialize)]
pub struct BatchOut {
  pub succeeded: usize,
  pub failed: usize,
  pub outcomes: Vec<BatchOutcome>,
  pub stored: Vec<StoredChallenge>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
  pub category: String,
  pub tier: Option<DifficultyTier>,
}

#[derive(Serialize)]
pub struct ListOut {
  pub challenges: Vec<StoredChallenge>,
}
