//! Generation pipeline: prompt → model call → parse → validate → sanitize.
//!
//! Each run is independent. A batch runs its items concurrently and reports one
//! outcome per item in request order; a failing item never affects its siblings.

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::anthropic::TextGenerator;
use crate::domain::{GenerationRequest, RejectionReport, ValidatedChallenge};
use crate::error::GenerationError;
use crate::parser;
use crate::prompts::PromptBuilder;
use crate::util::trunc_for_log;
use crate::validator::ComplianceValidator;

pub struct ChallengePipeline<G> {
  prompts: PromptBuilder,
  generator: G,
  validator: ComplianceValidator,
}

/// Per-item result of a batch.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
  Accepted {
    index: usize,
    #[serde(flatten)]
    result: ValidatedChallenge,
  },
  Failed {
    index: usize,
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection: Option<RejectionReport>,
  },
}

impl BatchOutcome {
  fn from_result(index: usize, result: Result<ValidatedChallenge, GenerationError>) -> Self {
    match result {
      Ok(result) => BatchOutcome::Accepted { index, result },
      Err(e) => {
        let kind = e.kind();
        let message = e.to_string();
        let rejection = match e {
          GenerationError::Rejected { report } => Some(*report),
          _ => None,
        };
        BatchOutcome::Failed { index, kind, message, rejection }
      }
    }
  }

  pub fn is_accepted(&self) -> bool {
    matches!(self, BatchOutcome::Accepted { .. })
  }
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
  pub succeeded: usize,
  pub failed: usize,
  pub outcomes: Vec<BatchOutcome>,
}

impl<G: TextGenerator> ChallengePipeline<G> {
  pub fn new(prompts: PromptBuilder, generator: G, validator: ComplianceValidator) -> Self {
    Self { prompts, generator, validator }
  }

  /// Run one item through the whole pipeline.
  #[instrument(
    level = "info",
    skip(self, req),
    fields(category = %req.category, difficulty = %req.difficulty, challenge_type = %req.challenge_type, excluded = req.exclude.len())
  )]
  pub async fn generate_one(&self, req: &GenerationRequest) -> Result<ValidatedChallenge, GenerationError> {
    let ctx = req.to_prompt_context();
    let prompt = self.prompts.build(&ctx);

    let raw = self.generator.generate(&prompt.system, &prompt.user).await.map_err(|e| {
      warn!(target: "pipeline", kind = e.kind(), retryable = e.is_retryable(), error = %e, "Generation call failed");
      e
    })?;

    let cleaned = parser::clean(&raw);
    let candidate = parser::parse(&cleaned, req.challenge_type).map_err(|e| {
      warn!(target: "pipeline", error = %e, raw = %trunc_for_log(&raw, 500), "Model output did not parse");
      match e {
        GenerationError::Parse { message, .. } => GenerationError::Parse { message, raw: raw.clone() },
        other => other,
      }
    })?;

    let validation = self.validator.validate(&candidate);
    if !validation.is_valid {
      warn!(target: "pipeline", errors = ?validation.errors, title = %candidate.title, "Candidate rejected");
      return Err(GenerationError::Rejected {
        report: Box::new(RejectionReport {
          candidate,
          errors: validation.errors,
          warnings: validation.warnings,
        }),
      });
    }

    let quality_issues = self.validator.check_quality(&candidate);
    if !quality_issues.is_empty() {
      debug!(target: "pipeline", issues = ?quality_issues, "Quality advisories");
    }
    let challenge = self.validator.sanitize(&candidate);

    info!(
      target: "pipeline",
      needs_review = validation.needs_review,
      warnings = validation.warnings.len(),
      title = %challenge.title,
      answer = ?challenge.correct_answer.ids(),
      "Candidate accepted"
    );

    Ok(ValidatedChallenge { challenge, original: candidate, validation, quality_issues })
  }

  /// Run every item independently; failures are reported per item.
  #[instrument(level = "info", skip(self, reqs), fields(items = reqs.len()))]
  pub async fn generate_batch(&self, reqs: &[GenerationRequest]) -> BatchReport {
    let runs: Vec<_> = reqs.iter().map(|r| self.generate_one(r)).collect();
    let results = join_all(runs).await;
    let outcomes: Vec<BatchOutcome> = results
      .into_iter()
      .enumerate()
      .map(|(i, r)| BatchOutcome::from_result(i, r))
      .collect();
    let succeeded = outcomes.iter().filter(|o| o.is_accepted()).count();
    let failed = outcomes.len() - succeeded;
    info!(target: "pipeline", succeeded, failed, "Batch finished");
    BatchReport { succeeded, failed, outcomes }
  }

  pub async fn validate_credential(&self) -> Result<(), GenerationError> {
    self.generator.validate_credential().await
  }
}
