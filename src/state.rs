//! Application state: the generation pipeline, the challenge store, and the
//! hand-off of accepted candidates to storage.
//!
//! The pipeline is optional: without ANTHROPIC_API_KEY the server still starts
//! and serves stored challenges, but generation endpoints report unavailability.

use tracing::{error, info, instrument, warn};

use crate::anthropic::{AnthropicClient, TextGenerator};
use crate::config::{load_generator_config_from_env, GeneratorConfig, ModelSettings};
use crate::domain::{GenerationRequest, ValidatedChallenge};
use crate::error::GenerationError;
use crate::patterns::PatternRegistry;
use crate::pipeline::{BatchOutcome, BatchReport, ChallengePipeline};
use crate::prompts::PromptBuilder;
use crate::store::{ChallengeStore, StoredChallenge};
use crate::validator::ComplianceValidator;

pub struct AppState<G = AnthropicClient> {
  pub pipeline: Option<ChallengePipeline<G>>,
  pub store: ChallengeStore,
}

impl AppState {
  /// Build state from env: load config, build the validator and the model client.
  #[instrument(level = "info", skip_all)]
  pub fn from_env() -> Self {
    let cfg = load_generator_config_from_env().unwrap_or_default();

    let client = match ModelSettings::from_env() {
      Some(settings) => match AnthropicClient::new(settings) {
        Ok(c) => {
          info!(target: "trivia_forge", base_url = %c.base_url, model = %c.model, "Generation enabled.");
          Some(c)
        }
        Err(e) => {
          error!(target: "trivia_forge", error = %e, "Failed to build generation client; generation disabled.");
          None
        }
      },
      None => {
        warn!(target: "trivia_forge", "ANTHROPIC_API_KEY not set; generation disabled.");
        None
      }
    };

    Self::with_generator(&cfg, client)
  }
}

impl<G: TextGenerator> AppState<G> {
  pub fn with_generator(cfg: &GeneratorConfig, generator: Option<G>) -> Self {
    let patterns = PatternRegistry::with_extra(&cfg.patterns.extra_forbidden, &cfg.patterns.extra_warning);
    info!(
      target: "trivia_forge",
      forbidden = patterns.forbidden_len(),
      warning = patterns.warning_len(),
      "Compliance patterns loaded"
    );
    let pipeline = generator.map(|g| {
      ChallengePipeline::new(PromptBuilder::new(cfg.prompts.clone()), g, ComplianceValidator::new(patterns))
    });
    Self { pipeline, store: ChallengeStore::new() }
  }

  /// Stored question texts for the category are appended to the caller's exclude list.
  async fn with_prior_questions(&self, req: &GenerationRequest) -> GenerationRequest {
    let mut req = req.clone();
    for q in self.store.question_texts(&req.category).await {
      if !req.exclude.contains(&q) {
        req.exclude.push(q);
      }
    }
    req
  }

  /// Generate, validate and store one challenge. `None` when generation is disabled.
  #[instrument(level = "info", skip(self, req), fields(category = %req.category, difficulty = %req.difficulty))]
  pub async fn generate_and_store(
    &self,
    req: &GenerationRequest,
  ) -> Option<Result<(StoredChallenge, ValidatedChallenge), GenerationError>> {
    let pipeline = self.pipeline.as_ref()?;
    let req = self.with_prior_questions(req).await;
    let result = match pipeline.generate_one(&req).await {
      Ok(v) => {
        let stored = self
          .store
          .insert(&req.category, req.difficulty, v.validation.needs_review, v.challenge.clone())
          .await;
        Ok((stored, v))
      }
      Err(e) => Err(e),
    };
    Some(result)
  }

  /// Batch variant: every accepted item is stored; failures are left in the report.
  #[instrument(level = "info", skip(self, reqs), fields(items = reqs.len()))]
  pub async fn generate_batch_and_store(&self, reqs: &[GenerationRequest]) -> Option<(BatchReport, Vec<StoredChallenge>)> {
    let pipeline = self.pipeline.as_ref()?;
    let mut enriched = Vec::with_capacity(reqs.len());
    for r in reqs {
      enriched.push(self.with_prior_questions(r).await);
    }
    let report = pipeline.generate_batch(&enriched).await;
    let mut stored = Vec::new();
    for outcome in &report.outcomes {
      if let BatchOutcome::Accepted { index, result } = outcome {
        let req = &enriched[*index];
        stored.push(
          self
            .store
            .insert(&req.category, req.difficulty, result.validation.needs_review, result.challenge.clone())
            .await,
        );
      }
    }
    Some((report, stored))
  }

  pub async fn validate_credential(&self) -> Option<Result<(), GenerationError>> {
    let pipeline = self.pipeline.as_ref()?;
    Some(pipeline.validate_credential().await)
  }
}
