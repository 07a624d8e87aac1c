//! Domain models: challenge types, difficulty tiers, prompt context, and the
//! parsed candidate challenge with its validation verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape of a quiz item. Selects the prompt template and the correct-answer encoding.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
  /// Four options, one correct id.
  MultipleChoice,
  /// Four events; the answer is their chronological order.
  Timeline,
  /// Two options ("True"/"False"), one correct id.
  TrueFalse,
}

impl ChallengeType {
  pub fn as_str(&self) -> &'static str {
    match self {
      ChallengeType::MultipleChoice => "multiple_choice",
      ChallengeType::Timeline => "timeline",
      ChallengeType::TrueFalse => "true_false",
    }
  }
}

impl fmt::Display for ChallengeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Difficulty tier 1..=5. Any other integer is tolerated and described generically.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct DifficultyTier(pub i64);

impl DifficultyTier {
  /// Human-readable framing for the prompt. Total over all integers.
  pub fn description(&self) -> &'static str {
    match self.0 {
      1 => "Beginner - well-known facts most fans would know",
      2 => "Easy - familiar facts that casual followers recognise",
      3 => "Intermediate - requires solid knowledge of the category",
      4 => "Advanced - detailed knowledge expected from dedicated fans",
      5 => "Master - obscure facts only experts would know",
      _ => "Medium difficulty",
    }
  }
}

impl fmt::Display for DifficultyTier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Immutable input bundle for the prompt builder.
#[derive(Clone, Debug)]
pub struct PromptContext {
  pub category_name: String,
  pub category_description: String,
  pub difficulty: DifficultyTier,
  pub challenge_type: ChallengeType,
  /// Previously generated question texts, in the order they were produced.
  pub previous_questions: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChallengeOption {
  pub id: String,
  pub text: String,
}

/// Correct-answer reference. Timeline challenges carry an ordered list of ids;
/// every other type carries a single id.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CorrectAnswer {
  SingleOption(String),
  OrderedSequence(Vec<String>),
}

impl CorrectAnswer {
  /// Decode the model's raw `correct_answer` string for the given type.
  pub fn from_raw(challenge_type: ChallengeType, raw: &str) -> Self {
    match challenge_type {
      ChallengeType::Timeline => {
        let raw = raw.trim();
        if raw.is_empty() {
          CorrectAnswer::OrderedSequence(Vec::new())
        } else {
          CorrectAnswer::OrderedSequence(raw.split(',').map(|id| id.trim().to_string()).collect())
        }
      }
      ChallengeType::MultipleChoice | ChallengeType::TrueFalse => {
        CorrectAnswer::SingleOption(raw.trim().to_string())
      }
    }
  }

  pub fn is_empty(&self) -> bool {
    match self {
      CorrectAnswer::SingleOption(id) => id.is_empty(),
      CorrectAnswer::OrderedSequence(ids) => ids.is_empty(),
    }
  }

  /// Referenced ids, in order.
  pub fn ids(&self) -> Vec<&str> {
    match self {
      CorrectAnswer::SingleOption(id) => vec![id.as_str()],
      CorrectAnswer::OrderedSequence(ids) => ids.iter().map(String::as_str).collect(),
    }
  }
}

impl fmt::Display for CorrectAnswer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CorrectAnswer::SingleOption(id) => f.write_str(id),
      CorrectAnswer::OrderedSequence(ids) => f.write_str(&ids.join(",")),
    }
  }
}

/// Candidate challenge parsed from model output. Lives only in memory until accepted.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct GeneratedChallenge {
  pub challenge_type: ChallengeType,
  pub title: String,
  pub description: String,
  pub question: String,
  pub options: Vec<ChallengeOption>,
  pub correct_answer: CorrectAnswer,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub difficulty_justification: Option<String>,
}

/// Verdict over a candidate. `passed` mirrors `is_valid`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ValidationResult {
  pub is_valid: bool,
  pub passed: bool,
  pub needs_review: bool,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
}

impl ValidationResult {
  pub fn new() -> Self {
    Self { is_valid: true, passed: true, needs_review: false, errors: Vec::new(), warnings: Vec::new() }
  }

  pub fn error(&mut self, message: impl Into<String>) {
    self.errors.push(message.into());
    self.is_valid = false;
    self.passed = false;
  }

  pub fn warn(&mut self, message: impl Into<String>) {
    self.warnings.push(message.into());
  }

  pub fn flag_for_review(&mut self, message: impl Into<String>) {
    self.warnings.push(message.into());
    self.needs_review = true;
  }
}

impl Default for ValidationResult {
  fn default() -> Self { Self::new() }
}

/// One inbound generation item (single or batch).
#[derive(Clone, Debug, Deserialize)]
pub struct GenerationRequest {
  pub category: String,
  #[serde(default)]
  pub category_description: String,
  pub difficulty: DifficultyTier,
  pub challenge_type: ChallengeType,
  #[serde(default)]
  pub exclude: Vec<String>,
}

impl GenerationRequest {
  pub fn to_prompt_context(&self) -> PromptContext {
    PromptContext {
      category_name: self.category.clone(),
      category_description: self.category_description.clone(),
      difficulty: self.difficulty,
      challenge_type: self.challenge_type,
      previous_questions: self.exclude.clone(),
    }
  }
}

/// Accepted pipeline output. `original` is kept for audit next to the sanitized copy.
#[derive(Clone, Debug, Serialize)]
pub struct ValidatedChallenge {
  pub challenge: GeneratedChallenge,
  pub original: GeneratedChallenge,
  pub validation: ValidationResult,
  pub quality_issues: Vec<String>,
}

/// Rejected candidate with the itemized reasons.
#[derive(Clone, Debug, Serialize)]
pub struct RejectionReport {
  pub candidate: GeneratedChallenge,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
}
