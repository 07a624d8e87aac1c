//! Turning raw model text into a candidate challenge.
//!
//! The model is told to answer with bare JSON but sometimes wraps it in a
//! markdown fence anyway. `clean` removes that wrapper; `parse` decodes the
//! object without correcting anything. Semantic checks belong to the validator.

use serde::Deserialize;

use crate::domain::{ChallengeOption, ChallengeType, CorrectAnswer, GeneratedChallenge};
use crate::error::GenerationError;

const FENCE: &str = "```";

/// Wire shape emitted by the model.
#[derive(Deserialize)]
struct RawChallenge {
  #[serde(default)] title: String,
  #[serde(default)] description: String,
  #[serde(default)] question: String,
  #[serde(default)] options: Vec<ChallengeOption>,
  #[serde(default)] correct_answer: String,
  #[serde(default)] explanation: Option<String>,
  #[serde(default)] difficulty_justification: Option<String>,
}

/// Strip surrounding whitespace and a markdown code fence (with or without a language tag).
/// Idempotent.
pub fn clean(raw: &str) -> String {
  let mut text = raw.trim();
  loop {
    let before = text;
    if let Some(rest) = text.strip_prefix(FENCE) {
      // Drop the language tag, if any, up to the end of the opening line.
      text = match rest.find('\n') {
        Some(nl) if is_lang_tag(&rest[..nl]) => &rest[nl + 1..],
        Some(_) => rest,
        None if is_lang_tag(rest) => "",
        None => rest,
      };
      text = text.trim();
    }
    if let Some(rest) = text.strip_suffix(FENCE) {
      text = rest.trim();
    }
    if text == before {
      return text.to_string();
    }
  }
}

fn is_lang_tag(s: &str) -> bool {
  s.trim().chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Decode cleaned text into a candidate of the given type.
pub fn parse(text: &str, challenge_type: ChallengeType) -> Result<GeneratedChallenge, GenerationError> {
  let raw: RawChallenge = serde_json::from_str(text).map_err(|e| GenerationError::Parse {
    message: e.to_string(),
    raw: text.to_string(),
  })?;

  Ok(GeneratedChallenge {
    challenge_type,
    title: raw.title,
    description: raw.description,
    question: raw.question,
    options: raw.options,
    correct_answer: CorrectAnswer::from_raw(challenge_type, &raw.correct_answer),
    explanation: raw.explanation,
    difficulty_justification: raw.difficulty_justification,
  })
}
