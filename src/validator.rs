//! Compliance validation for generated candidates.
//!
//! Flow:
//! 1) Lexical scan against forbidden patterns (blocking).
//! 2) Lexical scan against warning patterns (flags for review).
//! 3) Structural checks, including correct-answer resolution per challenge type (blocking).
//! 4) Length and duplicate-option advisories (non-blocking).
//!
//! Every check runs; nothing short-circuits.

use std::collections::HashSet;

use crate::domain::{ChallengeType, CorrectAnswer, GeneratedChallenge, ValidationResult};
use crate::patterns::PatternRegistry;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 200;
const QUESTION_MIN_CHARS: usize = 10;
const QUESTION_MAX_CHARS: usize = 500;
const ELLIPSIS: &str = "...";

#[derive(Clone, Debug, Default)]
pub struct ComplianceValidator {
  patterns: PatternRegistry,
}

impl ComplianceValidator {
  pub fn new(patterns: PatternRegistry) -> Self {
    Self { patterns }
  }

  pub fn validate(&self, c: &GeneratedChallenge) -> ValidationResult {
    let mut result = ValidationResult::new();
    let haystack = scan_text(c);

    for hit in self.patterns.forbidden_hits(&haystack) {
      result.error(format!("Forbidden pattern '{}' found ({})", hit.pattern, hit.area.label()));
    }
    for hit in self.patterns.warning_hits(&haystack) {
      result.flag_for_review(format!("Sensitive topic '{}' found; needs human review", hit));
    }

    check_structure(c, &mut result);

    let title_len = c.title.chars().count();
    if title_len > TITLE_MAX_CHARS {
      result.warn(format!("Title is {} characters (limit {})", title_len, TITLE_MAX_CHARS));
    }
    let desc_len = c.description.chars().count();
    if desc_len > DESCRIPTION_MAX_CHARS {
      result.warn(format!("Description is {} characters (limit {})", desc_len, DESCRIPTION_MAX_CHARS));
    }

    let mut seen = HashSet::new();
    for opt in &c.options {
      let key = opt.text.trim().to_lowercase();
      if !seen.insert(key) {
        result.warn(format!("Duplicate option text '{}'", opt.text.trim()));
      }
    }

    result
  }

  /// Advisory pass; never affects validity.
  pub fn check_quality(&self, c: &GeneratedChallenge) -> Vec<String> {
    let mut issues = Vec::new();
    let question = c.question.trim();
    let len = question.chars().count();
    if len < QUESTION_MIN_CHARS {
      issues.push(format!("Question is too short ({} characters)", len));
    }
    if len > QUESTION_MAX_CHARS {
      issues.push(format!("Question is too long ({} characters)", len));
    }
    if c.options.len() >= 2 {
      let first = c.options[0].text.chars().count();
      if c.options.iter().all(|o| o.text.chars().count() == first) {
        issues.push("All options have identical length".to_string());
      }
    }
    if !question.ends_with('?') {
      issues.push("Question does not end with a question mark".to_string());
    }
    issues
  }

  /// Trim every text field and clamp title/description. Returns a new value.
  pub fn sanitize(&self, c: &GeneratedChallenge) -> GeneratedChallenge {
    let mut out = c.clone();
    out.title = truncate_with_ellipsis(c.title.trim(), TITLE_MAX_CHARS);
    out.description = truncate_with_ellipsis(c.description.trim(), DESCRIPTION_MAX_CHARS);
    out.question = c.question.trim().to_string();
    out.explanation = c.explanation.as_ref().map(|s| s.trim().to_string());
    out.difficulty_justification = c.difficulty_justification.as_ref().map(|s| s.trim().to_string());
    for opt in &mut out.options {
      opt.text = opt.text.trim().to_string();
    }
    out
  }
}

/// Lower-cased text scanned for patterns.
fn scan_text(c: &GeneratedChallenge) -> String {
  let mut parts: Vec<&str> = vec![c.title.as_str(), c.description.as_str(), c.question.as_str()];
  parts.extend(c.options.iter().map(|o| o.text.as_str()));
  if let Some(e) = &c.explanation {
    parts.push(e);
  }
  parts.join(" ").to_lowercase()
}

fn check_structure(c: &GeneratedChallenge, result: &mut ValidationResult) {
  if c.title.trim().is_empty() {
    result.error("Title is required");
  }
  if c.question.trim().is_empty() {
    result.error("Question is required");
  }
  if c.options.len() < 2 {
    result.error(format!("At least 2 options are required (got {})", c.options.len()));
  }
  if c.correct_answer.is_empty() {
    result.error("Correct answer is required");
    return;
  }

  let ids: HashSet<&str> = c.options.iter().map(|o| o.id.as_str()).collect();
  match &c.correct_answer {
    CorrectAnswer::SingleOption(id) => {
      if c.challenge_type == ChallengeType::Timeline {
        result.error("Timeline challenges need an ordered list of option ids");
      } else if !ids.contains(id.as_str()) {
        result.error(format!("Correct answer '{}' does not match any option id", id));
      }
    }
    CorrectAnswer::OrderedSequence(order) => {
      if c.challenge_type != ChallengeType::Timeline {
        result.error(format!("{} challenges need a single correct option id", c.challenge_type));
      }
      let mut placed = HashSet::new();
      for id in order {
        if !ids.contains(id.as_str()) {
          result.error(format!("Timeline answer id '{}' does not match any option id", id));
        } else if !placed.insert(id.as_str()) {
          result.error(format!("Timeline answer repeats option id '{}'", id));
        }
      }
      let unplaced = ids.iter().filter(|id| !placed.contains(*id)).count();
      if unplaced > 0 && !c.options.is_empty() {
        result.warn(format!("Timeline answer leaves {} option(s) unordered", unplaced));
      }
    }
  }
}

/// Clamp to `max` chars; when cut, the last 3 chars become "...".
fn truncate_with_ellipsis(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    return s.to_string();
  }
  let keep = max.saturating_sub(ELLIPSIS.len());
  let mut out: String = s.chars().take(keep).collect();
  out.push_str(ELLIPSIS);
  out
}
