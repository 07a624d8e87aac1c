//! Forbidden and warning lexical patterns used by the compliance validator.
//!
//! Matching is plain case-insensitive substring containment. It over-matches
//! ("win" fires on "winner" and "window") and misses paraphrases. Reviewers
//! should expect false positives from short patterns.

use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PolicyArea {
  Endorsement,
  Gambling,
  Medical,
  Certainty,
  /// Added through configuration.
  Operator,
}

impl PolicyArea {
  pub fn label(&self) -> &'static str {
    match self {
      PolicyArea::Endorsement => "endorsement",
      PolicyArea::Gambling => "gambling/prize",
      PolicyArea::Medical => "medical claim",
      PolicyArea::Certainty => "unverifiable certainty",
      PolicyArea::Operator => "operator policy",
    }
  }
}

const ENDORSEMENT_PATTERNS: &[&str] = &["endorse", "recommend", "prefers", "sponsored", "approved by"];

const GAMBLING_PATTERNS: &[&str] = &[
  "win", "prize", "jackpot", "lottery", "betting", "gambl", "wager", "cash reward", "free money",
];

const MEDICAL_PATTERNS: &[&str] = &["cure", "heals", "treatment for", "prevents disease", "medical advice", "diagnos"];

const CERTAINTY_PATTERNS: &[&str] = &["guaranteed", "100%", "definitely", "proven fact", "scientifically proven"];

/// Sensitive-but-allowed topics. A hit flags the candidate for human review.
const WARNING_PATTERNS: &[&str] = &[
  // politics
  "politic", "election", "senator",
  // religion
  "religio", "church", "mosque",
  // violence
  "violen", "murder", "weapon", "shooting",
  // drugs
  "drug", "cocaine", "marijuana",
  // death
  "death", "died", "killed",
  // scandal
  "scandal", "controvers",
  // legal trouble
  "arrest", "lawsuit", "convicted", "prison",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForbiddenPattern {
  pub pattern: String,
  pub area: PolicyArea,
}

/// Immutable pattern set, built once and owned by the validator.
#[derive(Clone, Debug)]
pub struct PatternRegistry {
  forbidden: Vec<ForbiddenPattern>,
  warning: Vec<String>,
}

impl Default for PatternRegistry {
  fn default() -> Self {
    let areas: [(PolicyArea, &[&str]); 4] = [
      (PolicyArea::Endorsement, ENDORSEMENT_PATTERNS),
      (PolicyArea::Gambling, GAMBLING_PATTERNS),
      (PolicyArea::Medical, MEDICAL_PATTERNS),
      (PolicyArea::Certainty, CERTAINTY_PATTERNS),
    ];
    let forbidden = areas
      .iter()
      .flat_map(|(area, pats)| pats.iter().map(move |p| ForbiddenPattern { pattern: p.to_string(), area: *area }))
      .collect();
    let warning = WARNING_PATTERNS.iter().map(|p| p.to_string()).collect();
    Self { forbidden, warning }
  }
}

impl PatternRegistry {
  /// Defaults plus operator-supplied extras. Duplicates of existing patterns are ignored.
  pub fn with_extra(extra_forbidden: &[String], extra_warning: &[String]) -> Self {
    let mut reg = Self::default();
    for p in extra_forbidden {
      let p = p.trim().to_lowercase();
      if p.is_empty() || reg.forbidden.iter().any(|f| f.pattern == p) { continue; }
      reg.forbidden.push(ForbiddenPattern { pattern: p, area: PolicyArea::Operator });
    }
    for p in extra_warning {
      let p = p.trim().to_lowercase();
      if p.is_empty() || reg.warning.contains(&p) { continue; }
      reg.warning.push(p);
    }
    reg
  }

  /// Forbidden patterns contained in `haystack`, in registry order. `haystack` must be lower-cased.
  pub fn forbidden_hits<'a>(&'a self, haystack: &'a str) -> impl Iterator<Item = &'a ForbiddenPattern> + 'a {
    self.forbidden.iter().filter(move |f| haystack.contains(f.pattern.as_str()))
  }

  /// Warning patterns contained in `haystack`, in registry order. `haystack` must be lower-cased.
  pub fn warning_hits<'a>(&'a self, haystack: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    self.warning.iter().map(String::as_str).filter(move |w| haystack.contains(w))
  }

  pub fn forbidden_len(&self) -> usize { self.forbidden.len() }
  pub fn warning_len(&self) -> usize { self.warning.len() }
}
