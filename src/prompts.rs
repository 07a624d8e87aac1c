//! Prompt construction: one fixed system prompt plus a per-type user prompt.

use crate::config::Prompts;
use crate::domain::{ChallengeType, PromptContext};
use crate::util::fill_template;

/// A (system, user) pair ready for the generation client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptPair {
  pub system: String,
  pub user: String,
}

/// Stateless after construction; share one instance across requests.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
  prompts: Prompts,
}

impl PromptBuilder {
  pub fn new(prompts: Prompts) -> Self {
    Self { prompts }
  }

  pub fn system_prompt(&self) -> &str {
    &self.prompts.system
  }

  pub fn user_prompt(&self, ctx: &PromptContext) -> String {
    let tpl = match ctx.challenge_type {
      ChallengeType::MultipleChoice => &self.prompts.multiple_choice_template,
      ChallengeType::Timeline => &self.prompts.timeline_template,
      ChallengeType::TrueFalse => &self.prompts.true_false_template,
    };
    let description = if ctx.category_description.trim().is_empty() {
      "(none)"
    } else {
      ctx.category_description.trim()
    };
    let mut user = fill_template(
      tpl,
      &[
        ("category", ctx.category_name.as_str()),
        ("category_description", description),
        ("difficulty", ctx.difficulty.description()),
      ],
    );

    let previous: Vec<&str> = ctx
      .previous_questions
      .iter()
      .map(|q| q.trim())
      .filter(|q| !q.is_empty())
      .collect();
    if !previous.is_empty() {
      user.push_str("\n\n");
      user.push_str(&self.prompts.exclude_header);
      for q in previous {
        user.push_str("\n- ");
        user.push_str(q);
      }
    }
    user
  }

  pub fn build(&self, ctx: &PromptContext) -> PromptPair {
    PromptPair { system: self.system_prompt().to_string(), user: self.user_prompt(ctx) }
  }
}

impl Default for PromptBuilder {
  fn default() -> Self { Self::new(Prompts::default()) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::DifficultyTier;

  fn ctx(challenge_type: ChallengeType, tier: i64, previous: &[&str]) -> PromptContext {
    PromptContext {
      category_name: "Afrobeats (2010s)".into(),
      category_description: "West African pop from the 2010s".into(),
      difficulty: DifficultyTier(tier),
      challenge_type,
      previous_questions: previous.iter().map(|s| s.to_string()).collect(),
    }
  }

  #[test]
  fn every_type_mentions_category_and_difficulty() {
    let b = PromptBuilder::default();
    for t in [ChallengeType::MultipleChoice, ChallengeType::Timeline, ChallengeType::TrueFalse] {
      for tier in [1, 3, 5, 42, -1] {
        let user = b.user_prompt(&ctx(t, tier, &[]));
        assert!(user.contains("Afrobeats (2010s)"), "{t}: {user}");
        assert!(user.contains(DifficultyTier(tier).description()), "{t}: {user}");
        assert!(!user.contains("{category}") && !user.contains("{difficulty}"));
      }
    }
  }

  #[test]
  fn type_specific_requirements() {
    let b = PromptBuilder::default();
    let mc = b.user_prompt(&ctx(ChallengeType::MultipleChoice, 2, &[]));
    assert!(mc.contains("exactly 4 options") && mc.contains("plausible but clearly wrong"));
    let tl = b.user_prompt(&ctx(ChallengeType::Timeline, 2, &[]));
    assert!(tl.contains("chronological") && tl.contains("\"b,a,d,c\""));
    let tf = b.user_prompt(&ctx(ChallengeType::TrueFalse, 2, &[]));
    assert!(tf.contains("exactly 2 options") && tf.contains("\"True\"") && tf.contains("\"False\""));
  }

  #[test]
  fn previous_questions_are_listed_verbatim() {
    let b = PromptBuilder::default();
    let user = b.user_prompt(&ctx(ChallengeType::MultipleChoice, 2, &["Who sang 'Ye'?", "  "]));
    assert!(user.contains("Do NOT repeat"));
    assert!(user.contains("\n- Who sang 'Ye'?"));
    let listed = user.split(&Prompts::default().exclude_header).nth(1).map(|s| s.matches("\n- ").count());
    assert_eq!(listed, Some(1));

    let plain = b.user_prompt(&ctx(ChallengeType::MultipleChoice, 2, &[]));
    assert!(!plain.contains("Do NOT repeat"));
  }

  #[test]
  fn system_prompt_states_platform_rules() {
    let b = PromptBuilder::default();
    let pair = b.build(&ctx(ChallengeType::TrueFalse, 1, &[]));
    assert!(pair.system.contains("endorses"));
    assert!(pair.system.contains("gambling"));
    assert!(pair.system.contains("medical"));
    assert!(pair.system.contains("13 and up"));
    assert!(pair.system.contains("single JSON object"));
  }
}
