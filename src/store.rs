//! In-memory store for accepted challenges, keyed by category and difficulty tier.
//!
//! Stands in for the persistence service: the pipeline never touches it, the
//! HTTP layer hands accepted candidates over after validation.

use std::{collections::HashMap, sync::Arc};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{ChallengeType, DifficultyTier, GeneratedChallenge};

#[derive(Clone, Debug, Serialize)]
pub struct StoredChallenge {
  pub id: String,
  pub category: String,
  pub difficulty: DifficultyTier,
  pub challenge_type: ChallengeType,
  pub needs_review: bool,
  pub challenge: GeneratedChallenge,
}

type Key = (String, DifficultyTier);

#[derive(Clone, Default)]
pub struct ChallengeStore {
  by_id: Arc<RwLock<HashMap<String, StoredChallenge>>>,
  by_key: Arc<RwLock<HashMap<Key, Vec<String>>>>,
}

fn key(category: &str, difficulty: DifficultyTier) -> Key {
  (category.trim().to_lowercase(), difficulty)
}

impl ChallengeStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert an accepted challenge; returns the stored record.
  #[instrument(level = "debug", skip(self, challenge), fields(%category, %difficulty))]
  pub async fn insert(
    &self,
    category: &str,
    difficulty: DifficultyTier,
    needs_review: bool,
    challenge: GeneratedChallenge,
  ) -> StoredChallenge {
    let stored = StoredChallenge {
      id: Uuid::new_v4().to_string(),
      category: category.trim().to_string(),
      difficulty,
      challenge_type: challenge.challenge_type,
      needs_review,
      challenge,
    };
    let mut by_id = self.by_id.write().await;
    let mut by_key = self.by_key.write().await;
    by_key.entry(key(category, difficulty)).or_default().push(stored.id.clone());
    by_id.insert(stored.id.clone(), stored.clone());
    debug!(target: "trivia_forge", id = %stored.id, "Stored challenge");
    stored
  }

  /// Challenges for a category, optionally narrowed to one tier, in insertion order per tier.
  pub async fn list(&self, category: &str, difficulty: Option<DifficultyTier>) -> Vec<StoredChallenge> {
    let by_id = self.by_id.read().await;
    let by_key = self.by_key.read().await;
    let wanted = category.trim().to_lowercase();
    let mut keys: Vec<&Key> = by_key
      .keys()
      .filter(|(cat, tier)| *cat == wanted && difficulty.map_or(true, |d| d == *tier))
      .collect();
    keys.sort_by_key(|(_, tier)| tier.0);
    keys
      .into_iter()
      .flat_map(|k| by_key[k].iter())
      .filter_map(|id| by_id.get(id).cloned())
      .collect()
  }

  /// Question texts already stored for a category (all tiers), for anti-duplication prompts.
  pub async fn question_texts(&self, category: &str) -> Vec<String> {
    self.list(category, None).await.into_iter().map(|c| c.challenge.question).collect()
  }

  pub async fn get(&self, id: &str) -> Option<StoredChallenge> {
    self.by_id.read().await.get(id).cloned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ChallengeOption, CorrectAnswer};

  fn challenge(question: &str) -> GeneratedChallenge {
    GeneratedChallenge {
      challenge_type: ChallengeType::TrueFalse,
      title: "T".into(),
      description: String::new(),
      question: question.into(),
      options: vec![
        ChallengeOption { id: "a".into(), text: "True".into() },
        ChallengeOption { id: "b".into(), text: "False".into() },
      ],
      correct_answer: CorrectAnswer::SingleOption("a".into()),
      explanation: None,
      difficulty_justification: None,
    }
  }

  #[tokio::test]
  async fn keyed_by_category_and_tier() {
    let store = ChallengeStore::new();
    let first = store.insert("Afrobeats (2010s)", DifficultyTier(2), false, challenge("q1?")).await;
    store.insert("afrobeats (2010s) ", DifficultyTier(1), true, challenge("q0?")).await;
    store.insert("Jazz", DifficultyTier(2), false, challenge("other?")).await;

    let tier2 = store.list("Afrobeats (2010s)", Some(DifficultyTier(2))).await;
    assert_eq!(tier2.len(), 1);
    assert_eq!(tier2[0].id, first.id);

    let all = store.list("AFROBEATS (2010S)", None).await;
    assert_eq!(all.len(), 2);
    assert_eq!(store.question_texts("Afrobeats (2010s)").await, vec!["q0?".to_string(), "q1?".to_string()]);
    assert!(store.get(&first.id).await.is_some());
    assert!(store.list("Rock", None).await.is_empty());
  }
}
