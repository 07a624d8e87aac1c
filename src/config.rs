//! Loading generator configuration (prompts + extra compliance patterns) from TOML,
//! and the model connection settings from the environment.
//!
//! See `GeneratorConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct GeneratorConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub patterns: PatternConfig,
}

/// Extra compliance patterns appended to the built-in lists.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct PatternConfig {
  #[serde(default)] pub extra_forbidden: Vec<String>,
  #[serde(default)] pub extra_warning: Vec<String>,
}

/// Prompts sent to the generative model. Placeholders: `{category}`,
/// `{category_description}`, `{difficulty}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system: String,
  pub multiple_choice_template: String,
  pub timeline_template: String,
  pub true_false_template: String,
  pub exclude_header: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system: DEFAULT_SYSTEM_PROMPT.trim().into(),
      multiple_choice_template: DEFAULT_MULTIPLE_CHOICE_TEMPLATE.trim().into(),
      timeline_template: DEFAULT_TIMELINE_TEMPLATE.trim().into(),
      true_false_template: DEFAULT_TRUE_FALSE_TEMPLATE.trim().into(),
      exclude_header: "Do NOT repeat or closely paraphrase any of these previously generated questions:".into(),
    }
  }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"
You write trivia challenges for a music and pop-culture quiz platform.

Platform rules (MANDATORY):
- Never imply that any artist, celebrity or public figure endorses, recommends or prefers a product, brand or service.
- Never mention gambling, betting, prizes, cash rewards, lotteries or winning money.
- Never make medical or health claims of any kind.
- Never state false, unverifiable or defamatory things about real public figures. Only use well-documented, publicly verifiable facts.
- Avoid absolute certainty words such as "guaranteed" or "definitely".
- Keep the tone fun and family-friendly, suitable for ages 13 and up.

Output rules:
- Respond with a single JSON object and nothing else: no prose, no markdown.
- The JSON object has exactly these fields:
  {
    "title": string (max 100 characters),
    "description": string (max 200 characters),
    "question": string,
    "options": [{"id": string, "text": string}],
    "correct_answer": string,
    "explanation": string,
    "difficulty_justification": string
  }
"#;

const DEFAULT_MULTIPLE_CHOICE_TEMPLATE: &str = r#"
Create one multiple-choice trivia challenge.

Category: {category}
Category description: {category_description}
Difficulty: {difficulty}

Requirements:
- Provide exactly 4 options with ids "a", "b", "c" and "d".
- Exactly one option is correct; the other options must be plausible but clearly wrong.
- "correct_answer" is the id of the correct option, e.g. "b".
- The question must end with a question mark.
"#;

const DEFAULT_TIMELINE_TEMPLATE: &str = r#"
Create one timeline trivia challenge.

Category: {category}
Category description: {category_description}
Difficulty: {difficulty}

Requirements:
- Provide exactly 4 events from this category as options with ids "a", "b", "c" and "d", listed in shuffled order.
- The player must put the events in chronological order, earliest first.
- "correct_answer" is the comma-separated list of option ids in chronological order, e.g. "b,a,d,c".
- Every event must have a well-documented date.
"#;

const DEFAULT_TRUE_FALSE_TEMPLATE: &str = r#"
Create one true/false trivia challenge.

Category: {category}
Category description: {category_description}
Difficulty: {difficulty}

Requirements:
- Provide exactly 2 options: {"id": "a", "text": "True"} and {"id": "b", "text": "False"}.
- "correct_answer" is the id of the correct option, "a" or "b".
- The statement in the question must be unambiguous.
"#;

/// Model connection settings. Timeout, temperature and token budget are fixed by the client.
#[derive(Clone, Debug)]
pub struct ModelSettings {
  pub api_key: String,
  pub model: String,
  pub base_url: String,
}

impl ModelSettings {
  /// Read from ANTHROPIC_* variables. Returns None without an API key.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("ANTHROPIC_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
    let base_url = std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
    Some(Self { api_key, model, base_url })
  }
}

/// Attempt to load `GeneratorConfig` from GENERATOR_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_generator_config_from_env() -> Option<GeneratorConfig> {
  let path = std::env::var("GENERATOR_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<GeneratorConfig>(&s) {
      Ok(cfg) => {
        info!(target: "trivia_forge", %path, "Loaded generator config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "trivia_forge", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "trivia_forge", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
