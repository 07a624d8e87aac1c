//! Failure taxonomy for a single pipeline run.

use thiserror::Error;

use crate::domain::RejectionReport;

#[derive(Debug, Error)]
pub enum GenerationError {
  /// Network failure, timeout, non-2xx status, or an undecodable envelope.
  #[error("generation endpoint failed{}: {message}", status_suffix(.status))]
  Transport { status: Option<u16>, message: String, body: String },

  /// Well-formed envelope without any text block.
  #[error("model returned no text content")]
  EmptyResponse,

  /// Model output is not the expected JSON object. `raw` is the text that failed to decode.
  #[error("model output is not a valid challenge: {message}")]
  Parse { message: String, raw: String },

  /// Candidate failed structural or compliance checks.
  #[error("candidate rejected: {}", .report.errors.join("; "))]
  Rejected { report: Box<RejectionReport> },
}

impl GenerationError {
  /// Stable tag used in logs and API responses.
  pub fn kind(&self) -> &'static str {
    match self {
      GenerationError::Transport { .. } => "transport",
      GenerationError::EmptyResponse => "empty_response",
      GenerationError::Parse { .. } => "parse",
      GenerationError::Rejected { .. } => "rejected",
    }
  }

  /// Whether a fresh generation attempt may succeed. Callers own the retry policy.
  pub fn is_retryable(&self) -> bool {
    matches!(self, GenerationError::EmptyResponse | GenerationError::Parse { .. })
  }
}

fn status_suffix(status: &Option<u16>) -> String {
  status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn transport_message_includes_status() {
    let e = GenerationError::Transport { status: Some(529), message: "overloaded".into(), body: String::new() };
    assert_eq!(e.to_string(), "generation endpoint failed (HTTP 529): overloaded");
    assert_eq!(e.kind(), "transport");
    assert!(!e.is_retryable());

    let e = GenerationError::Transport { status: None, message: "timed out".into(), body: String::new() };
    assert_eq!(e.to_string(), "generation endpoint failed: timed out");
  }

  #[test]
  fn parse_and_empty_are_retryable() {
    assert!(GenerationError::EmptyResponse.is_retryable());
    assert!(GenerationError::Parse { message: "eof".into(), raw: "{".into() }.is_retryable());
  }
}
