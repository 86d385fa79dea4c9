//! Error types for the momentum client.

use momentum_shared::TaskId;
use thiserror::Error;

use crate::validate::ValidationError;

/// Failures surfaced by API calls, form submission, and draft storage.
#[derive(Error, Debug)]
pub enum ClientError {
  #[error("request to {endpoint} failed: {source}")]
  Network {
    endpoint: String,
    #[source]
    source:   reqwest::Error
  },

  #[error("{endpoint} returned HTTP {status}: {body}")]
  Status {
    endpoint: String,
    status:   u16,
    body:     String
  },

  #[error("task {0} was not found")]
  NotFound(TaskId),

  #[error("form is invalid: {}", describe_fields(.0))]
  Validation(
    Vec<(&'static str, ValidationError)>
  ),

  #[error("local storage error: {0}")]
  Storage(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error)
}

impl ClientError {
  /// True for transport failures and non-success HTTP responses.
  pub fn is_network(&self) -> bool {
    matches!(
      self,
      Self::Network { .. }
        | Self::Status { .. }
    )
  }
}

fn describe_fields(
  fields: &[(
    &'static str,
    ValidationError
  )]
) -> String {
  fields
    .iter()
    .map(|(field, error)| {
      format!("{field}: {error}")
    })
    .collect::<Vec<_>>()
    .join(", ")
}

pub type Result<T> =
  std::result::Result<T, ClientError>;
