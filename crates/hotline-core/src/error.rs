//! Error types for `hotline-core`.

use thiserror::Error;

/// A saved-search query blob that could not be turned back into the filter
/// vocabulary the search form accepts. Evaluation treats this as a non-match.
#[derive(Debug, Error)]
pub enum QueryParseError {
  #[error("query blob is not valid urlencoded form data: {0}")]
  Encoding(#[from] serde_urlencoded::de::Error),

  #[error("field {field:?} holds an invalid id: {value:?}")]
  InvalidId { field: &'static str, value: String },

  #[error("field {field:?} holds an unknown choice: {value:?}")]
  UnknownChoice { field: &'static str, value: String },
}

/// A message the transport could not deliver. Carries only a description;
/// this subsystem requires no delivery confirmation.
#[derive(Debug, Error)]
#[error("mail transport error: {0}")]
pub struct MailError(pub String);
