//! Error type for `hotline-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown visibility tier: {0:?}")]
  UnknownVisibility(String),

  #[error("subscription not found: {0}")]
  SubscriptionNotFound(uuid::Uuid),

  /// The `(report, user)` pair already holds an invite.
  #[error("user {user_id} is already invited to report {report_id}")]
  DuplicateInvite {
    report_id: uuid::Uuid,
    user_id:   uuid::Uuid,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
