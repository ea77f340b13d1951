//! Error type for `hotline-notify`.
//!
//! Only failures fatal to a whole dispatch run surface here. Per-subscription
//! and per-recipient failures (malformed blobs, transport errors) are logged
//! and isolated inside the run instead.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("report not found: {0}")]
  ReportNotFound(Uuid),

  #[error("comment not found: {0}")]
  CommentNotFound(Uuid),

  #[error("invite not found: {0}")]
  InviteNotFound(Uuid),

  #[error("subscription not found: {0}")]
  SubscriptionNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
