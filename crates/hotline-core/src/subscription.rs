//! Saved-search subscriptions and the notification ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's saved search, replayed against each new report to decide whether
/// to notify them.
///
/// The `query` field is an opaque urlencoded blob of search-form parameters.
/// Its vocabulary is owned by [`crate::query`]; everything else treats it as
/// an uninterpreted string, so stale blobs degrade to non-matches instead of
/// breaking evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
  pub subscription_id: Uuid,
  /// The owner. Always an existing user; reassignment is an explicit
  /// administrative operation.
  pub user_id:         Uuid,
  /// Human-readable name, e.g. "Aquatic plants in Multnomah county".
  pub name:            String,
  /// Urlencoded search-form parameters, captured when the search was saved.
  pub query:           String,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::HotlineStore::add_subscription`].
#[derive(Debug, Clone)]
pub struct NewSubscription {
  pub user_id: Uuid,
  pub name:    String,
  pub query:   String,
}

/// An immutable ledger fact: "this user has been notified about this report".
///
/// Its presence is the sole idempotency guard against double-notification,
/// so at most one row may ever exist per `(user, report)` pair. Rows are
/// written with insert-if-absent semantics after the send attempt completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  pub user_id:         Uuid,
  pub report_id:       Uuid,
  pub created_at:      DateTime<Utc>,
}
