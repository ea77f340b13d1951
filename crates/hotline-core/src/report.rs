//! Reports and invites.
//!
//! A report is the subject entity of the whole system: a public sighting of a
//! suspected invasive species, later reviewed and classified by managers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A submitted sighting. The identifier is immutable for the report's
/// lifetime; classification fields are what saved searches filter on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
  pub report_id:   Uuid,
  /// Display title, e.g. the species common name or the reported category.
  pub title:       String,
  pub category_id: Uuid,
  /// `None` when the submitter could not identify the species and only a
  /// category was reported.
  pub species_id:  Option<Uuid>,
  pub county_id:   Uuid,
  pub description: String,
  pub location:    String,
  pub created_by:  Uuid,
  /// The manager currently responsible for the report, if any.
  pub claimed_by:  Option<Uuid>,
  pub is_archived: bool,
  /// Whether members of the public may view this report.
  pub is_public:   bool,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::HotlineStore::add_report`].
#[derive(Debug, Clone)]
pub struct NewReport {
  pub title:       String,
  pub category_id: Uuid,
  pub species_id:  Option<Uuid>,
  pub county_id:   Uuid,
  pub description: String,
  pub location:    String,
  pub created_by:  Uuid,
  pub claimed_by:  Option<Uuid>,
  pub is_archived: bool,
  pub is_public:   bool,
}

/// An explicit grant allowing one user to view (and comment on) an
/// otherwise-private report. Unique per `(report, user)` pair; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invite {
  pub invite_id:  Uuid,
  pub report_id:  Uuid,
  pub user_id:    Uuid,
  pub created_by: Uuid,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::HotlineStore::add_invite`].
#[derive(Debug, Clone)]
pub struct NewInvite {
  pub report_id:  Uuid,
  pub user_id:    Uuid,
  pub created_by: Uuid,
}
