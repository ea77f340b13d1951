//! Comments and their visibility tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordinal visibility tier attached to a comment at creation time.
///
/// The ordering is meaningful: every tier at or above
/// [`Visibility::Protected`] is visible to the report's submitter.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
  /// Only managers and invited experts can see.
  Private,
  /// Managers, invited experts and the report submitter can see.
  Protected,
  /// Everyone can see, once the report itself is public.
  Public,
}

impl Visibility {
  /// Whether the report's submitter may see (and be notified of) a comment
  /// at this tier.
  pub fn visible_to_submitter(self) -> bool { self >= Visibility::Protected }
}

/// A comment on a report. Belongs to exactly one report and is never
/// reassigned; its visibility tier is fixed at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub report_id:  Uuid,
  pub body:       String,
  pub visibility: Visibility,
  pub created_by: Uuid,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::HotlineStore::add_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
  pub report_id:  Uuid,
  pub body:       String,
  pub visibility: Visibility,
  pub created_by: Uuid,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tiers_are_ordered() {
    assert!(Visibility::Private < Visibility::Protected);
    assert!(Visibility::Protected < Visibility::Public);
  }

  #[test]
  fn submitter_visibility() {
    assert!(!Visibility::Private.visible_to_submitter());
    assert!(Visibility::Protected.visible_to_submitter());
    assert!(Visibility::Public.visible_to_submitter());
  }
}
