//! User accounts.
//!
//! Active accounts belong to managers, staff and invited experts — people who
//! can log in directly. Inactive accounts belong to members of the public who
//! submitted a report; they reach the site only through signed login links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub email:      String,
  pub first_name: String,
  pub last_name:  String,
  /// Inactive users cannot log in; they receive signed authentication links.
  pub is_active:  bool,
  pub is_staff:   bool,
  pub created_at: DateTime<Utc>,
}

impl User {
  /// Display name falling back to the email address when no name is set.
  pub fn full_name(&self) -> String {
    match (self.first_name.is_empty(), self.last_name.is_empty()) {
      (false, false) => format!("{} {}", self.first_name, self.last_name),
      (false, true) => self.first_name.clone(),
      _ => self.email.clone(),
    }
  }
}

/// Input to [`crate::store::HotlineStore::add_user`].
/// `user_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:      String,
  pub first_name: String,
  pub last_name:  String,
  pub is_active:  bool,
  pub is_staff:   bool,
}
