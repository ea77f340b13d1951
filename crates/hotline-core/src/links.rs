//! The link/identity provider boundary.

use crate::user::User;

/// Builds the delivery URL embedded in a notification, given the recipient
/// and a site-relative `next` path.
///
/// Active accounts get a direct deep link. Inactive accounts get a signed,
/// time-bounded authentication URL that logs them in and redirects to
/// `next`.
pub trait LinkBuilder: Send + Sync {
  fn url_for(&self, user: &User, next: &str) -> String;
}
