//! The `HotlineStore` trait — the record store and search index boundary.
//!
//! The trait is implemented by storage backends (e.g.
//! `hotline-store-sqlite`). The notification engine depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  comment::{Comment, NewComment},
  query::ReportQuery,
  report::{Invite, NewInvite, NewReport, Report},
  subscription::{NewSubscription, Subscription},
  user::{NewUser, User},
};

// ─── Viewer ──────────────────────────────────────────────────────────────────

/// The identity a search runs as. Inactive viewers only see public reports
/// and reports they are explicitly tied to (submitted or invited).
#[derive(Debug, Clone, Copy)]
pub struct Viewer {
  pub user_id:   Uuid,
  pub is_active: bool,
}

impl Viewer {
  pub fn of(user: &User) -> Self {
    Self { user_id: user.user_id, is_active: user.is_active }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the hotline record store and its search capability.
///
/// Notification ledger writes use insert-if-absent semantics: the UNIQUE
/// `(user, report)` constraint is the commit point that keeps concurrent
/// dispatch runs from double-recording.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait HotlineStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  fn add_report(
    &self,
    input: NewReport,
  ) -> impl Future<Output = Result<Report, Self::Error>> + Send + '_;

  fn get_report(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Report>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// All comments on a report, oldest first.
  fn comments_for_report(
    &self,
    report_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  // ── Invites ───────────────────────────────────────────────────────────

  /// Record an invite. Returns an error if the `(report, user)` pair already
  /// holds one.
  fn add_invite(
    &self,
    input: NewInvite,
  ) -> impl Future<Output = Result<Invite, Self::Error>> + Send + '_;

  fn get_invite(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Invite>, Self::Error>> + Send + '_;

  fn invites_for_report(
    &self,
    report_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Invite>, Self::Error>> + Send + '_;

  // ── Subscriptions ─────────────────────────────────────────────────────

  fn add_subscription(
    &self,
    input: NewSubscription,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  fn get_subscription(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + '_;

  /// Every persisted subscription, across all owners. Iteration order is
  /// unspecified; dispatch must not rely on it.
  fn subscriptions(
    &self,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;

  fn subscriptions_for_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;

  /// Delete a subscription (owner or administrator action). Returns whether
  /// a row was removed.
  fn delete_subscription(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Administrative owner reassignment. Returns the updated subscription;
  /// errors if the subscription does not exist.
  fn reassign_subscription(
    &self,
    id: Uuid,
    new_owner: Uuid,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  // ── Notification ledger ───────────────────────────────────────────────

  /// Ids of users already ledgered for a report.
  fn notified_users(
    &self,
    report_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  /// Atomic insert-if-absent of a `(user, report)` ledger entry.
  ///
  /// Returns `true` if this call created the entry, `false` if the pair was
  /// already ledgered (e.g. by a concurrent dispatch run).
  fn record_notification(
    &self,
    user_id: Uuid,
    report_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Search ────────────────────────────────────────────────────────────

  /// Ids of the reports matching `query`, restricted to what `viewer` is
  /// entitled to see.
  fn search_reports<'a>(
    &'a self,
    query: &'a ReportQuery,
    viewer: &'a Viewer,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + 'a;

  /// Membership test: would `report_id` appear in the result set `query`
  /// produces for `viewer`?
  fn report_matches<'a>(
    &'a self,
    query: &'a ReportQuery,
    viewer: &'a Viewer,
    report_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a {
    async move {
      Ok(self.search_reports(query, viewer).await?.contains(&report_id))
    }
  }
}
