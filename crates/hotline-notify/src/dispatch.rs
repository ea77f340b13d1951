//! The dispatch runs: given a domain event, work out who to notify, send the
//! mail, and (for report matches) commit the ledger entry.
//!
//! Failure policy inside a run: anything scoped to one subscription or one
//! recipient — an unparseable blob, a missing owner row, a transport
//! refusal — is logged and skipped so it cannot starve the rest of the
//! audience. Only store failures and a missing triggering record abort the
//! run.

use std::{collections::HashSet, sync::Arc};

use hotline_core::{
  links::LinkBuilder,
  mailer::Mailer,
  store::HotlineStore,
  user::User,
};
use uuid::Uuid;

use crate::{
  config::NotifyConfig,
  email,
  error::{Error, Result},
  evaluator::subscription_matches,
  links::{report_path, saved_search_path},
  recipients::resolve_recipients,
};

/// What a dispatch run accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
  /// Messages handed to the transport successfully.
  pub sent: usize,
}

/// Executes dispatch runs against a store, a mail transport, and a link
/// builder.
pub struct Dispatcher<S, M, L> {
  store:  Arc<S>,
  mailer: Arc<M>,
  links:  Arc<L>,
  config: Arc<NotifyConfig>,
}

// Derived Clone would demand S: Clone etc.; only the Arcs are cloned.
impl<S, M, L> Clone for Dispatcher<S, M, L> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      mailer: Arc::clone(&self.mailer),
      links:  Arc::clone(&self.links),
      config: Arc::clone(&self.config),
    }
  }
}

impl<S, M, L> Dispatcher<S, M, L>
where
  S: HotlineStore,
  M: Mailer,
  L: LinkBuilder,
{
  pub fn new(
    store: Arc<S>,
    mailer: Arc<M>,
    links: Arc<L>,
    config: Arc<NotifyConfig>,
  ) -> Self {
    Self { store, mailer, links, config }
  }

  // ─── Report created ────────────────────────────────────────────────────

  /// Evaluate every subscription against a newly created report and notify
  /// each matching owner at most once, committing a ledger entry per
  /// notified owner.
  ///
  /// The ledger insert is attempted only after the transport accepts the
  /// message, and its insert-if-absent result is authoritative: a lost
  /// insert means a concurrent run already handled the pair, and is not an
  /// error.
  pub async fn run_report_created(&self, report_id: Uuid) -> Result<RunSummary> {
    let report = self
      .store
      .get_report(report_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ReportNotFound(report_id))?;

    let already: HashSet<Uuid> = self
      .store
      .notified_users(report_id)
      .await
      .map_err(Error::store)?
      .into_iter()
      .collect();

    let subscriptions =
      self.store.subscriptions().await.map_err(Error::store)?;

    let mut notified_this_run: HashSet<Uuid> = HashSet::new();
    let mut summary = RunSummary::default();

    for subscription in &subscriptions {
      let owner_id = subscription.user_id;
      if already.contains(&owner_id) || notified_this_run.contains(&owner_id) {
        continue;
      }

      let owner = match self.store.get_user(owner_id).await {
        Ok(Some(owner)) => owner,
        Ok(None) => {
          tracing::warn!(
            subscription_id = %subscription.subscription_id,
            owner_id = %owner_id,
            "subscription owner missing from store"
          );
          continue;
        }
        Err(err) => {
          return Err(Error::store(err));
        }
      };

      match subscription_matches(
        self.store.as_ref(),
        subscription,
        &owner,
        report_id,
      )
      .await
      {
        Ok(true) => {}
        Ok(false) => continue,
        Err(err) => {
          tracing::warn!(
            subscription_id = %subscription.subscription_id,
            error = %err,
            "subscription evaluation failed"
          );
          continue;
        }
      }

      let url = self.links.url_for(&owner, &report_path(report_id));
      let message = email::report_match(&self.config, &owner, &report, &url);
      if let Err(err) = self.mailer.send(&message).await {
        // Leave the pair unledgered so a later run can retry.
        tracing::warn!(
          owner_id = %owner_id,
          report_id = %report_id,
          error = %err,
          "match notice delivery failed"
        );
        continue;
      }

      match self.store.record_notification(owner_id, report_id).await {
        Ok(true) => summary.sent += 1,
        Ok(false) => {
          tracing::info!(
            owner_id = %owner_id,
            report_id = %report_id,
            "pair ledgered by a concurrent run"
          );
        }
        Err(err) => return Err(Error::store(err)),
      }
      notified_this_run.insert(owner_id);
    }

    Ok(summary)
  }

  // ─── Comment created ───────────────────────────────────────────────────

  /// Notify everyone tied to a report's discussion about a new comment. No
  /// ledger is involved; the ledger tracks report-match notices only.
  pub async fn run_comment_created(
    &self,
    comment_id: Uuid,
  ) -> Result<RunSummary> {
    let comment = self
      .store
      .get_comment(comment_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::CommentNotFound(comment_id))?;
    let report = self
      .store
      .get_report(comment.report_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ReportNotFound(comment.report_id))?;
    let author = self
      .store
      .get_user(comment.created_by)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound(comment.created_by))?;

    let recipients = resolve_recipients(
      self.store.as_ref(),
      self.links.as_ref(),
      &comment,
      &report,
    )
    .await?;

    let mut summary = RunSummary::default();
    for recipient in &recipients {
      let message = email::new_comment(
        &self.config,
        &author,
        &comment,
        &report,
        &recipient.user,
        &recipient.url,
      );
      match self.mailer.send(&message).await {
        Ok(()) => summary.sent += 1,
        Err(err) => {
          tracing::warn!(
            recipient = %recipient.user.user_id,
            comment_id = %comment_id,
            error = %err,
            "comment notice delivery failed"
          );
        }
      }
    }

    Ok(summary)
  }

  // ─── Subscription owner changed ────────────────────────────────────────

  /// Notify a subscription's new owner that it now belongs to them. A
  /// reassignment to the same owner sends nothing.
  pub async fn run_owner_changed(
    &self,
    subscription_id: Uuid,
    previous_owner: Uuid,
    new_owner: Uuid,
  ) -> Result<RunSummary> {
    if previous_owner == new_owner {
      return Ok(RunSummary::default());
    }

    let subscription = self
      .store
      .get_subscription(subscription_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SubscriptionNotFound(subscription_id))?;
    let owner = self.require_user(new_owner).await?;

    let next = saved_search_path(&subscription.query);
    let url = self.links.url_for(&owner, &next);
    let message = email::new_owner(&self.config, &owner, &subscription, &url);

    self.send_one(&message, new_owner).await
  }

  // ─── Report submitted ──────────────────────────────────────────────────

  /// Send the submitter their receipt for a newly submitted report.
  pub async fn run_report_submitted(
    &self,
    report_id: Uuid,
  ) -> Result<RunSummary> {
    let report = self
      .store
      .get_report(report_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ReportNotFound(report_id))?;
    let submitter = self.require_user(report.created_by).await?;

    let url = self.links.url_for(&submitter, &report_path(report_id));
    let message =
      email::report_submitted(&self.config, &submitter, &report, &url);

    self.send_one(&message, submitter.user_id).await
  }

  // ─── Invite created ────────────────────────────────────────────────────

  /// Notify an invited expert that a report awaits their review.
  pub async fn run_invite_created(
    &self,
    invite_id: Uuid,
    message_text: &str,
  ) -> Result<RunSummary> {
    let invite = self
      .store
      .get_invite(invite_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::InviteNotFound(invite_id))?;
    let report = self
      .store
      .get_report(invite.report_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ReportNotFound(invite.report_id))?;
    let invited = self.require_user(invite.user_id).await?;
    let inviter = self.require_user(invite.created_by).await?;

    let url = self.links.url_for(&invited, &report_path(report.report_id));
    let message = email::invite(
      &self.config,
      &inviter,
      &invited,
      &report,
      message_text,
      &url,
    );

    self.send_one(&message, invited.user_id).await
  }

  // ─── Helpers ───────────────────────────────────────────────────────────

  async fn require_user(&self, id: Uuid) -> Result<User> {
    self
      .store
      .get_user(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound(id))
  }

  /// Send a single message, logging transport failure instead of failing
  /// the run.
  async fn send_one(
    &self,
    message: &hotline_core::mailer::OutboundEmail,
    recipient: Uuid,
  ) -> Result<RunSummary> {
    match self.mailer.send(message).await {
      Ok(()) => Ok(RunSummary { sent: 1 }),
      Err(err) => {
        tracing::warn!(
          recipient = %recipient,
          error = %err,
          "notice delivery failed"
        );
        Ok(RunSummary::default())
      }
    }
  }
}
