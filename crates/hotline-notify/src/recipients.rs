//! Recipient resolution for comment notices.
//!
//! The audience for a new comment is everyone tied to the discussion: active
//! users who previously commented, the report's claimant, invited experts,
//! and — when the comment is visible to them — the submitter. The comment's
//! own author is never notified.

use std::collections::HashSet;

use hotline_core::{
  comment::Comment,
  links::LinkBuilder,
  report::{Invite, Report},
  store::HotlineStore,
  user::User,
};
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  links::comment_path,
};

/// One resolved recipient: the user plus the delivery URL appropriate for
/// their account state.
#[derive(Debug, Clone)]
pub struct Recipient {
  pub user: User,
  pub url:  String,
}

/// The id-level audience rule, kept pure so it can be tested without a
/// store.
///
/// `prior_authors` are the users who authored earlier comments on the
/// report; only the active ones are included. Claimant and invitees are
/// included regardless of account state. The submitter is included only when
/// the comment's visibility admits them, and the comment's author is always
/// removed last.
pub fn recipient_ids(
  comment: &Comment,
  report: &Report,
  prior_authors: &[User],
  invites: &[Invite],
) -> HashSet<Uuid> {
  let mut ids: HashSet<Uuid> = prior_authors
    .iter()
    .filter(|user| user.is_active)
    .map(|user| user.user_id)
    .collect();

  if let Some(claimant) = report.claimed_by {
    ids.insert(claimant);
  }
  ids.extend(invites.iter().map(|invite| invite.user_id));
  if comment.visibility.visible_to_submitter() {
    ids.insert(report.created_by);
  }

  ids.remove(&comment.created_by);
  ids
}

/// Load the audience for a comment and attach delivery URLs.
///
/// Users referenced by an id the store no longer holds are logged and
/// skipped; one dangling reference must not silence the rest of the
/// audience.
pub async fn resolve_recipients<S, L>(
  store: &S,
  links: &L,
  comment: &Comment,
  report: &Report,
) -> Result<Vec<Recipient>>
where
  S: HotlineStore,
  L: LinkBuilder,
{
  let comments = store
    .comments_for_report(report.report_id)
    .await
    .map_err(Error::store)?;
  let invites = store
    .invites_for_report(report.report_id)
    .await
    .map_err(Error::store)?;

  let author_ids: HashSet<Uuid> =
    comments.iter().map(|c| c.created_by).collect();
  let mut prior_authors = Vec::with_capacity(author_ids.len());
  for id in author_ids {
    match store.get_user(id).await.map_err(Error::store)? {
      Some(user) => prior_authors.push(user),
      None => {
        tracing::warn!(user_id = %id, "comment author missing from store");
      }
    }
  }

  let next = comment_path(comment);
  let mut recipients = Vec::new();
  for id in recipient_ids(comment, report, &prior_authors, &invites) {
    match store.get_user(id).await.map_err(Error::store)? {
      Some(user) => {
        let url = links.url_for(&user, &next);
        recipients.push(Recipient { user, url });
      }
      None => {
        tracing::warn!(user_id = %id, "recipient missing from store");
      }
    }
  }

  Ok(recipients)
}
