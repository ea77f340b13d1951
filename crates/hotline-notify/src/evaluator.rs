//! Match evaluation: does a new report fall inside a saved search?
//!
//! A subscription matches when its stored query blob, re-run as a search on
//! behalf of the subscription's owner, would include the report. Running the
//! search as the owner means visibility scoping applies: an inactive owner
//! never matches a non-public report they are not tied to.

use hotline_core::{
  query::ReportQuery,
  store::{HotlineStore, Viewer},
  subscription::Subscription,
  user::User,
};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Evaluate one subscription against one report.
///
/// An undecodable or invalid query blob is treated as matching nothing; the
/// failure is logged so an operator can find the broken saved search, and the
/// dispatch run moves on.
pub async fn subscription_matches<S: HotlineStore>(
  store: &S,
  subscription: &Subscription,
  owner: &User,
  report_id: Uuid,
) -> Result<bool> {
  let query = match ReportQuery::parse(&subscription.query) {
    Ok(query) => query,
    Err(err) => {
      tracing::warn!(
        subscription_id = %subscription.subscription_id,
        error = %err,
        "unparseable saved-search blob, treating as non-match"
      );
      return Ok(false);
    }
  };

  let viewer = Viewer::of(owner);
  store
    .report_matches(&query, &viewer, report_id)
    .await
    .map_err(Error::store)
}
