//! Delivery URLs: site paths, the timestamp signer, and the
//! [`LinkBuilder`] implementation backing every notice.
//!
//! Active accounts get plain absolute deep links. Inactive accounts get a
//! signed, time-bounded authentication URL: the login endpoint verifies the
//! signature, logs the user in, and redirects to the embedded `next` path.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::Utc;
use hotline_core::{comment::Comment, links::LinkBuilder, user::User};
use sha2::{Digest as _, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::config::NotifyConfig;

/// How long a signed authentication link stays valid.
pub const AUTH_LINK_MAX_AGE_SECS: i64 = 60 * 60 * 24;

// ─── Site paths ──────────────────────────────────────────────────────────────

pub fn report_path(report_id: Uuid) -> String { format!("/reports/{report_id}/") }

pub fn comment_path(comment: &Comment) -> String {
  format!("/reports/{}/#comment-{}", comment.report_id, comment.comment_id)
}

/// The report list filtered by a saved search's blob — the "re-run this
/// search" link in ownership notices.
pub fn saved_search_path(query_blob: &str) -> String {
  format!("/reports/?{query_blob}")
}

// ─── Timestamp signer ────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
  #[error("malformed signature token")]
  Malformed,
  #[error("signature does not match")]
  Mismatch,
  #[error("signature has expired")]
  Expired,
}

/// Signs a value together with the current time, so the resulting token can
/// later be verified and age-checked without any server-side state.
#[derive(Clone)]
pub struct TimestampSigner {
  key: String,
}

impl TimestampSigner {
  pub fn new(key: impl Into<String>) -> Self { Self { key: key.into() } }

  /// Produce an opaque token binding `value` to the current timestamp.
  pub fn sign(&self, value: &str) -> String {
    let ts = Utc::now().timestamp();
    let mac = self.digest(value, ts);
    B64.encode(format!("{value}:{ts}:{mac}"))
  }

  /// Verify a token and return the signed value, rejecting tokens older
  /// than `max_age_secs`.
  pub fn unsign(
    &self,
    token: &str,
    max_age_secs: i64,
  ) -> Result<String, SignatureError> {
    let decoded = B64.decode(token).map_err(|_| SignatureError::Malformed)?;
    let text =
      String::from_utf8(decoded).map_err(|_| SignatureError::Malformed)?;

    // The value itself may contain ':'; mac and timestamp never do.
    let mut parts = text.rsplitn(3, ':');
    let mac = parts.next().ok_or(SignatureError::Malformed)?;
    let ts: i64 = parts
      .next()
      .ok_or(SignatureError::Malformed)?
      .parse()
      .map_err(|_| SignatureError::Malformed)?;
    let value = parts.next().ok_or(SignatureError::Malformed)?;

    let expected = self.digest(value, ts);
    if !constant_time_eq(mac.as_bytes(), expected.as_bytes()) {
      return Err(SignatureError::Mismatch);
    }
    if Utc::now().timestamp() - ts > max_age_secs {
      return Err(SignatureError::Expired);
    }

    Ok(value.to_owned())
  }

  fn digest(&self, value: &str, ts: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.key.as_bytes());
    hasher.update([0]);
    hasher.update(value.as_bytes());
    hasher.update([0]);
    hasher.update(ts.to_le_bytes());
    hex::encode(hasher.finalize())
  }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
  if a.len() != b.len() {
    return false;
  }
  a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ─── SignedLinks ─────────────────────────────────────────────────────────────

/// The concrete [`LinkBuilder`]: absolute deep links for active accounts,
/// signed login links for inactive ones.
#[derive(Clone)]
pub struct SignedLinks {
  base_url: String,
  signer:   TimestampSigner,
}

impl SignedLinks {
  pub fn new(config: &NotifyConfig) -> Self {
    Self {
      base_url: config.base_url.trim_end_matches('/').to_owned(),
      signer:   TimestampSigner::new(config.signing_key.clone()),
    }
  }

  pub fn absolute(&self, next: &str) -> String {
    format!("{}{next}", self.base_url)
  }

  pub fn authentication_url(&self, user: &User, next: &str) -> String {
    let sig = self.signer.sign(&user.email);
    format!(
      "{}/users/authenticate?sig={}&next={}",
      self.base_url,
      urlencoding::encode(&sig),
      urlencoding::encode(next),
    )
  }

  /// Verify a signed login token and return the email it was issued for.
  /// Used by the login endpoint; exposed here so tests can close the loop.
  pub fn verify(&self, sig: &str) -> Result<String, SignatureError> {
    self.signer.unsign(sig, AUTH_LINK_MAX_AGE_SECS)
  }
}

impl LinkBuilder for SignedLinks {
  fn url_for(&self, user: &User, next: &str) -> String {
    if user.is_active {
      self.absolute(next)
    } else {
      self.authentication_url(user, next)
    }
  }
}
