//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Booleans map to SQLite integers through
//! rusqlite's native conversion.

use chrono::{DateTime, Utc};
use hotline_core::{
  comment::{Comment, Visibility},
  report::{Invite, Report},
  subscription::Subscription,
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Visibility ──────────────────────────────────────────────────────────────

pub fn encode_visibility(v: Visibility) -> &'static str {
  match v {
    Visibility::Private => "private",
    Visibility::Protected => "protected",
    Visibility::Public => "public",
  }
}

pub fn decode_visibility(s: &str) -> Result<Visibility> {
  match s {
    "private" => Ok(Visibility::Private),
    "protected" => Ok(Visibility::Protected),
    "public" => Ok(Visibility::Public),
    other => Err(Error::UnknownVisibility(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub email:      String,
  pub first_name: String,
  pub last_name:  String,
  pub is_active:  bool,
  pub is_staff:   bool,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      email:      self.email,
      first_name: self.first_name,
      last_name:  self.last_name,
      is_active:  self.is_active,
      is_staff:   self.is_staff,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `reports` row.
pub struct RawReport {
  pub report_id:   String,
  pub title:       String,
  pub category_id: String,
  pub species_id:  Option<String>,
  pub county_id:   String,
  pub description: String,
  pub location:    String,
  pub created_by:  String,
  pub claimed_by:  Option<String>,
  pub is_archived: bool,
  pub is_public:   bool,
  pub created_at:  String,
}

impl RawReport {
  pub fn into_report(self) -> Result<Report> {
    Ok(Report {
      report_id:   decode_uuid(&self.report_id)?,
      title:       self.title,
      category_id: decode_uuid(&self.category_id)?,
      species_id:  decode_opt_uuid(self.species_id)?,
      county_id:   decode_uuid(&self.county_id)?,
      description: self.description,
      location:    self.location,
      created_by:  decode_uuid(&self.created_by)?,
      claimed_by:  decode_opt_uuid(self.claimed_by)?,
      is_archived: self.is_archived,
      is_public:   self.is_public,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `comments` row.
pub struct RawComment {
  pub comment_id: String,
  pub report_id:  String,
  pub body:       String,
  pub visibility: String,
  pub created_by: String,
  pub created_at: String,
}

impl RawComment {
  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      report_id:  decode_uuid(&self.report_id)?,
      body:       self.body,
      visibility: decode_visibility(&self.visibility)?,
      created_by: decode_uuid(&self.created_by)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `invites` row.
pub struct RawInvite {
  pub invite_id:  String,
  pub report_id:  String,
  pub user_id:    String,
  pub created_by: String,
  pub created_at: String,
}

impl RawInvite {
  pub fn into_invite(self) -> Result<Invite> {
    Ok(Invite {
      invite_id:  decode_uuid(&self.invite_id)?,
      report_id:  decode_uuid(&self.report_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      created_by: decode_uuid(&self.created_by)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub subscription_id: String,
  pub user_id:         String,
  pub name:            String,
  pub query:           String,
  pub created_at:      String,
}

impl RawSubscription {
  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      subscription_id: decode_uuid(&self.subscription_id)?,
      user_id:         decode_uuid(&self.user_id)?,
      name:            self.name,
      query:           self.query,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
