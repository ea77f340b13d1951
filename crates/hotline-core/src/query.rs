//! The report search filter vocabulary and the saved-search blob codec.
//!
//! A subscription stores its filters as an urlencoded string — the exact
//! parameter shape the live search form submits. [`ReportQuery::parse`] is
//! the single seam through which that blob is rehydrated, so the filter
//! vocabulary can evolve without touching the match evaluator's control
//! flow. Unknown keys are ignored (schema drift is expected over a
//! subscription's lifetime); malformed values are an error, which callers
//! treat as a non-match.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QueryParseError;

// ─── Choice filters ──────────────────────────────────────────────────────────

/// Filter on the report's archived flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchivedFilter {
  Archived,
  NotArchived,
}

/// Filter on the report's public flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicFilter {
  Public,
  NotPublic,
}

/// Filter on who has claimed the report, relative to the searching user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimedFilter {
  Me,
  Nobody,
}

/// Filter on the searching user's relationship to the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFilter {
  /// Reports the user was invited to review.
  Invited,
  /// Reports the user submitted themselves.
  Reported,
}

// ─── ReportQuery ─────────────────────────────────────────────────────────────

/// The deserialised filter set a saved search evaluates against the report
/// corpus. All fields are optional; an empty query matches every report the
/// searching user may see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQuery {
  /// Free-text term, matched against title, description and location. A term
  /// that parses as a UUID also matches the report id directly.
  pub term:       Option<String>,
  pub categories: Vec<Uuid>,
  pub counties:   Vec<Uuid>,
  pub archived:   Option<ArchivedFilter>,
  pub public:     Option<PublicFilter>,
  pub claimed:    Option<ClaimedFilter>,
  pub source:     Option<SourceFilter>,
}

/// The wire shape of the blob: every value a plain string, lists
/// comma-separated. Unknown keys fall away during deserialisation.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawQuery {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  q:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  categories:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  counties:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  is_archived: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  is_public:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  claimed_by:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  source:      Option<String>,
}

impl ReportQuery {
  /// Rehydrate a saved-search blob.
  ///
  /// Fails on undecodable form data, malformed ids, or unknown choice
  /// values. Callers evaluating subscriptions treat any failure as
  /// "matches nothing".
  pub fn parse(blob: &str) -> Result<Self, QueryParseError> {
    let raw: RawQuery = serde_urlencoded::from_str(blob)?;

    Ok(Self {
      term:       non_blank(raw.q),
      categories: parse_id_list("categories", raw.categories)?,
      counties:   parse_id_list("counties", raw.counties)?,
      archived:   parse_choice("is_archived", raw.is_archived, |v| match v {
        "archived" => Some(ArchivedFilter::Archived),
        "notarchived" => Some(ArchivedFilter::NotArchived),
        _ => None,
      })?,
      public:     parse_choice("is_public", raw.is_public, |v| match v {
        "public" => Some(PublicFilter::Public),
        "notpublic" => Some(PublicFilter::NotPublic),
        _ => None,
      })?,
      claimed:    parse_choice("claimed_by", raw.claimed_by, |v| match v {
        "me" => Some(ClaimedFilter::Me),
        "nobody" => Some(ClaimedFilter::Nobody),
        _ => None,
      })?,
      source:     parse_choice("source", raw.source, |v| match v {
        "invited" => Some(SourceFilter::Invited),
        "reported" => Some(SourceFilter::Reported),
        _ => None,
      })?,
    })
  }

  /// Serialise back to the blob format. Used when a search is saved and when
  /// building the "re-run this search" link in ownership notices.
  pub fn to_blob(&self) -> String {
    let raw = RawQuery {
      q:           self.term.clone(),
      categories:  encode_id_list(&self.categories),
      counties:    encode_id_list(&self.counties),
      is_archived: self.archived.map(|f| {
        match f {
          ArchivedFilter::Archived => "archived",
          ArchivedFilter::NotArchived => "notarchived",
        }
        .to_owned()
      }),
      is_public:   self.public.map(|f| {
        match f {
          PublicFilter::Public => "public",
          PublicFilter::NotPublic => "notpublic",
        }
        .to_owned()
      }),
      claimed_by:  self.claimed.map(|f| {
        match f {
          ClaimedFilter::Me => "me",
          ClaimedFilter::Nobody => "nobody",
        }
        .to_owned()
      }),
      source:      self.source.map(|f| {
        match f {
          SourceFilter::Invited => "invited",
          SourceFilter::Reported => "reported",
        }
        .to_owned()
      }),
    };

    // RawQuery contains only flat Option<String> fields, which always
    // serialise.
    serde_urlencoded::to_string(&raw).unwrap_or_default()
  }
}

// ─── Field helpers ───────────────────────────────────────────────────────────

/// HTML forms submit empty strings for untouched fields; treat them as unset.
fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

fn parse_id_list(
  field: &'static str,
  value: Option<String>,
) -> Result<Vec<Uuid>, QueryParseError> {
  let Some(value) = non_blank(value) else {
    return Ok(Vec::new());
  };

  value
    .split(',')
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .map(|part| {
      Uuid::parse_str(part).map_err(|_| QueryParseError::InvalidId {
        field,
        value: part.to_owned(),
      })
    })
    .collect()
}

fn encode_id_list(ids: &[Uuid]) -> Option<String> {
  if ids.is_empty() {
    return None;
  }
  Some(
    ids
      .iter()
      .map(|id| id.hyphenated().to_string())
      .collect::<Vec<_>>()
      .join(","),
  )
}

fn parse_choice<T>(
  field: &'static str,
  value: Option<String>,
  decode: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, QueryParseError> {
  let Some(value) = non_blank(value) else {
    return Ok(None);
  };

  decode(&value)
    .map(Some)
    .ok_or(QueryParseError::UnknownChoice { field, value })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_blob_is_the_default_query() {
    let query = ReportQuery::parse("").unwrap();
    assert_eq!(query, ReportQuery::default());
  }

  #[test]
  fn full_blob_roundtrip() {
    let category = Uuid::new_v4();
    let county = Uuid::new_v4();
    let query = ReportQuery {
      term:       Some("knotweed".into()),
      categories: vec![category],
      counties:   vec![county],
      archived:   Some(ArchivedFilter::NotArchived),
      public:     Some(PublicFilter::Public),
      claimed:    Some(ClaimedFilter::Nobody),
      source:     Some(SourceFilter::Invited),
    };

    let parsed = ReportQuery::parse(&query.to_blob()).unwrap();
    assert_eq!(parsed, query);
  }

  #[test]
  fn blank_values_are_unset() {
    let query =
      ReportQuery::parse("q=&is_archived=&is_public=&claimed_by=&source=")
        .unwrap();
    assert_eq!(query, ReportQuery::default());
  }

  #[test]
  fn unknown_keys_are_ignored() {
    let query = ReportQuery::parse("q=ivy&order_by=-created_on&tabs=0").unwrap();
    assert_eq!(query.term.as_deref(), Some("ivy"));
  }

  #[test]
  fn bad_id_is_an_error() {
    let err = ReportQuery::parse("categories=12").unwrap_err();
    assert!(matches!(
      err,
      QueryParseError::InvalidId { field: "categories", .. }
    ));
  }

  #[test]
  fn unknown_choice_is_an_error() {
    let err = ReportQuery::parse("is_archived=maybe").unwrap_err();
    assert!(matches!(
      err,
      QueryParseError::UnknownChoice { field: "is_archived", .. }
    ));
  }

  #[test]
  fn undecodable_blob_is_an_error() {
    assert!(ReportQuery::parse("q=%zz").is_err());
  }
}
