//! [`SqliteStore`] — the SQLite implementation of [`HotlineStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use hotline_core::{
  comment::{Comment, NewComment},
  query::{
    ArchivedFilter, ClaimedFilter, PublicFilter, ReportQuery, SourceFilter,
  },
  report::{Invite, NewInvite, NewReport, Report},
  store::{HotlineStore, Viewer},
  subscription::{NewSubscription, Subscription},
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    RawComment, RawInvite, RawReport, RawSubscription, RawUser, encode_dt,
    encode_uuid, encode_visibility,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A hotline record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── HotlineStore impl ───────────────────────────────────────────────────────

impl HotlineStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:    Uuid::new_v4(),
      email:      input.email,
      first_name: input.first_name,
      last_name:  input.last_name,
      is_active:  input.is_active,
      is_staff:   input.is_staff,
      created_at: Utc::now(),
    };

    let row = (
      encode_uuid(user.user_id),
      user.email.clone(),
      user.first_name.clone(),
      user.last_name.clone(),
      user.is_active,
      user.is_staff,
      encode_dt(user.created_at),
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, email, first_name, last_name, is_active, is_staff,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![row.0, row.1, row.2, row.3, row.4, row.5, row.6],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, first_name, last_name, is_active,
                      is_staff, created_at
               FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawUser {
                  user_id:    row.get(0)?,
                  email:      row.get(1)?,
                  first_name: row.get(2)?,
                  last_name:  row.get(3)?,
                  is_active:  row.get(4)?,
                  is_staff:   row.get(5)?,
                  created_at: row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn add_report(&self, input: NewReport) -> Result<Report> {
    let report = Report {
      report_id:   Uuid::new_v4(),
      title:       input.title,
      category_id: input.category_id,
      species_id:  input.species_id,
      county_id:   input.county_id,
      description: input.description,
      location:    input.location,
      created_by:  input.created_by,
      claimed_by:  input.claimed_by,
      is_archived: input.is_archived,
      is_public:   input.is_public,
      created_at:  Utc::now(),
    };

    let row = (
      encode_uuid(report.report_id),
      report.title.clone(),
      encode_uuid(report.category_id),
      report.species_id.map(encode_uuid),
      encode_uuid(report.county_id),
      report.description.clone(),
      report.location.clone(),
      encode_uuid(report.created_by),
      report.claimed_by.map(encode_uuid),
      report.is_archived,
      report.is_public,
      encode_dt(report.created_at),
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reports (
             report_id, title, category_id, species_id, county_id,
             description, location, created_by, claimed_by, is_archived,
             is_public, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            row.0, row.1, row.2, row.3, row.4, row.5, row.6, row.7, row.8,
            row.9, row.10, row.11,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(report)
  }

  async fn get_report(&self, id: Uuid) -> Result<Option<Report>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawReport> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT report_id, title, category_id, species_id, county_id,
                      description, location, created_by, claimed_by,
                      is_archived, is_public, created_at
               FROM reports WHERE report_id = ?1",
              rusqlite::params![id_str],
              map_report_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReport::into_report).transpose()
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      report_id:  input.report_id,
      body:       input.body,
      visibility: input.visibility,
      created_by: input.created_by,
      created_at: Utc::now(),
    };

    let row = (
      encode_uuid(comment.comment_id),
      encode_uuid(comment.report_id),
      comment.body.clone(),
      encode_visibility(comment.visibility).to_owned(),
      encode_uuid(comment.created_by),
      encode_dt(comment.created_at),
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (
             comment_id, report_id, body, visibility, created_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![row.0, row.1, row.2, row.3, row.4, row.5],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT comment_id, report_id, body, visibility, created_by,
                      created_at
               FROM comments WHERE comment_id = ?1",
              rusqlite::params![id_str],
              map_comment_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn comments_for_report(&self, report_id: Uuid) -> Result<Vec<Comment>> {
    let id_str = encode_uuid(report_id);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT comment_id, report_id, body, visibility, created_by,
                  created_at
           FROM comments WHERE report_id = ?1
           ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], map_comment_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  // ── Invites ───────────────────────────────────────────────────────────────

  async fn add_invite(&self, input: NewInvite) -> Result<Invite> {
    let invite = Invite {
      invite_id:  Uuid::new_v4(),
      report_id:  input.report_id,
      user_id:    input.user_id,
      created_by: input.created_by,
      created_at: Utc::now(),
    };

    let row = (
      encode_uuid(invite.invite_id),
      encode_uuid(invite.report_id),
      encode_uuid(invite.user_id),
      encode_uuid(invite.created_by),
      encode_dt(invite.created_at),
    );

    let inserted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO invites (
             invite_id, report_id, user_id, created_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![row.0, row.1, row.2, row.3, row.4],
        )?)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::DuplicateInvite {
        report_id: invite.report_id,
        user_id:   invite.user_id,
      });
    }

    Ok(invite)
  }

  async fn get_invite(&self, id: Uuid) -> Result<Option<Invite>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawInvite> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT invite_id, report_id, user_id, created_by, created_at
               FROM invites WHERE invite_id = ?1",
              rusqlite::params![id_str],
              map_invite_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawInvite::into_invite).transpose()
  }

  async fn invites_for_report(&self, report_id: Uuid) -> Result<Vec<Invite>> {
    let id_str = encode_uuid(report_id);

    let raws: Vec<RawInvite> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT invite_id, report_id, user_id, created_by, created_at
           FROM invites WHERE report_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], map_invite_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawInvite::into_invite).collect()
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  async fn add_subscription(
    &self,
    input: NewSubscription,
  ) -> Result<Subscription> {
    let subscription = Subscription {
      subscription_id: Uuid::new_v4(),
      user_id:         input.user_id,
      name:            input.name,
      query:           input.query,
      created_at:      Utc::now(),
    };

    let row = (
      encode_uuid(subscription.subscription_id),
      encode_uuid(subscription.user_id),
      subscription.name.clone(),
      subscription.query.clone(),
      encode_dt(subscription.created_at),
    );

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subscriptions (
             subscription_id, user_id, name, query, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![row.0, row.1, row.2, row.3, row.4],
        )?;
        Ok(())
      })
      .await?;

    Ok(subscription)
  }

  async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT subscription_id, user_id, name, query, created_at
               FROM subscriptions WHERE subscription_id = ?1",
              rusqlite::params![id_str],
              map_subscription_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  async fn subscriptions(&self) -> Result<Vec<Subscription>> {
    let raws: Vec<RawSubscription> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT subscription_id, user_id, name, query, created_at
           FROM subscriptions",
        )?;
        let rows = stmt
          .query_map([], map_subscription_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawSubscription::into_subscription)
      .collect()
  }

  async fn subscriptions_for_user(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<Subscription>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT subscription_id, user_id, name, query, created_at
           FROM subscriptions WHERE user_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], map_subscription_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawSubscription::into_subscription)
      .collect()
  }

  async fn delete_subscription(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subscriptions WHERE subscription_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn reassign_subscription(
    &self,
    id: Uuid,
    new_owner: Uuid,
  ) -> Result<Subscription> {
    let id_str = encode_uuid(id);
    let owner_str = encode_uuid(new_owner);

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subscriptions SET user_id = ?1 WHERE subscription_id = ?2",
          rusqlite::params![owner_str, id_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::SubscriptionNotFound(id));
    }

    self
      .get_subscription(id)
      .await?
      .ok_or(Error::SubscriptionNotFound(id))
  }

  // ── Notification ledger ───────────────────────────────────────────────────

  async fn notified_users(&self, report_id: Uuid) -> Result<Vec<Uuid>> {
    let id_str = encode_uuid(report_id);

    let raw: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id FROM notifications WHERE report_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raw.iter().map(|s| Ok(Uuid::parse_str(s)?)).collect()
  }

  async fn record_notification(
    &self,
    user_id: Uuid,
    report_id: Uuid,
  ) -> Result<bool> {
    let row = (
      encode_uuid(Uuid::new_v4()),
      encode_uuid(user_id),
      encode_uuid(report_id),
      encode_dt(Utc::now()),
    );

    // INSERT OR IGNORE against the UNIQUE (user_id, report_id) constraint is
    // the atomic insert-if-absent primitive the dispatch engine relies on.
    let inserted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO notifications (
             notification_id, user_id, report_id, created_at
           ) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![row.0, row.1, row.2, row.3],
        )?)
      })
      .await?;

    Ok(inserted == 1)
  }

  // ── Search ────────────────────────────────────────────────────────────────

  async fn search_reports(
    &self,
    query: &ReportQuery,
    viewer: &Viewer,
  ) -> Result<Vec<Uuid>> {
    let query = query.clone();
    let viewer = *viewer;

    let raw: Vec<String> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; conditions and parameters are
        // pushed in lockstep so the unnumbered placeholders line up.
        let mut conds: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();
        let viewer_str = encode_uuid(viewer.user_id);

        if let Some(term) = &query.term {
          if let Ok(id) = Uuid::parse_str(term) {
            conds.push(
              "(r.report_id = ? OR r.title LIKE ? OR r.description LIKE ? \
               OR r.location LIKE ?)"
                .into(),
            );
            params.push(encode_uuid(id));
          } else {
            conds.push(
              "(r.title LIKE ? OR r.description LIKE ? OR r.location LIKE ?)"
                .into(),
            );
          }
          let pattern = format!("%{term}%");
          params.push(pattern.clone());
          params.push(pattern.clone());
          params.push(pattern);
        }

        if !query.categories.is_empty() {
          conds.push(format!(
            "r.category_id IN ({})",
            placeholders(query.categories.len())
          ));
          params.extend(query.categories.iter().copied().map(encode_uuid));
        }

        if !query.counties.is_empty() {
          conds.push(format!(
            "r.county_id IN ({})",
            placeholders(query.counties.len())
          ));
          params.extend(query.counties.iter().copied().map(encode_uuid));
        }

        match query.archived {
          Some(ArchivedFilter::Archived) => {
            conds.push("r.is_archived = 1".into())
          }
          Some(ArchivedFilter::NotArchived) => {
            conds.push("r.is_archived = 0".into())
          }
          None => {}
        }

        match query.public {
          Some(PublicFilter::Public) => conds.push("r.is_public = 1".into()),
          Some(PublicFilter::NotPublic) => {
            conds.push("r.is_public = 0".into())
          }
          None => {}
        }

        match query.claimed {
          Some(ClaimedFilter::Me) => {
            conds.push("r.claimed_by = ?".into());
            params.push(viewer_str.clone());
          }
          Some(ClaimedFilter::Nobody) => {
            conds.push("r.claimed_by IS NULL".into())
          }
          None => {}
        }

        match query.source {
          Some(SourceFilter::Invited) => {
            conds.push(
              "r.report_id IN (SELECT i.report_id FROM invites i \
               WHERE i.user_id = ?)"
                .into(),
            );
            params.push(viewer_str.clone());
          }
          Some(SourceFilter::Reported) => {
            conds.push("r.created_by = ?".into());
            params.push(viewer_str.clone());
          }
          None => {}
        }

        // Inactive viewers never see reports they are not tied to.
        if !viewer.is_active {
          conds.push(
            "(r.is_public = 1 OR r.created_by = ? OR r.report_id IN \
             (SELECT i.report_id FROM invites i WHERE i.user_id = ?))"
              .into(),
          );
          params.push(viewer_str.clone());
          params.push(viewer_str);
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!("SELECT r.report_id FROM reports r {where_clause}");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            row.get::<_, String>(0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raw.iter().map(|s| Ok(Uuid::parse_str(s)?)).collect()
  }
}

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn map_report_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReport> {
  Ok(RawReport {
    report_id:   row.get(0)?,
    title:       row.get(1)?,
    category_id: row.get(2)?,
    species_id:  row.get(3)?,
    county_id:   row.get(4)?,
    description: row.get(5)?,
    location:    row.get(6)?,
    created_by:  row.get(7)?,
    claimed_by:  row.get(8)?,
    is_archived: row.get(9)?,
    is_public:   row.get(10)?,
    created_at:  row.get(11)?,
  })
}

fn map_comment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawComment> {
  Ok(RawComment {
    comment_id: row.get(0)?,
    report_id:  row.get(1)?,
    body:       row.get(2)?,
    visibility: row.get(3)?,
    created_by: row.get(4)?,
    created_at: row.get(5)?,
  })
}

fn map_invite_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawInvite> {
  Ok(RawInvite {
    invite_id:  row.get(0)?,
    report_id:  row.get(1)?,
    user_id:    row.get(2)?,
    created_by: row.get(3)?,
    created_at: row.get(4)?,
  })
}

fn map_subscription_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawSubscription> {
  Ok(RawSubscription {
    subscription_id: row.get(0)?,
    user_id:         row.get(1)?,
    name:            row.get(2)?,
    query:           row.get(3)?,
    created_at:      row.get(4)?,
  })
}

/// `?, ?, …` — one placeholder per element.
fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }
