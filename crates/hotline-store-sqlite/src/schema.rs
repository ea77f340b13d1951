//! SQL schema for the hotline SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    email       TEXT NOT NULL UNIQUE,
    first_name  TEXT NOT NULL DEFAULT '',
    last_name   TEXT NOT NULL DEFAULT '',
    is_active   INTEGER NOT NULL DEFAULT 0,
    is_staff    INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reports (
    report_id   TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    category_id TEXT NOT NULL,
    species_id  TEXT,
    county_id   TEXT NOT NULL,
    description TEXT NOT NULL,
    location    TEXT NOT NULL,
    created_by  TEXT NOT NULL REFERENCES users(user_id),
    claimed_by  TEXT REFERENCES users(user_id),
    is_archived INTEGER NOT NULL DEFAULT 0,
    is_public   INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

-- Visibility is fixed at creation time; recipient resolution always reads
-- the tier the comment was created with.
CREATE TABLE IF NOT EXISTS comments (
    comment_id  TEXT PRIMARY KEY,
    report_id   TEXT NOT NULL REFERENCES reports(report_id),
    body        TEXT NOT NULL,
    visibility  TEXT NOT NULL,   -- 'private' | 'protected' | 'public'
    created_by  TEXT NOT NULL REFERENCES users(user_id),
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS invites (
    invite_id   TEXT PRIMARY KEY,
    report_id   TEXT NOT NULL REFERENCES reports(report_id),
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    created_by  TEXT NOT NULL REFERENCES users(user_id),
    created_at  TEXT NOT NULL,
    UNIQUE (report_id, user_id)
);

CREATE TABLE IF NOT EXISTS subscriptions (
    subscription_id TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(user_id),
    name            TEXT NOT NULL,
    query           TEXT NOT NULL,   -- opaque urlencoded search-form blob
    created_at      TEXT NOT NULL
);

-- The notification ledger is strictly append-only. The UNIQUE constraint is
-- the idempotency guard: writes go through INSERT OR IGNORE, and a
-- no-op insert means another dispatch run already handled the pair.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(user_id),
    report_id       TEXT NOT NULL REFERENCES reports(report_id),
    created_at      TEXT NOT NULL,
    UNIQUE (user_id, report_id)
);

CREATE INDEX IF NOT EXISTS comments_report_idx      ON comments(report_id);
CREATE INDEX IF NOT EXISTS invites_report_idx       ON invites(report_id);
CREATE INDEX IF NOT EXISTS subscriptions_user_idx   ON subscriptions(user_id);
CREATE INDEX IF NOT EXISTS notifications_report_idx ON notifications(report_id);

PRAGMA user_version = 1;
";
