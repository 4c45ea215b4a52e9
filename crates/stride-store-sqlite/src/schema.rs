//! SQL schema for the Stride SQLite store.
//!
//! Executed once at connection startup. The version is recorded in
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id   TEXT PRIMARY KEY,
    handle       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    display_name TEXT NOT NULL,
    avatar_ref   TEXT,
    is_private   INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);

-- One row per ordered (follower, followee) pair. No row means 'none'.
CREATE TABLE IF NOT EXISTS follows (
    edge_id     TEXT PRIMARY KEY,
    follower_id TEXT NOT NULL REFERENCES accounts(account_id),
    followee_id TEXT NOT NULL REFERENCES accounts(account_id),
    status      TEXT NOT NULL,   -- 'pending' | 'accepted'
    created_at  TEXT NOT NULL,
    UNIQUE (follower_id, followee_id),
    CHECK  (follower_id != followee_id)
);

-- Owner privacy is not copied here; it is joined from accounts on read.
CREATE TABLE IF NOT EXISTS posts (
    post_id      TEXT PRIMARY KEY,
    owner_id     TEXT NOT NULL REFERENCES accounts(account_id),
    kind         TEXT NOT NULL,   -- discriminant of PostContent
    payload_json TEXT NOT NULL,   -- JSON payload (inner data only)
    created_at   TEXT NOT NULL,
    edited_at    TEXT
);

CREATE TABLE IF NOT EXISTS likes (
    post_id    TEXT NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
    account_id TEXT NOT NULL REFERENCES accounts(account_id),
    created_at TEXT NOT NULL,
    UNIQUE (post_id, account_id)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id TEXT PRIMARY KEY,
    post_id    TEXT NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
    author_id  TEXT NOT NULL REFERENCES accounts(account_id),
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- target_id is a post id or a follow edge id depending on kind, so it
-- carries no foreign key.
CREATE TABLE IF NOT EXISTS notifications (
    event_id     TEXT PRIMARY KEY,
    recipient_id TEXT NOT NULL REFERENCES accounts(account_id),
    actor_id     TEXT NOT NULL REFERENCES accounts(account_id),
    kind         TEXT NOT NULL,
    target_id    TEXT,
    message      TEXT,
    created_at   TEXT NOT NULL,
    is_read      INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS follows_followee_idx      ON follows(followee_id, status);
CREATE INDEX IF NOT EXISTS follows_follower_idx      ON follows(follower_id, status);
CREATE INDEX IF NOT EXISTS posts_owner_idx           ON posts(owner_id);
CREATE INDEX IF NOT EXISTS posts_created_idx         ON posts(created_at);
CREATE INDEX IF NOT EXISTS notifications_recipient_idx
    ON notifications(recipient_id, created_at);
CREATE INDEX IF NOT EXISTS notifications_target_idx  ON notifications(target_id);

PRAGMA user_version = 1;
";
