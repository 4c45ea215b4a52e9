//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with microsecond
//! precision, so string order is chronological order. UUIDs are stored as
//! hyphenated lowercase strings. Enum columns use their snake_case names.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use stride_core::{
  account::Account,
  follow::{FollowEdge, FollowStatus},
  notification::{NotificationEvent, NotificationKind},
  post::{Comment, Post, PostContent, PostKind, PostView},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time, truncated to what the column can hold.
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  decode_dt(&encode_dt(now)).unwrap_or(now)
}

// ─── Enum columns ─────────────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::UnknownValue { column, value: s.to_owned() })
}

pub fn decode_follow_status(s: &str) -> Result<FollowStatus> { decode_enum("follows.status", s) }

pub fn decode_post_kind(s: &str) -> Result<PostKind> { decode_enum("posts.kind", s) }

pub fn decode_notification_kind(s: &str) -> Result<NotificationKind> {
  decode_enum("notifications.kind", s)
}

pub fn encode_content(content: &PostContent) -> Result<(String, String)> {
  Ok((content.kind().as_ref().to_owned(), content.to_json()?.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawAccount::from_row`].
pub const ACCOUNT_COLUMNS: &str =
  "a.account_id, a.handle, a.display_name, a.avatar_ref, a.is_private, a.created_at";

/// Raw values read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:   String,
  pub handle:       String,
  pub display_name: String,
  pub avatar_ref:   Option<String>,
  pub is_private:   bool,
  pub created_at:   String,
}

impl RawAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:   row.get(0)?,
      handle:       row.get(1)?,
      display_name: row.get(2)?,
      avatar_ref:   row.get(3)?,
      is_private:   row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:   decode_uuid(&self.account_id)?,
      handle:       self.handle,
      display_name: self.display_name,
      avatar_ref:   self.avatar_ref,
      is_private:   self.is_private,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub const FOLLOW_COLUMNS: &str = "edge_id, follower_id, followee_id, status, created_at";

/// Raw strings read directly from a `follows` row.
pub struct RawFollow {
  pub edge_id:     String,
  pub follower_id: String,
  pub followee_id: String,
  pub status:      String,
  pub created_at:  String,
}

impl RawFollow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      edge_id:     row.get(0)?,
      follower_id: row.get(1)?,
      followee_id: row.get(2)?,
      status:      row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_edge(self) -> Result<FollowEdge> {
    Ok(FollowEdge {
      edge_id:     decode_uuid(&self.edge_id)?,
      follower_id: decode_uuid(&self.follower_id)?,
      followee_id: decode_uuid(&self.followee_id)?,
      status:      decode_follow_status(&self.status)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawPost::from_row`]; expects `posts p JOIN accounts a`.
pub const POST_COLUMNS: &str =
  "p.post_id, p.owner_id, p.kind, p.payload_json, p.created_at, p.edited_at, a.is_private";

/// Raw values read from a `posts` row joined with its owner's account.
pub struct RawPost {
  pub post_id:          String,
  pub owner_id:         String,
  pub kind:             String,
  pub payload_json:     String,
  pub created_at:       String,
  pub edited_at:        Option<String>,
  pub owner_is_private: bool,
}

impl RawPost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:          row.get(0)?,
      owner_id:         row.get(1)?,
      kind:             row.get(2)?,
      payload_json:     row.get(3)?,
      created_at:       row.get(4)?,
      edited_at:        row.get(5)?,
      owner_is_private: row.get(6)?,
    })
  }

  pub fn into_view(self) -> Result<PostView> {
    let payload: serde_json::Value = serde_json::from_str(&self.payload_json)?;
    let content = PostContent::from_parts(decode_post_kind(&self.kind)?, payload)?;
    Ok(PostView {
      post:             Post {
        post_id: decode_uuid(&self.post_id)?,
        owner_id: decode_uuid(&self.owner_id)?,
        content,
        created_at: decode_dt(&self.created_at)?,
        edited_at: self.edited_at.as_deref().map(decode_dt).transpose()?,
      },
      owner_is_private: self.owner_is_private,
    })
  }
}

pub const COMMENT_COLUMNS: &str = "comment_id, post_id, author_id, body, created_at";

pub struct RawComment {
  pub comment_id: String,
  pub post_id:    String,
  pub author_id:  String,
  pub body:       String,
  pub created_at: String,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id: row.get(0)?,
      post_id:    row.get(1)?,
      author_id:  row.get(2)?,
      body:       row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      post_id:    decode_uuid(&self.post_id)?,
      author_id:  decode_uuid(&self.author_id)?,
      body:       self.body,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const NOTIFICATION_COLUMNS: &str =
  "event_id, recipient_id, actor_id, kind, target_id, message, created_at, is_read";

pub struct RawNotification {
  pub event_id:     String,
  pub recipient_id: String,
  pub actor_id:     String,
  pub kind:         String,
  pub target_id:    Option<String>,
  pub message:      Option<String>,
  pub created_at:   String,
  pub is_read:      bool,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:     row.get(0)?,
      recipient_id: row.get(1)?,
      actor_id:     row.get(2)?,
      kind:         row.get(3)?,
      target_id:    row.get(4)?,
      message:      row.get(5)?,
      created_at:   row.get(6)?,
      is_read:      row.get(7)?,
    })
  }

  pub fn into_event(self) -> Result<NotificationEvent> {
    Ok(NotificationEvent {
      event_id:     decode_uuid(&self.event_id)?,
      recipient_id: decode_uuid(&self.recipient_id)?,
      actor_id:     decode_uuid(&self.actor_id)?,
      kind:         decode_notification_kind(&self.kind)?,
      target_id:    self.target_id.as_deref().map(decode_uuid).transpose()?,
      message:      self.message,
      created_at:   decode_dt(&self.created_at)?,
      read:         self.is_read,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_as_strings() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1500);
    let c = a + chrono::Duration::seconds(10);
    assert!(encode_dt(a) < encode_dt(b));
    assert!(encode_dt(b) < encode_dt(c));
    assert_eq!(encode_dt(a).len(), encode_dt(c).len());
  }

  #[test]
  fn datetime_roundtrip_keeps_micros() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }

  #[test]
  fn unknown_status_is_an_error() {
    assert!(matches!(
      decode_follow_status("blocked"),
      Err(Error::UnknownValue { column: "follows.status", .. })
    ));
  }
}
