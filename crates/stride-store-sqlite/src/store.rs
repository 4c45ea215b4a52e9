//! The SQLite implementation of [`SocialStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use stride_core::{
  account::{Account, AccountPatch, NewAccount},
  follow::{FollowEdge, FollowStatus},
  notification::{NewNotification, NotificationEvent, NotificationMatch},
  post::{Comment, Post, PostContent, PostView},
  store::SocialStore,
};

use crate::{
  encode::{
    ACCOUNT_COLUMNS, COMMENT_COLUMNS, FOLLOW_COLUMNS, NOTIFICATION_COLUMNS, POST_COLUMNS,
    RawAccount, RawComment, RawFollow, RawNotification, RawPost, encode_content, encode_dt,
    encode_uuid, now,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Stride social store backed by a single SQLite file.
///
/// Clones share the inner connection.
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

  /// Open an in-memory store, mostly for tests.
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
    tracing::debug!("sqlite schema initialised");
    Ok(())
  }

  async fn query_follows(&self, sql: String, id: Uuid, status: FollowStatus) -> Result<Vec<FollowEdge>> {
    let id_str     = encode_uuid(id);
    let status_str = status.as_ref().to_owned();

    let raws: Vec<RawFollow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, status_str], RawFollow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFollow::into_edge).collect()
  }

  async fn query_accounts(
    &self,
    sql: String,
    id: Uuid,
    status: FollowStatus,
  ) -> Result<Vec<Account>> {
    let id_str     = encode_uuid(id);
    let status_str = status.as_ref().to_owned();

    let raws: Vec<RawAccount> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, status_str], RawAccount::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccount::into_account).collect()
  }
}

// ─── SocialStore impl ────────────────────────────────────────────────────────

impl SocialStore for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_account(&self, input: NewAccount) -> Result<Option<Account>> {
    let account = Account {
      account_id:   Uuid::new_v4(),
      handle:       input.handle,
      display_name: input.display_name,
      avatar_ref:   input.avatar_ref,
      is_private:   input.is_private,
      created_at:   now(),
    };

    let id_str       = encode_uuid(account.account_id);
    let handle       = account.handle.clone();
    let display_name = account.display_name.clone();
    let avatar_ref   = account.avatar_ref.clone();
    let is_private   = account.is_private;
    let at_str       = encode_dt(account.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO accounts (account_id, handle, display_name, avatar_ref, is_private, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (handle) DO NOTHING",
          rusqlite::params![id_str, handle, display_name, avatar_ref, is_private, at_str],
        )?)
      })
      .await?;

    Ok((inserted > 0).then_some(account))
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.account_id = ?1"),
            rusqlite::params![id_str],
            RawAccount::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn get_account_by_handle(&self, handle: &str) -> Result<Option<Account>> {
    let handle = handle.to_owned();

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.handle = ?1"),
            rusqlite::params![handle],
            RawAccount::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn update_account(&self, id: Uuid, patch: AccountPatch) -> Result<Option<Account>> {
    let Some(mut account) = self.get_account(id).await? else {
      return Ok(None);
    };
    if patch.is_empty() {
      return Ok(Some(account));
    }
    patch.apply(&mut account);

    let id_str       = encode_uuid(id);
    let display_name = account.display_name.clone();
    let avatar_ref   = account.avatar_ref.clone();
    let is_private   = account.is_private;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE accounts SET display_name = ?2, avatar_ref = ?3, is_private = ?4
           WHERE account_id = ?1",
          rusqlite::params![id_str, display_name, avatar_ref, is_private],
        )?;
        Ok(())
      })
      .await?;

    Ok(Some(account))
  }

  async fn search_accounts(&self, text: &str, limit: usize) -> Result<Vec<Account>> {
    let pattern   = format!("%{}%", escape_like(text.trim()));
    let limit_val = limit as i64;

    let raws: Vec<RawAccount> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ACCOUNT_COLUMNS} FROM accounts a
           WHERE a.handle LIKE ?1 ESCAPE '\\' OR a.display_name LIKE ?1 ESCAPE '\\'
           ORDER BY a.handle
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pattern, limit_val], RawAccount::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccount::into_account).collect()
  }

  // ── Follow edges ──────────────────────────────────────────────────────────

  async fn get_follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<Option<FollowEdge>> {
    let follower_str = encode_uuid(follower_id);
    let followee_str = encode_uuid(followee_id);

    let raw: Option<RawFollow> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {FOLLOW_COLUMNS} FROM follows WHERE follower_id = ?1 AND followee_id = ?2"
            ),
            rusqlite::params![follower_str, followee_str],
            RawFollow::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawFollow::into_edge).transpose()
  }

  async fn get_follow_by_id(&self, edge_id: Uuid) -> Result<Option<FollowEdge>> {
    let id_str = encode_uuid(edge_id);

    let raw: Option<RawFollow> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {FOLLOW_COLUMNS} FROM follows WHERE edge_id = ?1"),
            rusqlite::params![id_str],
            RawFollow::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawFollow::into_edge).transpose()
  }

  async fn insert_follow(
    &self,
    follower_id: Uuid,
    followee_id: Uuid,
    status:      FollowStatus,
  ) -> Result<Option<FollowEdge>> {
    let edge = FollowEdge {
      edge_id: Uuid::new_v4(),
      follower_id,
      followee_id,
      status,
      created_at: now(),
    };

    let edge_str     = encode_uuid(edge.edge_id);
    let follower_str = encode_uuid(follower_id);
    let followee_str = encode_uuid(followee_id);
    let status_str   = status.as_ref().to_owned();
    let at_str       = encode_dt(edge.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO follows (edge_id, follower_id, followee_id, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (follower_id, followee_id) DO NOTHING",
          rusqlite::params![edge_str, follower_str, followee_str, status_str, at_str],
        )?)
      })
      .await?;

    Ok((inserted > 0).then_some(edge))
  }

  async fn set_follow_status(&self, edge_id: Uuid, status: FollowStatus) -> Result<bool> {
    let id_str     = encode_uuid(edge_id);
    let status_str = status.as_ref().to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE follows SET status = ?2 WHERE edge_id = ?1",
          rusqlite::params![id_str, status_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_follow(&self, edge_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(edge_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM follows WHERE edge_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn follows_to(&self, followee_id: Uuid, status: FollowStatus) -> Result<Vec<FollowEdge>> {
    self
      .query_follows(
        format!(
          "SELECT {FOLLOW_COLUMNS} FROM follows
           WHERE followee_id = ?1 AND status = ?2
           ORDER BY rowid"
        ),
        followee_id,
        status,
      )
      .await
  }

  async fn follows_from(&self, follower_id: Uuid, status: FollowStatus) -> Result<Vec<FollowEdge>> {
    self
      .query_follows(
        format!(
          "SELECT {FOLLOW_COLUMNS} FROM follows
           WHERE follower_id = ?1 AND status = ?2
           ORDER BY rowid"
        ),
        follower_id,
        status,
      )
      .await
  }

  async fn follower_accounts(&self, followee_id: Uuid, status: FollowStatus) -> Result<Vec<Account>> {
    self
      .query_accounts(
        format!(
          "SELECT {ACCOUNT_COLUMNS} FROM follows f
           JOIN accounts a ON a.account_id = f.follower_id
           WHERE f.followee_id = ?1 AND f.status = ?2
           ORDER BY f.rowid"
        ),
        followee_id,
        status,
      )
      .await
  }

  async fn followee_accounts(&self, follower_id: Uuid, status: FollowStatus) -> Result<Vec<Account>> {
    self
      .query_accounts(
        format!(
          "SELECT {ACCOUNT_COLUMNS} FROM follows f
           JOIN accounts a ON a.account_id = f.followee_id
           WHERE f.follower_id = ?1 AND f.status = ?2
           ORDER BY f.rowid"
        ),
        follower_id,
        status,
      )
      .await
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, owner_id: Uuid, content: PostContent) -> Result<Post> {
    let post = Post {
      post_id: Uuid::new_v4(),
      owner_id,
      content,
      created_at: now(),
      edited_at: None,
    };

    let (kind, payload) = encode_content(&post.content)?;
    let post_str        = encode_uuid(post.post_id);
    let owner_str       = encode_uuid(owner_id);
    let at_str          = encode_dt(post.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (post_id, owner_id, kind, payload_json, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![post_str, owner_str, kind, payload, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(post)
  }

  async fn get_post(&self, post_id: Uuid) -> Result<Option<PostView>> {
    let id_str = encode_uuid(post_id);

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {POST_COLUMNS} FROM posts p
               JOIN accounts a ON a.account_id = p.owner_id
               WHERE p.post_id = ?1"
            ),
            rusqlite::params![id_str],
            RawPost::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPost::into_view).transpose()
  }

  async fn update_post(&self, post_id: Uuid, content: PostContent) -> Result<Option<Post>> {
    let Some(view) = self.get_post(post_id).await? else {
      return Ok(None);
    };

    let mut post = view.post;
    post.content = content;
    post.edited_at = Some(now());

    let (kind, payload) = encode_content(&post.content)?;
    let id_str          = encode_uuid(post_id);
    let edited_str      = post.edited_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE posts SET kind = ?2, payload_json = ?3, edited_at = ?4 WHERE post_id = ?1",
          rusqlite::params![id_str, kind, payload, edited_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(Some(post))
  }

  async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(post_id);

    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM likes WHERE post_id = ?1", rusqlite::params![id_str])?;
        tx.execute("DELETE FROM comments WHERE post_id = ?1", rusqlite::params![id_str])?;
        let changed =
          tx.execute("DELETE FROM posts WHERE post_id = ?1", rusqlite::params![id_str])?;
        tx.commit()?;
        Ok(changed)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn list_posts(&self, owner_id: Option<Uuid>) -> Result<Vec<PostView>> {
    let owner_str = owner_id.map(encode_uuid);

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLUMNS} FROM posts p
           JOIN accounts a ON a.account_id = p.owner_id
           WHERE ?1 IS NULL OR p.owner_id = ?1
           ORDER BY p.created_at DESC, p.rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_view).collect()
  }

  // ── Engagement ────────────────────────────────────────────────────────────

  async fn insert_like(&self, post_id: Uuid, account_id: Uuid) -> Result<bool> {
    let post_str    = encode_uuid(post_id);
    let account_str = encode_uuid(account_id);
    let at_str      = encode_dt(now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO likes (post_id, account_id, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![post_str, account_str, at_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_like(&self, post_id: Uuid, account_id: Uuid) -> Result<bool> {
    let post_str    = encode_uuid(post_id);
    let account_str = encode_uuid(account_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM likes WHERE post_id = ?1 AND account_id = ?2",
          rusqlite::params![post_str, account_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn count_likes(&self, post_id: Uuid) -> Result<usize> {
    let post_str = encode_uuid(post_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
          rusqlite::params![post_str],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(count as usize)
  }

  async fn insert_comment(&self, post_id: Uuid, author_id: Uuid, body: String) -> Result<Comment> {
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      post_id,
      author_id,
      body,
      created_at: now(),
    };

    let id_str     = encode_uuid(comment.comment_id);
    let post_str   = encode_uuid(post_id);
    let author_str = encode_uuid(author_id);
    let body       = comment.body.clone();
    let at_str     = encode_dt(comment.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, post_id, author_id, body, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, post_str, author_str, body, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
    let post_str = encode_uuid(post_id);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments
           WHERE post_id = ?1
           ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![post_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  // ── Notification events ───────────────────────────────────────────────────

  async fn insert_notification(&self, input: NewNotification) -> Result<NotificationEvent> {
    let event = NotificationEvent {
      event_id:     Uuid::new_v4(),
      recipient_id: input.recipient_id,
      actor_id:     input.actor_id,
      kind:         input.kind,
      target_id:    input.target_id,
      message:      input.message,
      created_at:   now(),
      read:         false,
    };

    let id_str        = encode_uuid(event.event_id);
    let recipient_str = encode_uuid(event.recipient_id);
    let actor_str     = encode_uuid(event.actor_id);
    let kind_str      = event.kind.as_ref().to_owned();
    let target_str    = event.target_id.map(encode_uuid);
    let message       = event.message.clone();
    let at_str        = encode_dt(event.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (
             event_id, recipient_id, actor_id, kind, target_id, message, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            recipient_str,
            actor_str,
            kind_str,
            target_str,
            message,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn list_notifications(&self, recipient_id: Uuid) -> Result<Vec<NotificationEvent>> {
    let recipient_str = encode_uuid(recipient_id);

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTIFICATION_COLUMNS} FROM notifications
           WHERE recipient_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![recipient_str], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_event).collect()
  }

  async fn delete_notifications(&self, selector: NotificationMatch) -> Result<usize> {
    let recipient_str = encode_uuid(selector.recipient_id);
    let actor_str     = encode_uuid(selector.actor_id);
    let kind_str      = selector.kind.as_ref().to_owned();
    let target_str    = selector.target_id.map(encode_uuid);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM notifications
           WHERE recipient_id = ?1 AND actor_id = ?2 AND kind = ?3
             AND (?4 IS NULL OR target_id = ?4)",
          rusqlite::params![recipient_str, actor_str, kind_str, target_str],
        )?)
      })
      .await?;

    Ok(removed)
  }

  async fn delete_notifications_for_target(&self, target_id: Uuid) -> Result<usize> {
    let target_str = encode_uuid(target_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM notifications WHERE target_id = ?1",
          rusqlite::params![target_str],
        )?)
      })
      .await?;

    Ok(removed)
  }

  async fn mark_notifications_read(&self, recipient_id: Uuid, event_ids: &[Uuid]) -> Result<usize> {
    let recipient_str = encode_uuid(recipient_id);
    let ids: Vec<String> = event_ids.iter().copied().map(encode_uuid).collect();

    let updated = self
      .conn
      .call(move |conn| {
        if ids.is_empty() {
          return Ok(conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE recipient_id = ?1 AND is_read = 0",
            rusqlite::params![recipient_str],
          )?);
        }

        let tx = conn.transaction()?;
        let mut updated = 0;
        for chunk in ids.chunks(READ_BATCH) {
          let placeholders = (2..=chunk.len() + 1)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
          let sql = format!(
            "UPDATE notifications SET is_read = 1
             WHERE recipient_id = ?1 AND is_read = 0 AND event_id IN ({placeholders})"
          );
          let params = std::iter::once(&recipient_str).chain(chunk);
          updated += tx.execute(&sql, rusqlite::params_from_iter(params))?;
        }
        tx.commit()?;
        Ok(updated)
      })
      .await?;

    Ok(updated)
  }
}

/// Ids bound per `UPDATE`, well under SQLite's host-parameter limit.
const READ_BATCH: usize = 500;

/// Make `%`, `_` and `\` match literally under `LIKE ... ESCAPE '\'`.
fn escape_like(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    if matches!(c, '\\' | '%' | '_') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}
