//! [`Posts`]: owner-restricted post CRUD and visibility-gated engagement.
//!
//! A post the viewer may not see behaves exactly like a missing post: the
//! caller gets [`Error::PostNotFound`] and learns nothing about its existence.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  accounts::Accounts,
  graph::FollowGraph,
  notification::{NewNotification, NotificationKind, NotificationMatch},
  post::{Comment, Post, PostContent, PostView},
  signal::{ChangeSignal, ChangeSink},
  store::SocialStore,
  visibility::can_view,
};

/// Result of reading someone's profile grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "visibility", content = "posts", rename_all = "snake_case")]
pub enum ProfilePosts {
  Visible(Vec<PostView>),
  /// Private profile with no accepted relationship to the viewer.
  Hidden,
}

pub struct Posts<'a, S> {
  store:   &'a S,
  signals: &'a dyn ChangeSink,
}

impl<'a, S: SocialStore> Posts<'a, S> {
  pub fn new(store: &'a S, signals: &'a dyn ChangeSink) -> Self { Self { store, signals } }

  fn graph(&self) -> FollowGraph<'a, S> { FollowGraph::new(self.store, self.signals) }

  /// Writes reference their actor, so it must be a registered account.
  async fn actor(&self, account_id: Uuid) -> Result<()> {
    Accounts::new(self.store, self.signals).get(account_id).await.map(drop)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// A single post, if `viewer_id` may see it.
  pub async fn view(&self, viewer_id: Uuid, post_id: Uuid) -> Result<PostView> {
    let view = self
      .store
      .get_post(post_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PostNotFound(post_id))?;

    let relationship = self.graph().relationship(viewer_id, view.owner_id()).await?;
    if can_view(viewer_id, view.owner_id(), view.owner_is_private, relationship) {
      Ok(view)
    } else {
      Err(Error::PostNotFound(post_id))
    }
  }

  /// `owner_id`'s posts as seen by `viewer_id`.
  pub async fn profile(&self, viewer_id: Uuid, owner_id: Uuid) -> Result<ProfilePosts> {
    let owner = self
      .store
      .get_account(owner_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AccountNotFound(owner_id))?;

    let relationship = self.graph().relationship(viewer_id, owner_id).await?;
    if !can_view(viewer_id, owner_id, owner.is_private, relationship) {
      return Ok(ProfilePosts::Hidden);
    }

    let posts = self
      .store
      .list_posts(Some(owner_id))
      .await
      .map_err(Error::store)?;
    Ok(ProfilePosts::Visible(posts))
  }

  pub async fn comments(&self, viewer_id: Uuid, post_id: Uuid) -> Result<Vec<Comment>> {
    self.view(viewer_id, post_id).await?;
    self.store.list_comments(post_id).await.map_err(Error::store)
  }

  // ── Owner-only writes ─────────────────────────────────────────────────

  pub async fn create(&self, owner_id: Uuid, content: PostContent) -> Result<Post> {
    content.validate()?;
    self.actor(owner_id).await?;
    let post = self
      .store
      .create_post(owner_id, content)
      .await
      .map_err(Error::store)?;
    tracing::debug!(owner = %owner_id, post = %post.post_id, "post created");
    self.signals.publish(ChangeSignal::Feed { account_id: owner_id });
    Ok(post)
  }

  pub async fn edit(&self, viewer_id: Uuid, post_id: Uuid, content: PostContent) -> Result<Post> {
    content.validate()?;
    self.owned(viewer_id, post_id).await?;
    let post = self
      .store
      .update_post(post_id, content)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PostNotFound(post_id))?;
    self.signals.publish(ChangeSignal::Feed { account_id: viewer_id });
    Ok(post)
  }

  /// Delete a post and every notification event pointing at it.
  pub async fn delete(&self, viewer_id: Uuid, post_id: Uuid) -> Result<()> {
    self.owned(viewer_id, post_id).await?;
    self.store.delete_post(post_id).await.map_err(Error::store)?;
    let removed = self
      .store
      .delete_notifications_for_target(post_id)
      .await
      .map_err(Error::store)?;
    tracing::debug!(owner = %viewer_id, post = %post_id, removed, "post deleted");
    self.signals.publish(ChangeSignal::Feed { account_id: viewer_id });
    if removed > 0 {
      self.signals.publish(ChangeSignal::Notifications { recipient_id: viewer_id });
    }
    Ok(())
  }

  async fn owned(&self, viewer_id: Uuid, post_id: Uuid) -> Result<PostView> {
    let view = self
      .store
      .get_post(post_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PostNotFound(post_id))?;
    if view.owner_id() != viewer_id {
      return Err(Error::Unauthorized { actor: viewer_id });
    }
    Ok(view)
  }

  // ── Engagement ────────────────────────────────────────────────────────

  /// Like a visible post. Idempotent; returns the like count afterwards.
  pub async fn like(&self, viewer_id: Uuid, post_id: Uuid) -> Result<usize> {
    self.actor(viewer_id).await?;
    let view = self.view(viewer_id, post_id).await?;
    let inserted = self
      .store
      .insert_like(post_id, viewer_id)
      .await
      .map_err(Error::store)?;

    if inserted && view.owner_id() != viewer_id {
      self
        .store
        .insert_notification(
          NewNotification::new(view.owner_id(), viewer_id, NotificationKind::Like)
            .with_target(post_id),
        )
        .await
        .map_err(Error::store)?;
      self.signals.publish(ChangeSignal::Notifications { recipient_id: view.owner_id() });
    }

    self.store.count_likes(post_id).await.map_err(Error::store)
  }

  /// Withdraw a like and its notification. Returns the like count afterwards.
  pub async fn unlike(&self, viewer_id: Uuid, post_id: Uuid) -> Result<usize> {
    let view = self.view(viewer_id, post_id).await?;
    let removed = self
      .store
      .delete_like(post_id, viewer_id)
      .await
      .map_err(Error::store)?;

    if removed && view.owner_id() != viewer_id {
      self
        .store
        .delete_notifications(NotificationMatch {
          recipient_id: view.owner_id(),
          actor_id:     viewer_id,
          kind:         NotificationKind::Like,
          target_id:    Some(post_id),
        })
        .await
        .map_err(Error::store)?;
      self.signals.publish(ChangeSignal::Notifications { recipient_id: view.owner_id() });
    }

    self.store.count_likes(post_id).await.map_err(Error::store)
  }

  pub async fn comment(&self, viewer_id: Uuid, post_id: Uuid, body: String) -> Result<Comment> {
    let body = body.trim().to_owned();
    if body.is_empty() {
      return Err(Error::InvalidOperation("empty comment".into()));
    }

    self.actor(viewer_id).await?;
    let view = self.view(viewer_id, post_id).await?;
    let comment = self
      .store
      .insert_comment(post_id, viewer_id, body)
      .await
      .map_err(Error::store)?;

    if view.owner_id() != viewer_id {
      self
        .store
        .insert_notification(
          NewNotification::new(view.owner_id(), viewer_id, NotificationKind::Comment)
            .with_target(post_id),
        )
        .await
        .map_err(Error::store)?;
      self.signals.publish(ChangeSignal::Notifications { recipient_id: view.owner_id() });
    }

    Ok(comment)
  }
}
