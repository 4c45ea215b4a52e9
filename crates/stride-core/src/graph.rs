//! [`FollowGraph`]: follow-state queries and transitions.
//!
//! State machine per ordered pair: `none → pending → accepted`, or
//! `none → accepted` for public targets. Unfollow, reject, and follower
//! removal return the pair to `none`. An accepted edge never goes back to
//! pending.
//!
//! Each transition also maintains the notification events tied to it, so a
//! follow request that was cancelled, approved, or rejected does not linger in
//! the target's inbox.

use uuid::Uuid;

use crate::{
  Error, Result,
  account::Account,
  accounts::Accounts,
  follow::{FollowEdge, FollowState, FollowStatus, Relationship},
  notification::{NewNotification, NotificationKind, NotificationMatch},
  signal::{ChangeSignal, ChangeSink},
  store::SocialStore,
};

/// Follow operations over a [`SocialStore`]. Holds no cache; every call reads
/// through to the store.
pub struct FollowGraph<'a, S> {
  store:   &'a S,
  signals: &'a dyn ChangeSink,
}

impl<'a, S: SocialStore> FollowGraph<'a, S> {
  pub fn new(store: &'a S, signals: &'a dyn ChangeSink) -> Self { Self { store, signals } }

  // ── Queries ───────────────────────────────────────────────────────────

  /// State of the single edge `viewer_id → target_id`.
  pub async fn status(&self, viewer_id: Uuid, target_id: Uuid) -> Result<FollowState> {
    let edge = self
      .store
      .get_follow(viewer_id, target_id)
      .await
      .map_err(Error::store)?;
    Ok(FollowState::from(edge.as_ref()))
  }

  /// Both directions between a viewer and a content owner.
  pub async fn relationship(&self, viewer_id: Uuid, owner_id: Uuid) -> Result<Relationship> {
    if viewer_id == owner_id {
      return Ok(Relationship::default());
    }
    Ok(Relationship::new(
      self.status(viewer_id, owner_id).await?,
      self.status(owner_id, viewer_id).await?,
    ))
  }

  pub async fn followers(&self, target_id: Uuid, status: FollowStatus) -> Result<Vec<Account>> {
    self
      .store
      .follower_accounts(target_id, status)
      .await
      .map_err(Error::store)
  }

  pub async fn following(&self, source_id: Uuid, status: FollowStatus) -> Result<Vec<Account>> {
    self
      .store
      .followee_accounts(source_id, status)
      .await
      .map_err(Error::store)
  }

  /// Incoming follow requests awaiting `target_id`'s decision.
  pub async fn pending_requests(&self, target_id: Uuid) -> Result<Vec<FollowEdge>> {
    self
      .store
      .follows_to(target_id, FollowStatus::Pending)
      .await
      .map_err(Error::store)
  }

  // ── Transitions ───────────────────────────────────────────────────────

  /// Follow `target_id`. Private targets get a pending request, public ones
  /// an accepted edge.
  ///
  /// Idempotent: if any edge already exists its status is returned and
  /// nothing is written.
  pub async fn follow(
    &self,
    follower_id: Uuid,
    target_id: Uuid,
    target_is_private: bool,
  ) -> Result<FollowStatus> {
    if follower_id == target_id {
      return Err(Error::InvalidOperation("cannot follow yourself".into()));
    }
    let accounts = Accounts::new(self.store, self.signals);
    accounts.get(follower_id).await?;
    accounts.get(target_id).await?;

    if let Some(existing) = self.existing_status(follower_id, target_id).await? {
      return Ok(existing);
    }

    let (status, kind) = if target_is_private {
      (FollowStatus::Pending, NotificationKind::FollowRequest)
    } else {
      (FollowStatus::Accepted, NotificationKind::NewFollower)
    };

    let Some(edge) = self
      .store
      .insert_follow(follower_id, target_id, status)
      .await
      .map_err(Error::store)?
    else {
      // Lost a race with an overlapping follow for the same pair.
      return self
        .existing_status(follower_id, target_id)
        .await?
        .ok_or_else(|| Error::Conflict("follow edge changed concurrently".into()));
    };

    self
      .store
      .insert_notification(
        NewNotification::new(target_id, follower_id, kind).with_target(edge.edge_id),
      )
      .await
      .map_err(Error::store)?;

    tracing::debug!(
      follower = %follower_id,
      target = %target_id,
      status = ?status,
      "follow edge created",
    );

    self.signals.publish(ChangeSignal::Notifications { recipient_id: target_id });
    if status == FollowStatus::Accepted {
      self.publish_feeds(follower_id, target_id);
    }
    Ok(status)
  }

  async fn existing_status(
    &self,
    follower_id: Uuid,
    target_id: Uuid,
  ) -> Result<Option<FollowStatus>> {
    let Some(existing) = self
      .store
      .get_follow(follower_id, target_id)
      .await
      .map_err(Error::store)?
    else {
      return Ok(None);
    };
    tracing::debug!(
      follower = %follower_id,
      target = %target_id,
      status = ?existing.status,
      "follow is a no-op; edge exists",
    );
    Ok(Some(existing.status))
  }

  /// Remove `follower_id → target_id`. Succeeds when there is no edge.
  pub async fn unfollow(&self, follower_id: Uuid, target_id: Uuid) -> Result<()> {
    self.drop_edge(follower_id, target_id).await
  }

  /// Accept a pending request. Only the followee may approve.
  pub async fn approve(&self, edge_id: Uuid, follower_id: Uuid, approver_id: Uuid) -> Result<()> {
    let edge = self.pending_edge(edge_id).await?;
    if edge.follower_id != follower_id {
      return Err(Error::FollowNotFound(edge_id));
    }
    if edge.followee_id != approver_id {
      return Err(Error::Unauthorized { actor: approver_id });
    }

    if !self
      .store
      .set_follow_status(edge_id, FollowStatus::Accepted)
      .await
      .map_err(Error::store)?
    {
      return Err(Error::FollowNotFound(edge_id));
    }

    self.clear_request(&edge).await?;
    self
      .store
      .insert_notification(
        NewNotification::new(edge.follower_id, approver_id, NotificationKind::FollowAccept)
          .with_target(edge_id),
      )
      .await
      .map_err(Error::store)?;

    tracing::debug!(
      follower = %edge.follower_id,
      target = %approver_id,
      "follow request approved",
    );

    self.signals.publish(ChangeSignal::Notifications { recipient_id: approver_id });
    self.signals.publish(ChangeSignal::Notifications { recipient_id: edge.follower_id });
    self.publish_feeds(edge.follower_id, approver_id);
    Ok(())
  }

  /// Decline a pending request. Only the followee may reject.
  pub async fn reject(&self, edge_id: Uuid, approver_id: Uuid) -> Result<()> {
    let edge = self.pending_edge(edge_id).await?;
    if edge.followee_id != approver_id {
      return Err(Error::Unauthorized { actor: approver_id });
    }

    self.store.delete_follow(edge_id).await.map_err(Error::store)?;
    self.clear_request(&edge).await?;

    tracing::debug!(
      follower = %edge.follower_id,
      target = %approver_id,
      "follow request rejected",
    );

    self.signals.publish(ChangeSignal::Notifications { recipient_id: approver_id });
    Ok(())
  }

  /// `target_id` drops `follower_id`, whatever the edge's status.
  pub async fn remove_follower(&self, target_id: Uuid, follower_id: Uuid) -> Result<()> {
    self.drop_edge(follower_id, target_id).await
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  async fn pending_edge(&self, edge_id: Uuid) -> Result<FollowEdge> {
    self
      .store
      .get_follow_by_id(edge_id)
      .await
      .map_err(Error::store)?
      .filter(FollowEdge::is_pending)
      .ok_or(Error::FollowNotFound(edge_id))
  }

  async fn drop_edge(&self, follower_id: Uuid, target_id: Uuid) -> Result<()> {
    let Some(edge) = self
      .store
      .get_follow(follower_id, target_id)
      .await
      .map_err(Error::store)?
    else {
      return Ok(());
    };

    self.store.delete_follow(edge.edge_id).await.map_err(Error::store)?;

    if edge.is_pending() {
      self.clear_request(&edge).await?;
      self.signals.publish(ChangeSignal::Notifications { recipient_id: target_id });
    } else {
      self.publish_feeds(follower_id, target_id);
    }

    tracing::debug!(
      follower = %follower_id,
      target = %target_id,
      status = ?edge.status,
      "follow edge removed",
    );
    Ok(())
  }

  /// Delete the `follow_request` event the edge produced.
  async fn clear_request(&self, edge: &FollowEdge) -> Result<()> {
    self
      .store
      .delete_notifications(NotificationMatch {
        recipient_id: edge.followee_id,
        actor_id:     edge.follower_id,
        kind:         NotificationKind::FollowRequest,
        target_id:    None,
      })
      .await
      .map_err(Error::store)?;
    Ok(())
  }

  fn publish_feeds(&self, a: Uuid, b: Uuid) {
    self.signals.publish(ChangeSignal::Feed { account_id: a });
    self.signals.publish(ChangeSignal::Feed { account_id: b });
  }
}
