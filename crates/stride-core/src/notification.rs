//! Notification events and their aggregated display form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Kind ────────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
  Like,
  Comment,
  NewFollower,
  FollowRequest,
  FollowAccept,
  Generic,
}

impl NotificationKind {
  /// Only likes and comments are merged into "N people did X" groups.
  pub fn is_groupable(self) -> bool { matches!(self, Self::Like | Self::Comment) }

  fn phrase(self) -> &'static str {
    match self {
      Self::Like => "liked your post",
      Self::Comment => "commented on your post",
      Self::NewFollower => "started following you",
      Self::FollowRequest => "requested to follow you",
      Self::FollowAccept => "accepted your follow request",
      Self::Generic => "sent you a notification",
    }
  }
}

// ─── Raw event ───────────────────────────────────────────────────────────────

/// One atomic occurrence, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
  pub event_id:     Uuid,
  pub recipient_id: Uuid,
  pub actor_id:     Uuid,
  pub kind:         NotificationKind,
  /// Post id for likes and comments; follow edge id for follow events.
  pub target_id:    Option<Uuid>,
  /// Free text, used by [`NotificationKind::Generic`].
  pub message:      Option<String>,
  pub created_at:   DateTime<Utc>,
  pub read:         bool,
}

/// Input to [`crate::store::SocialStore::insert_notification`].
/// `created_at` is set by the store.
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub recipient_id: Uuid,
  pub actor_id:     Uuid,
  pub kind:         NotificationKind,
  pub target_id:    Option<Uuid>,
  pub message:      Option<String>,
}

impl NewNotification {
  pub fn new(recipient_id: Uuid, actor_id: Uuid, kind: NotificationKind) -> Self {
    Self { recipient_id, actor_id, kind, target_id: None, message: None }
  }

  pub fn with_target(mut self, target_id: Uuid) -> Self {
    self.target_id = Some(target_id);
    self
  }
}

/// Selector for [`crate::store::SocialStore::delete_notifications`].
#[derive(Debug, Clone, Copy)]
pub struct NotificationMatch {
  pub recipient_id: Uuid,
  pub actor_id:     Uuid,
  pub kind:         NotificationKind,
  /// When set, only events with this exact target are matched.
  pub target_id:    Option<Uuid>,
}

// ─── Aggregated ──────────────────────────────────────────────────────────────

/// A raw event, or a merged group of same-kind/same-target events.
/// Computed fresh on every fetch; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedNotification {
  /// The most recent event of the group. Its `read` flag is the group's:
  /// true only when every merged event has been read.
  #[serde(flatten)]
  pub latest:    NotificationEvent,
  pub count:     usize,
  /// Distinct actors, most recent first.
  pub actors:    Vec<Uuid>,
  /// Every raw event merged into this entry, most recent first.
  pub event_ids: Vec<Uuid>,
}

impl AggregatedNotification {
  pub fn single(event: NotificationEvent) -> Self {
    Self {
      count:     1,
      actors:    vec![event.actor_id],
      event_ids: vec![event.event_id],
      latest:    event,
    }
  }

  /// Display text following the count-minus-one convention:
  /// "liked your post", or "and 2 more people liked your post".
  pub fn summary(&self) -> String {
    let phrase = match (&self.latest.kind, &self.latest.message) {
      (NotificationKind::Generic, Some(message)) => message.as_str(),
      (kind, _) => kind.phrase(),
    };
    if self.count > 1 {
      format!("and {} more people {phrase}", self.count - 1)
    } else {
      phrase.to_owned()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn event(kind: NotificationKind) -> NotificationEvent {
    NotificationEvent {
      event_id:     Uuid::new_v4(),
      recipient_id: Uuid::new_v4(),
      actor_id:     Uuid::new_v4(),
      kind,
      target_id:    None,
      message:      None,
      created_at:   Utc::now(),
      read:         false,
    }
  }

  #[test]
  fn summary_singular() {
    let n = AggregatedNotification::single(event(NotificationKind::Like));
    assert_eq!(n.summary(), "liked your post");
  }

  #[test]
  fn summary_counts_others_not_everyone() {
    let mut n = AggregatedNotification::single(event(NotificationKind::Like));
    n.count = 3;
    assert_eq!(n.summary(), "and 2 more people liked your post");

    n.latest.kind = NotificationKind::Comment;
    n.count = 2;
    assert_eq!(n.summary(), "and 1 more people commented on your post");
  }

  #[test]
  fn generic_uses_message_text() {
    let mut e = event(NotificationKind::Generic);
    e.message = Some("your challenge starts today".into());
    let n = AggregatedNotification::single(e);
    assert_eq!(n.summary(), "your challenge starts today");
  }

  #[test]
  fn kind_column_encoding() {
    assert_eq!(NotificationKind::FollowRequest.as_ref(), "follow_request");
    assert_eq!(
      "new_follower".parse::<NotificationKind>().unwrap(),
      NotificationKind::NewFollower
    );
  }
}
