//! Notification aggregation.
//!
//! Likes and comments sharing a target are merged into a single entry; every
//! other event passes through on its own. The result is newest-first by each
//! entry's latest event. Pure: the input is never mutated, and the same input
//! always yields the same output.

use std::collections::HashMap;

use uuid::Uuid;

use crate::notification::{AggregatedNotification, NotificationEvent, NotificationKind};

pub fn aggregate(events: &[NotificationEvent]) -> Vec<AggregatedNotification> {
  // Groups keep first-seen order so that equal timestamps sort stably.
  let mut groups: Vec<Vec<&NotificationEvent>> = Vec::new();
  let mut index: HashMap<(NotificationKind, Uuid), usize> = HashMap::new();
  let mut out: Vec<AggregatedNotification> = Vec::with_capacity(events.len());

  for event in events {
    match (event.kind.is_groupable(), event.target_id) {
      (true, Some(target)) => {
        let slot = *index.entry((event.kind, target)).or_insert_with(|| {
          groups.push(Vec::new());
          groups.len() - 1
        });
        groups[slot].push(event);
      }
      // A like or comment without a target has nothing to group on.
      _ => out.push(AggregatedNotification::single(event.clone())),
    }
  }

  out.extend(groups.into_iter().map(merge));
  out.sort_by(|a, b| b.latest.created_at.cmp(&a.latest.created_at));
  out
}

fn merge(mut group: Vec<&NotificationEvent>) -> AggregatedNotification {
  group.sort_by(|a, b| b.created_at.cmp(&a.created_at));

  let mut actors: Vec<Uuid> = Vec::with_capacity(group.len());
  for event in &group {
    if !actors.contains(&event.actor_id) {
      actors.push(event.actor_id);
    }
  }

  let mut latest = group[0].clone();
  latest.read = group.iter().all(|e| e.read);

  AggregatedNotification {
    count: group.len(),
    event_ids: group.iter().map(|e| e.event_id).collect(),
    actors,
    latest,
  }
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, Duration, TimeZone, Utc};

  use super::*;

  fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() }

  fn ev(
    kind: NotificationKind,
    actor: Uuid,
    target: Option<Uuid>,
    minutes: i64,
  ) -> NotificationEvent {
    NotificationEvent {
      event_id:     Uuid::new_v4(),
      recipient_id: Uuid::nil(),
      actor_id:     actor,
      kind,
      target_id:    target,
      message:      None,
      created_at:   t0() + Duration::minutes(minutes),
      read:         false,
    }
  }

  #[test]
  fn empty_input_empty_output() {
    assert!(aggregate(&[]).is_empty());
  }

  #[test]
  fn likes_on_same_post_merge() {
    let post = Uuid::new_v4();
    let (x, y, z) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    // Store order is newest first, but the merge must not rely on it.
    let events = vec![
      ev(NotificationKind::Like, y, Some(post), 2),
      ev(NotificationKind::Like, z, Some(post), 3),
      ev(NotificationKind::Like, x, Some(post), 1),
    ];

    let out = aggregate(&events);
    assert_eq!(out.len(), 1);
    let group = &out[0];
    assert_eq!(group.count, 3);
    assert_eq!(group.latest.actor_id, z);
    assert_eq!(group.actors, vec![z, y, x]);
    assert_eq!(group.latest.created_at, t0() + Duration::minutes(3));
    assert_eq!(group.event_ids[0], events[1].event_id);
  }

  #[test]
  fn actors_are_distinct() {
    let post = Uuid::new_v4();
    let (x, y) = (Uuid::new_v4(), Uuid::new_v4());
    let events = vec![
      ev(NotificationKind::Comment, x, Some(post), 3),
      ev(NotificationKind::Comment, y, Some(post), 2),
      ev(NotificationKind::Comment, x, Some(post), 1),
    ];
    let out = aggregate(&events);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].count, 3);
    assert_eq!(out[0].actors, vec![x, y]);
  }

  #[test]
  fn likes_and_comments_on_same_post_stay_apart() {
    let post = Uuid::new_v4();
    let a = Uuid::new_v4();
    let events = vec![
      ev(NotificationKind::Comment, a, Some(post), 2),
      ev(NotificationKind::Like, a, Some(post), 1),
    ];
    let out = aggregate(&events);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].latest.kind, NotificationKind::Comment);
    assert_eq!(out[1].latest.kind, NotificationKind::Like);
  }

  #[test]
  fn different_targets_stay_apart() {
    let a = Uuid::new_v4();
    let events = vec![
      ev(NotificationKind::Like, a, Some(Uuid::new_v4()), 2),
      ev(NotificationKind::Like, a, Some(Uuid::new_v4()), 1),
    ];
    assert_eq!(aggregate(&events).len(), 2);
  }

  #[test]
  fn follower_events_never_merge() {
    let events = vec![
      ev(NotificationKind::NewFollower, Uuid::new_v4(), None, 2),
      ev(NotificationKind::NewFollower, Uuid::new_v4(), None, 1),
      ev(NotificationKind::FollowRequest, Uuid::new_v4(), None, 0),
    ];
    let out = aggregate(&events);
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|n| n.count == 1));
  }

  #[test]
  fn mixed_output_is_newest_first() {
    let post = Uuid::new_v4();
    let events = vec![
      ev(NotificationKind::NewFollower, Uuid::new_v4(), None, 5),
      ev(NotificationKind::Like, Uuid::new_v4(), Some(post), 10),
      ev(NotificationKind::Like, Uuid::new_v4(), Some(post), 1),
      ev(NotificationKind::FollowAccept, Uuid::new_v4(), None, 7),
    ];
    let out = aggregate(&events);
    let minutes: Vec<i64> = out
      .iter()
      .map(|n| (n.latest.created_at - t0()).num_minutes())
      .collect();
    assert_eq!(minutes, vec![10, 7, 5]);
    assert_eq!(out[0].count, 2);
  }

  #[test]
  fn group_is_read_only_when_all_members_are() {
    let post = Uuid::new_v4();
    let mut older = ev(NotificationKind::Like, Uuid::new_v4(), Some(post), 1);
    let mut newer = ev(NotificationKind::Like, Uuid::new_v4(), Some(post), 2);
    newer.read = true;

    let out = aggregate(&[newer.clone(), older.clone()]);
    assert!(!out[0].latest.read);

    older.read = true;
    let out = aggregate(&[newer, older]);
    assert!(out[0].latest.read);
  }

  #[test]
  fn input_is_untouched_and_output_repeatable() {
    let post = Uuid::new_v4();
    let events = vec![
      ev(NotificationKind::Like, Uuid::new_v4(), Some(post), 1),
      ev(NotificationKind::Like, Uuid::new_v4(), Some(post), 2),
    ];
    let before = events.clone();
    let first = aggregate(&events);
    let second = aggregate(&events);
    assert_eq!(events, before);
    assert_eq!(first, second);
  }
}
