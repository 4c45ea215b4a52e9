//! Notification inbox reads and read-state updates.

use uuid::Uuid;

use crate::{
  Error, Result,
  aggregate::aggregate,
  notification::AggregatedNotification,
  signal::{ChangeSignal, ChangeSink},
  store::SocialStore,
};

/// Fetch `recipient_id`'s events and aggregate them for display.
pub async fn fetch<S: SocialStore>(
  store: &S,
  recipient_id: Uuid,
) -> Result<Vec<AggregatedNotification>> {
  let events = store
    .list_notifications(recipient_id)
    .await
    .map_err(Error::store)?;
  Ok(aggregate(&events))
}

/// Number of unread raw events.
pub async fn unread_count<S: SocialStore>(store: &S, recipient_id: Uuid) -> Result<usize> {
  let events = store
    .list_notifications(recipient_id)
    .await
    .map_err(Error::store)?;
  Ok(events.iter().filter(|e| !e.read).count())
}

/// Mark events read. Pass an aggregated entry's `event_ids` to clear a whole
/// group; an empty slice marks everything.
pub async fn mark_read<S: SocialStore>(
  store: &S,
  signals: &dyn ChangeSink,
  recipient_id: Uuid,
  event_ids: &[Uuid],
) -> Result<usize> {
  let updated = store
    .mark_notifications_read(recipient_id, event_ids)
    .await
    .map_err(Error::store)?;
  if updated > 0 {
    signals.publish(ChangeSignal::Notifications { recipient_id });
  }
  Ok(updated)
}
