//! Change signals.
//!
//! Mutations report what they touched through an injected [`ChangeSink`].
//! Delivery is the caller's business: a push channel, a broadcast queue, or
//! nothing at all (`()`). Subscribers respond by re-running the relevant read
//! (`inbox::fetch`, `feed::load`); signals carry no payload beyond the key.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeSignal {
  /// A notification event was inserted, deleted, or marked read for this
  /// recipient.
  Notifications { recipient_id: Uuid },
  /// Something this account's feed depends on changed (follow state, or a
  /// post it can see).
  Feed { account_id: Uuid },
}

impl ChangeSignal {
  /// The account whose view is stale after this change.
  pub fn account_id(&self) -> Uuid {
    match *self {
      Self::Notifications { recipient_id } => recipient_id,
      Self::Feed { account_id } => account_id,
    }
  }
}

pub trait ChangeSink: Send + Sync {
  fn publish(&self, signal: ChangeSignal);
}

/// Discards every signal.
impl ChangeSink for () {
  fn publish(&self, _signal: ChangeSignal) {}
}

