//! Follow edges and the relationship types derived from them.
//!
//! An edge exists only in the `pending` or `accepted` state. The "none" state
//! is the absence of a row, represented at query time by [`FollowState::None`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Stored status ───────────────────────────────────────────────────────────

/// Status of a persisted follow edge. Transitions only `Pending → Accepted`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FollowStatus {
  Pending,
  Accepted,
}

/// A directed follower → followee relationship. At most one per ordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdge {
  pub edge_id:     Uuid,
  pub follower_id: Uuid,
  pub followee_id: Uuid,
  pub status:      FollowStatus,
  pub created_at:  DateTime<Utc>,
}

impl FollowEdge {
  pub fn is_accepted(&self) -> bool { self.status == FollowStatus::Accepted }

  pub fn is_pending(&self) -> bool { self.status == FollowStatus::Pending }
}

// ─── Query-time state ────────────────────────────────────────────────────────

/// The tri-state answer to "does A follow B?".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowState {
  #[default]
  None,
  Pending,
  Accepted,
}

impl FollowState {
  pub fn is_accepted(self) -> bool { self == Self::Accepted }
}

impl From<FollowStatus> for FollowState {
  fn from(status: FollowStatus) -> Self {
    match status {
      FollowStatus::Pending => Self::Pending,
      FollowStatus::Accepted => Self::Accepted,
    }
  }
}

impl From<Option<&FollowEdge>> for FollowState {
  fn from(edge: Option<&FollowEdge>) -> Self {
    edge.map(|e| e.status.into()).unwrap_or_default()
  }
}

/// Follow state between a viewer and a content owner, in both directions.
///
/// Missing data defaults to [`FollowState::None`], the most restrictive
/// reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
  /// viewer → owner
  pub viewer_follows_owner: FollowState,
  /// owner → viewer
  pub owner_follows_viewer: FollowState,
}

impl Relationship {
  pub fn new(viewer_follows_owner: FollowState, owner_follows_viewer: FollowState) -> Self {
    Self { viewer_follows_owner, owner_follows_viewer }
  }
}
