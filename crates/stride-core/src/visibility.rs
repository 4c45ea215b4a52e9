//! Visibility policy: may this viewer see this owner's content?
//!
//! Private content is unlocked by an accepted follow in *either* direction.
//! Being followed by a private account, without following back, is enough to
//! see its posts. This is product behaviour, not an oversight; keep it unless
//! the product decision changes.

use uuid::Uuid;

use crate::follow::Relationship;

/// Total decision function; never fails. Missing relationship data should be
/// passed as `Relationship::default()`, which denies private content.
pub fn can_view(
  viewer_id: Uuid,
  owner_id: Uuid,
  owner_is_private: bool,
  relationship: Relationship,
) -> bool {
  if viewer_id == owner_id {
    return true;
  }
  if !owner_is_private {
    return true;
  }
  relationship.viewer_follows_owner.is_accepted()
    || relationship.owner_follows_viewer.is_accepted()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::follow::FollowState;

  fn rel(v2o: FollowState, o2v: FollowState) -> Relationship { Relationship::new(v2o, o2v) }

  #[test]
  fn owner_always_sees_own_content() {
    let a = Uuid::new_v4();
    assert!(can_view(a, a, true, Relationship::default()));
    assert!(can_view(a, a, false, Relationship::default()));
  }

  #[test]
  fn public_owner_visible_to_strangers() {
    assert!(can_view(Uuid::new_v4(), Uuid::new_v4(), false, Relationship::default()));
  }

  #[test]
  fn private_owner_hidden_without_relationship() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    assert!(!can_view(a, b, true, Relationship::default()));
  }

  #[test]
  fn pending_does_not_unlock() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    assert!(!can_view(a, b, true, rel(FollowState::Pending, FollowState::None)));
    assert!(!can_view(a, b, true, rel(FollowState::Pending, FollowState::Pending)));
  }

  #[test]
  fn accepted_follow_unlocks() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    assert!(can_view(a, b, true, rel(FollowState::Accepted, FollowState::None)));
  }

  #[test]
  fn being_followed_by_private_owner_unlocks() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    assert!(can_view(a, b, true, rel(FollowState::None, FollowState::Accepted)));
  }
}
