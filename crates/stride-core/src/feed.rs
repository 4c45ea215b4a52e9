//! Feed assembly: split the post collection into the viewer's own posts and
//! the community posts the viewer may see.
//!
//! This is a filter, not a ranking. Input order (newest first, from the
//! store) is preserved in both partitions.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  follow::{FollowState, FollowStatus, Relationship},
  post::PostView,
  store::SocialStore,
  visibility::can_view,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Feed {
  pub mine:      Vec<PostView>,
  /// Every visible post, the viewer's own included.
  pub community: Vec<PostView>,
}

/// Partition `posts` for `viewer_id`.
///
/// `following` holds accounts the viewer follows (accepted); `followers`
/// holds accounts following the viewer (accepted).
pub fn assemble(
  viewer_id: Uuid,
  posts: &[PostView],
  following: &HashSet<Uuid>,
  followers: &HashSet<Uuid>,
) -> Feed {
  let mut feed = Feed::default();
  for view in posts {
    let owner = view.owner_id();
    if owner == viewer_id {
      feed.mine.push(view.clone());
    }
    let relationship = Relationship::new(
      accepted_if(following.contains(&owner)),
      accepted_if(followers.contains(&owner)),
    );
    if can_view(viewer_id, owner, view.owner_is_private, relationship) {
      feed.community.push(view.clone());
    }
  }
  feed
}

fn accepted_if(present: bool) -> FollowState {
  if present { FollowState::Accepted } else { FollowState::None }
}

/// Read the viewer's accepted edges and every post, then [`assemble`].
///
/// Reads are independent; a follow approved mid-load may leave this result
/// one cycle stale.
pub async fn load<S: SocialStore>(store: &S, viewer_id: Uuid) -> Result<Feed> {
  let following: HashSet<Uuid> = store
    .follows_from(viewer_id, FollowStatus::Accepted)
    .await
    .map_err(Error::store)?
    .into_iter()
    .map(|e| e.followee_id)
    .collect();

  let followers: HashSet<Uuid> = store
    .follows_to(viewer_id, FollowStatus::Accepted)
    .await
    .map_err(Error::store)?
    .into_iter()
    .map(|e| e.follower_id)
    .collect();

  let posts = store.list_posts(None).await.map_err(Error::store)?;

  Ok(assemble(viewer_id, &posts, &following, &followers))
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::post::{Post, PostContent};

  fn post(owner: Uuid, private: bool) -> PostView {
    PostView {
      post:             Post {
        post_id:    Uuid::new_v4(),
        owner_id:   owner,
        content:    PostContent::Text { body: "leg day".into() },
        created_at: Utc::now(),
        edited_at:  None,
      },
      owner_is_private: private,
    }
  }

  fn ids(posts: &[PostView]) -> Vec<Uuid> { posts.iter().map(|p| p.post.post_id).collect() }

  #[test]
  fn empty_collection_gives_empty_partitions() {
    let feed = assemble(Uuid::new_v4(), &[], &HashSet::new(), &HashSet::new());
    assert!(feed.mine.is_empty());
    assert!(feed.community.is_empty());
  }

  #[test]
  fn partitions_own_public_and_private_strangers() {
    let viewer = Uuid::new_v4();
    let mine = post(viewer, true);
    let public = post(Uuid::new_v4(), false);
    let private = post(Uuid::new_v4(), true);
    let posts = vec![mine.clone(), public.clone(), private];

    let feed = assemble(viewer, &posts, &HashSet::new(), &HashSet::new());
    assert_eq!(ids(&feed.mine), ids(&[mine.clone()]));
    assert_eq!(ids(&feed.community), ids(&[mine, public]));
  }

  #[test]
  fn private_owner_unlocked_from_either_set() {
    let viewer = Uuid::new_v4();
    let followed = Uuid::new_v4();
    let follower = Uuid::new_v4();
    let posts = vec![post(followed, true), post(follower, true), post(Uuid::new_v4(), true)];

    let feed = assemble(
      viewer,
      &posts,
      &HashSet::from([followed]),
      &HashSet::from([follower]),
    );
    assert!(feed.mine.is_empty());
    assert_eq!(ids(&feed.community), ids(&posts[..2]));
  }

  #[test]
  fn order_is_preserved() {
    let viewer = Uuid::new_v4();
    let posts: Vec<PostView> = (0..5).map(|_| post(Uuid::new_v4(), false)).collect();
    let feed = assemble(viewer, &posts, &HashSet::new(), &HashSet::new());
    assert_eq!(ids(&feed.community), ids(&posts));
  }
}
