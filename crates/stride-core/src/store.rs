//! The `SocialStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `stride-store-sqlite`).
//! The engine types in this crate hold no state of their own; every read and
//! write goes through this abstraction. No method is retried here, and
//! backends give no ordering guarantee across calls beyond last-write-wins.

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::{Account, AccountPatch, NewAccount},
  follow::{FollowEdge, FollowStatus},
  notification::{NewNotification, NotificationEvent, NotificationMatch},
  post::{Comment, Post, PostContent, PostView},
};

/// Abstraction over the hosted data store.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SocialStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Persist a new account. Returns `None` without writing if the handle
  /// is already taken, including by a concurrent insert.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  fn get_account_by_handle<'a>(
    &'a self,
    handle: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Apply a profile edit. Returns `None` if the account does not exist.
  fn update_account(
    &self,
    id: Uuid,
    patch: AccountPatch,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Case-insensitive substring match over handle and display name.
  fn search_accounts<'a>(
    &'a self,
    text: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + 'a;

  // ── Follow edges ──────────────────────────────────────────────────────

  /// Exact match on the ordered `(follower, followee)` pair.
  fn get_follow(
    &self,
    follower_id: Uuid,
    followee_id: Uuid,
  ) -> impl Future<Output = Result<Option<FollowEdge>, Self::Error>> + Send + '_;

  fn get_follow_by_id(
    &self,
    edge_id: Uuid,
  ) -> impl Future<Output = Result<Option<FollowEdge>, Self::Error>> + Send + '_;

  /// Create an edge. Returns `None` without writing if one already exists
  /// for the pair.
  fn insert_follow(
    &self,
    follower_id: Uuid,
    followee_id: Uuid,
    status: FollowStatus,
  ) -> impl Future<Output = Result<Option<FollowEdge>, Self::Error>> + Send + '_;

  /// Overwrite the status of an edge. Returns `false` if it does not exist.
  fn set_follow_status(
    &self,
    edge_id: Uuid,
    status: FollowStatus,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `false` if the edge did not exist.
  fn delete_follow(
    &self,
    edge_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Edges pointing at `followee_id` with the given status, insertion order.
  fn follows_to(
    &self,
    followee_id: Uuid,
    status: FollowStatus,
  ) -> impl Future<Output = Result<Vec<FollowEdge>, Self::Error>> + Send + '_;

  /// Edges leaving `follower_id` with the given status, insertion order.
  fn follows_from(
    &self,
    follower_id: Uuid,
    status: FollowStatus,
  ) -> impl Future<Output = Result<Vec<FollowEdge>, Self::Error>> + Send + '_;

  /// Accounts following `followee_id` with the given status, edge insertion
  /// order.
  fn follower_accounts(
    &self,
    followee_id: Uuid,
    status: FollowStatus,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;

  /// Accounts followed by `follower_id` with the given status, edge insertion
  /// order.
  fn followee_accounts(
    &self,
    follower_id: Uuid,
    status: FollowStatus,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  fn create_post(
    &self,
    owner_id: Uuid,
    content: PostContent,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// A post joined with its owner's current privacy flag.
  fn get_post(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<Option<PostView>, Self::Error>> + Send + '_;

  /// Replace a post's payload. Returns `None` if the post does not exist.
  fn update_post(
    &self,
    post_id: Uuid,
    content: PostContent,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Delete a post with its likes and comments. Returns `false` if absent.
  fn delete_post(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All posts, or one owner's posts, newest first.
  fn list_posts(
    &self,
    owner_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<PostView>, Self::Error>> + Send + '_;

  // ── Engagement ────────────────────────────────────────────────────────

  /// Returns `false` if the account had already liked the post.
  fn insert_like(
    &self,
    post_id: Uuid,
    account_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `false` if there was no like to remove.
  fn delete_like(
    &self,
    post_id: Uuid,
    account_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_likes(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn insert_comment(
    &self,
    post_id: Uuid,
    author_id: Uuid,
    body: String,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Comments on a post, oldest first.
  fn list_comments(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  // ── Notification events ───────────────────────────────────────────────

  fn insert_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<NotificationEvent, Self::Error>> + Send + '_;

  /// Events addressed to `recipient_id`, newest first.
  fn list_notifications(
    &self,
    recipient_id: Uuid,
  ) -> impl Future<Output = Result<Vec<NotificationEvent>, Self::Error>> + Send + '_;

  /// Delete by `(recipient, actor, kind[, target])`. Returns the number removed.
  fn delete_notifications(
    &self,
    selector: NotificationMatch,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Delete every event whose target is `target_id`. Returns the number removed.
  fn delete_notifications_for_target(
    &self,
    target_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Mark the given events read; an empty slice marks all of the recipient's
  /// events. Returns the number updated.
  fn mark_notifications_read<'a>(
    &'a self,
    recipient_id: Uuid,
    event_ids: &'a [Uuid],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}
