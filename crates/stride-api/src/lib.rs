//! JSON REST API for Stride's social layer.
//!
//! Exposes an axum [`Router`] backed by any [`stride_core::store::SocialStore`].
//! Authentication is the gateway's job: handlers act as the account named in
//! the `x-viewer-id` header (see [`viewer`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! let signals = stride_api::Broadcaster::new(256);
//! .nest("/api", stride_api::api_router(store.clone(), signals))
//! ```

pub mod accounts;
pub mod error;
pub mod feed;
pub mod follows;
pub mod notifications;
pub mod posts;
pub mod signals;
pub mod viewer;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use stride_core::{
  accounts::Accounts, graph::FollowGraph, posts::Posts, store::SocialStore,
};

pub use error::ApiError;
pub use signals::Broadcaster;
pub use viewer::{VIEWER_HEADER, Viewer};

/// Shared handler state: the store plus the signal hub mutations publish to.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub signals: Broadcaster,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), signals: self.signals.clone() }
  }
}

impl<S: SocialStore> ApiState<S> {
  pub fn accounts(&self) -> Accounts<'_, S> { Accounts::new(&self.store, &self.signals) }

  pub fn graph(&self) -> FollowGraph<'_, S> { FollowGraph::new(&self.store, &self.signals) }

  pub fn posts(&self) -> Posts<'_, S> { Posts::new(&self.store, &self.signals) }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, signals: Broadcaster) -> Router<()>
where
  S: SocialStore + 'static,
{
  Router::new()
    // Accounts
    .route("/accounts", get(accounts::search::<S>).post(accounts::register::<S>))
    .route("/accounts/me", get(accounts::me::<S>).patch(accounts::update_me::<S>))
    .route("/accounts/{id}", get(accounts::profile::<S>))
    .route("/accounts/{id}/followers", get(accounts::followers::<S>))
    .route("/accounts/{id}/following", get(accounts::following::<S>))
    .route("/accounts/{id}/posts", get(accounts::posts::<S>))
    // Follow graph
    .route(
      "/accounts/{id}/follow",
      post(follows::follow::<S>).delete(follows::unfollow::<S>),
    )
    .route("/followers/{id}", delete(follows::remove_follower::<S>))
    .route("/follow-requests", get(follows::requests::<S>))
    .route("/follow-requests/{edge_id}/approve", post(follows::approve::<S>))
    .route("/follow-requests/{edge_id}/reject", post(follows::reject::<S>))
    // Posts
    .route("/posts", post(posts::create::<S>))
    .route(
      "/posts/{id}",
      get(posts::get_one::<S>)
        .patch(posts::edit::<S>)
        .delete(posts::delete_one::<S>),
    )
    .route("/posts/{id}/like", post(posts::like::<S>).delete(posts::unlike::<S>))
    .route(
      "/posts/{id}/comments",
      get(posts::comments::<S>).post(posts::comment::<S>),
    )
    // Feed
    .route("/feed", get(feed::handler::<S>))
    // Notifications
    .route("/notifications", get(notifications::list::<S>))
    .route("/notifications/unread", get(notifications::unread::<S>))
    .route("/notifications/read", post(notifications::mark_read::<S>))
    .route("/notifications/events", get(notifications::events::<S>))
    .with_state(ApiState { store, signals })
}
