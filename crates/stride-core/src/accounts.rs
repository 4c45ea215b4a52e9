//! [`Accounts`]: registration, profile reads and profile edits.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  account::{Account, AccountPatch, NewAccount},
  follow::{FollowStatus, Relationship},
  graph::FollowGraph,
  signal::{ChangeSignal, ChangeSink},
  store::SocialStore,
};

/// An account as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
  #[serde(flatten)]
  pub account:         Account,
  pub relationship:    Relationship,
  /// Accepted followers.
  pub follower_count:  usize,
  /// Accepted followees.
  pub following_count: usize,
}

pub struct Accounts<'a, S> {
  store:   &'a S,
  signals: &'a dyn ChangeSink,
}

impl<'a, S: SocialStore> Accounts<'a, S> {
  pub fn new(store: &'a S, signals: &'a dyn ChangeSink) -> Self { Self { store, signals } }

  /// Create an account. The handle is trimmed and must be unused
  /// (case-insensitively).
  pub async fn register(&self, mut input: NewAccount) -> Result<Account> {
    input.handle = input.handle.trim().to_owned();
    input.display_name = input.display_name.trim().to_owned();
    if input.handle.is_empty() || input.handle.contains(char::is_whitespace) {
      return Err(Error::InvalidOperation("handle must be a single non-empty word".into()));
    }
    if input.display_name.is_empty() {
      return Err(Error::InvalidOperation("display name must not be empty".into()));
    }

    let taken = || Error::Conflict(format!("handle {:?} is taken", input.handle));
    if self
      .store
      .get_account_by_handle(&input.handle)
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Err(taken());
    }

    // A concurrent register can claim the handle after the check above.
    let account = self
      .store
      .create_account(input.clone())
      .await
      .map_err(Error::store)?
      .ok_or_else(taken)?;
    tracing::debug!(account = %account.account_id, handle = %account.handle, "account registered");
    Ok(account)
  }

  pub async fn get(&self, account_id: Uuid) -> Result<Account> {
    self
      .store
      .get_account(account_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AccountNotFound(account_id))
  }

  /// `account_id` together with how `viewer_id` relates to it.
  pub async fn profile(&self, viewer_id: Uuid, account_id: Uuid) -> Result<Profile> {
    let account = self.get(account_id).await?;
    let relationship = FollowGraph::new(self.store, self.signals)
      .relationship(viewer_id, account_id)
      .await?;

    let follower_count = self
      .store
      .follows_to(account_id, FollowStatus::Accepted)
      .await
      .map_err(Error::store)?
      .len();
    let following_count = self
      .store
      .follows_from(account_id, FollowStatus::Accepted)
      .await
      .map_err(Error::store)?
      .len();

    Ok(Profile { account, relationship, follower_count, following_count })
  }

  /// Apply `patch` to the viewer's own account. A privacy change
  /// immediately affects what others can see, so feeds are signalled.
  pub async fn update_profile(&self, viewer_id: Uuid, patch: AccountPatch) -> Result<Account> {
    if patch.is_empty() {
      return self.get(viewer_id).await;
    }
    if patch.display_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return Err(Error::InvalidOperation("display name must not be empty".into()));
    }

    let privacy_changed = patch.is_private.is_some();
    let account = self
      .store
      .update_account(viewer_id, patch)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AccountNotFound(viewer_id))?;

    if privacy_changed {
      tracing::debug!(account = %viewer_id, private = account.is_private, "privacy updated");
      self.signals.publish(ChangeSignal::Feed { account_id: viewer_id });
    }
    Ok(account)
  }

  /// Accounts whose handle or display name contains `text`.
  pub async fn search(&self, text: &str, limit: usize) -> Result<Vec<Account>> {
    self
      .store
      .search_accounts(text, limit)
      .await
      .map_err(Error::store)
  }
}
