//! Accounts: user identities.
//!
//! Accounts are never hard-deleted from within this crate. The `is_private`
//! flag is the only attribute the visibility rules care about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub account_id:   Uuid,
  /// Unique, user-chosen username.
  pub handle:       String,
  pub display_name: String,
  /// Opaque reference into the blob store; never resolved here.
  pub avatar_ref:   Option<String>,
  pub is_private:   bool,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::SocialStore::create_account`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
  pub handle:       String,
  pub display_name: String,
  #[serde(default)]
  pub avatar_ref:   Option<String>,
  #[serde(default)]
  pub is_private:   bool,
}

impl NewAccount {
  pub fn new(handle: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self {
      handle:       handle.into(),
      display_name: display_name.into(),
      avatar_ref:   None,
      is_private:   false,
    }
  }

  pub fn private(mut self) -> Self {
    self.is_private = true;
    self
  }
}

/// A partial profile edit. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountPatch {
  pub display_name: Option<String>,
  pub avatar_ref:   Option<String>,
  pub is_private:   Option<bool>,
}

impl AccountPatch {
  pub fn is_empty(&self) -> bool {
    self.display_name.is_none()
      && self.avatar_ref.is_none()
      && self.is_private.is_none()
  }

  pub fn apply(self, account: &mut Account) {
    if let Some(name) = self.display_name {
      account.display_name = name;
    }
    if let Some(avatar) = self.avatar_ref {
      account.avatar_ref = Some(avatar);
    }
    if let Some(private) = self.is_private {
      account.is_private = private;
    }
  }
}
