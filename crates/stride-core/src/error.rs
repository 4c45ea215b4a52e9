//! Error types for `stride-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("account not found: {0}")]
  AccountNotFound(Uuid),

  #[error("follow edge not found: {0}")]
  FollowNotFound(Uuid),

  #[error("post not found: {0}")]
  PostNotFound(Uuid),

  /// The actor is not allowed to perform the mutation (e.g. approving a
  /// follow request addressed to someone else).
  #[error("account {actor} is not allowed to perform this operation")]
  Unauthorized { actor: Uuid },

  /// A uniqueness rule was violated (e.g. a handle already in use).
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("invalid operation: {0}")]
  InvalidOperation(String),

  #[error("unknown {kind} discriminant: {value:?}")]
  UnknownDiscriminant { kind: &'static str, value: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Any failure reported by the backing store. Never retried here.
  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error. Used as `.map_err(Error::store)`.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StoreUnavailable(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::AccountNotFound(_) | Self::FollowNotFound(_) | Self::PostNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
