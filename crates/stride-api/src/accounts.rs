//! Handlers for `/accounts` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/accounts` | Body: [`NewAccount`]; 201, or 409 if the handle is taken |
//! | `GET`   | `/accounts` | `?q=<text>&limit=<n>` handle / display-name search |
//! | `GET`   | `/accounts/me` | The viewer's own profile |
//! | `PATCH` | `/accounts/me` | Body: [`AccountPatch`] |
//! | `GET`   | `/accounts/{id}` | Profile with relationship and counts |
//! | `GET`   | `/accounts/{id}/followers` | Accepted followers |
//! | `GET`   | `/accounts/{id}/following` | Accepted followees |
//! | `GET`   | `/accounts/{id}/posts` | Visibility-gated profile grid |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stride_core::{
  account::{Account, AccountPatch, NewAccount},
  accounts::Profile,
  follow::FollowStatus,
  posts::ProfilePosts,
  store::SocialStore,
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, viewer::Viewer};

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /accounts`
pub async fn register<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewAccount>,
) -> Result<impl IntoResponse, ApiError> {
  let account = state.accounts().register(body).await?;
  Ok((StatusCode::CREATED, Json(account)))
}

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  #[serde(default)]
  pub q:     String,
  pub limit: Option<usize>,
}

/// `GET /accounts[?q=...][&limit=...]`
pub async fn search<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Account>>, ApiError> {
  let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
  Ok(Json(state.accounts().search(&params.q, limit).await?))
}

// ─── Profiles ─────────────────────────────────────────────────────────────────

/// `GET /accounts/me`
pub async fn me<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
) -> Result<Json<Profile>, ApiError> {
  Ok(Json(state.accounts().profile(viewer, viewer).await?))
}

/// `PATCH /accounts/me`
pub async fn update_me<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Json(patch): Json<AccountPatch>,
) -> Result<Json<Account>, ApiError> {
  Ok(Json(state.accounts().update_profile(viewer, patch).await?))
}

/// `GET /accounts/{id}`
pub async fn profile<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError> {
  Ok(Json(state.accounts().profile(viewer, id).await?))
}

// ─── Connections ──────────────────────────────────────────────────────────────

/// `GET /accounts/{id}/followers`
pub async fn followers<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Account>>, ApiError> {
  state.accounts().get(id).await?;
  Ok(Json(state.graph().followers(id, FollowStatus::Accepted).await?))
}

/// `GET /accounts/{id}/following`
pub async fn following<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Account>>, ApiError> {
  state.accounts().get(id).await?;
  Ok(Json(state.graph().following(id, FollowStatus::Accepted).await?))
}

/// `GET /accounts/{id}/posts`
pub async fn posts<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(id): Path<Uuid>,
) -> Result<Json<ProfilePosts>, ApiError> {
  Ok(Json(state.posts().profile(viewer, id).await?))
}
