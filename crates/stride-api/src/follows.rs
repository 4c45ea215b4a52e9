//! Handlers for follow-graph endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/accounts/{id}/follow` | Returns `{"status":"pending"\|"accepted"}` |
//! | `DELETE` | `/accounts/{id}/follow` | Unfollow or cancel a request; 204 |
//! | `DELETE` | `/followers/{id}` | Drop a follower; 204 |
//! | `GET`    | `/follow-requests` | Incoming pending edges |
//! | `POST`   | `/follow-requests/{edge_id}/approve` | Body: `{"follower_id":"<uuid>"}` |
//! | `POST`   | `/follow-requests/{edge_id}/reject` | 204 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};
use stride_core::{
  follow::{FollowEdge, FollowStatus},
  store::SocialStore,
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, viewer::Viewer};

#[derive(Debug, Serialize)]
pub struct FollowResponse {
  pub status: FollowStatus,
}

/// `POST /accounts/{id}/follow`
pub async fn follow<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(target_id): Path<Uuid>,
) -> Result<Json<FollowResponse>, ApiError> {
  if viewer == target_id {
    return Err(ApiError::BadRequest("cannot follow yourself".into()));
  }
  let target = state.accounts().get(target_id).await?;
  let status = state
    .graph()
    .follow(viewer, target_id, target.is_private)
    .await?;
  Ok(Json(FollowResponse { status }))
}

/// `DELETE /accounts/{id}/follow`
pub async fn unfollow<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(target_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.graph().unfollow(viewer, target_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /followers/{id}`
pub async fn remove_follower<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(follower_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.graph().remove_follower(viewer, follower_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Requests ─────────────────────────────────────────────────────────────────

/// `GET /follow-requests`
pub async fn requests<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
) -> Result<Json<Vec<FollowEdge>>, ApiError> {
  Ok(Json(state.graph().pending_requests(viewer).await?))
}

#[derive(Debug, Deserialize)]
pub struct ApproveBody {
  pub follower_id: Uuid,
}

/// `POST /follow-requests/{edge_id}/approve`
pub async fn approve<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(edge_id): Path<Uuid>,
  Json(body): Json<ApproveBody>,
) -> Result<StatusCode, ApiError> {
  state.graph().approve(edge_id, body.follower_id, viewer).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /follow-requests/{edge_id}/reject`
pub async fn reject<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(edge_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.graph().reject(edge_id, viewer).await?;
  Ok(StatusCode::NO_CONTENT)
}
