//! Handlers for `/posts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/posts` | Body: [`PostContent`], e.g. `{"type":"text","data":{"body":"..."}}` |
//! | `GET`    | `/posts/{id}` | 404 if missing or not visible to the viewer |
//! | `PATCH`  | `/posts/{id}` | Owner only; body: [`PostContent`] |
//! | `DELETE` | `/posts/{id}` | Owner only; 204 |
//! | `POST`   | `/posts/{id}/like` | Returns `{"likes":n}` |
//! | `DELETE` | `/posts/{id}/like` | Returns `{"likes":n}` |
//! | `GET`    | `/posts/{id}/comments` | Oldest first |
//! | `POST`   | `/posts/{id}/comments` | Body: `{"body":"..."}`; 201 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use stride_core::{
  post::{Comment, Post, PostContent, PostView},
  store::SocialStore,
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, viewer::Viewer};

// ─── CRUD ─────────────────────────────────────────────────────────────────────

/// `POST /posts`
pub async fn create<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Json(content): Json<PostContent>,
) -> Result<impl IntoResponse, ApiError> {
  let post = state.posts().create(viewer, content).await?;
  Ok((StatusCode::CREATED, Json(post)))
}

/// `GET /posts/{id}`
pub async fn get_one<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(id): Path<Uuid>,
) -> Result<Json<PostView>, ApiError> {
  Ok(Json(state.posts().view(viewer, id).await?))
}

/// `PATCH /posts/{id}`
pub async fn edit<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(id): Path<Uuid>,
  Json(content): Json<PostContent>,
) -> Result<Json<Post>, ApiError> {
  Ok(Json(state.posts().edit(viewer, id, content).await?))
}

/// `DELETE /posts/{id}`
pub async fn delete_one<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.posts().delete(viewer, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Likes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LikeCount {
  pub likes: usize,
}

/// `POST /posts/{id}/like`
pub async fn like<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(id): Path<Uuid>,
) -> Result<Json<LikeCount>, ApiError> {
  let likes = state.posts().like(viewer, id).await?;
  Ok(Json(LikeCount { likes }))
}

/// `DELETE /posts/{id}/like`
pub async fn unlike<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(id): Path<Uuid>,
) -> Result<Json<LikeCount>, ApiError> {
  let likes = state.posts().unlike(viewer, id).await?;
  Ok(Json(LikeCount { likes }))
}

// ─── Comments ─────────────────────────────────────────────────────────────────

/// `GET /posts/{id}/comments`
pub async fn comments<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError> {
  Ok(Json(state.posts().comments(viewer, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub body: String,
}

/// `POST /posts/{id}/comments`
pub async fn comment<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Path(id): Path<Uuid>,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError> {
  let comment = state.posts().comment(viewer, id, body.body).await?;
  Ok((StatusCode::CREATED, Json(comment)))
}
