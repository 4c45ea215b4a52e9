//! Handler for `GET /feed`.

use axum::{Json, extract::State};
use stride_core::{
  feed::{self, Feed},
  store::SocialStore,
};

use crate::{ApiState, error::ApiError, viewer::Viewer};

/// `GET /feed` returns `{"mine":[...],"community":[...]}`, newest first.
pub async fn handler<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
) -> Result<Json<Feed>, ApiError> {
  Ok(Json(feed::load(&*state.store, viewer).await?))
}
