//! Handlers for `/notifications` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/notifications` | Aggregated inbox, newest first, with display summaries |
//! | `GET`  | `/notifications/unread` | `{"count":n}` raw unread events |
//! | `POST` | `/notifications/read` | Body: `{"ids":[...]}`; empty or absent marks all |
//! | `GET`  | `/notifications/events` | SSE; one `notifications` event per inbox change |

use std::convert::Infallible;

use axum::{
  Json,
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use stride_core::{
  inbox,
  notification::AggregatedNotification,
  signal::ChangeSignal,
  store::SocialStore,
};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, viewer::Viewer};

/// One inbox row as rendered to clients.
#[derive(Debug, Serialize)]
pub struct InboxItem {
  #[serde(flatten)]
  pub notification: AggregatedNotification,
  pub summary:      String,
}

impl From<AggregatedNotification> for InboxItem {
  fn from(notification: AggregatedNotification) -> Self {
    Self { summary: notification.summary(), notification }
  }
}

async fn load_inbox<S: SocialStore>(
  state: &ApiState<S>,
  viewer: Uuid,
) -> Result<Vec<InboxItem>, ApiError> {
  let items = inbox::fetch(&*state.store, viewer).await?;
  Ok(items.into_iter().map(InboxItem::from).collect())
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /notifications`
pub async fn list<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
) -> Result<Json<Vec<InboxItem>>, ApiError> {
  Ok(Json(load_inbox(&state, viewer).await?))
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
  pub count: usize,
}

/// `GET /notifications/unread`
pub async fn unread<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
) -> Result<Json<UnreadCount>, ApiError> {
  let count = inbox::unread_count(&*state.store, viewer).await?;
  Ok(Json(UnreadCount { count }))
}

// ─── Mark read ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct MarkReadBody {
  #[serde(default)]
  pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
  pub updated: usize,
}

/// `POST /notifications/read`
pub async fn mark_read<S: SocialStore>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
  Json(body): Json<MarkReadBody>,
) -> Result<Json<MarkReadResponse>, ApiError> {
  let updated = inbox::mark_read(&*state.store, &state.signals, viewer, &body.ids).await?;
  Ok(Json(MarkReadResponse { updated }))
}

// ─── Live stream ──────────────────────────────────────────────────────────────

/// `GET /notifications/events`
///
/// Sends the current inbox on connect, then a fresh one whenever a signal for
/// the viewer arrives. A lagging receiver resyncs with a single refetch.
pub async fn events<S>(
  State(state): State<ApiState<S>>,
  Viewer(viewer): Viewer,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
  S: SocialStore + 'static,
{
  let rx = state.signals.subscribe();

  let stream = stream::unfold((state, rx, true), move |(state, mut rx, first)| async move {
    if !first {
      loop {
        match rx.recv().await {
          Ok(ChangeSignal::Notifications { recipient_id }) if recipient_id == viewer => break,
          Ok(_) => continue,
          Err(RecvError::Lagged(skipped)) => {
            tracing::debug!(viewer = %viewer, skipped, "signal receiver lagged; resyncing");
            break;
          }
          Err(RecvError::Closed) => return None,
        }
      }
    }

    let event = inbox_event(&state, viewer).await;
    Some((Ok(event), (state, rx, false)))
  });

  Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn inbox_event<S: SocialStore>(state: &ApiState<S>, viewer: Uuid) -> Event {
  let payload = load_inbox(state, viewer)
    .await
    .and_then(|items| {
      Event::default()
        .event("notifications")
        .json_data(items)
        .map_err(|e| ApiError::Internal(e.to_string()))
    });

  match payload {
    Ok(event) => event,
    Err(e) => {
      tracing::warn!(viewer = %viewer, error = %e, "inbox refresh failed");
      Event::default().event("error").data(e.to_string())
    }
  }
}
