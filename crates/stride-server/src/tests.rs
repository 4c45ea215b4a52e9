//! End-to-end HTTP tests over an in-memory store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use stride_api::VIEWER_HEADER;
use stride_store_sqlite::SqliteStore;
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{ServerConfig, app};

async fn make_app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  app(Arc::new(store), &ServerConfig::default())
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  viewer: Option<Uuid>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(id) = viewer {
    builder = builder.header(VIEWER_HEADER, id.to_string());
  }
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };

  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap_or_else(|_| {
      Value::String(String::from_utf8_lossy(&bytes).into_owned())
    })
  };
  (status, value)
}

async fn register(app: &Router, handle: &str, private: bool) -> Uuid {
  let (status, body) = send(
    app,
    "POST",
    "/api/accounts",
    None,
    Some(json!({ "handle": handle, "display_name": handle, "is_private": private })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["account_id"].as_str().unwrap().parse().unwrap()
}

async fn text_post(app: &Router, owner: Uuid, text: &str) -> Uuid {
  let (status, body) = send(
    app,
    "POST",
    "/api/posts",
    Some(owner),
    Some(json!({ "type": "text", "data": { "body": text } })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["post_id"].as_str().unwrap().parse().unwrap()
}

// ── Basics ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
  let app = make_app().await;
  let (status, body) = send(&app, "GET", "/health", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, Value::String("ok".into()));
}

#[tokio::test]
async fn missing_viewer_is_401() {
  let app = make_app().await;
  let (status, body) = send(&app, "GET", "/api/feed", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["error"].as_str().unwrap().contains(VIEWER_HEADER));
}

#[tokio::test]
async fn malformed_viewer_is_400() {
  let app = make_app().await;
  let req = Request::builder()
    .uri("/api/feed")
    .header(VIEWER_HEADER, "not-a-uuid")
    .body(Body::empty())
    .unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Accounts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_handle_is_409() {
  let app = make_app().await;
  register(&app, "ana", false).await;
  let (status, _) = send(
    &app,
    "POST",
    "/api/accounts",
    None,
    Some(json!({ "handle": "ANA", "display_name": "Other" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn simultaneous_registers_of_one_handle() {
  let app = make_app().await;
  let body = || Some(json!({ "handle": "dup", "display_name": "Dup" }));
  let ((first, _), (second, _)) = tokio::join!(
    send(&app, "POST", "/api/accounts", None, body()),
    send(&app, "POST", "/api/accounts", None, body()),
  );
  let mut statuses = [first, second];
  statuses.sort();
  assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn profile_and_search() {
  let app = make_app().await;
  let a = register(&app, "runner_a", false).await;
  let b = register(&app, "lifter_b", false).await;

  send(&app, "POST", &format!("/api/accounts/{b}/follow"), Some(a), None).await;

  let (status, profile) = send(&app, "GET", &format!("/api/accounts/{b}"), Some(a), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(profile["handle"], "lifter_b");
  assert_eq!(profile["follower_count"], 1);
  assert_eq!(profile["relationship"]["viewer_follows_owner"], "accepted");

  let (_, hits) = send(&app, "GET", "/api/accounts?q=runner", None, None).await;
  assert_eq!(hits.as_array().unwrap().len(), 1);
  assert_eq!(hits[0]["account_id"], a.to_string());

  let (status, me) = send(
    &app,
    "PATCH",
    "/api/accounts/me",
    Some(a),
    Some(json!({ "display_name": "Runner A" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(me["display_name"], "Runner A");

  let (status, _) = send(&app, "GET", &format!("/api/accounts/{}", Uuid::new_v4()), Some(a), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Follow graph ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn private_follow_request_flow() {
  let app = make_app().await;
  let a = register(&app, "a", false).await;
  let b = register(&app, "b", true).await;

  let (status, body) = send(&app, "POST", &format!("/api/accounts/{b}/follow"), Some(a), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "pending" }));

  let (_, requests) = send(&app, "GET", "/api/follow-requests", Some(b), None).await;
  let requests = requests.as_array().unwrap();
  assert_eq!(requests.len(), 1);
  let edge_id = requests[0]["edge_id"].as_str().unwrap().to_owned();

  // Only the followee may approve.
  let (status, _) = send(
    &app,
    "POST",
    &format!("/api/follow-requests/{edge_id}/approve"),
    Some(a),
    Some(json!({ "follower_id": a })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(
    &app,
    "POST",
    &format!("/api/follow-requests/{edge_id}/approve"),
    Some(b),
    Some(json!({ "follower_id": a })),
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, inbox_b) = send(&app, "GET", "/api/notifications", Some(b), None).await;
  assert_eq!(inbox_b, json!([]));

  let (_, inbox_a) = send(&app, "GET", "/api/notifications", Some(a), None).await;
  let inbox_a = inbox_a.as_array().unwrap();
  assert_eq!(inbox_a.len(), 1);
  assert_eq!(inbox_a[0]["kind"], "follow_accept");
  assert_eq!(inbox_a[0]["summary"], "accepted your follow request");

  let (_, followers) = send(&app, "GET", &format!("/api/accounts/{b}/followers"), Some(a), None).await;
  assert_eq!(followers[0]["account_id"], a.to_string());
}

#[tokio::test]
async fn self_follow_is_400() {
  let app = make_app().await;
  let a = register(&app, "a", false).await;
  let (status, _) = send(&app, "POST", &format!("/api/accounts/{a}/follow"), Some(a), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unregistered_viewer_writes_are_404() {
  let app = make_app().await;
  let b = register(&app, "b", false).await;
  let post = text_post(&app, b, "easy 5k").await;
  let ghost = Uuid::new_v4();

  let (status, _) = send(&app, "POST", &format!("/api/accounts/{b}/follow"), Some(ghost), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(
    &app,
    "POST",
    "/api/posts",
    Some(ghost),
    Some(json!({ "type": "text", "data": { "body": "hello" } })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&app, "POST", &format!("/api/posts/{post}/like"), Some(ghost), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(
    &app,
    "POST",
    &format!("/api/posts/{post}/comments"),
    Some(ghost),
    Some(json!({ "body": "nice" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, unread) = send(&app, "GET", "/api/notifications/unread", Some(b), None).await;
  assert_eq!(unread, json!({ "count": 0 }));
}

#[tokio::test]
async fn simultaneous_follows_answer_alike() {
  let app = make_app().await;
  let a = register(&app, "a", false).await;
  let b = register(&app, "b", false).await;
  let uri = format!("/api/accounts/{b}/follow");

  let ((s1, r1), (s2, r2)) = tokio::join!(
    send(&app, "POST", &uri, Some(a), None),
    send(&app, "POST", &uri, Some(a), None),
  );
  assert_eq!((s1, s2), (StatusCode::OK, StatusCode::OK));
  assert_eq!(r1, json!({ "status": "accepted" }));
  assert_eq!(r2, json!({ "status": "accepted" }));

  let (_, unread) = send(&app, "GET", "/api/notifications/unread", Some(b), None).await;
  assert_eq!(unread, json!({ "count": 1 }));
}

#[tokio::test]
async fn reject_and_remove_follower() {
  let app = make_app().await;
  let a = register(&app, "a", false).await;
  let b = register(&app, "b", true).await;
  let c = register(&app, "c", false).await;

  send(&app, "POST", &format!("/api/accounts/{b}/follow"), Some(a), None).await;
  let (_, requests) = send(&app, "GET", "/api/follow-requests", Some(b), None).await;
  let edge_id = requests[0]["edge_id"].as_str().unwrap().to_owned();

  let (status, _) =
    send(&app, "POST", &format!("/api/follow-requests/{edge_id}/reject"), Some(b), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) =
    send(&app, "POST", &format!("/api/follow-requests/{edge_id}/reject"), Some(b), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  send(&app, "POST", &format!("/api/accounts/{a}/follow"), Some(c), None).await;
  let (status, _) = send(&app, "DELETE", &format!("/api/followers/{c}"), Some(a), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (_, followers) = send(&app, "GET", &format!("/api/accounts/{a}/followers"), Some(a), None).await;
  assert_eq!(followers, json!([]));
}

// ── Posts and visibility ─────────────────────────────────────────────────────

#[tokio::test]
async fn private_posts_hidden_from_strangers() {
  let app = make_app().await;
  let owner = register(&app, "owner", true).await;
  let stranger = register(&app, "stranger", false).await;
  let post = text_post(&app, owner, "secret squat PR").await;

  let (status, _) = send(&app, "GET", &format!("/api/posts/{post}"), Some(stranger), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, grid) = send(&app, "GET", &format!("/api/accounts/{owner}/posts"), Some(stranger), None).await;
  assert_eq!(grid, json!({ "visibility": "hidden" }));

  let (status, view) = send(&app, "GET", &format!("/api/posts/{post}"), Some(owner), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["owner_is_private"], true);
  assert_eq!(view["content"]["data"]["body"], "secret squat PR");

  let (_, feed) = send(&app, "GET", "/api/feed", Some(stranger), None).await;
  assert_eq!(feed["community"], json!([]));
}

#[tokio::test]
async fn only_owner_edits_posts() {
  let app = make_app().await;
  let owner = register(&app, "owner", false).await;
  let other = register(&app, "other", false).await;
  let post = text_post(&app, owner, "v1").await;

  let edit = json!({ "type": "text", "data": { "body": "v2" } });
  let (status, _) =
    send(&app, "PATCH", &format!("/api/posts/{post}"), Some(other), Some(edit.clone())).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) =
    send(&app, "PATCH", &format!("/api/posts/{post}"), Some(owner), Some(edit)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["content"]["data"]["body"], "v2");

  let (status, _) = send(&app, "DELETE", &format!("/api/posts/{post}"), Some(owner), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, "GET", &format!("/api/posts/{post}"), Some(owner), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_comment_is_400() {
  let app = make_app().await;
  let owner = register(&app, "owner", false).await;
  let post = text_post(&app, owner, "hi").await;
  let (status, _) = send(
    &app,
    "POST",
    &format!("/api/posts/{post}/comments"),
    Some(owner),
    Some(json!({ "body": "   " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Notifications ────────────────────────────────────────────────────────────

#[tokio::test]
async fn likes_group_and_mark_read() {
  let app = make_app().await;
  let owner = register(&app, "owner", false).await;
  let post = text_post(&app, owner, "10k").await;

  for handle in ["x", "y", "z"] {
    let liker = register(&app, handle, false).await;
    let (status, _) = send(&app, "POST", &format!("/api/posts/{post}/like"), Some(liker), None).await;
    assert_eq!(status, StatusCode::OK);
  }

  let (_, unread) = send(&app, "GET", "/api/notifications/unread", Some(owner), None).await;
  assert_eq!(unread, json!({ "count": 3 }));

  let (_, inbox) = send(&app, "GET", "/api/notifications", Some(owner), None).await;
  let inbox = inbox.as_array().unwrap();
  assert_eq!(inbox.len(), 1);
  assert_eq!(inbox[0]["count"], 3);
  assert_eq!(inbox[0]["summary"], "and 2 more people liked your post");
  assert_eq!(inbox[0]["read"], false);

  let ids = inbox[0]["event_ids"].clone();
  let (_, marked) =
    send(&app, "POST", "/api/notifications/read", Some(owner), Some(json!({ "ids": ids }))).await;
  assert_eq!(marked, json!({ "updated": 3 }));

  let (_, unread) = send(&app, "GET", "/api/notifications/unread", Some(owner), None).await;
  assert_eq!(unread, json!({ "count": 0 }));
}

#[tokio::test]
async fn mark_read_with_huge_id_list() {
  let app = make_app().await;
  let owner = register(&app, "owner", false).await;
  let liker = register(&app, "liker", false).await;
  let post = text_post(&app, owner, "hill repeats").await;
  send(&app, "POST", &format!("/api/posts/{post}/like"), Some(liker), None).await;

  let (_, inbox) = send(&app, "GET", "/api/notifications", Some(owner), None).await;
  let mut ids: Vec<Value> = (0..33_000).map(|_| json!(Uuid::new_v4())).collect();
  ids.push(inbox[0]["event_ids"][0].clone());

  let (status, marked) =
    send(&app, "POST", "/api/notifications/read", Some(owner), Some(json!({ "ids": ids }))).await;
  assert_eq!(status, StatusCode::OK, "{marked}");
  assert_eq!(marked, json!({ "updated": 1 }));
}

#[tokio::test]
async fn notification_stream_opens_as_sse() {
  let app = make_app().await;
  let viewer = register(&app, "viewer", false).await;

  let req = Request::builder()
    .uri("/api/notifications/events")
    .header(VIEWER_HEADER, viewer.to_string())
    .body(Body::empty())
    .unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
  assert!(content_type.starts_with("text/event-stream"), "{content_type}");
}
