//! HttpBackend against a local axum server speaking the social API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use socialsync::config::RemoteSettings;
use socialsync::errors::RemoteError;
use socialsync::model::{
    CommentId, PostId, ProfileUpdate, RelationKind, ToggleTarget, UserId, UserSummary,
};
use socialsync::notify::ChannelNotifier;
use socialsync::remote::{HttpBackend, SocialBackend};
use socialsync::session::Viewer;
use socialsync::toggle::{ToggleController, ToggleOutcome, ToggleSnapshot};

/// One request as the server saw it.
#[derive(Debug, Clone)]
struct Seen {
    method: &'static str,
    path: String,
    auth: Option<String>,
    body: Option<Value>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn record(log: &Log, method: &'static str, path: String, headers: &HeaderMap, body: Option<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    log.lock().unwrap().push(Seen {
        method,
        path,
        auth,
        body,
    });
}

fn users() -> Vec<UserSummary> {
    vec![
        UserSummary::new("u1", "ada").with_name("Ada"),
        UserSummary::new("u2", "bob"),
    ]
}

async fn like(
    State(log): State<Log>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record(&log, "POST", format!("/api/posts/{}/like", id), &headers, None);
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Post not found" })));
    }
    (StatusCode::OK, Json(json!({ "success": true })))
}

async fn follow(
    State(log): State<Log>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    record(&log, "POST", format!("/api/users/{}/follow", id), &headers, None);
    if id == "me" {
        return Json(json!({ "success": false, "error": "You cannot follow yourself" }));
    }
    Json(json!({ "success": true }))
}

async fn followers(State(log): State<Log>, Path(id): Path<String>, headers: HeaderMap) -> Json<Vec<UserSummary>> {
    record(&log, "GET", format!("/api/users/{}/followers", id), &headers, None);
    Json(users())
}

async fn following(State(log): State<Log>, Path(id): Path<String>, headers: HeaderMap) -> &'static str {
    record(&log, "GET", format!("/api/users/{}/following", id), &headers, None);
    "<html>not json</html>"
}

async fn likes(State(log): State<Log>, Path(id): Path<String>, headers: HeaderMap) -> Json<Value> {
    record(&log, "GET", format!("/api/posts/{}/likes", id), &headers, None);
    // Missing optional fields must decode as None.
    Json(json!([{ "id": "u3", "username": "cat" }]))
}

async fn user_posts(State(log): State<Log>, Path(id): Path<String>, headers: HeaderMap) -> Json<Value> {
    record(&log, "GET", format!("/api/users/{}/posts", id), &headers, None);
    Json(json!([{
        "id": "p1",
        "author": { "id": id, "username": "bob" },
        "content": "hello",
        "created_at": "2024-03-09T12:00:00Z",
        "like_count": 2,
        "liked_by_viewer": true,
        "comments": [{
            "id": "c1",
            "author": { "id": "u1", "username": "ada" },
            "content": "nice",
            "created_at": "2024-03-09T12:05:00Z"
        }]
    }]))
}

async fn liked_posts(State(log): State<Log>, Path(id): Path<String>, headers: HeaderMap) -> Json<Value> {
    record(&log, "GET", format!("/api/users/{}/liked-posts", id), &headers, None);
    Json(json!([]))
}

async fn comment(
    State(log): State<Log>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&log, "POST", format!("/api/posts/{}/comments", id), &headers, Some(body));
    Json(json!({ "success": true }))
}

async fn delete_comment(State(log): State<Log>, Path(id): Path<String>, headers: HeaderMap) -> Json<Value> {
    record(&log, "DELETE", format!("/api/comments/{}", id), &headers, None);
    Json(json!({ "success": true }))
}

async fn delete_post(State(log): State<Log>, Path(id): Path<String>, headers: HeaderMap) -> impl IntoResponse {
    record(&log, "DELETE", format!("/api/posts/{}", id), &headers, None);
    (StatusCode::FORBIDDEN, "forbidden")
}

async fn profile(State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    record(&log, "PATCH", "/api/profile".to_string(), &headers, Some(body));
    Json(json!({ "success": true }))
}

async fn search(
    State(log): State<Log>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Vec<UserSummary>> {
    let q = params.get("q").cloned().unwrap_or_default();
    record(&log, "GET", format!("/api/users/search?q={}", q), &headers, None);
    Json(users().into_iter().filter(|u| u.username.contains(&q)).collect())
}

fn router(log: Log) -> Router {
    Router::new()
        .route("/api/posts/{id}/like", post(like))
        .route("/api/users/{id}/follow", post(follow))
        .route("/api/users/{id}/followers", get(followers))
        .route("/api/users/{id}/following", get(following))
        .route("/api/posts/{id}/likes", get(likes))
        .route("/api/users/{id}/posts", get(user_posts))
        .route("/api/users/{id}/liked-posts", get(liked_posts))
        .route("/api/posts/{id}/comments", post(comment))
        .route("/api/comments/{id}", delete(delete_comment))
        .route("/api/posts/{id}", delete(delete_post))
        .route("/api/profile", patch(profile))
        .route("/api/users/search", get(search))
        .with_state(log)
}

/// Start the fake API. `None` when the environment forbids binding sockets.
async fn serve(token: Option<&str>) -> Option<(HttpBackend, Log)> {
    let listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Skipping HTTP backend test (sandbox): {:?}", e);
            return None;
        }
    };
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::default();
    let app = router(log.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let backend = HttpBackend::new(&RemoteSettings {
        base_url: format!("http://{}", addr),
        timeout_secs: 5,
        token: token.map(str::to_string),
    })
    .unwrap();
    Some((backend, log))
}

fn last(log: &Log) -> Seen {
    log.lock().unwrap().last().cloned().unwrap()
}

#[tokio::test]
async fn toggle_posts_to_like_and_follow_routes() {
    let Some((backend, log)) = serve(Some("tok")).await else {
        return;
    };

    let res = backend
        .toggle_relationship(&ToggleTarget::Like(PostId::new("p1")))
        .await
        .unwrap();
    assert!(res.success);
    let seen = last(&log);
    assert_eq!((seen.method, seen.path.as_str()), ("POST", "/api/posts/p1/like"));
    assert_eq!(seen.auth.as_deref(), Some("Bearer tok"));

    let res = backend
        .toggle_relationship(&ToggleTarget::Follow(UserId::new("me")))
        .await
        .unwrap();
    assert!(!res.success);
    assert_eq!(res.error.as_deref(), Some("You cannot follow yourself"));
    assert_eq!(last(&log).path, "/api/users/me/follow");
}

#[tokio::test]
async fn error_status_carries_server_message() {
    let Some((backend, _log)) = serve(None).await else {
        return;
    };

    let err = backend
        .toggle_relationship(&ToggleTarget::Like(PostId::new("missing")))
        .await
        .unwrap_err();
    match &err {
        RemoteError::Status {
            endpoint,
            status,
            message,
        } => {
            assert_eq!(endpoint, "/api/posts/missing/like");
            assert_eq!(*status, 404);
            assert_eq!(message, "Post not found");
        }
        other => panic!("expected status error, got {:?}", other),
    }
    assert!(err.is_rejection());

    let err = backend
        .delete_post(&PostId::new("p1"))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Status { status: 403, ref message, .. } if message == "forbidden"));
}

#[tokio::test]
async fn relation_lists_use_kind_specific_routes() {
    let Some((backend, log)) = serve(None).await else {
        return;
    };

    let users = backend
        .fetch_relation(RelationKind::Followers, "u9")
        .await
        .unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name.as_deref(), Some("Ada"));
    assert_eq!(last(&log).path, "/api/users/u9/followers");
    assert_eq!(last(&log).auth, None);

    let likers = backend.fetch_relation(RelationKind::Likers, "p1").await.unwrap();
    assert_eq!(likers, vec![UserSummary::new("u3", "cat")]);
    assert_eq!(last(&log).path, "/api/posts/p1/likes");
}

#[tokio::test]
async fn profile_tabs_fetch_post_lists() {
    let Some((backend, log)) = serve(Some("tok")).await else {
        return;
    };

    let posts = backend.fetch_user_posts(&UserId::new("u2")).await.unwrap();
    assert_eq!(last(&log).path, "/api/users/u2/posts");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, PostId::new("p1"));
    assert_eq!(posts[0].like_count, 2);
    assert!(posts[0].liked_by_viewer);
    assert_eq!(posts[0].image, None);
    assert_eq!(posts[0].comments[0].content, "nice");

    let liked = backend.fetch_liked_posts(&UserId::new("u2")).await.unwrap();
    assert!(liked.is_empty());
    let seen = last(&log);
    assert_eq!((seen.method, seen.path.as_str()), ("GET", "/api/users/u2/liked-posts"));
    assert_eq!(seen.auth.as_deref(), Some("Bearer tok"));
}

#[tokio::test]
async fn non_json_body_is_decode_error() {
    let Some((backend, _log)) = serve(None).await else {
        return;
    };

    let err = backend
        .fetch_relation(RelationKind::Following, "u1")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Decode { ref endpoint, .. } if endpoint == "/api/users/u1/following"));
    assert!(!err.is_rejection());
}

#[tokio::test]
async fn comment_and_profile_send_json_bodies() {
    let Some((backend, log)) = serve(Some("tok")).await else {
        return;
    };

    backend
        .submit_comment(&PostId::new("p1"), "hello there")
        .await
        .unwrap();
    let seen = last(&log);
    assert_eq!(seen.path, "/api/posts/p1/comments");
    assert_eq!(seen.body, Some(json!({ "content": "hello there" })));

    let update = ProfileUpdate {
        name: "Ada L".to_string(),
        bio: "math".to_string(),
        location: String::new(),
        website: "ada.dev".to_string(),
    };
    assert!(backend.update_profile(&update).await.unwrap().success);
    let seen = last(&log);
    assert_eq!((seen.method, seen.path.as_str()), ("PATCH", "/api/profile"));
    assert_eq!(seen.body.unwrap()["website"], "ada.dev");

    assert!(
        backend
            .delete_comment(&CommentId::new("c7"))
            .await
            .unwrap()
            .success
    );
    assert_eq!(last(&log).path, "/api/comments/c7");
}

#[tokio::test]
async fn search_passes_query_string() {
    let Some((backend, log)) = serve(None).await else {
        return;
    };

    let found = backend.search_users("bo").await.unwrap();
    assert_eq!(found, vec![UserSummary::new("u2", "bob")]);
    assert_eq!(last(&log).path, "/api/users/search?q=bo");
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        return;
    };
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpBackend::new(&RemoteSettings {
        base_url: format!("http://{}", addr),
        timeout_secs: 2,
        token: None,
    })
    .unwrap();
    let err = backend.search_users("x").await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport { .. }));
}

#[tokio::test]
async fn like_rolls_back_when_server_rejects() {
    let Some((backend, _log)) = serve(Some("tok")).await else {
        return;
    };
    let (notifier, mut rx) = ChannelNotifier::channel();
    let controller = ToggleController::new(
        ToggleTarget::Like(PostId::new("missing")),
        ToggleSnapshot::new(false, 7),
        Viewer::signed_in("u1", "ada"),
        Arc::new(backend),
        Arc::new(notifier),
    );

    assert_eq!(
        controller.toggle().await,
        ToggleOutcome::RolledBack(ToggleSnapshot::new(false, 7))
    );
    assert_eq!(
        rx.try_recv().unwrap().message(),
        "Failed to update like"
    );
}
