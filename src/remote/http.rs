//! JSON-over-HTTP implementation of `SocialBackend`.
//!
//! Routes:
//! - `POST   /api/posts/{id}/like`, `POST /api/users/{id}/follow`
//! - `GET    /api/users/{id}/followers`, `GET /api/users/{id}/following`,
//!   `GET /api/posts/{id}/likes`
//! - `GET    /api/users/{id}/posts`, `GET /api/users/{id}/liked-posts`
//! - `POST   /api/posts/{id}/comments`, `DELETE /api/comments/{id}`,
//!   `DELETE /api/posts/{id}`
//! - `PATCH  /api/profile`
//! - `GET    /api/users/search?q=`

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use socialsync_common::{
    CommentId, MutationResult, PostId, PostSummary, ProfileUpdate, RelationKind, ToggleTarget,
    UserId, UserSummary,
};

use super::SocialBackend;
use crate::config::RemoteSettings;
use crate::errors::RemoteError;

const USER_AGENT: &str = concat!("socialsync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

#[derive(serde::Serialize)]
struct CommentBody<'a> {
    content: &'a str,
}

impl HttpBackend {
    pub fn new(settings: &RemoteSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url)
            .with_context(|| format!("Invalid base URL '{}'", settings.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Base URL '{}' cannot carry a path", settings.base_url);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url,
            token: settings.token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> (RequestBuilder, String) {
        let url = self.url(segments);
        let endpoint = url.path().to_string();
        let mut req = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        (req, endpoint)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        endpoint: String,
    ) -> Result<T, RemoteError> {
        tracing::debug!(%endpoint, "remote call");
        let resp = req.send().await.map_err(|source| RemoteError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|source| RemoteError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                endpoint,
                status: status.as_u16(),
                message: error_message(&bytes),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }
}

/// Pull `{"error": "..."}` out of an error body, falling back to the raw text.
fn error_message(body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: String,
    }
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}

#[async_trait]
impl SocialBackend for HttpBackend {
    async fn toggle_relationship(
        &self,
        target: &ToggleTarget,
    ) -> Result<MutationResult, RemoteError> {
        let (req, endpoint) = match target {
            ToggleTarget::Like(post) => {
                self.request(Method::POST, &["api", "posts", post.as_str(), "like"])
            }
            ToggleTarget::Follow(user) => {
                self.request(Method::POST, &["api", "users", user.as_str(), "follow"])
            }
        };
        self.send(req, endpoint).await
    }

    async fn fetch_relation(
        &self,
        kind: RelationKind,
        owner: &str,
    ) -> Result<Vec<UserSummary>, RemoteError> {
        let segments = match kind {
            RelationKind::Followers => ["api", "users", owner, "followers"],
            RelationKind::Following => ["api", "users", owner, "following"],
            RelationKind::Likers => ["api", "posts", owner, "likes"],
        };
        let (req, endpoint) = self.request(Method::GET, &segments);
        self.send(req, endpoint).await
    }

    async fn fetch_user_posts(&self, user: &UserId) -> Result<Vec<PostSummary>, RemoteError> {
        let (req, endpoint) = self.request(Method::GET, &["api", "users", user.as_str(), "posts"]);
        self.send(req, endpoint).await
    }

    async fn fetch_liked_posts(&self, user: &UserId) -> Result<Vec<PostSummary>, RemoteError> {
        let (req, endpoint) =
            self.request(Method::GET, &["api", "users", user.as_str(), "liked-posts"]);
        self.send(req, endpoint).await
    }

    async fn submit_comment(
        &self,
        post: &PostId,
        content: &str,
    ) -> Result<MutationResult, RemoteError> {
        let (req, endpoint) =
            self.request(Method::POST, &["api", "posts", post.as_str(), "comments"]);
        self.send(req.json(&CommentBody { content }), endpoint).await
    }

    async fn delete_comment(&self, comment: &CommentId) -> Result<MutationResult, RemoteError> {
        let (req, endpoint) = self.request(Method::DELETE, &["api", "comments", comment.as_str()]);
        self.send(req, endpoint).await
    }

    async fn delete_post(&self, post: &PostId) -> Result<MutationResult, RemoteError> {
        let (req, endpoint) = self.request(Method::DELETE, &["api", "posts", post.as_str()]);
        self.send(req, endpoint).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<MutationResult, RemoteError> {
        let (req, endpoint) = self.request(Method::PATCH, &["api", "profile"]);
        self.send(req.json(update), endpoint).await
    }

    async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>, RemoteError> {
        let (req, endpoint) = self.request(Method::GET, &["api", "users", "search"]);
        self.send(req.query(&[("q", query)]), endpoint).await
    }
}
