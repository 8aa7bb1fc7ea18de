//! The boundary to the social API.
//!
//! Every remote operation the client needs is a method on `SocialBackend`.
//! Mutations share the boolean `MutationResult` contract; no partial-failure
//! detail travels beyond success or failure.

pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use socialsync_common::{
    CommentId, MutationResult, PostId, PostSummary, ProfileUpdate, RelationKind, ToggleTarget,
    UserId, UserSummary,
};

use crate::errors::RemoteError;

pub use http::HttpBackend;
pub use memory::{InMemoryBackend, Operation};

#[async_trait]
pub trait SocialBackend: Send + Sync {
    /// Flip the viewer's like or follow. The server decides whether the edge
    /// is created or removed.
    async fn toggle_relationship(&self, target: &ToggleTarget)
    -> Result<MutationResult, RemoteError>;

    /// Current related users for one owner and kind, in edge insertion order.
    async fn fetch_relation(
        &self,
        kind: RelationKind,
        owner: &str,
    ) -> Result<Vec<UserSummary>, RemoteError>;

    /// Posts authored by `user`, newest first.
    async fn fetch_user_posts(&self, user: &UserId) -> Result<Vec<PostSummary>, RemoteError>;

    /// Posts `user` has liked, newest first.
    async fn fetch_liked_posts(&self, user: &UserId) -> Result<Vec<PostSummary>, RemoteError>;

    async fn submit_comment(
        &self,
        post: &PostId,
        content: &str,
    ) -> Result<MutationResult, RemoteError>;

    async fn delete_comment(&self, comment: &CommentId) -> Result<MutationResult, RemoteError>;

    async fn delete_post(&self, post: &PostId) -> Result<MutationResult, RemoteError>;

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<MutationResult, RemoteError>;

    async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>, RemoteError>;
}

pub type SharedBackend = Arc<dyn SocialBackend>;

/// Collapse a mutation response into `None` on success or the failure reason.
pub(crate) fn failure_reason(result: Result<MutationResult, RemoteError>) -> Option<String> {
    match result {
        Ok(MutationResult { success: true, .. }) => None,
        Ok(MutationResult { error, .. }) => {
            Some(error.unwrap_or_else(|| "request was not applied".to_string()))
        }
        Err(e) => Some(e.to_string()),
    }
}
