//! In-process `SocialBackend` backed by plain collections.
//!
//! Behaves like the real API for a single acting user: toggles create or
//! remove edges, relation lists come back in edge insertion order, comments
//! and posts can only be deleted by their authors. Failure injection, a pause
//! gate and per-operation call counters make it usable as a test double.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use socialsync_common::{
    Comment, CommentId, EdgeKind, MutationResult, PostId, PostSummary, ProfileUpdate,
    RelationEdge, RelationKind, ToggleTarget, UserId, UserSummary,
};
use tokio::sync::watch;

use super::SocialBackend;
use crate::errors::RemoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Toggle,
    FetchRelation,
    FetchPosts,
    SubmitComment,
    DeleteComment,
    DeletePost,
    UpdateProfile,
    Search,
}

#[derive(Debug, Clone)]
struct StoredPost {
    author: UserId,
    content: String,
    created_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Debug, Clone)]
struct StoredComment {
    post: PostId,
    author: UserId,
    content: String,
    created_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Debug, Default)]
struct Store {
    users: Vec<UserSummary>,
    profiles: HashMap<UserId, ProfileUpdate>,
    posts: HashMap<PostId, StoredPost>,
    comments: HashMap<CommentId, StoredComment>,
    edges: Vec<RelationEdge>,
    /// Insertion counter; stands in for creation order.
    seq: u64,
    calls: HashMap<Operation, usize>,
    fail_remaining: usize,
    fail_always: bool,
}

impl Store {
    fn user(&self, id: &str) -> Option<&UserSummary> {
        self.users.iter().find(|u| u.id.as_str() == id)
    }

    fn edge_index(&self, source: &str, target: &str, kind: EdgeKind) -> Option<usize> {
        self.edges
            .iter()
            .position(|e| e.kind == kind && e.source == source && e.target == target)
    }

    fn insert_edge(&mut self, source: &str, target: &str, kind: EdgeKind) -> bool {
        if self.edge_index(source, target, kind).is_some() {
            return false;
        }
        self.edges.push(RelationEdge {
            source: source.to_string(),
            target: target.to_string(),
            kind,
            created_at: Utc::now(),
        });
        true
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn author(&self, id: &UserId) -> UserSummary {
        self.user(id.as_str())
            .cloned()
            .unwrap_or_else(|| UserSummary::new(id.clone(), id.as_str()))
    }

    /// The feed payload for one post, as seen by `viewer`.
    fn post_summary(&self, id: &PostId, post: &StoredPost, viewer: Option<&UserId>) -> PostSummary {
        let likes = |e: &&RelationEdge| e.kind == EdgeKind::Likes && e.target == id.as_str();
        let mut comments: Vec<(&CommentId, &StoredComment)> =
            self.comments.iter().filter(|(_, c)| &c.post == id).collect();
        comments.sort_by_key(|(_, c)| c.seq);

        PostSummary {
            id: id.clone(),
            author: self.author(&post.author),
            content: post.content.clone(),
            image: None,
            created_at: post.created_at,
            like_count: self.edges.iter().filter(likes).count() as u64,
            liked_by_viewer: viewer.is_some_and(|v| {
                self.edges
                    .iter()
                    .filter(likes)
                    .any(|e| e.source == v.as_str())
            }),
            comments: comments
                .into_iter()
                .map(|(cid, c)| Comment {
                    id: cid.clone(),
                    author: self.author(&c.author),
                    content: c.content.clone(),
                    created_at: c.created_at,
                })
                .collect(),
        }
    }

    /// Posts matching `keep`, newest first.
    fn post_summaries(
        &self,
        viewer: Option<&UserId>,
        keep: impl Fn(&PostId, &StoredPost) -> bool,
    ) -> Vec<PostSummary> {
        let mut posts: Vec<(&PostId, &StoredPost)> =
            self.posts.iter().filter(|(id, p)| keep(*id, *p)).collect();
        posts.sort_by_key(|(_, p)| std::cmp::Reverse(p.seq));
        posts
            .into_iter()
            .map(|(id, p)| self.post_summary(id, p, viewer))
            .collect()
    }

    fn summaries<'a>(&self, ids: impl Iterator<Item = &'a str>) -> Vec<UserSummary> {
        ids.filter_map(|id| self.user(id).cloned()).collect()
    }
}

/// Shared in-memory social graph. Clones share the same store.
#[derive(Clone)]
pub struct InMemoryBackend {
    acting_as: Option<UserId>,
    store: Arc<Mutex<Store>>,
    latency: Option<Duration>,
    gate: Arc<watch::Sender<bool>>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            acting_as: None,
            store: Arc::new(Mutex::new(Store::default())),
            latency: None,
            gate: Arc::new(gate),
        }
    }

    /// A handle onto the same store that acts on behalf of `user`.
    pub fn acting_as(&self, user: impl Into<UserId>) -> Self {
        Self {
            acting_as: Some(user.into()),
            ..self.clone()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        // A panic while holding the lock only happens inside a failing test.
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_user(&self, user: UserSummary) {
        let mut store = self.store();
        store.users.retain(|u| u.id != user.id);
        store.users.push(user);
    }

    pub fn add_post(&self, post: impl Into<PostId>, author: impl Into<UserId>) {
        self.add_post_with_content(post, author, "");
    }

    /// Posts added later count as newer.
    pub fn add_post_with_content(
        &self,
        post: impl Into<PostId>,
        author: impl Into<UserId>,
        content: impl Into<String>,
    ) {
        let mut store = self.store();
        let seq = store.next_seq();
        store.posts.insert(
            post.into(),
            StoredPost {
                author: author.into(),
                content: content.into(),
                created_at: Utc::now(),
                seq,
            },
        );
    }

    /// Insert an edge directly. Returns false when it already exists.
    pub fn seed_edge(&self, source: &str, target: &str, kind: EdgeKind) -> bool {
        self.store().insert_edge(source, target, kind)
    }

    pub fn edges(&self) -> Vec<RelationEdge> {
        self.store().edges.clone()
    }

    pub fn has_edge(&self, source: &str, target: &str, kind: EdgeKind) -> bool {
        self.store().edge_index(source, target, kind).is_some()
    }

    pub fn comment_ids(&self, post: &PostId) -> Vec<CommentId> {
        let store = self.store();
        let mut ids: Vec<CommentId> = store
            .comments
            .iter()
            .filter(|(_, c)| &c.post == post)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn add_comment(
        &self,
        id: impl Into<CommentId>,
        post: impl Into<PostId>,
        author: impl Into<UserId>,
    ) {
        let mut store = self.store();
        let seq = store.next_seq();
        store.comments.insert(
            id.into(),
            StoredComment {
                post: post.into(),
                author: author.into(),
                content: String::new(),
                created_at: Utc::now(),
                seq,
            },
        );
    }

    pub fn profile(&self, user: &UserId) -> Option<ProfileUpdate> {
        self.store().profiles.get(user).cloned()
    }

    pub fn post_exists(&self, post: &PostId) -> bool {
        self.store().posts.contains_key(post)
    }

    pub fn calls(&self, op: Operation) -> usize {
        self.store().calls.get(&op).copied().unwrap_or(0)
    }

    /// Fail the next `n` calls with `RemoteError::Unavailable`.
    pub fn fail_next(&self, n: usize) {
        self.store().fail_remaining = n;
    }

    pub fn set_failing(&self, failing: bool) {
        self.store().fail_always = failing;
    }

    /// Hold every call after it has been counted until `resume` is called.
    pub fn pause(&self) {
        self.gate.send_replace(true);
    }

    pub fn resume(&self) {
        self.gate.send_replace(false);
    }

    async fn enter(&self, op: Operation) -> Result<(), RemoteError> {
        self.store().calls.entry(op).and_modify(|n| *n += 1).or_insert(1);

        let mut rx = self.gate.subscribe();
        // The sender lives in self, so the channel cannot close here.
        let _ = rx.wait_for(|paused| !*paused).await;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let mut store = self.store();
        if store.fail_always {
            return Err(RemoteError::Unavailable(format!("{:?} failed", op)));
        }
        if store.fail_remaining > 0 {
            store.fail_remaining -= 1;
            return Err(RemoteError::Unavailable(format!("{:?} failed", op)));
        }
        Ok(())
    }

    fn actor(&self) -> Result<&UserId, MutationResult> {
        self.acting_as
            .as_ref()
            .ok_or_else(|| MutationResult::failed("Unauthorized"))
    }
}

#[async_trait]
impl SocialBackend for InMemoryBackend {
    async fn toggle_relationship(
        &self,
        target: &ToggleTarget,
    ) -> Result<MutationResult, RemoteError> {
        self.enter(Operation::Toggle).await?;
        let actor = match self.actor() {
            Ok(actor) => actor.as_str(),
            Err(denied) => return Ok(denied),
        };

        let mut store = self.store();
        match target {
            ToggleTarget::Like(post) if !store.posts.contains_key(post) => {
                return Ok(MutationResult::failed("Post not found"));
            }
            ToggleTarget::Follow(user) if user.as_str() == actor => {
                return Ok(MutationResult::failed("You cannot follow yourself"));
            }
            ToggleTarget::Follow(user) if store.user(user.as_str()).is_none() => {
                return Ok(MutationResult::failed("User not found"));
            }
            _ => {}
        }

        let kind = target.edge_kind();
        match store.edge_index(actor, target.id(), kind) {
            Some(idx) => {
                store.edges.remove(idx);
            }
            None => {
                store.insert_edge(actor, target.id(), kind);
            }
        }
        Ok(MutationResult::ok())
    }

    async fn fetch_relation(
        &self,
        kind: RelationKind,
        owner: &str,
    ) -> Result<Vec<UserSummary>, RemoteError> {
        self.enter(Operation::FetchRelation).await?;
        let store = self.store();
        let users = match kind {
            RelationKind::Followers => store.summaries(
                store
                    .edges
                    .iter()
                    .filter(|e| e.kind == EdgeKind::Follows && e.target == owner)
                    .map(|e| e.source.as_str()),
            ),
            RelationKind::Following => store.summaries(
                store
                    .edges
                    .iter()
                    .filter(|e| e.kind == EdgeKind::Follows && e.source == owner)
                    .map(|e| e.target.as_str()),
            ),
            RelationKind::Likers => store.summaries(
                store
                    .edges
                    .iter()
                    .filter(|e| e.kind == EdgeKind::Likes && e.target == owner)
                    .map(|e| e.source.as_str()),
            ),
        };
        Ok(users)
    }

    async fn submit_comment(
        &self,
        post: &PostId,
        content: &str,
    ) -> Result<MutationResult, RemoteError> {
        self.enter(Operation::SubmitComment).await?;
        let actor = match self.actor() {
            Ok(actor) => actor.clone(),
            Err(denied) => return Ok(denied),
        };
        if content.trim().is_empty() {
            return Ok(MutationResult::failed("Comment cannot be empty"));
        }

        let mut store = self.store();
        if !store.posts.contains_key(post) {
            return Ok(MutationResult::failed("Post not found"));
        }
        let id = CommentId::new(uuid::Uuid::new_v4().to_string());
        let seq = store.next_seq();
        store.comments.insert(
            id,
            StoredComment {
                post: post.clone(),
                author: actor,
                content: content.trim().to_string(),
                created_at: Utc::now(),
                seq,
            },
        );
        Ok(MutationResult::ok())
    }

    async fn delete_comment(&self, comment: &CommentId) -> Result<MutationResult, RemoteError> {
        self.enter(Operation::DeleteComment).await?;
        let actor = match self.actor() {
            Ok(actor) => actor.clone(),
            Err(denied) => return Ok(denied),
        };

        let mut store = self.store();
        let author = store.comments.get(comment).map(|c| c.author.clone());
        match author {
            None => Ok(MutationResult::failed("Comment not found")),
            Some(author) if author != actor => Ok(MutationResult::failed("Unauthorized")),
            Some(_) => {
                store.comments.remove(comment);
                Ok(MutationResult::ok())
            }
        }
    }

    async fn delete_post(&self, post: &PostId) -> Result<MutationResult, RemoteError> {
        self.enter(Operation::DeletePost).await?;
        let actor = match self.actor() {
            Ok(actor) => actor.clone(),
            Err(denied) => return Ok(denied),
        };

        let mut store = self.store();
        let author = store.posts.get(post).map(|p| p.author.clone());
        match author {
            None => Ok(MutationResult::failed("Post not found")),
            Some(author) if author != actor => Ok(MutationResult::failed("Unauthorized")),
            Some(_) => {
                store.posts.remove(post);
                store.comments.retain(|_, c| &c.post != post);
                store
                    .edges
                    .retain(|e| !(e.kind == EdgeKind::Likes && e.target == post.as_str()));
                Ok(MutationResult::ok())
            }
        }
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<MutationResult, RemoteError> {
        self.enter(Operation::UpdateProfile).await?;
        let actor = match self.actor() {
            Ok(actor) => actor.clone(),
            Err(denied) => return Ok(denied),
        };

        let mut store = self.store();
        let name = update.name.trim();
        if let Some(user) = store.users.iter_mut().find(|u| u.id == actor) {
            user.name = (!name.is_empty()).then(|| name.to_string());
        }
        store.profiles.insert(actor, update.clone());
        Ok(MutationResult::ok())
    }

    async fn fetch_user_posts(&self, user: &UserId) -> Result<Vec<PostSummary>, RemoteError> {
        self.enter(Operation::FetchPosts).await?;
        let store = self.store();
        Ok(store.post_summaries(self.acting_as.as_ref(), |_, p| &p.author == user))
    }

    async fn fetch_liked_posts(&self, user: &UserId) -> Result<Vec<PostSummary>, RemoteError> {
        self.enter(Operation::FetchPosts).await?;
        let store = self.store();
        Ok(store.post_summaries(self.acting_as.as_ref(), |id, _| {
            store
                .edge_index(user.as_str(), id.as_str(), EdgeKind::Likes)
                .is_some()
        }))
    }

    async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>, RemoteError> {
        self.enter(Operation::Search).await?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let store = self.store();
        Ok(store
            .users
            .iter()
            .filter(|u| {
                u.username.to_lowercase().contains(&needle)
                    || u
                        .name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}
