//! On-demand relation lists: followers, following and "liked by".
//!
//! A list is fetched only when its view opens, exactly once per opening, and
//! thrown away when the view closes. Opening an open list does nothing. Fetch failures leave the list empty and
//! are logged; they are never shown to the user.
//!
//! ```text
//! Closed --open--> Loading --ok(items)--> Populated
//!                          --ok([])-----> Empty
//!                          --err--------> ErroredEmpty
//! any --close--> Closed
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use socialsync_common::{RelationKind, UserId, UserSummary};

use crate::remote::SharedBackend;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RelationListState {
    #[default]
    Closed,
    Loading,
    Populated(Vec<UserSummary>),
    Empty,
    /// The fetch failed; rendered like `Empty`.
    ErroredEmpty,
}

/// One row of a rendered relation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationItem {
    pub id: UserId,
    pub display_name: String,
    pub handle: String,
    pub avatar: String,
    pub href: String,
}

impl From<&UserSummary> for RelationItem {
    fn from(user: &UserSummary) -> Self {
        Self {
            id: user.id.clone(),
            display_name: user.display_name().to_string(),
            handle: user.handle(),
            avatar: user.avatar_ref().to_string(),
            href: user.profile_href(),
        }
    }
}

/// What the list view should draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationPanel {
    Hidden,
    Placeholder,
    EmptyMessage(&'static str),
    Items(Vec<RelationItem>),
}

pub fn empty_message(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Followers => "No followers found.",
        RelationKind::Following => "No following users found.",
        RelationKind::Likers => "No likes yet.",
    }
}

/// Summary line shown under a post, e.g. "Ada and Bob liked this post".
pub fn liked_by_text(users: &[UserSummary]) -> Option<String> {
    match users {
        [] => None,
        [only] => Some(format!("{} liked this post", only.display_name())),
        [first, second] => Some(format!(
            "{} and {} liked this post",
            first.display_name(),
            second.display_name()
        )),
        [first, second, rest @ ..] => Some(format!(
            "{}, {} and {} others liked this post..",
            first.display_name(),
            second.display_name(),
            rest.len()
        )),
    }
}

#[derive(Debug, Default)]
struct LoaderInner {
    state: RelationListState,
    /// Bumped on every open and close; a fetch only lands if it still matches.
    generation: u64,
}

pub struct RelationLoader {
    kind: RelationKind,
    owner: String,
    exclude: Option<UserId>,
    backend: SharedBackend,
    inner: Mutex<LoaderInner>,
}

impl RelationLoader {
    pub fn new(kind: RelationKind, owner: impl Into<String>, backend: SharedBackend) -> Self {
        Self {
            kind,
            owner: owner.into(),
            exclude: None,
            backend,
            inner: Mutex::new(LoaderInner::default()),
        }
    }

    /// Drop `viewer` from fetched lists. Used for "liked by", where the
    /// viewer's own like is already visible on the button.
    pub fn excluding(mut self, viewer: Option<UserId>) -> Self {
        self.exclude = viewer;
        self
    }

    fn inner(&self) -> MutexGuard<'_, LoaderInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn state(&self) -> RelationListState {
        self.inner().state.clone()
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.inner().state, RelationListState::Closed)
    }

    /// Show the list and fetch it. A list that is already open is left as it
    /// is; close it first to refetch.
    pub async fn open(&self) -> RelationListState {
        let generation = {
            let mut inner = self.inner();
            if inner.state != RelationListState::Closed {
                return inner.state.clone();
            }
            inner.generation += 1;
            inner.state = RelationListState::Loading;
            inner.generation
        };

        let next = match self.backend.fetch_relation(self.kind, &self.owner).await {
            Ok(mut users) => {
                if let Some(viewer) = &self.exclude {
                    users.retain(|u| &u.id != viewer);
                }
                if users.is_empty() {
                    RelationListState::Empty
                } else {
                    RelationListState::Populated(users)
                }
            }
            Err(e) => {
                tracing::warn!(
                    kind = %self.kind,
                    owner = %self.owner,
                    error = %e,
                    "failed to load relation list"
                );
                RelationListState::ErroredEmpty
            }
        };

        let mut inner = self.inner();
        if inner.generation != generation {
            tracing::debug!(kind = %self.kind, owner = %self.owner, "discarding stale relation list");
            return inner.state.clone();
        }
        inner.state = next;
        inner.state.clone()
    }

    /// Hide the list and discard what was loaded. A fetch still in flight
    /// will not repopulate it.
    pub fn close(&self) {
        let mut inner = self.inner();
        inner.generation += 1;
        inner.state = RelationListState::Closed;
    }

    pub fn users(&self) -> Vec<UserSummary> {
        match &self.inner().state {
            RelationListState::Populated(users) => users.clone(),
            _ => Vec::new(),
        }
    }

    pub fn panel(&self) -> RelationPanel {
        match &self.inner().state {
            RelationListState::Closed => RelationPanel::Hidden,
            RelationListState::Loading => RelationPanel::Placeholder,
            RelationListState::Empty | RelationListState::ErroredEmpty => {
                RelationPanel::EmptyMessage(empty_message(self.kind))
            }
            RelationListState::Populated(users) => {
                RelationPanel::Items(users.iter().map(RelationItem::from).collect())
            }
        }
    }

    pub fn liked_by_text(&self) -> Option<String> {
        liked_by_text(&self.users())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use socialsync_common::EdgeKind;

    use crate::remote::{InMemoryBackend, Operation};

    fn user(id: &str, name: &str) -> UserSummary {
        UserSummary::new(id, name.to_lowercase()).with_name(name)
    }

    fn backend() -> InMemoryBackend {
        let backend = InMemoryBackend::new();
        backend.add_user(user("a", "Ann"));
        backend.add_user(user("b", "Ben"));
        backend.add_user(user("c", "Cat"));
        backend.add_user(user("owner", "Olive"));
        backend.add_post("p1", "owner");
        backend
    }

    #[test]
    fn liked_by_text_rules() {
        let a = user("a", "Ann");
        let b = user("b", "Ben");
        let c = user("c", "Cat");
        let d = user("d", "Dee");
        assert_eq!(liked_by_text(&[]), None);
        assert_eq!(
            liked_by_text(std::slice::from_ref(&a)).as_deref(),
            Some("Ann liked this post")
        );
        assert_eq!(
            liked_by_text(&[a.clone(), b.clone()]).as_deref(),
            Some("Ann and Ben liked this post")
        );
        assert_eq!(
            liked_by_text(&[a.clone(), b.clone(), c.clone()]).as_deref(),
            Some("Ann, Ben and 1 others liked this post..")
        );
        assert_eq!(
            liked_by_text(&[a, b, c, d]).as_deref(),
            Some("Ann, Ben and 2 others liked this post..")
        );
    }

    #[test]
    fn liked_by_text_falls_back_to_username() {
        let nameless = UserSummary::new("z", "zed");
        assert_eq!(
            liked_by_text(&[nameless]).as_deref(),
            Some("zed liked this post")
        );
    }

    #[tokio::test]
    async fn each_open_fetches_once() {
        let backend = backend();
        backend.seed_edge("a", "owner", EdgeKind::Follows);
        let loader = RelationLoader::new(RelationKind::Followers, "owner", Arc::new(backend.clone()));

        assert_eq!(loader.panel(), RelationPanel::Hidden);
        assert_eq!(backend.calls(Operation::FetchRelation), 0);

        loader.open().await;
        assert_eq!(backend.calls(Operation::FetchRelation), 1);
        assert_eq!(loader.users().len(), 1);

        loader.close();
        assert_eq!(loader.state(), RelationListState::Closed);
        assert!(loader.users().is_empty());

        backend.seed_edge("b", "owner", EdgeKind::Follows);
        loader.open().await;
        assert_eq!(backend.calls(Operation::FetchRelation), 2);
        assert_eq!(loader.users().len(), 2);
    }

    #[tokio::test]
    async fn opening_an_open_list_does_not_refetch() {
        let backend = backend();
        backend.seed_edge("a", "owner", EdgeKind::Follows);
        let loader = RelationLoader::new(RelationKind::Followers, "owner", Arc::new(backend.clone()));

        loader.open().await;
        backend.seed_edge("b", "owner", EdgeKind::Follows);
        let again = loader.open().await;

        assert_eq!(backend.calls(Operation::FetchRelation), 1);
        assert!(matches!(again, RelationListState::Populated(ref users) if users.len() == 1));
    }

    #[tokio::test]
    async fn open_while_loading_shares_the_pending_fetch() {
        let backend = backend();
        let loader = Arc::new(RelationLoader::new(
            RelationKind::Followers,
            "owner",
            Arc::new(backend.clone()),
        ));

        backend.pause();
        let pending = tokio::spawn({
            let loader = Arc::clone(&loader);
            async move { loader.open().await }
        });
        while backend.calls(Operation::FetchRelation) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(loader.open().await, RelationListState::Loading);

        backend.resume();
        assert_eq!(pending.await.unwrap(), RelationListState::Empty);
        assert_eq!(backend.calls(Operation::FetchRelation), 1);
    }

    #[tokio::test]
    async fn slow_fetch_after_close_is_discarded() {
        let backend = backend();
        backend.seed_edge("a", "owner", EdgeKind::Follows);
        let slow = backend.clone().with_latency(Duration::from_millis(50));
        let loader = Arc::new(RelationLoader::new(
            RelationKind::Followers,
            "owner",
            Arc::new(slow),
        ));

        let pending = tokio::spawn({
            let loader = Arc::clone(&loader);
            async move { loader.open().await }
        });
        while backend.calls(Operation::FetchRelation) == 0 {
            tokio::task::yield_now().await;
        }
        loader.close();

        assert_eq!(pending.await.unwrap(), RelationListState::Closed);
        assert!(loader.users().is_empty());
        assert_eq!(loader.panel(), RelationPanel::Hidden);
    }

    #[tokio::test]
    async fn empty_list_renders_empty_message() {
        let backend = backend();
        let loader = RelationLoader::new(RelationKind::Following, "owner", Arc::new(backend));

        assert_eq!(loader.open().await, RelationListState::Empty);
        assert_eq!(
            loader.panel(),
            RelationPanel::EmptyMessage("No following users found.")
        );
    }

    #[tokio::test]
    async fn fetch_failure_is_errored_empty() {
        let backend = backend();
        backend.seed_edge("a", "owner", EdgeKind::Follows);
        backend.fail_next(1);
        let loader = RelationLoader::new(RelationKind::Followers, "owner", Arc::new(backend));

        assert_eq!(loader.open().await, RelationListState::ErroredEmpty);
        assert_eq!(loader.panel(), RelationPanel::EmptyMessage("No followers found."));

        // Re-opening is the retry.
        loader.close();
        assert!(matches!(loader.open().await, RelationListState::Populated(_)));
    }

    #[tokio::test]
    async fn likers_exclude_viewer() {
        let backend = backend();
        backend.seed_edge("a", "p1", EdgeKind::Likes);
        backend.seed_edge("b", "p1", EdgeKind::Likes);
        backend.seed_edge("c", "p1", EdgeKind::Likes);
        let loader = RelationLoader::new(RelationKind::Likers, "p1", Arc::new(backend))
            .excluding(Some(UserId::new("b")));

        loader.open().await;
        let ids: Vec<String> = loader.users().iter().map(|u| u.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(
            loader.liked_by_text().as_deref(),
            Some("Ann and Cat liked this post")
        );
    }

    #[tokio::test]
    async fn only_viewer_liked_is_empty() {
        let backend = backend();
        backend.seed_edge("b", "p1", EdgeKind::Likes);
        let loader = RelationLoader::new(RelationKind::Likers, "p1", Arc::new(backend))
            .excluding(Some(UserId::new("b")));

        assert_eq!(loader.open().await, RelationListState::Empty);
        assert_eq!(loader.liked_by_text(), None);
    }

    #[tokio::test]
    async fn populated_items_link_to_profiles() {
        let backend = backend();
        backend.add_user(UserSummary::new("n", "nameless"));
        backend.seed_edge("owner", "n", EdgeKind::Follows);
        let loader = RelationLoader::new(RelationKind::Following, "owner", Arc::new(backend));

        loader.open().await;
        assert_eq!(
            loader.panel(),
            RelationPanel::Items(vec![RelationItem {
                id: UserId::new("n"),
                display_name: "nameless".to_string(),
                handle: "@nameless".to_string(),
                avatar: "/avatar.png".to_string(),
                href: "/profile/nameless".to_string(),
            }])
        );
    }

    #[tokio::test]
    async fn loading_shows_placeholder_and_close_discards_late_result() {
        let backend = backend();
        backend.seed_edge("a", "owner", EdgeKind::Follows);
        let loader = Arc::new(RelationLoader::new(
            RelationKind::Followers,
            "owner",
            Arc::new(backend.clone()),
        ));

        backend.pause();
        let pending = tokio::spawn({
            let loader = Arc::clone(&loader);
            async move { loader.open().await }
        });
        while backend.calls(Operation::FetchRelation) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(loader.panel(), RelationPanel::Placeholder);

        loader.close();
        backend.resume();
        assert_eq!(pending.await.unwrap(), RelationListState::Closed);
        assert_eq!(loader.state(), RelationListState::Closed);
    }
}
