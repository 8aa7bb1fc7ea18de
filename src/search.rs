//! Search-as-you-type over users.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use socialsync_common::{UserId, UserSummary};

use crate::remote::SharedBackend;

pub const EMPTY_RESULTS: &str = "Search for more Users";
pub const NO_NAME: &str = "No Name Provided";

/// One row in the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    pub id: UserId,
    pub name: String,
    pub handle: String,
    pub avatar: String,
    /// Shown in place of the avatar while it loads.
    pub initial: String,
    pub href: String,
}

impl From<&UserSummary> for SearchItem {
    fn from(user: &UserSummary) -> Self {
        let name = user
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(NO_NAME);
        Self {
            id: user.id.clone(),
            name: name.to_string(),
            handle: user.handle(),
            avatar: user.avatar_ref().to_string(),
            initial: user.initial(),
            href: user.profile_href(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPanel {
    Placeholder,
    EmptyMessage(&'static str),
    Items(Vec<SearchItem>),
}

#[derive(Debug, Default)]
struct SearchInner {
    query: String,
    results: Vec<UserSummary>,
    loading: bool,
    generation: u64,
}

pub struct UserSearch {
    backend: SharedBackend,
    debounce: Duration,
    inner: Mutex<SearchInner>,
}

impl UserSearch {
    pub fn new(backend: SharedBackend, debounce: Duration) -> Self {
        Self {
            backend,
            debounce,
            inner: Mutex::new(SearchInner::default()),
        }
    }

    fn inner(&self) -> MutexGuard<'_, SearchInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn query(&self) -> String {
        self.inner().query.clone()
    }

    pub fn results(&self) -> Vec<UserSummary> {
        self.inner().results.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner().loading
    }

    /// Record a keystroke. Searches after the debounce unless another
    /// keystroke arrives first.
    pub async fn input(&self, text: &str) {
        let query = text.trim().to_string();
        let generation = {
            let mut inner = self.inner();
            inner.generation += 1;
            inner.query = query.clone();
            if query.is_empty() {
                inner.results.clear();
                inner.loading = false;
                return;
            }
            inner.generation
        };

        tokio::time::sleep(self.debounce).await;
        if self.inner().generation != generation {
            tracing::trace!(%query, "search input superseded");
            return;
        }
        self.run(generation, &query).await;
    }

    /// Search the current query now, skipping the debounce.
    pub async fn submit(&self) {
        let (generation, query) = {
            let mut inner = self.inner();
            inner.generation += 1;
            if inner.query.is_empty() {
                inner.results.clear();
                inner.loading = false;
                return;
            }
            (inner.generation, inner.query.clone())
        };
        self.run(generation, &query).await;
    }

    /// Replace the query and search it immediately.
    pub async fn submit_query(&self, text: &str) {
        self.inner().query = text.trim().to_string();
        self.submit().await;
    }

    async fn run(&self, generation: u64, query: &str) {
        self.inner().loading = true;
        let result = self.backend.search_users(query).await;

        let mut inner = self.inner();
        if inner.generation != generation {
            return;
        }
        inner.loading = false;
        match result {
            Ok(users) => {
                tracing::debug!(%query, hits = users.len(), "search finished");
                inner.results = users;
            }
            Err(e) => {
                tracing::warn!(%query, error = %e, "user search failed");
            }
        }
    }

    pub fn panel(&self) -> SearchPanel {
        let inner = self.inner();
        if inner.loading {
            SearchPanel::Placeholder
        } else if inner.results.is_empty() {
            SearchPanel::EmptyMessage(EMPTY_RESULTS)
        } else {
            SearchPanel::Items(inner.results.iter().map(SearchItem::from).collect())
        }
    }
}
