//! The handle every view is built from: who is looking, how to reach the
//! server, and where notices go.

use std::sync::Arc;

use socialsync_common::{PostId, PostSummary, RelationKind, UserProfile};

use crate::notify::{LogNotifier, Notice, SharedNotifier};
use crate::relations::RelationLoader;
use crate::remote::SharedBackend;
use crate::session::Viewer;
use crate::toggle::ToggleController;

#[derive(Clone)]
pub struct Client {
    pub viewer: Viewer,
    pub backend: SharedBackend,
    pub notifier: SharedNotifier,
}

/// Result of a delete action on a comment or post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Failed,
    /// Only the author may delete; nothing was sent.
    NotAuthor,
    /// A delete for the same item is still in flight.
    Busy,
    SignInRequired,
}

impl Client {
    pub fn new(viewer: Viewer, backend: SharedBackend, notifier: SharedNotifier) -> Self {
        Self {
            viewer,
            backend,
            notifier,
        }
    }

    /// A client with no host to show notices; they go to the log instead.
    pub fn headless(viewer: Viewer, backend: SharedBackend) -> Self {
        Self::new(viewer, backend, Arc::new(LogNotifier))
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    pub fn like_toggle(&self, post: &PostSummary) -> ToggleController {
        ToggleController::for_post(
            post,
            self.viewer.clone(),
            self.backend.clone(),
            self.notifier.clone(),
        )
    }

    pub fn follow_toggle(&self, profile: &UserProfile, following: bool) -> ToggleController {
        ToggleController::for_user(
            profile.user.id.clone(),
            following,
            profile.counts.followers,
            self.viewer.clone(),
            self.backend.clone(),
            self.notifier.clone(),
        )
    }

    pub fn relation_loader(&self, kind: RelationKind, owner: impl Into<String>) -> RelationLoader {
        RelationLoader::new(kind, owner, self.backend.clone())
    }

    /// "Liked by" list for a post, without the viewer.
    pub fn likers(&self, post: &PostId) -> RelationLoader {
        RelationLoader::new(RelationKind::Likers, post.as_str(), self.backend.clone())
            .excluding(self.viewer.id().cloned())
    }
}
