//! Optimistic like/follow toggling.
//!
//! A toggle flips the local flag and moves the counter by one immediately,
//! then asks the server to flip the relationship. On failure the view is
//! reset to the snapshot taken before the toggle; on success the optimistic
//! value stands and becomes the new baseline. At most one toggle per entity is
//! in flight; attempts made meanwhile are dropped, not queued.

use std::sync::{Mutex, MutexGuard, PoisonError};

use socialsync_common::{PostSummary, ToggleTarget, UserId};

use crate::notify::{Notice, SharedNotifier};
use crate::remote::{SharedBackend, failure_reason};
use crate::session::Viewer;

/// The visible flag and counter of one toggleable relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleSnapshot {
    pub active: bool,
    pub count: u64,
}

impl ToggleSnapshot {
    pub fn new(active: bool, count: u64) -> Self {
        Self { active, count }
    }

    /// Flip the flag and move the counter with it. The counter never goes
    /// below zero even if the payload it came from was inconsistent.
    pub fn flipped(self) -> Self {
        if self.active {
            Self {
                active: false,
                count: self.count.saturating_sub(1),
            }
        } else {
            Self {
                active: true,
                count: self.count.saturating_add(1),
            }
        }
    }
}

/// View state for one toggle: the last confirmed snapshot, what is shown, and
/// the in-flight latch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleState {
    baseline: ToggleSnapshot,
    current: ToggleSnapshot,
    in_flight: bool,
}

impl ToggleState {
    pub fn new(initial: ToggleSnapshot) -> Self {
        Self {
            baseline: initial,
            current: initial,
            in_flight: false,
        }
    }

    pub fn current(&self) -> ToggleSnapshot {
        self.current
    }

    pub fn baseline(&self) -> ToggleSnapshot {
        self.baseline
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Apply the optimistic flip and latch. Returns `None` without touching
    /// anything while a toggle is already outstanding.
    pub fn begin(&mut self) -> Option<ToggleSnapshot> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        self.current = self.baseline.flipped();
        Some(self.current)
    }

    /// The server accepted the toggle; the optimistic value is now confirmed.
    pub fn confirm(&mut self) -> ToggleSnapshot {
        self.in_flight = false;
        self.baseline = self.current;
        self.current
    }

    /// The server call failed; show the pre-toggle snapshot again.
    pub fn reject(&mut self) -> ToggleSnapshot {
        self.in_flight = false;
        self.current = self.baseline;
        self.current
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Confirmed(ToggleSnapshot),
    RolledBack(ToggleSnapshot),
    /// Another toggle for the same entity was still in flight.
    Ignored,
    /// No signed-in viewer; a sign-in prompt was raised instead.
    SignInRequired,
}

/// Drives one entity's toggle against the remote API.
pub struct ToggleController {
    target: ToggleTarget,
    viewer: Viewer,
    backend: SharedBackend,
    notifier: SharedNotifier,
    state: Mutex<ToggleState>,
}

impl ToggleController {
    pub fn new(
        target: ToggleTarget,
        initial: ToggleSnapshot,
        viewer: Viewer,
        backend: SharedBackend,
        notifier: SharedNotifier,
    ) -> Self {
        Self {
            target,
            viewer,
            backend,
            notifier,
            state: Mutex::new(ToggleState::new(initial)),
        }
    }

    /// Like button for a post as rendered from a feed payload.
    pub fn for_post(
        post: &PostSummary,
        viewer: Viewer,
        backend: SharedBackend,
        notifier: SharedNotifier,
    ) -> Self {
        Self::new(
            ToggleTarget::Like(post.id.clone()),
            ToggleSnapshot::new(post.liked_by_viewer, post.like_count),
            viewer,
            backend,
            notifier,
        )
    }

    /// Follow button for a profile; `count` is the profile's follower count.
    pub fn for_user(
        user: UserId,
        following: bool,
        count: u64,
        viewer: Viewer,
        backend: SharedBackend,
        notifier: SharedNotifier,
    ) -> Self {
        Self::new(
            ToggleTarget::Follow(user),
            ToggleSnapshot::new(following, count),
            viewer,
            backend,
            notifier,
        )
    }

    fn state(&self) -> MutexGuard<'_, ToggleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn target(&self) -> &ToggleTarget {
        &self.target
    }

    pub fn snapshot(&self) -> ToggleSnapshot {
        self.state().current()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state().is_in_flight()
    }

    fn failure_message(&self) -> &'static str {
        match self.target {
            ToggleTarget::Like(_) => "Failed to update like",
            ToggleTarget::Follow(_) => "Failed to update follow status",
        }
    }

    pub async fn toggle(&self) -> ToggleOutcome {
        if !self.viewer.is_signed_in() {
            self.notifier.notify(Notice::SignInPrompt);
            return ToggleOutcome::SignInRequired;
        }

        let Some(optimistic) = self.state().begin() else {
            tracing::debug!(entity = %self.target, "toggle already in flight; ignoring");
            return ToggleOutcome::Ignored;
        };
        tracing::debug!(
            entity = %self.target,
            active = optimistic.active,
            count = optimistic.count,
            "optimistic toggle applied"
        );

        let result = self.backend.toggle_relationship(&self.target).await;

        match failure_reason(result) {
            None => ToggleOutcome::Confirmed(self.state().confirm()),
            Some(reason) => {
                let restored = self.state().reject();
                tracing::warn!(entity = %self.target, %reason, "toggle failed; rolled back");
                self.notifier.notify(Notice::error(self.failure_message()));
                ToggleOutcome::RolledBack(restored)
            }
        }
    }
}
