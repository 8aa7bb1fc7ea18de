//! Writing and deleting comments.

use std::sync::{Mutex, MutexGuard, PoisonError};

use socialsync_common::{Comment, CommentId, PostId};

use crate::client::{Client, DeleteOutcome};
use crate::notify::Notice;
use crate::remote::failure_reason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Posted,
    Failed,
    /// Blank draft; nothing was sent.
    Invalid,
    /// A previous submission has not finished yet.
    Busy,
    SignInRequired,
}

#[derive(Debug, Default)]
struct ComposerInner {
    draft: String,
    submitting: bool,
}

/// The comment box under a post.
pub struct CommentComposer {
    post: PostId,
    client: Client,
    inner: Mutex<ComposerInner>,
}

impl CommentComposer {
    pub fn new(client: Client, post: PostId) -> Self {
        Self {
            post,
            client,
            inner: Mutex::new(ComposerInner::default()),
        }
    }

    fn inner(&self) -> MutexGuard<'_, ComposerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.inner().draft = text.into();
    }

    pub fn draft(&self) -> String {
        self.inner().draft.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.inner().submitting
    }

    /// Whether the submit button is enabled.
    pub fn can_submit(&self) -> bool {
        let inner = self.inner();
        !inner.submitting && !inner.draft.trim().is_empty()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_submitting() {
            "Posting..."
        } else {
            "Comment"
        }
    }

    pub async fn submit(&self) -> SubmitOutcome {
        if !self.client.viewer.is_signed_in() {
            self.client.notify(Notice::SignInPrompt);
            return SubmitOutcome::SignInRequired;
        }

        let content = {
            let mut inner = self.inner();
            if inner.submitting {
                return SubmitOutcome::Busy;
            }
            let content = inner.draft.trim().to_string();
            if content.is_empty() {
                return SubmitOutcome::Invalid;
            }
            inner.submitting = true;
            content
        };

        let result = self.client.backend.submit_comment(&self.post, &content).await;
        let reason = failure_reason(result);

        let mut inner = self.inner();
        inner.submitting = false;
        match reason {
            None => {
                inner.draft.clear();
                drop(inner);
                tracing::info!(post = %self.post, "comment posted");
                self.client.notify(Notice::success("Comment posted successfully"));
                SubmitOutcome::Posted
            }
            Some(reason) => {
                drop(inner);
                tracing::warn!(post = %self.post, %reason, "failed to add comment");
                self.client.notify(Notice::error("Failed to add comment"));
                SubmitOutcome::Failed
            }
        }
    }
}

/// Whether the viewer may see a delete control on this comment.
pub fn can_delete_comment(client: &Client, comment: &Comment) -> bool {
    client.viewer.owns(&comment.author.id)
}

pub async fn delete_comment(client: &Client, comment: &Comment) -> DeleteOutcome {
    if client.viewer.is_signed_in() && !can_delete_comment(client, comment) {
        return DeleteOutcome::NotAuthor;
    }
    delete_comment_by_id(client, &comment.id).await
}

/// Delete by id alone, leaving the authorship check to the server.
pub async fn delete_comment_by_id(client: &Client, id: &CommentId) -> DeleteOutcome {
    if !client.viewer.is_signed_in() {
        client.notify(Notice::SignInPrompt);
        return DeleteOutcome::SignInRequired;
    }

    match failure_reason(client.backend.delete_comment(id).await) {
        None => {
            client.notify(Notice::success("Comment deleted"));
            DeleteOutcome::Deleted
        }
        Some(reason) => {
            tracing::warn!(comment = %id, %reason, "failed to delete comment");
            client.notify(Notice::error("Unable to delete comment"));
            DeleteOutcome::Failed
        }
    }
}
