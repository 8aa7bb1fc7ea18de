//! A post as shown in a feed: like button, "liked by" line, comments and the
//! author's delete control.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use socialsync_common::{PostId, PostSummary};

use crate::client::{Client, DeleteOutcome};
use crate::comments::CommentComposer;
use crate::notify::Notice;
use crate::relations::RelationLoader;
use crate::remote::failure_reason;
use crate::toggle::{ToggleController, ToggleOutcome, ToggleSnapshot};

pub struct PostCard {
    post: PostSummary,
    client: Client,
    like: ToggleController,
    likers: RelationLoader,
    composer: CommentComposer,
    comments_open: AtomicBool,
    deleting: AtomicBool,
}

impl PostCard {
    pub fn new(client: Client, post: PostSummary) -> Self {
        let like = client.like_toggle(&post);
        let likers = client.likers(&post.id);
        let composer = CommentComposer::new(client.clone(), post.id.clone());
        Self {
            post,
            client,
            like,
            likers,
            composer,
            comments_open: AtomicBool::new(false),
            deleting: AtomicBool::new(false),
        }
    }

    pub fn post(&self) -> &PostSummary {
        &self.post
    }

    pub fn likes(&self) -> ToggleSnapshot {
        self.like.snapshot()
    }

    pub async fn toggle_like(&self) -> ToggleOutcome {
        self.like.toggle().await
    }

    pub fn likers(&self) -> &RelationLoader {
        &self.likers
    }

    /// Load the "liked by" list if the post has any likes at all.
    pub async fn load_likers(&self) {
        if self.post.like_count > 0 {
            self.likers.open().await;
        }
    }

    pub fn liked_by_text(&self) -> Option<String> {
        self.likers.liked_by_text()
    }

    pub fn composer(&self) -> &CommentComposer {
        &self.composer
    }

    pub fn comment_count(&self) -> usize {
        self.post.comments.len()
    }

    /// Show or hide the comment section. Returns the new visibility.
    pub fn toggle_comments(&self) -> bool {
        !self.comments_open.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn comments_open(&self) -> bool {
        self.comments_open.load(Ordering::SeqCst)
    }

    pub fn can_delete(&self) -> bool {
        self.client.viewer.owns(&self.post.author.id)
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.load(Ordering::SeqCst)
    }

    pub async fn delete(&self) -> DeleteOutcome {
        if self.client.viewer.is_signed_in() && !self.can_delete() {
            return DeleteOutcome::NotAuthor;
        }
        if self.deleting.swap(true, Ordering::SeqCst) {
            return DeleteOutcome::Busy;
        }
        let outcome = delete_post(&self.client, &self.post.id).await;
        self.deleting.store(false, Ordering::SeqCst);
        outcome
    }

    pub fn age(&self, now: DateTime<Utc>) -> String {
        format_age(self.post.created_at, now)
    }
}

/// Delete by id alone, leaving the authorship check to the server.
pub async fn delete_post(client: &Client, post: &PostId) -> DeleteOutcome {
    if !client.viewer.is_signed_in() {
        client.notify(Notice::SignInPrompt);
        return DeleteOutcome::SignInRequired;
    }

    match failure_reason(client.backend.delete_post(post).await) {
        None => {
            tracing::info!(%post, "post deleted");
            client.notify(Notice::success("Post deleted successfully"));
            DeleteOutcome::Deleted
        }
        Some(reason) => {
            tracing::warn!(%post, %reason, "failed to delete post");
            client.notify(Notice::error("Failed to delete post"));
            DeleteOutcome::Failed
        }
    }
}

/// Relative age like "5 minutes ago" or "about 3 hours ago".
pub fn format_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const HOUR: i64 = 60;
    const DAY: i64 = 24 * HOUR;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 365 * DAY;

    let secs = (now - created_at).num_seconds().max(0);
    let minutes = (secs + 30) / 60;
    let rounded = |unit: i64| (minutes + unit / 2) / unit;

    let distance = if secs < 30 {
        "less than a minute".to_string()
    } else if minutes < 2 {
        "1 minute".to_string()
    } else if minutes < 45 {
        format!("{} minutes", minutes)
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if minutes < DAY {
        format!("about {} hours", rounded(HOUR))
    } else if minutes < 42 * HOUR {
        "1 day".to_string()
    } else if minutes < MONTH {
        format!("{} days", rounded(DAY))
    } else if minutes < 45 * DAY {
        "about 1 month".to_string()
    } else if minutes < 60 * DAY {
        "about 2 months".to_string()
    } else if minutes < YEAR {
        format!("{} months", rounded(MONTH).min(11))
    } else {
        let years = minutes / YEAR;
        let months_over = (minutes % YEAR) / MONTH;
        if months_over < 3 {
            format!("about {} {}", years, plural(years, "year"))
        } else if months_over < 9 {
            format!("over {} {}", years, plural(years, "year"))
        } else {
            format!("almost {} years", years + 1)
        }
    };
    format!("{} ago", distance)
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        unit.to_string()
    } else {
        format!("{}s", unit)
    }
}
