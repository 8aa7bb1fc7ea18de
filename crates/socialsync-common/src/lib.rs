//! Shared domain types for socialsync.
//!
//! These are the payloads exchanged with the remote social API: user and post
//! summaries, relation edges and the boolean mutation contract. They carry no
//! client state; view state lives in the `socialsync` crate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Avatar shown when a user has not uploaded an image.
pub const DEFAULT_AVATAR: &str = "/avatar.png";

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(
    /// Stable identifier of a user. Opaque to the client.
    UserId
);
opaque_id!(
    /// Stable identifier of a post.
    PostId
);
opaque_id!(CommentId);

/// The minimal projection of a user used in lists, cards and search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl UserSummary {
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            name: None,
            image: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// The name to show for this user: the display name when set and not
    /// blank, otherwise the username.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }

    pub fn handle(&self) -> String {
        format!("@{}", self.username)
    }

    pub fn avatar_ref(&self) -> &str {
        self.image.as_deref().unwrap_or(DEFAULT_AVATAR)
    }

    /// Upper-cased first letter of the display name, used when there is no avatar.
    pub fn initial(&self) -> String {
        self.display_name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    pub fn profile_href(&self) -> String {
        format!("/profile/{}", self.username)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCounts {
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
}

/// A user's full profile as rendered on the profile page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserSummary,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub counts: ProfileCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: UserSummary,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A post as delivered in a feed, including the viewer-relative like flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,
    pub author: UserSummary,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub like_count: u64,
    #[serde(default)]
    pub liked_by_viewer: bool,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Follows,
    Likes,
}

/// A directed relationship record. At most one edge exists per
/// `(source, target, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub created_at: DateTime<Utc>,
}

/// Which list of related users to load for an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Users following the owner (a user).
    Followers,
    /// Users the owner (a user) follows.
    Following,
    /// Users who liked the owner (a post).
    Likers,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Followers => "followers",
            Self::Following => "following",
            Self::Likers => "likers",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Followers => "Followers",
            Self::Following => "Following",
            Self::Likers => "Liked By",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "followers" => Ok(Self::Followers),
            "following" => Ok(Self::Following),
            "likers" | "likes" => Ok(Self::Likers),
            _ => Err(format!("Invalid relation kind: {}", s)),
        }
    }
}

/// The entity a toggle applies to. The server decides whether the toggle
/// creates or removes the edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ToggleTarget {
    Like(PostId),
    Follow(UserId),
}

impl ToggleTarget {
    pub fn id(&self) -> &str {
        match self {
            Self::Like(id) => id.as_str(),
            Self::Follow(id) => id.as_str(),
        }
    }

    pub fn edge_kind(&self) -> EdgeKind {
        match self {
            Self::Like(_) => EdgeKind::Likes,
            Self::Follow(_) => EdgeKind::Follows,
        }
    }
}

impl fmt::Display for ToggleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Like(id) => write!(f, "like:{}", id),
            Self::Follow(id) => write!(f, "follow:{}", id),
        }
    }
}

/// Boolean success contract shared by every remote mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Editable profile fields. Empty strings clear a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub bio: String,
    pub location: String,
    pub website: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_username() {
        let user = UserSummary::new("u1", "ada");
        assert_eq!(user.display_name(), "ada");

        let blank = UserSummary::new("u1", "ada").with_name("   ");
        assert_eq!(blank.display_name(), "ada");

        let named = UserSummary::new("u1", "ada").with_name("Ada Lovelace");
        assert_eq!(named.display_name(), "Ada Lovelace");
    }

    #[test]
    fn avatar_defaults_when_missing() {
        let user = UserSummary::new("u1", "ada");
        assert_eq!(user.avatar_ref(), DEFAULT_AVATAR);
        let user = user.with_image("https://cdn/ada.png");
        assert_eq!(user.avatar_ref(), "https://cdn/ada.png");
    }

    #[test]
    fn handle_initial_and_href() {
        let user = UserSummary::new("u1", "grace").with_name("grace hopper");
        assert_eq!(user.handle(), "@grace");
        assert_eq!(user.initial(), "G");
        assert_eq!(user.profile_href(), "/profile/grace");
    }

    #[test]
    fn relation_kind_parses() {
        assert_eq!("followers".parse::<RelationKind>(), Ok(RelationKind::Followers));
        assert_eq!("likes".parse::<RelationKind>(), Ok(RelationKind::Likers));
        assert!("friends".parse::<RelationKind>().is_err());
    }

    #[test]
    fn toggle_target_serializes_tagged() {
        let target = ToggleTarget::Like(PostId::new("p1"));
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "like", "id": "p1"}));
        assert_eq!(target.edge_kind(), EdgeKind::Likes);
        assert_eq!(target.to_string(), "like:p1");
    }

    #[test]
    fn user_summary_accepts_null_fields() {
        let json = r#"{"id":"u9","username":"zed","name":null,"image":null}"#;
        let user: UserSummary = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, UserId::new("u9"));
        assert_eq!(user.display_name(), "zed");
    }

    #[test]
    fn mutation_result_omits_empty_error() {
        let json = serde_json::to_string(&MutationResult::ok()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
        let failed: MutationResult = serde_json::from_str(r#"{"success":false,"error":"nope"}"#).unwrap();
        assert_eq!(failed, MutationResult::failed("nope"));
    }
}
