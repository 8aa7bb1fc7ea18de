//! Profile page: follow button, followers/following lists, the edit form and
//! the Posts/Likes tabs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use socialsync_common::{ProfileUpdate, RelationKind, UserId, UserProfile};

use crate::client::Client;
use crate::notify::Notice;
use crate::posts::PostCard;
use crate::relations::RelationLoader;
use crate::remote::failure_reason;
use crate::toggle::{ToggleController, ToggleOutcome};

/// The single action button under a profile header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowAction {
    /// Nobody is signed in; pressing it opens the sign-in prompt.
    SignIn,
    EditProfile,
    Follow,
    Unfollow,
}

impl FollowAction {
    pub fn label(&self) -> &'static str {
        match self {
            FollowAction::SignIn | FollowAction::Follow => "Follow",
            FollowAction::EditProfile => "Edit Profile",
            FollowAction::Unfollow => "Unfollow",
        }
    }
}

/// `https://` is assumed when the stored website has no scheme.
pub fn website_href(website: &str) -> String {
    if website.starts_with("http") {
        website.to_string()
    } else {
        format!("https://{}", website)
    }
}

pub fn joined_label(created_at: DateTime<Utc>) -> String {
    format!("Joined {}", created_at.format("%B %Y"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed,
    SignInRequired,
}

#[derive(Debug, Default)]
struct FormInner {
    fields: ProfileUpdate,
    open: bool,
}

/// The "Edit Profile" dialog.
pub struct EditProfileForm {
    client: Client,
    inner: Mutex<FormInner>,
}

impl EditProfileForm {
    pub fn new(client: Client, profile: &UserProfile) -> Self {
        let fields = ProfileUpdate {
            name: profile.user.name.clone().unwrap_or_default(),
            bio: profile.bio.clone().unwrap_or_default(),
            location: profile.location.clone().unwrap_or_default(),
            website: profile.website.clone().unwrap_or_default(),
        };
        Self {
            client,
            inner: Mutex::new(FormInner {
                fields,
                open: false,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, FormInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open(&self) {
        self.inner().open = true;
    }

    pub fn cancel(&self) {
        self.inner().open = false;
    }

    pub fn is_open(&self) -> bool {
        self.inner().open
    }

    pub fn fields(&self) -> ProfileUpdate {
        self.inner().fields.clone()
    }

    pub fn edit(&self, f: impl FnOnce(&mut ProfileUpdate)) {
        f(&mut self.inner().fields);
    }

    pub async fn submit(&self) -> SaveOutcome {
        if !self.client.viewer.is_signed_in() {
            self.client.notify(Notice::SignInPrompt);
            return SaveOutcome::SignInRequired;
        }
        let fields = self.fields();

        match failure_reason(self.client.backend.update_profile(&fields).await) {
            None => {
                self.inner().open = false;
                self.client.notify(Notice::success("Profile updated successfully"));
                SaveOutcome::Saved
            }
            Some(reason) => {
                tracing::warn!(%reason, "failed to update profile");
                self.client.notify(Notice::error("Failed to update profile"));
                SaveOutcome::Failed
            }
        }
    }
}

/// The post lists under a profile header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileTab {
    #[default]
    Posts,
    Likes,
}

impl ProfileTab {
    pub fn label(&self) -> &'static str {
        match self {
            ProfileTab::Posts => "Posts",
            ProfileTab::Likes => "Likes",
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            ProfileTab::Posts => "No posts yet",
            ProfileTab::Likes => "No liked posts to show",
        }
    }
}

/// Same lifecycle as a relation list: fetched on open, dropped on close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabState {
    #[default]
    Closed,
    Loading,
    Populated,
    Empty,
    ErroredEmpty,
}

pub enum TabPanel {
    Hidden,
    Placeholder,
    EmptyMessage(&'static str),
    Posts(Vec<Arc<PostCard>>),
}

#[derive(Default)]
struct TabInner {
    state: TabState,
    cards: Vec<Arc<PostCard>>,
    generation: u64,
}

/// Lazily loaded posts for one profile tab.
pub struct PostTabLoader {
    tab: ProfileTab,
    owner: UserId,
    client: Client,
    inner: Mutex<TabInner>,
}

impl PostTabLoader {
    pub fn new(client: Client, tab: ProfileTab, owner: UserId) -> Self {
        Self {
            tab,
            owner,
            client,
            inner: Mutex::new(TabInner::default()),
        }
    }

    fn inner(&self) -> MutexGuard<'_, TabInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn tab(&self) -> ProfileTab {
        self.tab
    }

    pub fn state(&self) -> TabState {
        self.inner().state
    }

    pub fn cards(&self) -> Vec<Arc<PostCard>> {
        self.inner().cards.clone()
    }

    /// Fetch the tab's posts unless it is already open.
    pub async fn open(&self) -> TabState {
        let generation = {
            let mut inner = self.inner();
            if inner.state != TabState::Closed {
                return inner.state;
            }
            inner.generation += 1;
            inner.state = TabState::Loading;
            inner.generation
        };

        let backend = &self.client.backend;
        let result = match self.tab {
            ProfileTab::Posts => backend.fetch_user_posts(&self.owner).await,
            ProfileTab::Likes => backend.fetch_liked_posts(&self.owner).await,
        };

        let (state, cards) = match result {
            Ok(posts) if posts.is_empty() => (TabState::Empty, Vec::new()),
            Ok(posts) => (
                TabState::Populated,
                posts
                    .into_iter()
                    .map(|post| Arc::new(PostCard::new(self.client.clone(), post)))
                    .collect(),
            ),
            Err(e) => {
                tracing::warn!(
                    tab = self.tab.label(),
                    owner = %self.owner,
                    error = %e,
                    "failed to load profile posts"
                );
                (TabState::ErroredEmpty, Vec::new())
            }
        };

        let mut inner = self.inner();
        if inner.generation != generation {
            return inner.state;
        }
        inner.state = state;
        inner.cards = cards;
        state
    }

    pub fn close(&self) {
        let mut inner = self.inner();
        inner.generation += 1;
        inner.state = TabState::Closed;
        inner.cards.clear();
    }

    pub fn panel(&self) -> TabPanel {
        let inner = self.inner();
        match inner.state {
            TabState::Closed => TabPanel::Hidden,
            TabState::Loading => TabPanel::Placeholder,
            TabState::Empty | TabState::ErroredEmpty => {
                TabPanel::EmptyMessage(self.tab.empty_message())
            }
            TabState::Populated => TabPanel::Posts(inner.cards.clone()),
        }
    }
}

pub struct ProfilePage {
    profile: UserProfile,
    client: Client,
    follow: ToggleController,
    followers: RelationLoader,
    following: RelationLoader,
    edit: EditProfileForm,
    posts: PostTabLoader,
    likes: PostTabLoader,
    active_tab: Mutex<ProfileTab>,
}

impl ProfilePage {
    /// `is_following` is whether the viewer follows this profile, as rendered
    /// by the server.
    pub fn new(client: Client, profile: UserProfile, is_following: bool) -> Self {
        let follow = client.follow_toggle(&profile, is_following);
        let owner = profile.user.id.as_str();
        let followers = client.relation_loader(RelationKind::Followers, owner);
        let following = client.relation_loader(RelationKind::Following, owner);
        let edit = EditProfileForm::new(client.clone(), &profile);
        let posts = PostTabLoader::new(client.clone(), ProfileTab::Posts, profile.user.id.clone());
        let likes = PostTabLoader::new(client.clone(), ProfileTab::Likes, profile.user.id.clone());
        Self {
            profile,
            client,
            follow,
            followers,
            following,
            edit,
            posts,
            likes,
            active_tab: Mutex::new(ProfileTab::default()),
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn is_own_profile(&self) -> bool {
        self.client.viewer.is_self(&self.profile.user)
    }

    pub fn action(&self) -> FollowAction {
        if !self.client.viewer.is_signed_in() {
            FollowAction::SignIn
        } else if self.is_own_profile() {
            FollowAction::EditProfile
        } else if self.follow.snapshot().active {
            FollowAction::Unfollow
        } else {
            FollowAction::Follow
        }
    }

    /// Whether the follow button is disabled.
    pub fn follow_pending(&self) -> bool {
        self.follow.is_in_flight()
    }

    pub fn follower_count(&self) -> u64 {
        self.follow.snapshot().count
    }

    pub async fn toggle_follow(&self) -> ToggleOutcome {
        self.follow.toggle().await
    }

    pub fn followers(&self) -> &RelationLoader {
        &self.followers
    }

    pub fn following(&self) -> &RelationLoader {
        &self.following
    }

    pub fn edit_form(&self) -> &EditProfileForm {
        &self.edit
    }

    pub fn tab(&self, tab: ProfileTab) -> &PostTabLoader {
        match tab {
            ProfileTab::Posts => &self.posts,
            ProfileTab::Likes => &self.likes,
        }
    }

    pub fn active_tab(&self) -> ProfileTab {
        *self.active_tab.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch tabs, loading the tab's posts the first time it is shown.
    pub async fn select_tab(&self, tab: ProfileTab) -> TabState {
        *self.active_tab.lock().unwrap_or_else(PoisonError::into_inner) = tab;
        self.tab(tab).open().await
    }

    pub fn website_href(&self) -> Option<String> {
        self.profile
            .website
            .as_deref()
            .filter(|w| !w.is_empty())
            .map(website_href)
    }

    pub fn joined_label(&self) -> String {
        joined_label(self.profile.created_at)
    }
}
