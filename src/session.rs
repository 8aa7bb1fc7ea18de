//! The viewer on whose behalf interactions happen.

use socialsync_common::{UserId, UserSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInViewer {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
}

/// Authentication is handled elsewhere; the client only needs to know whether
/// someone is signed in and who.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Viewer {
    #[default]
    Anonymous,
    SignedIn(SignedInViewer),
}

impl Viewer {
    pub fn signed_in(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Viewer::SignedIn(SignedInViewer {
            id: id.into(),
            username: username.into(),
            email: None,
        })
    }

    pub fn with_email(self, email: impl Into<String>) -> Self {
        match self {
            Viewer::SignedIn(mut v) => {
                v.email = Some(email.into());
                Viewer::SignedIn(v)
            }
            Viewer::Anonymous => Viewer::Anonymous,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Viewer::SignedIn(_))
    }

    pub fn id(&self) -> Option<&UserId> {
        match self {
            Viewer::SignedIn(v) => Some(&v.id),
            Viewer::Anonymous => None,
        }
    }

    /// True when `user` is the viewer, either by id or by id-less identity
    /// (username, or the local part of the sign-in email).
    pub fn is_self(&self, user: &UserSummary) -> bool {
        let Viewer::SignedIn(v) = self else {
            return false;
        };
        if v.id == user.id || v.username == user.username {
            return true;
        }
        v.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .is_some_and(|local| !local.is_empty() && local == user.username)
    }

    pub fn owns(&self, author: &UserId) -> bool {
        self.id() == Some(author)
    }
}
