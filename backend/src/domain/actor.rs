//! Actor identity resolved by the excluded transport layer.
//!
//! Authentication (token validation, session cookies, OAuth exchange) happens
//! before this crate is invoked; operations receive either an anonymous
//! reader or a resolved identity with its admin flag.

use crate::domain::UserId;

/// Identity of the caller as resolved by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// No identity was presented. Read-only surfaces may still be served.
    Anonymous,
    /// A resolved, authenticated user.
    User(CurrentUser),
}

impl Actor {
    /// Build an authenticated actor for a regular user.
    pub fn user(id: UserId) -> Self {
        Self::User(CurrentUser {
            id,
            is_admin: false,
        })
    }

    /// Build an authenticated actor carrying the admin flag.
    pub fn admin(id: UserId) -> Self {
        Self::User(CurrentUser { id, is_admin: true })
    }

    /// The authenticated identity, if any.
    pub fn current_user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Anonymous => None,
            Self::User(user) => Some(user),
        }
    }
}

/// Authenticated caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub is_admin: bool,
}
