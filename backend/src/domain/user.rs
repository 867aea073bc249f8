//! User identity, profile fields, and gamification counters.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooShort { min: usize },
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    EmptyEmail,
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, spaces, or underscores",
            ),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must contain a single '@'"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;

/// Validated account name shown to other users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`] from owned input.
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }

        let length = username.chars().count();
        if length < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if length > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }

        let allowed = username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '_');
        if !allowed {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }

        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Input payload for [`User::new`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub username: Username,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
    pub xp: u32,
    pub level: u32,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Application user account.
///
/// ## Invariants
/// - `xp` is non-negative and only ever grows through the gamification
///   engine's atomic award path.
/// - `level` is derived from `xp` by the configured level curve and never
///   decreases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    image: Option<String>,
    xp: u32,
    level: u32,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl User {
    /// Build a validated user from a draft.
    pub fn new(draft: UserDraft) -> Result<Self, UserValidationError> {
        let email = draft.email;
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if email.chars().filter(|&c| c == '@').count() != 1 {
            return Err(UserValidationError::InvalidEmail);
        }

        Ok(Self {
            id: draft.id,
            username: draft.username,
            email,
            first_name: draft.first_name,
            last_name: draft.last_name,
            image: draft.image,
            xp: draft.xp,
            level: draft.level,
            is_admin: draft.is_admin,
            created_at: draft.created_at,
        })
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Account name shown to other users.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Contact email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Optional given name.
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    /// Optional family name.
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// Optional avatar URL.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Cumulative experience points.
    pub fn xp(&self) -> u32 {
        self.xp
    }

    /// Level derived from cumulative XP.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Whether the account carries the admin role.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Account creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
