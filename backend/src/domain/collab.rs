//! Collaboration surfaces scoped to a session: chat messages and shared
//! resource links.

use std::fmt;

use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use crate::domain::UserId;

/// Validation errors returned by the collaboration constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollabValidationError {
    EmptyMessage,
    EmptyResourceTitle,
    InvalidResourceLink { reason: String },
}

impl fmt::Display for CollabValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "message text must not be empty"),
            Self::EmptyResourceTitle => write!(f, "resource title must not be empty"),
            Self::InvalidResourceLink { reason } => {
                write!(f, "resource link is not a valid URL: {reason}")
            }
        }
    }
}

impl std::error::Error for CollabValidationError {}

/// A chat message within a session.
///
/// Append-only; there is no edit or delete operation. Messages are returned
/// ordered ascending by creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMessage {
    id: Uuid,
    session_id: Uuid,
    sender_id: UserId,
    body: String,
    created_at: DateTime<Utc>,
}

impl SessionMessage {
    /// Create a new message after validating the body.
    pub fn new(
        session_id: Uuid,
        sender_id: UserId,
        body: impl Into<String>,
    ) -> Result<Self, CollabValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(CollabValidationError::EmptyMessage);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            session_id,
            sender_id,
            body,
            created_at: Utc::now(),
        })
    }

    /// Rehydrate a message from persisted state.
    pub fn from_parts(
        id: Uuid,
        session_id: Uuid,
        sender_id: UserId,
        body: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id,
            sender_id,
            body,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn sender_id(&self) -> &UserId {
        &self.sender_id
    }

    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A shared resource link within a session.
///
/// Deletable only by whoever added it or by the session host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResource {
    id: Uuid,
    session_id: Uuid,
    title: String,
    link: String,
    added_by_id: UserId,
    created_at: DateTime<Utc>,
}

impl SessionResource {
    /// Create a new resource after validating the title and link.
    pub fn new(
        session_id: Uuid,
        added_by_id: UserId,
        title: impl Into<String>,
        link: impl Into<String>,
    ) -> Result<Self, CollabValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CollabValidationError::EmptyResourceTitle);
        }

        let link = link.into();
        Url::parse(&link).map_err(|err| CollabValidationError::InvalidResourceLink {
            reason: err.to_string(),
        })?;

        Ok(Self {
            id: Uuid::new_v4(),
            session_id,
            title,
            link,
            added_by_id,
            created_at: Utc::now(),
        })
    }

    /// Rehydrate a resource from persisted state.
    pub fn from_parts(
        id: Uuid,
        session_id: Uuid,
        title: String,
        link: String,
        added_by_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id,
            title,
            link,
            added_by_id,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn link(&self) -> &str {
        self.link.as_str()
    }

    pub fn added_by_id(&self) -> &UserId {
        &self.added_by_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
