//! Study group aggregate and its approval workflow.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// Validation errors returned by the group constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValidationError {
    EmptyName,
    NameTooLong { max: usize },
    EmptySubject,
    UnknownStatus { value: String },
}

impl fmt::Display for GroupValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "group name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "group name must be at most {max} characters")
            }
            Self::EmptySubject => write!(f, "group subject must not be empty"),
            Self::UnknownStatus { value } => write!(f, "unknown group status '{value}'"),
        }
    }
}

impl std::error::Error for GroupValidationError {}

/// Maximum allowed length for a group name.
pub const GROUP_NAME_MAX: usize = 120;

/// Approval workflow state of a study group.
///
/// New groups always start [`GroupStatus::Pending`]; only an admin moves a
/// group out of that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    Pending,
    Approved,
    Rejected,
}

impl GroupStatus {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse the storage representation.
    pub fn parse(value: &str) -> Result<Self, GroupValidationError> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(GroupValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-provided fields for creating or updating a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDraft {
    pub name: String,
    pub subject: String,
    #[serde(default)]
    pub description: String,
}

impl GroupDraft {
    /// Validate the draft fields.
    pub fn validate(&self) -> Result<(), GroupValidationError> {
        if self.name.trim().is_empty() {
            return Err(GroupValidationError::EmptyName);
        }
        if self.name.chars().count() > GROUP_NAME_MAX {
            return Err(GroupValidationError::NameTooLong {
                max: GROUP_NAME_MAX,
            });
        }
        if self.subject.trim().is_empty() {
            return Err(GroupValidationError::EmptySubject);
        }
        Ok(())
    }
}

/// A study group subject to the admin approval gate.
///
/// ## Invariants
/// - `creator_id` is immutable after creation.
/// - Newly created groups have `status == Pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyGroup {
    id: Uuid,
    name: String,
    subject: String,
    description: String,
    creator_id: UserId,
    status: GroupStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StudyGroup {
    /// Create a new pending group from a validated draft.
    pub fn create(creator_id: UserId, draft: GroupDraft) -> Result<Self, GroupValidationError> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name,
            subject: draft.subject,
            description: draft.description,
            creator_id,
            status: GroupStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a group from persisted state.
    pub fn from_parts(
        id: Uuid,
        name: String,
        subject: String,
        description: String,
        creator_id: UserId,
        status: GroupStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            subject,
            description,
            creator_id,
            status,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// The user who created the group; immutable after creation.
    pub fn creator_id(&self) -> &UserId {
        &self.creator_id
    }

    pub fn status(&self) -> GroupStatus {
        self.status
    }

    /// Whether non-admin users may see and join the group.
    pub fn is_approved(&self) -> bool {
        self.status == GroupStatus::Approved
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
