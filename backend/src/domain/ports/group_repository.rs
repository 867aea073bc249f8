//! Port for study group persistence and the membership ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{GroupMembership, GroupStatus, StudyGroup, UserId};

/// Errors raised by group repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupRepositoryError {
    /// Repository connection could not be established.
    #[error("group repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("group repository query failed: {message}")]
    Query { message: String },
    /// The `(user, group)` membership pair already exists.
    #[error("membership already exists for this user and group")]
    DuplicateMembership,
}

impl GroupRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for group state and membership facts.
///
/// Membership uniqueness is owned by storage (unique `(user, group)` pair);
/// adapters surface a violation as [`GroupRepositoryError::DuplicateMembership`]
/// so a concurrent double-join loses cleanly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Persist a new group and its creator's membership in one atomic unit
    /// of work: either both persist or neither.
    async fn create_with_creator(&self, group: &StudyGroup) -> Result<(), GroupRepositoryError>;

    /// Find a group by id.
    async fn find_by_id(&self, group_id: &Uuid)
    -> Result<Option<StudyGroup>, GroupRepositoryError>;

    /// List groups, optionally restricted to one status.
    async fn list(
        &self,
        status: Option<GroupStatus>,
    ) -> Result<Vec<StudyGroup>, GroupRepositoryError>;

    /// Set a group's approval status. Returns false when the group does not
    /// exist. Re-applying the current status is not an error.
    async fn set_status(
        &self,
        group_id: &Uuid,
        status: GroupStatus,
    ) -> Result<bool, GroupRepositoryError>;

    /// Whether the membership pair exists.
    async fn is_member(
        &self,
        user_id: &UserId,
        group_id: &Uuid,
    ) -> Result<bool, GroupRepositoryError>;

    /// Record a membership; fails with `DuplicateMembership` when the pair
    /// already exists.
    async fn add_member(&self, membership: &GroupMembership)
    -> Result<(), GroupRepositoryError>;

    /// Delete a membership. Returns false when no membership existed.
    async fn remove_member(
        &self,
        user_id: &UserId,
        group_id: &Uuid,
    ) -> Result<bool, GroupRepositoryError>;

    /// Number of members in the group.
    async fn member_count(&self, group_id: &Uuid) -> Result<u64, GroupRepositoryError>;

    /// Member counts for a batch of groups; groups with no members may be
    /// absent from the map.
    async fn member_counts(
        &self,
        group_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, GroupRepositoryError>;

    /// Ids of every group the user belongs to.
    async fn member_group_ids(&self, user_id: &UserId) -> Result<Vec<Uuid>, GroupRepositoryError>;

    /// Number of groups the user belongs to.
    async fn joined_count(&self, user_id: &UserId) -> Result<u64, GroupRepositoryError>;

    /// Approved groups the user belongs to, for profile views.
    async fn approved_groups_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<StudyGroup>, GroupRepositoryError>;
}
