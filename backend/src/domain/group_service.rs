//! Group registry and membership services.
//!
//! Implements group creation with the approval gate, join/leave membership
//! flows with XP side effects, admin-only status transitions, and visibility
//! rules for listings.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::gamification::{LevelCurve, XpAction, XpRewards};
use crate::domain::ports::{
    GroupRepository, GroupRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Actor, Error, GroupDraft, GroupMembership, GroupStatus, GroupView, StudyGroup, XpAwarded,
    policy,
};

fn map_group_error(error: GroupRepositoryError) -> Error {
    match error {
        GroupRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("group repository unavailable: {message}"))
        }
        GroupRepositoryError::Query { message } => {
            Error::internal(format!("group repository error: {message}"))
        }
        GroupRepositoryError::DuplicateMembership => {
            Error::conflict("you are already a member of this group")
        }
    }
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::Missing { user_id } => {
            Error::internal(format!("user {user_id} vanished during award"))
        }
    }
}

/// Group registry service over the group and user repository ports.
#[derive(Clone)]
pub struct GroupService<G, U> {
    groups: Arc<G>,
    users: Arc<U>,
    rewards: XpRewards,
    curve: LevelCurve,
}

impl<G, U> GroupService<G, U> {
    /// Create a new service with the given repositories and policy.
    pub fn new(groups: Arc<G>, users: Arc<U>, rewards: XpRewards, curve: LevelCurve) -> Self {
        Self {
            groups,
            users,
            rewards,
            curve,
        }
    }
}

impl<G, U> GroupService<G, U>
where
    G: GroupRepository,
    U: UserRepository,
{
    /// Create a pending group; the creator becomes its first member and
    /// earns the `create_group` reward.
    pub async fn create_group(&self, actor: &Actor, draft: GroupDraft) -> Result<GroupView, Error> {
        let user = policy::require_authenticated(actor)?;

        let group = StudyGroup::create(user.id, draft)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.groups
            .create_with_creator(&group)
            .await
            .map_err(map_group_error)?;

        let amount = self.rewards.amount_for(XpAction::CreateGroup);
        self.users
            .award_xp(&user.id, amount, &self.curve)
            .await
            .map_err(map_user_error)?;
        info!(group_id = %group.id(), user_id = %user.id, amount, "group created, xp awarded");

        Ok(GroupView::project(&group, 1, true))
    }

    /// Join an approved group, earning the `join_group` reward.
    pub async fn join_group(&self, actor: &Actor, group_id: &Uuid) -> Result<XpAwarded, Error> {
        let user = policy::require_authenticated(actor)?;
        let group = self.find_group(group_id).await?;

        if !group.is_approved() {
            return Err(Error::forbidden("this group is not yet approved"));
        }

        let membership = GroupMembership::new(user.id, group.id());
        self.groups
            .add_member(&membership)
            .await
            .map_err(map_group_error)?;

        let amount = self.rewards.amount_for(XpAction::JoinGroup);
        let outcome = self
            .users
            .award_xp(&user.id, amount, &self.curve)
            .await
            .map_err(map_user_error)?;
        info!(group_id = %group.id(), user_id = %user.id, amount, "group joined, xp awarded");

        Ok(XpAwarded {
            xp_earned: amount,
            xp: outcome.xp,
            level: outcome.level,
        })
    }

    /// Leave a group. No XP penalty.
    pub async fn leave_group(&self, actor: &Actor, group_id: &Uuid) -> Result<(), Error> {
        let user = policy::require_authenticated(actor)?;
        let group = self.find_group(group_id).await?;

        let removed = self
            .groups
            .remove_member(&user.id, &group.id())
            .await
            .map_err(map_group_error)?;
        if !removed {
            return Err(Error::not_found("you are not a member of this group"));
        }
        Ok(())
    }

    /// List groups visible to the actor: admins see everything, everyone
    /// else sees only approved groups.
    pub async fn list_groups(&self, actor: &Actor) -> Result<Vec<GroupView>, Error> {
        let is_admin = actor.current_user().is_some_and(|user| user.is_admin);
        let filter = if is_admin {
            None
        } else {
            Some(GroupStatus::Approved)
        };

        let groups = self.groups.list(filter).await.map_err(map_group_error)?;
        self.project_many(actor, groups).await
    }

    /// Fetch a single group, subject to the same visibility rule as listing.
    pub async fn get_group(&self, actor: &Actor, group_id: &Uuid) -> Result<GroupView, Error> {
        let group = self.find_group(group_id).await?;

        let is_admin = actor.current_user().is_some_and(|user| user.is_admin);
        if !group.is_approved() && !is_admin {
            return Err(Error::not_found("group not found"));
        }

        let members_count = self
            .groups
            .member_count(&group.id())
            .await
            .map_err(map_group_error)?;
        let is_member = match actor.current_user() {
            Some(user) => self
                .groups
                .is_member(&user.id, &group.id())
                .await
                .map_err(map_group_error)?,
            None => false,
        };

        Ok(GroupView::project(&group, members_count, is_member))
    }

    /// Approve a pending group. Admin-only; idempotent.
    pub async fn approve_group(&self, actor: &Actor, group_id: &Uuid) -> Result<(), Error> {
        self.set_status(actor, group_id, GroupStatus::Approved).await
    }

    /// Reject a group. Admin-only; idempotent.
    pub async fn reject_group(&self, actor: &Actor, group_id: &Uuid) -> Result<(), Error> {
        self.set_status(actor, group_id, GroupStatus::Rejected).await
    }

    async fn set_status(
        &self,
        actor: &Actor,
        group_id: &Uuid,
        status: GroupStatus,
    ) -> Result<(), Error> {
        let admin = policy::require_admin(actor)?;

        let updated = self
            .groups
            .set_status(group_id, status)
            .await
            .map_err(map_group_error)?;
        if !updated {
            return Err(Error::not_found("group not found"));
        }
        info!(%group_id, %status, admin_id = %admin.id, "group status set");
        Ok(())
    }

    async fn find_group(&self, group_id: &Uuid) -> Result<StudyGroup, Error> {
        self.groups
            .find_by_id(group_id)
            .await
            .map_err(map_group_error)?
            .ok_or_else(|| Error::not_found("group not found"))
    }

    async fn project_many(
        &self,
        actor: &Actor,
        groups: Vec<StudyGroup>,
    ) -> Result<Vec<GroupView>, Error> {
        let ids: Vec<Uuid> = groups.iter().map(StudyGroup::id).collect();
        let counts = self
            .groups
            .member_counts(&ids)
            .await
            .map_err(map_group_error)?;
        let joined: Vec<Uuid> = match actor.current_user() {
            Some(user) => self
                .groups
                .member_group_ids(&user.id)
                .await
                .map_err(map_group_error)?,
            None => Vec::new(),
        };

        Ok(groups
            .iter()
            .map(|group| {
                let members_count = counts.get(&group.id()).copied().unwrap_or(0);
                let is_member = joined.contains(&group.id());
                GroupView::project(group, members_count, is_member)
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "group_service_tests.rs"]
mod tests;
