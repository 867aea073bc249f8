//! PostgreSQL-backed `GroupRepository` implementation using Diesel ORM.
//!
//! Group creation and the creator's auto-membership run in one transaction;
//! membership uniqueness rides on the composite primary key.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::group::{GroupStatus, StudyGroup};
use crate::domain::membership::GroupMembership;
use crate::domain::ports::{GroupRepository, GroupRepositoryError};
use crate::domain::user::UserId;

use super::diesel_helpers::{
    is_connection_error, is_unique_violation, map_diesel_error_message, map_pool_error_message,
};
use super::models::{GroupRow, MembershipRow, NewGroupRow};
use super::pool::{DbPool, PoolError};
use super::schema::{group_memberships, study_groups};

/// Diesel-backed implementation of the group repository port.
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GroupRepositoryError {
    GroupRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: &DieselError, context: &str) -> GroupRepositoryError {
    if is_connection_error(error) {
        GroupRepositoryError::connection(map_diesel_error_message(error, context))
    } else {
        GroupRepositoryError::query(map_diesel_error_message(error, context))
    }
}

/// Convert a database row into a validated domain group.
fn row_to_group(row: GroupRow) -> Result<StudyGroup, GroupRepositoryError> {
    let status = GroupStatus::parse(&row.status)
        .map_err(|err| GroupRepositoryError::query(format!("decode group status: {err}")))?;

    Ok(StudyGroup::from_parts(
        row.id,
        row.name,
        row.subject,
        row.description,
        UserId::from_uuid(row.creator_id),
        status,
        row.created_at,
        row.updated_at,
    ))
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn create_with_creator(&self, group: &StudyGroup) -> Result<(), GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let group_row = NewGroupRow {
            id: group.id(),
            name: group.name(),
            subject: group.subject(),
            description: group.description(),
            creator_id: *group.creator_id().as_uuid(),
            status: group.status().as_str(),
            created_at: group.created_at(),
            updated_at: group.updated_at(),
        };
        let membership_row = MembershipRow {
            user_id: *group.creator_id().as_uuid(),
            group_id: group.id(),
            joined_at: group.created_at(),
        };

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(study_groups::table)
                    .values(&group_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(group_memberships::table)
                    .values(&membership_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err: DieselError| map_diesel_error(&err, "group create"))
    }

    async fn find_by_id(
        &self,
        group_id: &Uuid,
    ) -> Result<Option<StudyGroup>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = study_groups::table
            .find(group_id)
            .select(GroupRow::as_select())
            .first::<GroupRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, "group lookup"))?;

        row.map(row_to_group).transpose()
    }

    async fn list(
        &self,
        status: Option<GroupStatus>,
    ) -> Result<Vec<StudyGroup>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = study_groups::table
            .select(GroupRow::as_select())
            .order(study_groups::created_at.asc())
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(study_groups::status.eq(status.as_str()));
        }

        let rows: Vec<GroupRow> = query
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "group list"))?;

        rows.into_iter().map(row_to_group).collect()
    }

    async fn set_status(
        &self,
        group_id: &Uuid,
        status: GroupStatus,
    ) -> Result<bool, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(study_groups::table.find(group_id))
            .set((
                study_groups::status.eq(status.as_str()),
                study_groups::updated_at.eq(chrono::Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "group status update"))?;

        Ok(updated > 0)
    }

    async fn is_member(
        &self,
        user_id: &UserId,
        group_id: &Uuid,
    ) -> Result<bool, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            group_memberships::table
                .filter(group_memberships::user_id.eq(user_id.as_uuid()))
                .filter(group_memberships::group_id.eq(group_id)),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(|err| map_diesel_error(&err, "membership lookup"))
    }

    async fn add_member(
        &self,
        membership: &GroupMembership,
    ) -> Result<(), GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = MembershipRow {
            user_id: *membership.user_id.as_uuid(),
            group_id: membership.group_id,
            joined_at: membership.joined_at,
        };

        diesel::insert_into(group_memberships::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    GroupRepositoryError::DuplicateMembership
                } else {
                    map_diesel_error(&err, "membership insert")
                }
            })
    }

    async fn remove_member(
        &self,
        user_id: &UserId,
        group_id: &Uuid,
    ) -> Result<bool, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            group_memberships::table
                .filter(group_memberships::user_id.eq(user_id.as_uuid()))
                .filter(group_memberships::group_id.eq(group_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(&err, "membership delete"))?;

        Ok(deleted > 0)
    }

    async fn member_count(&self, group_id: &Uuid) -> Result<u64, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = group_memberships::table
            .filter(group_memberships::group_id.eq(group_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "membership count"))?;

        Ok(count.unsigned_abs())
    }

    async fn member_counts(
        &self,
        group_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(Uuid, i64)> = group_memberships::table
            .filter(group_memberships::group_id.eq_any(group_ids.iter().copied()))
            .group_by(group_memberships::group_id)
            .select((group_memberships::group_id, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "membership counts"))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count.unsigned_abs()))
            .collect())
    }

    async fn member_group_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Uuid>, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        group_memberships::table
            .filter(group_memberships::user_id.eq(user_id.as_uuid()))
            .select(group_memberships::group_id)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "membership list"))
    }

    async fn joined_count(&self, user_id: &UserId) -> Result<u64, GroupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = group_memberships::table
            .filter(group_memberships::user_id.eq(user_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "joined count"))?;

        Ok(count.unsigned_abs())
    }

    async fn approved_groups_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<StudyGroup>, GroupRepositoryError> {
        let joined = self.member_group_ids(user_id).await?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<GroupRow> = study_groups::table
            .filter(study_groups::id.eq_any(joined))
            .filter(study_groups::status.eq(GroupStatus::Approved.as_str()))
            .order(study_groups::created_at.asc())
            .select(GroupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "approved group list"))?;

        rows.into_iter().map(row_to_group).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn valid_row() -> GroupRow {
        GroupRow {
            id: Uuid::new_v4(),
            name: "Circle".to_owned(),
            subject: "Math".to_owned(),
            description: String::new(),
            creator_id: Uuid::new_v4(),
            status: "pending".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn row_conversion_parses_status(valid_row: GroupRow) {
        let group = row_to_group(valid_row).expect("valid row");
        assert_eq!(group.status(), GroupStatus::Pending);
    }

    #[rstest]
    fn row_conversion_rejects_unknown_status(mut valid_row: GroupRow) {
        valid_row.status = "archived".to_owned();
        let error = row_to_group(valid_row).expect_err("unknown status");
        assert!(matches!(error, GroupRepositoryError::Query { .. }));
        assert!(error.to_string().contains("decode group status"));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(repo_err, GroupRepositoryError::Connection { .. }));
    }
}
