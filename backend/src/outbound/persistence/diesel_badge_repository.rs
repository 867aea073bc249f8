//! PostgreSQL-backed `BadgeRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::badge::Badge;
use crate::domain::ports::{BadgeRepository, BadgeRepositoryError};
use crate::domain::user::UserId;

use super::diesel_helpers::{
    is_connection_error, map_diesel_error_message, map_pool_error_message,
};
use super::models::BadgeRow;
use super::pool::{DbPool, PoolError};
use super::schema::badges;

/// Diesel-backed implementation of the badge repository port.
#[derive(Clone)]
pub struct DieselBadgeRepository {
    pool: DbPool,
}

impl DieselBadgeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BadgeRepositoryError {
    BadgeRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: &DieselError, context: &str) -> BadgeRepositoryError {
    if is_connection_error(error) {
        BadgeRepositoryError::connection(map_diesel_error_message(error, context))
    } else {
        BadgeRepositoryError::query(map_diesel_error_message(error, context))
    }
}

fn row_to_badge(row: BadgeRow) -> Badge {
    Badge {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        name: row.name,
        icon: row.icon,
        color: row.color,
        bg_color: row.bg_color,
        earned_at: row.earned_at,
    }
}

#[async_trait]
impl BadgeRepository for DieselBadgeRepository {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Badge>, BadgeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<BadgeRow> = badges::table
            .filter(badges::user_id.eq(user_id.as_uuid()))
            .order(badges::earned_at.desc())
            .select(BadgeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "badge list"))?;

        Ok(rows.into_iter().map(row_to_badge).collect())
    }

    async fn latest_name_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<String>, BadgeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        badges::table
            .filter(badges::user_id.eq(user_id.as_uuid()))
            .order(badges::earned_at.desc())
            .select(badges::name)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, "latest badge lookup"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion.

    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    #[rstest]
    fn badge_rows_convert_losslessly() {
        let row = BadgeRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Night Owl".to_owned(),
            icon: "owl".to_owned(),
            color: "#eab308".to_owned(),
            bg_color: "#fef9c3".to_owned(),
            earned_at: Utc::now(),
        };
        let badge = row_to_badge(row.clone());
        assert_eq!(badge.name, "Night Owl");
        assert_eq!(badge.user_id.as_uuid(), &row.user_id);
    }
}
