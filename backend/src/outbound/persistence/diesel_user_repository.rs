//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! The XP award path runs as a single transaction with an in-database
//! increment, so concurrent awards to the same user never lose updates.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::gamification::LevelCurve;
use crate::domain::ports::{UserRepository, UserRepositoryError, XpAwardOutcome};
use crate::domain::user::{User, UserDraft, UserId, Username};

use super::diesel_helpers::{is_connection_error, map_diesel_error_message, map_pool_error_message};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    UserRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: &DieselError, context: &str) -> UserRepositoryError {
    if is_connection_error(error) {
        UserRepositoryError::connection(map_diesel_error_message(error, context))
    } else {
        UserRepositoryError::query(map_diesel_error_message(error, context))
    }
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let username = Username::new(row.username)
        .map_err(|err| UserRepositoryError::query(format!("decode username: {err}")))?;
    let xp = u32::try_from(row.xp)
        .map_err(|_| UserRepositoryError::query("stored xp is negative"))?;
    let level = u32::try_from(row.level)
        .map_err(|_| UserRepositoryError::query("stored level is negative"))?;

    User::new(UserDraft {
        id: UserId::from_uuid(row.id),
        username,
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        image: row.image,
        xp,
        level,
        is_admin: row.is_admin,
        created_at: row.created_at,
    })
    .map_err(|err| UserRepositoryError::query(err.to_string()))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let xp = i32::try_from(user.xp())
            .map_err(|_| UserRepositoryError::query("xp exceeds storage range"))?;
        let level = i32::try_from(user.level())
            .map_err(|_| UserRepositoryError::query("level exceeds storage range"))?;

        let new_row = NewUserRow {
            id: *user.id().as_uuid(),
            username: user.username().as_ref(),
            email: user.email(),
            first_name: user.first_name(),
            last_name: user.last_name(),
            image: user.image(),
            xp,
            level,
            is_admin: user.is_admin(),
            created_at: user.created_at(),
            updated_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(&err, "user insert"))
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .find(user_id.as_uuid())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, "user lookup"))?;

        row.map(row_to_user).transpose()
    }

    async fn award_xp(
        &self,
        user_id: &UserId,
        amount: u32,
        curve: &LevelCurve,
    ) -> Result<XpAwardOutcome, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let delta = i32::try_from(amount)
            .map_err(|_| UserRepositoryError::query("xp award exceeds storage range"))?;
        let uuid = *user_id.as_uuid();
        let curve = curve.clone();

        // Increment in the database and recompute the level from the
        // returned total, all in one transaction: two racing awards both
        // land and the second level write sees both increments.
        let result: Result<XpAwardOutcome, DieselError> = conn
            .transaction(|conn| {
                async move {
                    let new_xp: i32 = diesel::update(users::table.find(uuid))
                        .set(users::xp.eq(users::xp + delta))
                        .returning(users::xp)
                        .get_result(conn)
                        .await?;
                    let xp = u32::try_from(new_xp)
                        .map_err(|err| DieselError::DeserializationError(Box::new(err)))?;
                    let level = curve.level_for_xp(xp);
                    let stored_level = i32::try_from(level)
                        .map_err(|err| DieselError::SerializationError(Box::new(err)))?;

                    diesel::update(users::table.find(uuid))
                        .set(users::level.eq(stored_level))
                        .execute(conn)
                        .await?;

                    Ok(XpAwardOutcome { xp, level })
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(outcome) => Ok(outcome),
            Err(DieselError::NotFound) => Err(UserRepositoryError::missing(uuid)),
            Err(err) => Err(map_diesel_error(&err, "xp award")),
        }
    }

    async fn list_top_by_xp(&self, limit: u32) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order((users::xp.desc(), users::created_at.asc()))
            .limit(i64::from(limit))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "leaderboard query"))?;

        rows.into_iter().map(row_to_user).collect()
    }
}
