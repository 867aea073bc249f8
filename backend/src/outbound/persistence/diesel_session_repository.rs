//! PostgreSQL-backed `SessionRepository` implementation using Diesel ORM.
//!
//! RSVP uniqueness rides on the composite primary key; the attendance flip
//! is a conditional update so the false→true transition happens exactly
//! once under concurrent submissions.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::membership::SessionRsvp;
use crate::domain::ports::{SessionRepository, SessionRepositoryError};
use crate::domain::session::{SessionDraft, StudySession, VerificationCode};
use crate::domain::user::UserId;

use super::diesel_helpers::{
    is_connection_error, is_unique_violation, map_diesel_error_message, map_pool_error_message,
};
use super::models::{NewSessionRow, RsvpRow, SessionRow, SessionUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{session_rsvps, study_sessions};

/// Diesel-backed implementation of the session repository port.
#[derive(Clone)]
pub struct DieselSessionRepository {
    pool: DbPool,
}

impl DieselSessionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SessionRepositoryError {
    SessionRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: &DieselError, context: &str) -> SessionRepositoryError {
    if is_connection_error(error) {
        SessionRepositoryError::connection(map_diesel_error_message(error, context))
    } else {
        SessionRepositoryError::query(map_diesel_error_message(error, context))
    }
}

/// Convert a database row into a validated domain session.
fn row_to_session(row: SessionRow) -> Result<StudySession, SessionRepositoryError> {
    let code = VerificationCode::new(row.verification_code)
        .map_err(|err| SessionRepositoryError::query(format!("decode verification code: {err}")))?;

    Ok(StudySession::from_parts(
        row.id,
        SessionDraft {
            title: row.title,
            course_code: row.course_code,
            description: row.description,
            date: row.date,
            time: row.time,
            location: row.location,
            group_id: row.group_id,
        },
        UserId::from_uuid(row.host_id),
        code,
        row.created_at,
        row.updated_at,
    ))
}

fn row_to_rsvp(row: RsvpRow) -> SessionRsvp {
    SessionRsvp {
        user_id: UserId::from_uuid(row.user_id),
        session_id: row.session_id,
        attended: row.attended,
        created_at: row.created_at,
    }
}

#[async_trait]
impl SessionRepository for DieselSessionRepository {
    async fn create(&self, session: &StudySession) -> Result<(), SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewSessionRow {
            id: session.id(),
            title: session.title(),
            course_code: session.course_code(),
            description: session.description(),
            date: session.date(),
            time: session.time(),
            location: session.location(),
            host_id: *session.host_id().as_uuid(),
            group_id: session.group_id(),
            verification_code: session.verification_code().as_str(),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        };

        diesel::insert_into(study_sessions::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(&err, "session insert"))
    }

    async fn update(&self, session: &StudySession) -> Result<(), SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let update_row = SessionUpdate {
            title: session.title(),
            course_code: session.course_code(),
            description: session.description(),
            date: session.date(),
            time: session.time(),
            location: session.location(),
            group_id: session.group_id(),
            updated_at: session.updated_at(),
        };

        diesel::update(study_sessions::table.find(session.id()))
            .set(&update_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(&err, "session update"))
    }

    async fn delete(&self, session_id: &Uuid) -> Result<bool, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(study_sessions::table.find(session_id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "session delete"))?;

        Ok(deleted > 0)
    }

    async fn find_by_id(
        &self,
        session_id: &Uuid,
    ) -> Result<Option<StudySession>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = study_sessions::table
            .find(session_id)
            .select(SessionRow::as_select())
            .first::<SessionRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, "session lookup"))?;

        row.map(row_to_session).transpose()
    }

    async fn list(&self) -> Result<Vec<StudySession>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SessionRow> = study_sessions::table
            .order(study_sessions::created_at.asc())
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "session list"))?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn list_for_group(
        &self,
        group_id: &Uuid,
    ) -> Result<Vec<StudySession>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SessionRow> = study_sessions::table
            .filter(study_sessions::group_id.eq(group_id))
            .order((study_sessions::date.asc(), study_sessions::time.asc()))
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "group session list"))?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn list_attending(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<StudySession>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let session_ids: Vec<Uuid> = session_rsvps::table
            .filter(session_rsvps::user_id.eq(user_id.as_uuid()))
            .select(session_rsvps::session_id)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "attending lookup"))?;

        let rows: Vec<SessionRow> = study_sessions::table
            .filter(study_sessions::id.eq_any(session_ids))
            .order((study_sessions::date.asc(), study_sessions::time.asc()))
            .limit(i64::from(limit))
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "attending session list"))?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn hosted_count(&self, user_id: &UserId) -> Result<u64, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = study_sessions::table
            .filter(study_sessions::host_id.eq(user_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "hosted count"))?;

        Ok(count.unsigned_abs())
    }

    async fn total_count(&self) -> Result<u64, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = study_sessions::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "session count"))?;

        Ok(count.unsigned_abs())
    }

    async fn with_attendees_count(&self) -> Result<u64, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = session_rsvps::table
            .select(diesel::dsl::count_distinct(session_rsvps::session_id))
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "active session count"))?;

        Ok(count.unsigned_abs())
    }

    async fn find_rsvp(
        &self,
        user_id: &UserId,
        session_id: &Uuid,
    ) -> Result<Option<SessionRsvp>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = session_rsvps::table
            .find((user_id.as_uuid(), session_id))
            .select(RsvpRow::as_select())
            .first::<RsvpRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, "rsvp lookup"))?;

        Ok(row.map(row_to_rsvp))
    }

    async fn create_rsvp(&self, rsvp: &SessionRsvp) -> Result<(), SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = RsvpRow {
            user_id: *rsvp.user_id.as_uuid(),
            session_id: rsvp.session_id,
            attended: rsvp.attended,
            created_at: rsvp.created_at,
        };

        diesel::insert_into(session_rsvps::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    SessionRepositoryError::DuplicateRsvp
                } else {
                    map_diesel_error(&err, "rsvp insert")
                }
            })
    }

    async fn delete_rsvp(
        &self,
        user_id: &UserId,
        session_id: &Uuid,
    ) -> Result<bool, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            session_rsvps::table.find((user_id.as_uuid(), session_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(&err, "rsvp delete"))?;

        Ok(deleted > 0)
    }

    async fn mark_attended(
        &self,
        user_id: &UserId,
        session_id: &Uuid,
    ) -> Result<bool, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The `attended = false` guard makes the transition single-shot:
        // the losing side of a double-submit updates zero rows.
        let updated = diesel::update(
            session_rsvps::table
                .find((user_id.as_uuid(), session_id))
                .filter(session_rsvps::attended.eq(false)),
        )
        .set(session_rsvps::attended.eq(true))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(&err, "attendance update"))?;

        Ok(updated > 0)
    }

    async fn rsvp_count(&self, session_id: &Uuid) -> Result<u64, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = session_rsvps::table
            .filter(session_rsvps::session_id.eq(session_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "rsvp count"))?;

        Ok(count.unsigned_abs())
    }

    async fn rsvp_counts(
        &self,
        session_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(Uuid, i64)> = session_rsvps::table
            .filter(session_rsvps::session_id.eq_any(session_ids.iter().copied()))
            .group_by(session_rsvps::session_id)
            .select((session_rsvps::session_id, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "rsvp counts"))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count.unsigned_abs()))
            .collect())
    }

    async fn rsvp_count_for_user(&self, user_id: &UserId) -> Result<u64, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = session_rsvps::table
            .filter(session_rsvps::user_id.eq(user_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "user rsvp count"))?;

        Ok(count.unsigned_abs())
    }

    async fn rsvps_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SessionRsvp>, SessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RsvpRow> = session_rsvps::table
            .filter(session_rsvps::user_id.eq(user_id.as_uuid()))
            .select(RsvpRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "user rsvp list"))?;

        Ok(rows.into_iter().map(row_to_rsvp).collect())
    }
}
