//! PostgreSQL-backed `CollabRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::collab::{SessionMessage, SessionResource};
use crate::domain::ports::{CollabRepository, CollabRepositoryError};
use crate::domain::user::UserId;

use super::diesel_helpers::{
    is_connection_error, map_diesel_error_message, map_pool_error_message,
};
use super::models::{MessageRow, NewMessageRow, NewResourceRow, ResourceRow};
use super::pool::{DbPool, PoolError};
use super::schema::{session_messages, session_resources};

/// Diesel-backed implementation of the collaboration repository port.
#[derive(Clone)]
pub struct DieselCollabRepository {
    pool: DbPool,
}

impl DieselCollabRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CollabRepositoryError {
    CollabRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: &DieselError, context: &str) -> CollabRepositoryError {
    if is_connection_error(error) {
        CollabRepositoryError::connection(map_diesel_error_message(error, context))
    } else {
        CollabRepositoryError::query(map_diesel_error_message(error, context))
    }
}

fn row_to_message(row: MessageRow) -> SessionMessage {
    SessionMessage::from_parts(
        row.id,
        row.session_id,
        UserId::from_uuid(row.sender_id),
        row.body,
        row.created_at,
    )
}

fn row_to_resource(row: ResourceRow) -> SessionResource {
    SessionResource::from_parts(
        row.id,
        row.session_id,
        row.title,
        row.link,
        UserId::from_uuid(row.added_by_id),
        row.created_at,
    )
}

#[async_trait]
impl CollabRepository for DieselCollabRepository {
    async fn list_messages(
        &self,
        session_id: &Uuid,
    ) -> Result<Vec<SessionMessage>, CollabRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<MessageRow> = session_messages::table
            .filter(session_messages::session_id.eq(session_id))
            .order(session_messages::created_at.asc())
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "message list"))?;

        Ok(rows.into_iter().map(row_to_message).collect())
    }

    async fn append_message(
        &self,
        message: &SessionMessage,
    ) -> Result<(), CollabRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewMessageRow {
            id: message.id(),
            session_id: message.session_id(),
            sender_id: *message.sender_id().as_uuid(),
            body: message.body(),
            created_at: message.created_at(),
        };

        diesel::insert_into(session_messages::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(&err, "message insert"))
    }

    async fn list_resources(
        &self,
        session_id: &Uuid,
    ) -> Result<Vec<SessionResource>, CollabRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ResourceRow> = session_resources::table
            .filter(session_resources::session_id.eq(session_id))
            .order(session_resources::created_at.asc())
            .select(ResourceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "resource list"))?;

        Ok(rows.into_iter().map(row_to_resource).collect())
    }

    async fn add_resource(
        &self,
        resource: &SessionResource,
    ) -> Result<(), CollabRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewResourceRow {
            id: resource.id(),
            session_id: resource.session_id(),
            title: resource.title(),
            link: resource.link(),
            added_by_id: *resource.added_by_id().as_uuid(),
            created_at: resource.created_at(),
        };

        diesel::insert_into(session_resources::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(&err, "resource insert"))
    }

    async fn find_resource(
        &self,
        session_id: &Uuid,
        resource_id: &Uuid,
    ) -> Result<Option<SessionResource>, CollabRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = session_resources::table
            .find(resource_id)
            .filter(session_resources::session_id.eq(session_id))
            .select(ResourceRow::as_select())
            .first::<ResourceRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, "resource lookup"))?;

        Ok(row.map(row_to_resource))
    }

    async fn delete_resource(&self, resource_id: &Uuid) -> Result<bool, CollabRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(session_resources::table.find(resource_id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "resource delete"))?;

        Ok(deleted > 0)
    }
}
