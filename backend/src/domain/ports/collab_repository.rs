//! Port for session chat messages and shared resources.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{SessionMessage, SessionResource};

/// Errors raised by collaboration repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollabRepositoryError {
    /// Repository connection could not be established.
    #[error("collaboration repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("collaboration repository query failed: {message}")]
    Query { message: String },
}

impl CollabRepositoryError {
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

/// Port for the append-only chat log and the per-session resource set.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollabRepository: Send + Sync {
    /// Messages for a session, ascending by creation time.
    async fn list_messages(
        &self,
        session_id: &Uuid,
    ) -> Result<Vec<SessionMessage>, CollabRepositoryError>;

    /// Append a message to the session's chat log.
    async fn append_message(&self, message: &SessionMessage)
    -> Result<(), CollabRepositoryError>;

    /// Resources shared on a session, ascending by creation time.
    async fn list_resources(
        &self,
        session_id: &Uuid,
    ) -> Result<Vec<SessionResource>, CollabRepositoryError>;

    /// Add a resource to the session.
    async fn add_resource(&self, resource: &SessionResource)
    -> Result<(), CollabRepositoryError>;

    /// Find a resource by id, scoped to the session.
    async fn find_resource(
        &self,
        session_id: &Uuid,
        resource_id: &Uuid,
    ) -> Result<Option<SessionResource>, CollabRepositoryError>;

    /// Delete a resource. Returns false when it did not exist.
    async fn delete_resource(&self, resource_id: &Uuid) -> Result<bool, CollabRepositoryError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn connection_error_formats_message() {
        let err = CollabRepositoryError::connection("refused");
        assert!(err.to_string().contains("refused"));
    }
}
