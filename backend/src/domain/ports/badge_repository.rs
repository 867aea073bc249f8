//! Port for reading externally-awarded badges.

use async_trait::async_trait;

use crate::domain::{Badge, UserId};

/// Errors raised by badge repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BadgeRepositoryError {
    /// Repository connection could not be established.
    #[error("badge repository connection failed: {message}")]
    Connection { message: String },
    /// Query failed during execution.
    #[error("badge repository query failed: {message}")]
    Query { message: String },
}

impl BadgeRepositoryError {
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

/// Read-only port for badges. Awarding happens outside this core.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeRepository: Send + Sync {
    /// Badges for the user, most recently earned first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Badge>, BadgeRepositoryError>;

    /// Name of the most recently earned badge, if any.
    async fn latest_name_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<String>, BadgeRepositoryError>;
}

/// Fixture implementation for tests that do not exercise badges.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBadgeRepository;

#[async_trait]
impl BadgeRepository for FixtureBadgeRepository {
    async fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<Badge>, BadgeRepositoryError> {
        Ok(Vec::new())
    }

    async fn latest_name_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<String>, BadgeRepositoryError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_returns_no_badges() {
        let repo = FixtureBadgeRepository;
        let badges = repo
            .list_for_user(&UserId::random())
            .await
            .expect("fixture list succeeds");
        assert!(badges.is_empty());
        assert!(
            repo.latest_name_for_user(&UserId::random())
                .await
                .expect("fixture lookup succeeds")
                .is_none()
        );
    }
}
