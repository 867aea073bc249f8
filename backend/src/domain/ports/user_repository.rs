//! Port for user accounts and the atomic XP award path.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::gamification::LevelCurve;
use crate::domain::{User, UserId};

/// Errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// The referenced user does not exist.
    #[error("user {user_id} does not exist")]
    Missing { user_id: Uuid },
}

impl UserRepositoryError {
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

    /// Create a missing-user error.
    pub fn missing(user_id: Uuid) -> Self {
        Self::Missing { user_id }
    }
}

/// Counters after an XP award has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAwardOutcome {
    /// New cumulative XP.
    pub xp: u32,
    /// Level recomputed from the new total.
    pub level: u32,
}

/// Port for reading users and applying atomic XP awards.
///
/// `award_xp` must increment the stored XP and recompute the level from the
/// new total in one atomic unit of work, so concurrent awards to the same
/// user never lose updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user account.
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Find a user by id.
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Atomically add `amount` XP and recompute the level via `curve`.
    async fn award_xp(
        &self,
        user_id: &UserId,
        amount: u32,
        curve: &LevelCurve,
    ) -> Result<XpAwardOutcome, UserRepositoryError>;

    /// The top users ordered by cumulative XP descending.
    async fn list_top_by_xp(&self, limit: u32) -> Result<Vec<User>, UserRepositoryError>;
}
