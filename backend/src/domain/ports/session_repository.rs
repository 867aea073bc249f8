//! Port for study session persistence and the RSVP ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{SessionRsvp, StudySession, UserId};

/// Errors raised by session repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionRepositoryError {
    /// Repository connection could not be established.
    #[error("session repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("session repository query failed: {message}")]
    Query { message: String },
    /// The `(user, session)` RSVP pair already exists.
    #[error("an RSVP already exists for this user and session")]
    DuplicateRsvp,
}

impl SessionRepositoryError {
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

/// Port for session state, RSVPs, and attendance transitions.
///
/// RSVP uniqueness is owned by storage (unique `(user, session)` pair) and
/// the `attended` flag transitions false→true at most once: `mark_attended`
/// is a conditional update that reports whether this call performed the
/// transition, so a concurrent double-submit loses cleanly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session.
    async fn create(&self, session: &StudySession) -> Result<(), SessionRepositoryError>;

    /// Persist updated fields of an existing session.
    async fn update(&self, session: &StudySession) -> Result<(), SessionRepositoryError>;

    /// Delete a session. Returns false when it did not exist.
    async fn delete(&self, session_id: &Uuid) -> Result<bool, SessionRepositoryError>;

    /// Find a session by id.
    async fn find_by_id(
        &self,
        session_id: &Uuid,
    ) -> Result<Option<StudySession>, SessionRepositoryError>;

    /// Every session, insertion-ordered.
    async fn list(&self) -> Result<Vec<StudySession>, SessionRepositoryError>;

    /// Sessions bound to the given group.
    async fn list_for_group(
        &self,
        group_id: &Uuid,
    ) -> Result<Vec<StudySession>, SessionRepositoryError>;

    /// Sessions the user has RSVP'd to, soonest first, capped at `limit`.
    async fn list_attending(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<StudySession>, SessionRepositoryError>;

    /// Number of sessions hosted by the user.
    async fn hosted_count(&self, user_id: &UserId) -> Result<u64, SessionRepositoryError>;

    /// Total number of sessions.
    async fn total_count(&self) -> Result<u64, SessionRepositoryError>;

    /// Number of sessions with at least one RSVP.
    async fn with_attendees_count(&self) -> Result<u64, SessionRepositoryError>;

    /// Find the RSVP pair, if present.
    async fn find_rsvp(
        &self,
        user_id: &UserId,
        session_id: &Uuid,
    ) -> Result<Option<SessionRsvp>, SessionRepositoryError>;

    /// Record an RSVP; fails with `DuplicateRsvp` when the pair exists.
    async fn create_rsvp(&self, rsvp: &SessionRsvp) -> Result<(), SessionRepositoryError>;

    /// Delete an RSVP, discarding any attended state. Returns false when no
    /// RSVP existed.
    async fn delete_rsvp(
        &self,
        user_id: &UserId,
        session_id: &Uuid,
    ) -> Result<bool, SessionRepositoryError>;

    /// Flip `attended` to true if and only if it is currently false.
    /// Returns whether this call performed the transition.
    async fn mark_attended(
        &self,
        user_id: &UserId,
        session_id: &Uuid,
    ) -> Result<bool, SessionRepositoryError>;

    /// Number of RSVPs on the session.
    async fn rsvp_count(&self, session_id: &Uuid) -> Result<u64, SessionRepositoryError>;

    /// RSVP counts for a batch of sessions; sessions with no RSVPs may be
    /// absent from the map.
    async fn rsvp_counts(
        &self,
        session_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, SessionRepositoryError>;

    /// Number of sessions the user has RSVP'd to.
    async fn rsvp_count_for_user(&self, user_id: &UserId) -> Result<u64, SessionRepositoryError>;

    /// Every RSVP held by the user.
    async fn rsvps_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SessionRsvp>, SessionRepositoryError>;
}
