//! Membership ledger facts: group memberships and session RSVPs.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::UserId;

/// A user's membership in a study group.
///
/// Unique per `(user_id, group_id)` pair; created on explicit join or on
/// group creation (the creator auto-joins) and destroyed on leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembership {
    pub user_id: UserId,
    pub group_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

impl GroupMembership {
    /// Record a membership starting now.
    pub fn new(user_id: UserId, group_id: Uuid) -> Self {
        Self {
            user_id,
            group_id,
            joined_at: Utc::now(),
        }
    }
}

/// A user's RSVP to a study session.
///
/// Unique per `(user_id, session_id)` pair. `attended` starts false and
/// transitions to true exactly once, via successful code verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRsvp {
    pub user_id: UserId,
    pub session_id: Uuid,
    pub attended: bool,
    pub created_at: DateTime<Utc>,
}

impl SessionRsvp {
    /// Record an intent to attend, not yet verified.
    pub fn new(user_id: UserId, session_id: Uuid) -> Self {
        Self {
            user_id,
            session_id,
            attended: false,
            created_at: Utc::now(),
        }
    }
}
