//! Badges earned by users.
//!
//! Badges are awarded by an external process and surfaced read-only on
//! profiles and the leaderboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// A badge on a user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub bg_color: String,
    pub earned_at: DateTime<Utc>,
}
