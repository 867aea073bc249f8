//! Read-model projections returned by the services.
//!
//! Views carry per-viewer derived fields (membership, attendance, secret
//! visibility) computed at the boundary; nothing viewer-specific is stored.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Badge, CurrentUser, GroupStatus, SessionRsvp, StudyGroup, StudySession, UserId, policy,
};

/// A study group as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub description: String,
    pub creator_id: UserId,
    pub status: GroupStatus,
    pub members_count: u64,
    /// Whether the viewer currently belongs to the group; false for
    /// anonymous viewers.
    pub is_member: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupView {
    /// Project a group for a viewer from prefetched membership facts.
    pub fn project(group: &StudyGroup, members_count: u64, is_member: bool) -> Self {
        Self {
            id: group.id(),
            name: group.name().to_owned(),
            subject: group.subject().to_owned(),
            description: group.description().to_owned(),
            creator_id: *group.creator_id(),
            status: group.status(),
            members_count,
            is_member,
            created_at: group.created_at(),
            updated_at: group.updated_at(),
        }
    }
}

/// A study session as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub title: String,
    pub course_code: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub host_id: UserId,
    pub group_id: Option<Uuid>,
    pub attendees_count: u64,
    /// Whether the viewer holds an RSVP on the session.
    pub is_attending: bool,
    /// Whether the viewer's RSVP has been verified with the code.
    pub has_attended: bool,
    /// Whether the viewer may RSVP: groupless sessions are open to every
    /// authenticated viewer, group sessions require membership.
    pub is_group_member: bool,
    /// Present only when the viewer is the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionView {
    /// Project a session for a viewer from prefetched per-viewer facts.
    ///
    /// `viewer_is_member` is the raw membership fact for the session's group
    /// (ignored for groupless sessions); the verification code survives the
    /// projection only when the viewer is the host.
    pub fn project(
        session: &StudySession,
        viewer: Option<&CurrentUser>,
        attendees_count: u64,
        viewer_rsvp: Option<&SessionRsvp>,
        viewer_is_member: bool,
    ) -> Self {
        let is_attending = viewer_rsvp.is_some();
        let has_attended = viewer_rsvp.is_some_and(|rsvp| rsvp.attended);
        let is_group_member = viewer.is_some()
            && policy::is_group_member_for_session(session, viewer_is_member);
        let verification_code = viewer
            .filter(|user| session.host_id() == &user.id)
            .map(|_| session.verification_code().as_str().to_owned());

        Self {
            id: session.id(),
            title: session.title().to_owned(),
            course_code: session.course_code().to_owned(),
            description: session.description().to_owned(),
            date: session.date(),
            time: session.time(),
            location: session.location().to_owned(),
            host_id: *session.host_id(),
            group_id: session.group_id(),
            attendees_count,
            is_attending,
            has_attended,
            is_group_member,
            verification_code,
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        }
    }
}

/// A chat message as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub session_id: Uuid,
    pub sender_id: UserId,
    pub body: String,
    /// Whether the viewer sent this message.
    pub is_current_user: bool,
    pub created_at: DateTime<Utc>,
}

impl MessageView {
    /// Project a message for a viewer.
    pub fn project(message: &crate::domain::SessionMessage, viewer: &CurrentUser) -> Self {
        Self {
            id: message.id(),
            session_id: message.session_id(),
            sender_id: *message.sender_id(),
            body: message.body().to_owned(),
            is_current_user: message.sender_id() == &viewer.id,
            created_at: message.created_at(),
        }
    }
}

/// A shared resource as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub id: Uuid,
    pub session_id: Uuid,
    pub title: String,
    pub link: String,
    pub added_by_id: UserId,
    /// Whether the viewer added this resource.
    pub is_owner: bool,
    /// Whether the viewer may delete it (owner or session host).
    pub can_delete: bool,
    pub created_at: DateTime<Utc>,
}

impl ResourceView {
    /// Project a resource for a viewer, deriving the deletion capability.
    pub fn project(
        resource: &crate::domain::SessionResource,
        session: &StudySession,
        viewer: &CurrentUser,
    ) -> Self {
        Self {
            id: resource.id(),
            session_id: resource.session_id(),
            title: resource.title().to_owned(),
            link: resource.link().to_owned(),
            added_by_id: *resource.added_by_id(),
            is_owner: resource.added_by_id() == &viewer.id,
            can_delete: policy::may_delete_resource(&viewer.id, session, resource),
            created_at: resource.created_at(),
        }
    }
}

/// Outcome of an operation that awarded XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpAwarded {
    pub xp_earned: u32,
    pub xp: u32,
    pub level: u32,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: UserId,
    pub username: String,
    pub xp: u32,
    pub level: u32,
    /// Most recently earned badge name, or a default label.
    pub badge: String,
}

/// Aggregate counters shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub sessions_attended: u64,
    pub groups_joined: u64,
    pub sessions_hosted: u64,
    pub xp: u32,
    pub level: u32,
}

/// Dashboard payload for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub upcoming_sessions: Vec<SessionView>,
    pub stats: DashboardStats,
}

/// Aggregate counters shown on the admin overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_groups: u64,
    pub approved_groups: u64,
    pub rejected_groups: u64,
    pub total_sessions: u64,
    /// Sessions with at least one RSVP.
    pub active_sessions: u64,
}

/// Admin overview: every group bucketed by approval status, plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub pending: Vec<GroupView>,
    pub approved: Vec<GroupView>,
    pub rejected: Vec<GroupView>,
    pub stats: AdminStats,
}

/// A group summary shown on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileGroup {
    pub id: Uuid,
    pub name: String,
    pub members_count: u64,
}

/// Detailed profile with badges and approved group memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
    pub xp: u32,
    pub level: u32,
    pub is_admin: bool,
    pub badges: Vec<Badge>,
    pub groups: Vec<ProfileGroup>,
    pub created_at: DateTime<Utc>,
}
