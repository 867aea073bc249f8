//! Reporting queries: leaderboard, dashboard, admin overview, and profiles.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{
    BadgeRepository, BadgeRepositoryError, GroupRepository, GroupRepositoryError,
    SessionRepository, SessionRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Actor, AdminOverview, AdminStats, DashboardStats, DashboardSummary, Error, GroupStatus,
    GroupView, LeaderboardEntry, ProfileGroup, ProfileView, SessionView, StudyGroup, UserId,
    policy,
};

/// Number of rows on the leaderboard.
const LEADERBOARD_SIZE: u32 = 10;

/// Number of upcoming sessions shown on the dashboard.
const DASHBOARD_UPCOMING: u32 = 3;

/// Badge label shown for users who have not earned one yet.
const DEFAULT_BADGE: &str = "Rising Star";

/// Requested leaderboard window.
///
/// Both windows currently rank by all-time XP: per-award activity timestamps
/// are not recorded, so a true weekly window has nothing to aggregate over.
/// The simplification is deliberate and documented rather than hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardPeriod {
    Week,
    AllTime,
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::Missing { user_id } => {
            Error::not_found(format!("user {user_id} not found"))
        }
    }
}

fn map_group_error(error: GroupRepositoryError) -> Error {
    match error {
        GroupRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("group repository unavailable: {message}"))
        }
        GroupRepositoryError::Query { message } => {
            Error::internal(format!("group repository error: {message}"))
        }
        GroupRepositoryError::DuplicateMembership => {
            Error::internal("unexpected membership conflict while reading")
        }
    }
}

fn map_session_error(error: SessionRepositoryError) -> Error {
    match error {
        SessionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("session repository unavailable: {message}"))
        }
        SessionRepositoryError::Query { message } => {
            Error::internal(format!("session repository error: {message}"))
        }
        SessionRepositoryError::DuplicateRsvp => {
            Error::internal("unexpected RSVP conflict while reading")
        }
    }
}

fn map_badge_error(error: BadgeRepositoryError) -> Error {
    match error {
        BadgeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("badge repository unavailable: {message}"))
        }
        BadgeRepositoryError::Query { message } => {
            Error::internal(format!("badge repository error: {message}"))
        }
    }
}

/// Reporting service over the user, group, session, and badge ports.
#[derive(Clone)]
pub struct ReportingService<U, G, S, B> {
    users: Arc<U>,
    groups: Arc<G>,
    sessions: Arc<S>,
    badges: Arc<B>,
}

impl<U, G, S, B> ReportingService<U, G, S, B> {
    /// Create a new service with the given repositories.
    pub fn new(users: Arc<U>, groups: Arc<G>, sessions: Arc<S>, badges: Arc<B>) -> Self {
        Self {
            users,
            groups,
            sessions,
            badges,
        }
    }
}

impl<U, G, S, B> ReportingService<U, G, S, B>
where
    U: UserRepository,
    G: GroupRepository,
    S: SessionRepository,
    B: BadgeRepository,
{
    /// Top users by cumulative XP with dense 1-based ranks.
    pub async fn leaderboard(
        &self,
        _period: LeaderboardPeriod,
    ) -> Result<Vec<LeaderboardEntry>, Error> {
        let users = self
            .users
            .list_top_by_xp(LEADERBOARD_SIZE)
            .await
            .map_err(map_user_error)?;

        let mut entries = Vec::with_capacity(users.len());
        for (index, user) in users.iter().enumerate() {
            let badge = self
                .badges
                .latest_name_for_user(user.id())
                .await
                .map_err(map_badge_error)?
                .unwrap_or_else(|| DEFAULT_BADGE.to_owned());
            entries.push(LeaderboardEntry {
                rank: u32::try_from(index + 1).unwrap_or(u32::MAX),
                user_id: *user.id(),
                username: user.username().as_ref().to_owned(),
                xp: user.xp(),
                level: user.level(),
                badge,
            });
        }
        Ok(entries)
    }

    /// Dashboard payload for the current user.
    pub async fn dashboard(&self, actor: &Actor) -> Result<DashboardSummary, Error> {
        let user = policy::require_authenticated(actor)?;

        let upcoming = self
            .sessions
            .list_attending(&user.id, DASHBOARD_UPCOMING)
            .await
            .map_err(map_session_error)?;

        // The viewer RSVP'd to every listed session, so project each with an
        // attending fact rather than refetching the pair.
        let rsvps = self
            .sessions
            .rsvps_for_user(&user.id)
            .await
            .map_err(map_session_error)?;
        let ids: Vec<Uuid> = upcoming.iter().map(|session| session.id()).collect();
        let counts = self
            .sessions
            .rsvp_counts(&ids)
            .await
            .map_err(map_session_error)?;
        let member_group_ids = self
            .groups
            .member_group_ids(&user.id)
            .await
            .map_err(map_group_error)?;

        let upcoming_sessions = upcoming
            .iter()
            .map(|session| {
                let viewer_rsvp = rsvps.iter().find(|rsvp| rsvp.session_id == session.id());
                let viewer_is_member = session
                    .group_id()
                    .is_some_and(|group_id| member_group_ids.contains(&group_id));
                SessionView::project(
                    session,
                    Some(user),
                    counts.get(&session.id()).copied().unwrap_or(0),
                    viewer_rsvp,
                    viewer_is_member,
                )
            })
            .collect();

        let account = self
            .users
            .find_by_id(&user.id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        let stats = DashboardStats {
            sessions_attended: self
                .sessions
                .rsvp_count_for_user(&user.id)
                .await
                .map_err(map_session_error)?,
            groups_joined: self
                .groups
                .joined_count(&user.id)
                .await
                .map_err(map_group_error)?,
            sessions_hosted: self
                .sessions
                .hosted_count(&user.id)
                .await
                .map_err(map_session_error)?,
            xp: account.xp(),
            level: account.level(),
        };

        Ok(DashboardSummary {
            upcoming_sessions,
            stats,
        })
    }

    /// Admin overview: groups bucketed by status plus aggregate totals.
    pub async fn admin_overview(&self, actor: &Actor) -> Result<AdminOverview, Error> {
        policy::require_admin(actor)?;

        let groups = self.groups.list(None).await.map_err(map_group_error)?;
        let ids: Vec<Uuid> = groups.iter().map(StudyGroup::id).collect();
        let counts = self
            .groups
            .member_counts(&ids)
            .await
            .map_err(map_group_error)?;

        let mut pending = Vec::new();
        let mut approved = Vec::new();
        let mut rejected = Vec::new();
        for group in &groups {
            let members_count = counts.get(&group.id()).copied().unwrap_or(0);
            let view = GroupView::project(group, members_count, false);
            match group.status() {
                GroupStatus::Pending => pending.push(view),
                GroupStatus::Approved => approved.push(view),
                GroupStatus::Rejected => rejected.push(view),
            }
        }

        let stats = AdminStats {
            total_groups: groups.len() as u64,
            approved_groups: approved.len() as u64,
            rejected_groups: rejected.len() as u64,
            total_sessions: self
                .sessions
                .total_count()
                .await
                .map_err(map_session_error)?,
            active_sessions: self
                .sessions
                .with_attendees_count()
                .await
                .map_err(map_session_error)?,
        };

        Ok(AdminOverview {
            pending,
            approved,
            rejected,
            stats,
        })
    }

    /// Detailed profile with badges and approved group memberships.
    pub async fn profile(&self, actor: &Actor, user_id: &UserId) -> Result<ProfileView, Error> {
        policy::require_authenticated(actor)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        let badges = self
            .badges
            .list_for_user(user_id)
            .await
            .map_err(map_badge_error)?;

        let groups = self
            .groups
            .approved_groups_for_user(user_id)
            .await
            .map_err(map_group_error)?;
        let ids: Vec<Uuid> = groups.iter().map(StudyGroup::id).collect();
        let counts = self
            .groups
            .member_counts(&ids)
            .await
            .map_err(map_group_error)?;
        let groups = groups
            .iter()
            .map(|group| ProfileGroup {
                id: group.id(),
                name: group.name().to_owned(),
                members_count: counts.get(&group.id()).copied().unwrap_or(0),
            })
            .collect();

        Ok(ProfileView {
            id: *user.id(),
            username: user.username().as_ref().to_owned(),
            email: user.email().to_owned(),
            first_name: user.first_name().map(str::to_owned),
            last_name: user.last_name().map(str::to_owned),
            image: user.image().map(str::to_owned),
            xp: user.xp(),
            level: user.level(),
            is_admin: user.is_admin(),
            badges,
            groups,
            created_at: user.created_at(),
        })
    }
}

#[cfg(test)]
#[path = "reporting_service_tests.rs"]
mod tests;
