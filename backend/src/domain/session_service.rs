//! Session registry and lifecycle services.
//!
//! Implements session creation with code minting, host-gated mutation,
//! per-viewer projection (code redaction, attendance flags), the RSVP flow,
//! and code-verified attendance with its XP side effect.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::gamification::{LevelCurve, XpAction, XpRewards};
use crate::domain::ports::{
    GroupRepository, GroupRepositoryError, SessionRepository, SessionRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    Actor, CurrentUser, Error, SessionDraft, SessionRsvp, SessionView, StudySession, XpAwarded,
    policy,
};

fn map_session_error(error: SessionRepositoryError) -> Error {
    match error {
        SessionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("session repository unavailable: {message}"))
        }
        SessionRepositoryError::Query { message } => {
            Error::internal(format!("session repository error: {message}"))
        }
        SessionRepositoryError::DuplicateRsvp => {
            Error::conflict("you have already RSVP'd to this session")
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

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::Missing { user_id } => {
            Error::internal(format!("user {user_id} vanished during award"))
        }
    }
}

/// Session registry service over the session, group, and user ports.
#[derive(Clone)]
pub struct SessionService<S, G, U> {
    sessions: Arc<S>,
    groups: Arc<G>,
    users: Arc<U>,
    rewards: XpRewards,
    curve: LevelCurve,
}

impl<S, G, U> SessionService<S, G, U> {
    /// Create a new service with the given repositories and policy.
    pub fn new(
        sessions: Arc<S>,
        groups: Arc<G>,
        users: Arc<U>,
        rewards: XpRewards,
        curve: LevelCurve,
    ) -> Self {
        Self {
            sessions,
            groups,
            users,
            rewards,
            curve,
        }
    }
}

impl<S, G, U> SessionService<S, G, U>
where
    S: SessionRepository,
    G: GroupRepository,
    U: UserRepository,
{
    /// Create a session hosted by the actor, minting a verification code
    /// and awarding the `create_session` reward.
    pub async fn create_session(
        &self,
        actor: &Actor,
        draft: SessionDraft,
    ) -> Result<SessionView, Error> {
        let user = policy::require_authenticated(actor)?;

        let session = StudySession::create(user.id, draft)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.sessions
            .create(&session)
            .await
            .map_err(map_session_error)?;

        let amount = self.rewards.amount_for(XpAction::CreateSession);
        self.users
            .award_xp(&user.id, amount, &self.curve)
            .await
            .map_err(map_user_error)?;
        info!(session_id = %session.id(), host_id = %user.id, amount, "session created, xp awarded");

        // Creator is the host, so the projection keeps the code visible.
        self.project_one(Some(user), &session).await
    }

    /// Fetch a session projected for the viewer.
    pub async fn get_session(
        &self,
        actor: &Actor,
        session_id: &Uuid,
    ) -> Result<SessionView, Error> {
        let session = self.find_session(session_id).await?;
        self.project_one(actor.current_user(), &session).await
    }

    /// Every session, projected for the viewer.
    pub async fn list_sessions(&self, actor: &Actor) -> Result<Vec<SessionView>, Error> {
        let sessions = self.sessions.list().await.map_err(map_session_error)?;
        self.project_many(actor.current_user(), sessions).await
    }

    /// Sessions bound to a group, projected for the viewer.
    pub async fn list_sessions_for_group(
        &self,
        actor: &Actor,
        group_id: &Uuid,
    ) -> Result<Vec<SessionView>, Error> {
        let sessions = self
            .sessions
            .list_for_group(group_id)
            .await
            .map_err(map_session_error)?;
        self.project_many(actor.current_user(), sessions).await
    }

    /// Update session fields. Host-only.
    pub async fn update_session(
        &self,
        actor: &Actor,
        session_id: &Uuid,
        draft: SessionDraft,
    ) -> Result<SessionView, Error> {
        let user = policy::require_authenticated(actor)?;
        let mut session = self.find_session(session_id).await?;
        policy::require_session_host(user, &session)?;

        session
            .apply(draft)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.sessions
            .update(&session)
            .await
            .map_err(map_session_error)?;

        self.project_one(Some(user), &session).await
    }

    /// Delete a session. Host-only.
    pub async fn delete_session(&self, actor: &Actor, session_id: &Uuid) -> Result<(), Error> {
        let user = policy::require_authenticated(actor)?;
        let session = self.find_session(session_id).await?;
        policy::require_session_host(user, &session)?;

        let deleted = self
            .sessions
            .delete(&session.id())
            .await
            .map_err(map_session_error)?;
        if !deleted {
            return Err(Error::not_found("session not found"));
        }
        Ok(())
    }

    /// RSVP to a session. Group-bound sessions require membership; no XP is
    /// awarded for mere intent.
    pub async fn rsvp(&self, actor: &Actor, session_id: &Uuid) -> Result<(), Error> {
        let user = policy::require_authenticated(actor)?;
        let session = self.find_session(session_id).await?;

        if let Some(group_id) = session.group_id() {
            let is_member = self
                .groups
                .is_member(&user.id, &group_id)
                .await
                .map_err(map_group_error)?;
            if !is_member {
                return Err(Error::forbidden(
                    "you must join the group before you can RSVP to this session",
                ));
            }
        }

        let rsvp = SessionRsvp::new(user.id, session.id());
        self.sessions
            .create_rsvp(&rsvp)
            .await
            .map_err(map_session_error)?;
        Ok(())
    }

    /// Cancel an RSVP, discarding any attended state. No XP clawback.
    pub async fn cancel_rsvp(&self, actor: &Actor, session_id: &Uuid) -> Result<(), Error> {
        let user = policy::require_authenticated(actor)?;
        let session = self.find_session(session_id).await?;

        let deleted = self
            .sessions
            .delete_rsvp(&user.id, &session.id())
            .await
            .map_err(map_session_error)?;
        if !deleted {
            return Err(Error::not_found("you have not RSVP'd to this session"));
        }
        Ok(())
    }

    /// Verify attendance with the session's code and award the
    /// `rsvp_session` reward.
    ///
    /// The `attended` flag transitions false→true exactly once; the flip is
    /// a conditional update so a concurrent double-submit earns XP only once.
    pub async fn mark_attendance(
        &self,
        actor: &Actor,
        session_id: &Uuid,
        submitted_code: &str,
    ) -> Result<XpAwarded, Error> {
        let user = policy::require_authenticated(actor)?;
        let session = self.find_session(session_id).await?;

        let rsvp = self
            .sessions
            .find_rsvp(&user.id, &session.id())
            .await
            .map_err(map_session_error)?
            .ok_or_else(|| {
                Error::forbidden("you must RSVP to this session before marking attendance")
            })?;
        if rsvp.attended {
            return Err(Error::conflict(
                "you have already marked your attendance for this session",
            ));
        }

        let submitted = submitted_code.trim();
        if submitted.is_empty() {
            return Err(Error::invalid_request("verification code is required"));
        }
        if !session.verification_code().matches(submitted) {
            return Err(Error::invalid_request("invalid verification code"));
        }

        let transitioned = self
            .sessions
            .mark_attended(&user.id, &session.id())
            .await
            .map_err(map_session_error)?;
        if !transitioned {
            return Err(Error::conflict(
                "you have already marked your attendance for this session",
            ));
        }

        let amount = self.rewards.amount_for(XpAction::RsvpSession);
        let outcome = self
            .users
            .award_xp(&user.id, amount, &self.curve)
            .await
            .map_err(map_user_error)?;
        info!(session_id = %session.id(), user_id = %user.id, amount, "attendance verified, xp awarded");

        Ok(XpAwarded {
            xp_earned: amount,
            xp: outcome.xp,
            level: outcome.level,
        })
    }

    async fn find_session(&self, session_id: &Uuid) -> Result<StudySession, Error> {
        self.sessions
            .find_by_id(session_id)
            .await
            .map_err(map_session_error)?
            .ok_or_else(|| Error::not_found("session not found"))
    }

    async fn project_one(
        &self,
        viewer: Option<&CurrentUser>,
        session: &StudySession,
    ) -> Result<SessionView, Error> {
        let attendees_count = self
            .sessions
            .rsvp_count(&session.id())
            .await
            .map_err(map_session_error)?;

        let (viewer_rsvp, viewer_is_member) = match viewer {
            None => (None, false),
            Some(user) => {
                let rsvp = self
                    .sessions
                    .find_rsvp(&user.id, &session.id())
                    .await
                    .map_err(map_session_error)?;
                let is_member = match session.group_id() {
                    Some(group_id) => self
                        .groups
                        .is_member(&user.id, &group_id)
                        .await
                        .map_err(map_group_error)?,
                    None => false,
                };
                (rsvp, is_member)
            }
        };

        Ok(SessionView::project(
            session,
            viewer,
            attendees_count,
            viewer_rsvp.as_ref(),
            viewer_is_member,
        ))
    }

    /// Batch projection that prefetches counts, RSVPs, and memberships to
    /// avoid per-session lookups.
    async fn project_many(
        &self,
        viewer: Option<&CurrentUser>,
        sessions: Vec<StudySession>,
    ) -> Result<Vec<SessionView>, Error> {
        let ids: Vec<Uuid> = sessions.iter().map(StudySession::id).collect();
        let counts = self
            .sessions
            .rsvp_counts(&ids)
            .await
            .map_err(map_session_error)?;

        let (viewer_rsvps, member_group_ids) = match viewer {
            None => (Vec::new(), Vec::new()),
            Some(user) => {
                let rsvps = self
                    .sessions
                    .rsvps_for_user(&user.id)
                    .await
                    .map_err(map_session_error)?;
                let groups = self
                    .groups
                    .member_group_ids(&user.id)
                    .await
                    .map_err(map_group_error)?;
                (rsvps, groups)
            }
        };

        Ok(sessions
            .iter()
            .map(|session| {
                let attendees_count = counts.get(&session.id()).copied().unwrap_or(0);
                let viewer_rsvp = viewer_rsvps
                    .iter()
                    .find(|rsvp| rsvp.session_id == session.id());
                let viewer_is_member = session
                    .group_id()
                    .is_some_and(|group_id| member_group_ids.contains(&group_id));
                SessionView::project(
                    session,
                    viewer,
                    attendees_count,
                    viewer_rsvp,
                    viewer_is_member,
                )
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;
