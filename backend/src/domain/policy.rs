//! Access policy capability checks.
//!
//! Each check is a pure function over the actor and already-loaded resource
//! facts, independent of storage. Services consult a check before every gated
//! mutation and surface the returned [`Error`] unchanged; a denied check is
//! never silently ignored.

use crate::domain::{Actor, CurrentUser, Error, SessionResource, StudyGroup, StudySession, UserId};

/// Require an authenticated actor, returning the resolved identity.
pub fn require_authenticated(actor: &Actor) -> Result<&CurrentUser, Error> {
    actor
        .current_user()
        .ok_or_else(|| Error::unauthorized("authentication required"))
}

/// Require an authenticated admin actor.
pub fn require_admin(actor: &Actor) -> Result<&CurrentUser, Error> {
    let user = require_authenticated(actor)?;
    if !user.is_admin {
        return Err(Error::forbidden("admin privileges required"));
    }
    Ok(user)
}

/// Host-or-read-only: only the host may mutate a session.
pub fn require_session_host(user: &CurrentUser, session: &StudySession) -> Result<(), Error> {
    if session.host_id() != &user.id {
        return Err(Error::forbidden(
            "only the session host may modify this session",
        ));
    }
    Ok(())
}

/// Creator-or-read-only: only the creator may mutate a group.
pub fn require_group_creator(user: &CurrentUser, group: &StudyGroup) -> Result<(), Error> {
    if group.creator_id() != &user.id {
        return Err(Error::forbidden(
            "only the group creator may modify this group",
        ));
    }
    Ok(())
}

/// Attendance gate for chat and resources: the caller must hold an RSVP on
/// the session (verified or not).
pub fn require_session_attendee(has_rsvp: bool) -> Result<(), Error> {
    if !has_rsvp {
        return Err(Error::forbidden(
            "you must be attending this session to use this feature",
        ));
    }
    Ok(())
}

/// Whether `user_id` may delete the resource: its owner or the session host.
pub fn may_delete_resource(
    user_id: &UserId,
    session: &StudySession,
    resource: &SessionResource,
) -> bool {
    resource.added_by_id() == user_id || session.host_id() == user_id
}

/// Resource deletion check built on [`may_delete_resource`].
pub fn require_resource_delete(
    user: &CurrentUser,
    session: &StudySession,
    resource: &SessionResource,
) -> Result<(), Error> {
    if !may_delete_resource(&user.id, session, resource) {
        return Err(Error::forbidden(
            "only the session host or resource owner can delete this resource",
        ));
    }
    Ok(())
}

/// Group-membership visibility rule for sessions.
///
/// Sessions without a group are open to every authenticated viewer; sessions
/// bound to a group are only "member-visible" when the viewer holds a
/// membership in that group.
pub fn is_group_member_for_session(session: &StudySession, membership_exists: bool) -> bool {
    match session.group_id() {
        None => true,
        Some(_) => membership_exists,
    }
}
