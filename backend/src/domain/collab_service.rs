//! Collaboration services: session chat and shared resources.
//!
//! Both surfaces are gated on attendance — the caller must hold an RSVP on
//! the session (verified or not). Resource deletion additionally requires
//! the owner-or-host capability.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::ports::{
    CollabRepository, CollabRepositoryError, SessionRepository, SessionRepositoryError,
};
use crate::domain::{
    Actor, CurrentUser, Error, MessageView, ResourceView, SessionMessage, SessionResource,
    StudySession, policy,
};

fn map_collab_error(error: CollabRepositoryError) -> Error {
    match error {
        CollabRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("collaboration repository unavailable: {message}"))
        }
        CollabRepositoryError::Query { message } => {
            Error::internal(format!("collaboration repository error: {message}"))
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

/// Collaboration service over the collaboration and session ports.
#[derive(Clone)]
pub struct CollabService<C, S> {
    collab: Arc<C>,
    sessions: Arc<S>,
}

impl<C, S> CollabService<C, S> {
    /// Create a new service with the given repositories.
    pub fn new(collab: Arc<C>, sessions: Arc<S>) -> Self {
        Self { collab, sessions }
    }
}

impl<C, S> CollabService<C, S>
where
    C: CollabRepository,
    S: SessionRepository,
{
    /// Messages for a session, ascending by creation time. Attendees only.
    pub async fn list_messages(
        &self,
        actor: &Actor,
        session_id: &Uuid,
    ) -> Result<Vec<MessageView>, Error> {
        let (user, session) = self.require_attendee(actor, session_id).await?;

        let messages = self
            .collab
            .list_messages(&session.id())
            .await
            .map_err(map_collab_error)?;
        Ok(messages
            .iter()
            .map(|message| MessageView::project(message, user))
            .collect())
    }

    /// Append a message to the session chat. Attendees only.
    pub async fn send_message(
        &self,
        actor: &Actor,
        session_id: &Uuid,
        body: &str,
    ) -> Result<MessageView, Error> {
        let (user, session) = self.require_attendee(actor, session_id).await?;

        let message = SessionMessage::new(session.id(), user.id, body)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.collab
            .append_message(&message)
            .await
            .map_err(map_collab_error)?;

        Ok(MessageView::project(&message, user))
    }

    /// Resources shared on a session. Attendees only.
    pub async fn list_resources(
        &self,
        actor: &Actor,
        session_id: &Uuid,
    ) -> Result<Vec<ResourceView>, Error> {
        let (user, session) = self.require_attendee(actor, session_id).await?;

        let resources = self
            .collab
            .list_resources(&session.id())
            .await
            .map_err(map_collab_error)?;
        Ok(resources
            .iter()
            .map(|resource| ResourceView::project(resource, &session, user))
            .collect())
    }

    /// Share a resource on a session. Attendees only.
    pub async fn add_resource(
        &self,
        actor: &Actor,
        session_id: &Uuid,
        title: &str,
        link: &str,
    ) -> Result<ResourceView, Error> {
        let (user, session) = self.require_attendee(actor, session_id).await?;

        let resource = SessionResource::new(session.id(), user.id, title, link)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.collab
            .add_resource(&resource)
            .await
            .map_err(map_collab_error)?;

        Ok(ResourceView::project(&resource, &session, user))
    }

    /// Delete a resource. Permitted for its owner or the session host.
    pub async fn delete_resource(
        &self,
        actor: &Actor,
        session_id: &Uuid,
        resource_id: &Uuid,
    ) -> Result<(), Error> {
        let user = policy::require_authenticated(actor)?;
        let session = self.find_session(session_id).await?;

        let resource = self
            .collab
            .find_resource(&session.id(), resource_id)
            .await
            .map_err(map_collab_error)?
            .ok_or_else(|| Error::not_found("resource not found"))?;

        policy::require_resource_delete(user, &session, &resource)?;

        let deleted = self
            .collab
            .delete_resource(resource_id)
            .await
            .map_err(map_collab_error)?;
        if !deleted {
            return Err(Error::not_found("resource not found"));
        }
        Ok(())
    }

    async fn find_session(&self, session_id: &Uuid) -> Result<StudySession, Error> {
        self.sessions
            .find_by_id(session_id)
            .await
            .map_err(map_session_error)?
            .ok_or_else(|| Error::not_found("session not found"))
    }

    /// Resolve the actor and enforce the attendance gate for the session.
    async fn require_attendee<'a>(
        &self,
        actor: &'a Actor,
        session_id: &Uuid,
    ) -> Result<(&'a CurrentUser, StudySession), Error> {
        let user = policy::require_authenticated(actor)?;
        let session = self.find_session(session_id).await?;

        let has_rsvp = self
            .sessions
            .find_rsvp(&user.id, &session.id())
            .await
            .map_err(map_session_error)?
            .is_some();
        policy::require_session_attendee(has_rsvp)?;

        Ok((user, session))
    }
}

#[cfg(test)]
#[path = "collab_service_tests.rs"]
mod tests;
