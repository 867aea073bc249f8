//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    badges, group_memberships, session_messages, session_resources, session_rsvps, study_groups,
    study_sessions, users,
};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
    pub xp: i32,
    pub level: i32,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub image: Option<&'a str>,
    pub xp: i32,
    pub level: i32,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Study group models
// ---------------------------------------------------------------------------

/// Row struct for reading from the study_groups table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = study_groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub description: String,
    pub creator_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new group records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = study_groups)]
pub(crate) struct NewGroupRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub subject: &'a str,
    pub description: &'a str,
    pub creator_id: Uuid,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for the membership ledger.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = group_memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MembershipRow {
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Study session models
// ---------------------------------------------------------------------------

/// Row struct for reading from the study_sessions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = study_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub id: Uuid,
    pub title: String,
    pub course_code: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub host_id: Uuid,
    pub group_id: Option<Uuid>,
    pub verification_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new session records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = study_sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub course_code: &'a str,
    pub description: &'a str,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: &'a str,
    pub host_id: Uuid,
    pub group_id: Option<Uuid>,
    pub verification_code: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for updating session fields; host and code never change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = study_sessions)]
pub(crate) struct SessionUpdate<'a> {
    pub title: &'a str,
    pub course_code: &'a str,
    pub description: &'a str,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: &'a str,
    pub group_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for the RSVP ledger.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = session_rsvps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RsvpRow {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub attended: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Collaboration models
// ---------------------------------------------------------------------------

/// Row struct for the session chat log.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = session_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for appending chat messages.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = session_messages)]
pub(crate) struct NewMessageRow<'a> {
    pub id: Uuid,
    pub session_id: Uuid,
    pub sender_id: Uuid,
    pub body: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Row struct for shared session resources.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = session_resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ResourceRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub title: String,
    pub link: String,
    pub added_by_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for sharing resources.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = session_resources)]
pub(crate) struct NewResourceRow<'a> {
    pub id: Uuid,
    pub session_id: Uuid,
    pub title: &'a str,
    pub link: &'a str,
    pub added_by_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Badge models
// ---------------------------------------------------------------------------

/// Row struct for reading from the badges table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = badges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BadgeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub bg_color: String,
    pub earned_at: DateTime<Utc>,
}
