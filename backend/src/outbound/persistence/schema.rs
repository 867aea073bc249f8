//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// User accounts with gamification counters.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        image -> Nullable<Varchar>,
        /// Cumulative experience points; only grows.
        xp -> Int4,
        /// Level derived from `xp` via the configured curve.
        level -> Int4,
        is_admin -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Study groups gated by the admin approval workflow.
    study_groups (id) {
        id -> Uuid,
        name -> Varchar,
        subject -> Varchar,
        description -> Text,
        creator_id -> Uuid,
        /// One of `pending`, `approved`, `rejected`.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Membership ledger; the composite key enforces one row per pair.
    group_memberships (user_id, group_id) {
        user_id -> Uuid,
        group_id -> Uuid,
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Scheduled study sessions, optionally bound to a group.
    study_sessions (id) {
        id -> Uuid,
        title -> Varchar,
        course_code -> Varchar,
        description -> Text,
        date -> Date,
        time -> Time,
        location -> Varchar,
        host_id -> Uuid,
        group_id -> Nullable<Uuid>,
        /// Six decimal digits; shown only to the host.
        verification_code -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// RSVP ledger; the composite key enforces one row per pair.
    session_rsvps (user_id, session_id) {
        user_id -> Uuid,
        session_id -> Uuid,
        /// Flips false→true exactly once, via code verification.
        attended -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only session chat log.
    session_messages (id) {
        id -> Uuid,
        session_id -> Uuid,
        sender_id -> Uuid,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shared resource links per session.
    session_resources (id) {
        id -> Uuid,
        session_id -> Uuid,
        title -> Varchar,
        link -> Varchar,
        added_by_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Externally awarded badges, surfaced read-only.
    badges (id) {
        id -> Uuid,
        user_id -> Uuid,
        name -> Varchar,
        icon -> Varchar,
        color -> Varchar,
        bg_color -> Varchar,
        earned_at -> Timestamptz,
    }
}
