//! StudySphere backend core.
//!
//! A study-session coordination backend: users create and join study groups
//! behind an admin approval gate, schedule sessions, RSVP, verify attendance
//! with a six-digit code, chat and share resources per session, and earn XP
//! and levels for qualifying actions.
//!
//! The crate is transport agnostic: an external layer resolves an
//! authenticated [`domain::Actor`] and calls the services in [`domain`];
//! persistence adapters live in [`outbound`].

pub mod domain;
pub mod outbound;
