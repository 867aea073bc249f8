//! Diesel/PostgreSQL adapters for the domain ports.
//!
//! Each repository wraps the shared [`DbPool`] and maps pool and Diesel
//! failures into its port's error type; Diesel types never cross into the
//! domain.

mod diesel_badge_repository;
mod diesel_collab_repository;
mod diesel_group_repository;
mod diesel_helpers;
mod diesel_session_repository;
mod diesel_user_repository;
mod models;
mod pool;
pub(crate) mod schema;

pub use diesel_badge_repository::DieselBadgeRepository;
pub use diesel_collab_repository::DieselCollabRepository;
pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_session_repository::DieselSessionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
