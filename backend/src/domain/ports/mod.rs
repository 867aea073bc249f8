//! Domain ports for the hexagonal boundary.
//!
//! Services depend on these traits; `outbound::persistence` provides the
//! Diesel-backed adapters. Every port carries a `mockall` automock for unit
//! tests.

mod badge_repository;
mod collab_repository;
mod group_repository;
mod session_repository;
mod user_repository;

#[cfg(test)]
pub use badge_repository::MockBadgeRepository;
pub use badge_repository::{BadgeRepository, BadgeRepositoryError, FixtureBadgeRepository};
#[cfg(test)]
pub use collab_repository::MockCollabRepository;
pub use collab_repository::{CollabRepository, CollabRepositoryError};
#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::{GroupRepository, GroupRepositoryError};
#[cfg(test)]
pub use session_repository::MockSessionRepository;
pub use session_repository::{SessionRepository, SessionRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError, XpAwardOutcome};
