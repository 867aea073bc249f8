//! Domain entities, policies, and services.
//!
//! Purpose: strongly typed aggregates for the study coordination core
//! (groups, sessions, memberships, RSVPs, collaboration surfaces), the
//! access policy capability checks, the gamification policy, and the
//! services implementing every operation over the ports in [`ports`].
//!
//! Keep entities immutable where possible and document invariants in each
//! type's Rustdoc; inbound adapters talk to the services, never to the
//! ports directly.

pub mod actor;
pub mod badge;
pub mod collab;
pub mod collab_service;
pub mod error;
pub mod gamification;
pub mod group;
pub mod group_service;
pub mod membership;
pub mod policy;
pub mod ports;
pub mod reporting_service;
pub mod session;
pub mod session_service;
pub mod user;
pub mod views;

pub use self::actor::{Actor, CurrentUser};
pub use self::badge::Badge;
pub use self::collab::{CollabValidationError, SessionMessage, SessionResource};
pub use self::collab_service::CollabService;
pub use self::error::{Error, ErrorCode};
pub use self::group::{GroupDraft, GroupStatus, GroupValidationError, StudyGroup};
pub use self::group_service::GroupService;
pub use self::membership::{GroupMembership, SessionRsvp};
pub use self::reporting_service::{LeaderboardPeriod, ReportingService};
pub use self::session::{
    SessionDraft, SessionValidationError, StudySession, VerificationCode,
};
pub use self::session_service::SessionService;
pub use self::user::{User, UserDraft, UserId, UserValidationError, Username};
pub use self::views::{
    AdminOverview, AdminStats, DashboardStats, DashboardSummary, GroupView, LeaderboardEntry,
    MessageView, ProfileGroup, ProfileView, ResourceView, SessionView, XpAwarded,
};

/// Convenient result alias for service operations.
pub type OpResult<T> = Result<T, Error>;
