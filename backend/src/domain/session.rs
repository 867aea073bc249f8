//! Study session aggregate and its verification secret.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// Validation errors returned by the session constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionValidationError {
    EmptyTitle,
    TitleTooLong { max: usize },
    EmptyCourseCode,
    EmptyLocation,
    InvalidVerificationCode,
}

impl fmt::Display for SessionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "session title must not be empty"),
            Self::TitleTooLong { max } => {
                write!(f, "session title must be at most {max} characters")
            }
            Self::EmptyCourseCode => write!(f, "course code must not be empty"),
            Self::EmptyLocation => write!(f, "session location must not be empty"),
            Self::InvalidVerificationCode => {
                write!(f, "verification code must be exactly six decimal digits")
            }
        }
    }
}

impl std::error::Error for SessionValidationError {}

/// Maximum allowed length for a session title.
pub const SESSION_TITLE_MAX: usize = 120;

/// Number of digits in a verification code.
pub const VERIFICATION_CODE_LEN: usize = 6;

/// Shared attendance secret handed out by the host.
///
/// Exactly six decimal digits; leading zeros are allowed and collisions
/// across sessions are acceptable. The code never expires, which makes it a
/// weak secret by construction; hardening it is out of scope here.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Validate and wrap a stored code.
    pub fn new(code: impl Into<String>) -> Result<Self, SessionValidationError> {
        let code = code.into();
        let valid = code.chars().count() == VERIFICATION_CODE_LEN
            && code.chars().all(|c| c.is_ascii_digit());
        if !valid {
            return Err(SessionValidationError::InvalidVerificationCode);
        }
        Ok(Self(code))
    }

    /// Generate a fresh random code from the given source of randomness.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let code = (0..VERIFICATION_CODE_LEN)
            .map(|_| char::from(b'0' + rng.gen_range(0..10)))
            .collect();
        Self(code)
    }

    /// Generate a fresh random code from the thread-local generator.
    pub fn random() -> Self {
        Self::generate(&mut rand::thread_rng())
    }

    /// The digits as stored; only ever shown to the session host.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Exact string comparison against a caller-submitted code.
    pub fn matches(&self, submitted: &str) -> bool {
        self.0 == submitted
    }
}

impl fmt::Debug for VerificationCode {
    // The code is a secret; keep it out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode(******)")
    }
}

impl From<VerificationCode> for String {
    fn from(value: VerificationCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for VerificationCode {
    type Error = SessionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Caller-provided fields for creating or updating a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub title: String,
    pub course_code: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    /// `None` means the session is open to every authenticated user.
    pub group_id: Option<Uuid>,
}

impl SessionDraft {
    /// Validate the draft fields.
    pub fn validate(&self) -> Result<(), SessionValidationError> {
        if self.title.trim().is_empty() {
            return Err(SessionValidationError::EmptyTitle);
        }
        if self.title.chars().count() > SESSION_TITLE_MAX {
            return Err(SessionValidationError::TitleTooLong {
                max: SESSION_TITLE_MAX,
            });
        }
        if self.course_code.trim().is_empty() {
            return Err(SessionValidationError::EmptyCourseCode);
        }
        if self.location.trim().is_empty() {
            return Err(SessionValidationError::EmptyLocation);
        }
        Ok(())
    }
}

/// A scheduled study session.
///
/// ## Invariants
/// - `host_id` is immutable after creation.
/// - `verification_code` is generated at creation and visible only to the
///   host through view projections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySession {
    id: Uuid,
    title: String,
    course_code: String,
    description: String,
    date: NaiveDate,
    time: NaiveTime,
    location: String,
    host_id: UserId,
    group_id: Option<Uuid>,
    verification_code: VerificationCode,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StudySession {
    /// Create a new session from a validated draft, minting a fresh
    /// verification code.
    pub fn create(host_id: UserId, draft: SessionDraft) -> Result<Self, SessionValidationError> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: draft.title,
            course_code: draft.course_code,
            description: draft.description,
            date: draft.date,
            time: draft.time,
            location: draft.location,
            host_id,
            group_id: draft.group_id,
            verification_code: VerificationCode::random(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a session from persisted state.
    pub fn from_parts(
        id: Uuid,
        draft: SessionDraft,
        host_id: UserId,
        verification_code: VerificationCode,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: draft.title,
            course_code: draft.course_code,
            description: draft.description,
            date: draft.date,
            time: draft.time,
            location: draft.location,
            host_id,
            group_id: draft.group_id,
            verification_code,
            created_at,
            updated_at,
        }
    }

    /// Apply an update draft, preserving identity, host, and code.
    pub fn apply(&mut self, draft: SessionDraft) -> Result<(), SessionValidationError> {
        draft.validate()?;
        self.title = draft.title;
        self.course_code = draft.course_code;
        self.description = draft.description;
        self.date = draft.date;
        self.time = draft.time;
        self.location = draft.location;
        self.group_id = draft.group_id;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn course_code(&self) -> &str {
        self.course_code.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn location(&self) -> &str {
        self.location.as_str()
    }

    /// The user who created the session; immutable after creation.
    pub fn host_id(&self) -> &UserId {
        &self.host_id
    }

    /// Owning group, or `None` for a session open to everyone.
    pub fn group_id(&self) -> Option<Uuid> {
        self.group_id
    }

    /// The attendance secret. Callers must project it away for non-hosts.
    pub fn verification_code(&self) -> &VerificationCode {
        &self.verification_code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
