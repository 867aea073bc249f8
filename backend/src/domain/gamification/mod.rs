//! Gamification policy: XP reward table and level curve.
//!
//! Reward amounts and level thresholds are policy, not contract; both are
//! injectable and can be overridden through [`config::GamificationSettings`].
//! The engine itself is stateless — the atomic increment-then-recompute
//! happens behind the user repository port.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod config;

/// Action kinds that earn XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpAction {
    CreateSession,
    CreateGroup,
    JoinGroup,
    RsvpSession,
}

impl fmt::Display for XpAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateSession => "create_session",
            Self::CreateGroup => "create_group",
            Self::JoinGroup => "join_group",
            Self::RsvpSession => "rsvp_session",
        };
        f.write_str(name)
    }
}

/// Errors raised when constructing gamification policy values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyValidationError {
    /// A reward amount was zero.
    #[error("reward for {action} must be a positive amount")]
    ZeroReward { action: XpAction },
    /// The threshold table was empty.
    #[error("level curve requires at least one threshold")]
    EmptyCurve,
    /// The threshold table did not start at zero.
    #[error("level curve must start at zero XP")]
    MissingBaseThreshold,
    /// The threshold table was not strictly ascending.
    #[error("level curve thresholds must be strictly ascending")]
    NonAscendingCurve,
}

/// Fixed positive XP amount per qualifying action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpRewards {
    create_session: u32,
    create_group: u32,
    join_group: u32,
    rsvp_session: u32,
}

impl XpRewards {
    /// Build a reward table, rejecting zero amounts.
    pub fn new(
        create_session: u32,
        create_group: u32,
        join_group: u32,
        rsvp_session: u32,
    ) -> Result<Self, PolicyValidationError> {
        for (action, amount) in [
            (XpAction::CreateSession, create_session),
            (XpAction::CreateGroup, create_group),
            (XpAction::JoinGroup, join_group),
            (XpAction::RsvpSession, rsvp_session),
        ] {
            if amount == 0 {
                return Err(PolicyValidationError::ZeroReward { action });
            }
        }
        Ok(Self {
            create_session,
            create_group,
            join_group,
            rsvp_session,
        })
    }

    /// Amount awarded for the given action.
    pub fn amount_for(&self, action: XpAction) -> u32 {
        match action {
            XpAction::CreateSession => self.create_session,
            XpAction::CreateGroup => self.create_group,
            XpAction::JoinGroup => self.join_group,
            XpAction::RsvpSession => self.rsvp_session,
        }
    }
}

impl Default for XpRewards {
    fn default() -> Self {
        Self {
            create_session: 20,
            create_group: 25,
            join_group: 10,
            rsvp_session: 15,
        }
    }
}

/// Monotonic step function from cumulative XP to level.
///
/// `thresholds[i]` is the minimum XP for level `i + 1`; the table starts at
/// zero and ascends strictly, so levels never decrease as XP grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct LevelCurve {
    thresholds: Vec<u32>,
}

impl LevelCurve {
    /// Build a curve from an ascending threshold table starting at zero.
    pub fn new(thresholds: Vec<u32>) -> Result<Self, PolicyValidationError> {
        let Some(&first) = thresholds.first() else {
            return Err(PolicyValidationError::EmptyCurve);
        };
        if first != 0 {
            return Err(PolicyValidationError::MissingBaseThreshold);
        }
        if thresholds.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(PolicyValidationError::NonAscendingCurve);
        }
        Ok(Self { thresholds })
    }

    /// The level reached with `xp` cumulative experience points.
    pub fn level_for_xp(&self, xp: u32) -> u32 {
        let reached = self
            .thresholds
            .iter()
            .take_while(|&&threshold| threshold <= xp)
            .count();
        u32::try_from(reached).unwrap_or(u32::MAX)
    }

    /// The threshold table.
    pub fn thresholds(&self) -> &[u32] {
        &self.thresholds
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            thresholds: vec![0, 100, 250, 500, 1000, 1750, 2750, 4000, 5500, 7500],
        }
    }
}

impl From<LevelCurve> for Vec<u32> {
    fn from(value: LevelCurve) -> Self {
        value.thresholds
    }
}

impl TryFrom<Vec<u32>> for LevelCurve {
    type Error = PolicyValidationError;

    fn try_from(value: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
