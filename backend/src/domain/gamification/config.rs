//! Gamification policy configuration loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use super::{LevelCurve, PolicyValidationError, XpRewards};

/// Configuration values overriding the default reward table and level curve.
///
/// Values resolve through the usual layering (CLI, environment with the
/// `GAMIFICATION_` prefix, config file); unset values fall back to the
/// defaults baked into [`XpRewards`] and [`LevelCurve`].
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GAMIFICATION")]
pub struct GamificationSettings {
    /// XP awarded for hosting a new session.
    pub create_session_xp: Option<u32>,
    /// XP awarded for creating a group.
    pub create_group_xp: Option<u32>,
    /// XP awarded for joining an approved group.
    pub join_group_xp: Option<u32>,
    /// XP awarded for verified session attendance.
    pub rsvp_session_xp: Option<u32>,
    /// Ascending XP thresholds, one per level, starting at zero.
    pub level_thresholds: Option<Vec<u32>>,
}

impl GamificationSettings {
    /// Resolve the reward table, rejecting zero amounts.
    pub fn rewards(&self) -> Result<XpRewards, PolicyValidationError> {
        let defaults = XpRewards::default();
        XpRewards::new(
            self.create_session_xp
                .unwrap_or_else(|| defaults.amount_for(super::XpAction::CreateSession)),
            self.create_group_xp
                .unwrap_or_else(|| defaults.amount_for(super::XpAction::CreateGroup)),
            self.join_group_xp
                .unwrap_or_else(|| defaults.amount_for(super::XpAction::JoinGroup)),
            self.rsvp_session_xp
                .unwrap_or_else(|| defaults.amount_for(super::XpAction::RsvpSession)),
        )
    }

    /// Resolve the level curve, rejecting malformed threshold tables.
    pub fn level_curve(&self) -> Result<LevelCurve, PolicyValidationError> {
        match &self.level_thresholds {
            Some(thresholds) => LevelCurve::new(thresholds.clone()),
            None => Ok(LevelCurve::default()),
        }
    }
}
