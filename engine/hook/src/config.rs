//! League scoring configuration
//!
//! One `LeagueRules` exists per league+season. It is an immutable
//! value passed by value into each scoring function so nothing can
//! mutate the rules between grading and aggregation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How ties in the weekly/season points standings are broken.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tiebreaker {
    /// Points only; correct-pick count as the fallback.
    #[default]
    None = 0,
    CorrectKeyPicks = 1,
    /// Closest guess at a designated game's combined score.
    TotalPointsGuess = 2,
    CorrectPicks = 3,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesError {
    #[error("points_per_correct_pick must be non-negative")]
    NegativePickPoints,
    #[error("key_pick_extra_points must be non-negative")]
    NegativeKeyBonus,
}

/// Scoring and structural configuration for one league+season.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueRules {
    pub points_per_correct_pick: i32,
    pub key_pick_extra_points: i32,
    pub key_picks_enabled: bool,
    /// Max key picks a member may flag per week. Enforced at
    /// submission time; grading trusts the stored flag.
    pub number_of_key_picks: u32,
    /// When false, grading is straight-up winner instead of
    /// spread-cover.
    pub against_the_spread_enabled: bool,
    /// When true, spreads are hooked off whole numbers before
    /// grading, which eliminates pushes.
    pub force_hooks: bool,
    pub tiebreaker: Tiebreaker,
    /// Worst-performing weeks excluded from adjusted season standings.
    pub drop_weeks: u32,
}

impl Default for LeagueRules {
    fn default() -> Self {
        Self {
            points_per_correct_pick: 1,
            key_pick_extra_points: 1,
            key_picks_enabled: true,
            number_of_key_picks: 1,
            against_the_spread_enabled: true,
            force_hooks: false,
            tiebreaker: Tiebreaker::None,
            drop_weeks: 0,
        }
    }
}

impl LeagueRules {
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.points_per_correct_pick < 0 {
            return Err(RulesError::NegativePickPoints);
        }
        if self.key_pick_extra_points < 0 {
            return Err(RulesError::NegativeKeyBonus);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        assert!(LeagueRules::default().validate().is_ok());
    }

    #[test]
    fn test_negative_points_rejected() {
        let rules = LeagueRules { points_per_correct_pick: -1, ..Default::default() };
        assert_eq!(rules.validate(), Err(RulesError::NegativePickPoints));

        let rules = LeagueRules { key_pick_extra_points: -2, ..Default::default() };
        assert_eq!(rules.validate(), Err(RulesError::NegativeKeyBonus));
    }
}
