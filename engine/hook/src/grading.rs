//! Grading engine: decides whether a pick beat the locked spread
//!
//! Grading is a pure function of the finished game, the pick, the
//! league's locked home spread, and the league rules. The caller owns
//! persistence and the write-once rule for `Pick::is_correct`.

use rust_decimal::Decimal;

use crate::config::LeagueRules;
use crate::types::{Game, Pick};

/// Win/loss/void outcome of a graded pick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PickOutcome {
    Correct,
    Incorrect,
    /// Margin landed exactly on the spread (or the game tied in
    /// straight-up mode). The pick is voided: no win, no loss.
    Push,
}

impl PickOutcome {
    /// The value to persist into `Pick::is_correct`. A push stays
    /// `None` permanently.
    pub fn as_correct_flag(self) -> Option<bool> {
        match self {
            PickOutcome::Correct => Some(true),
            PickOutcome::Incorrect => Some(false),
            PickOutcome::Push => None,
        }
    }
}

/// Result of a grading attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradeResult {
    /// Game not final, a score missing, or (in spread mode) no locked
    /// spread for this league. The pick stays ungraded.
    NotGradable,
    Graded(PickOutcome),
}

/// Hook a spread off whole numbers so it cannot push.
///
/// Rounds to the nearest half point away from the push zone: a whole
/// spread `s` becomes `s + 0.5` (or `s - 0.5` when home is favored),
/// fractional spreads round up in magnitude to the next `.5`, and a
/// pick'em (0) is left alone.
pub fn apply_hook(spread: Decimal) -> Decimal {
    if spread.is_zero() {
        return spread;
    }
    let mut half_points = (spread.abs() * Decimal::TWO).ceil();
    if (half_points % Decimal::TWO).is_zero() {
        // Landed on a whole number of points; push the hook past it.
        half_points += Decimal::ONE;
    }
    let hooked = half_points / Decimal::TWO;
    if spread.is_sign_negative() {
        -hooked
    } else {
        hooked
    }
}

/// Grade one pick against one finished game.
///
/// `locked_home_spread` is the league's frozen line from the home
/// team's perspective (negative = home favored). It is ignored in
/// straight-up mode.
pub fn grade_pick(
    pick: &Pick,
    game: &Game,
    locked_home_spread: Option<Decimal>,
    rules: &LeagueRules,
) -> GradeResult {
    if !game.is_final {
        return GradeResult::NotGradable;
    }
    let (Some(home_score), Some(away_score)) = (game.home_score, game.away_score) else {
        return GradeResult::NotGradable;
    };
    let actual_margin = home_score - away_score;

    if rules.against_the_spread_enabled {
        let Some(mut spread) = locked_home_spread else {
            tracing::debug!(
                pick_id = pick.id,
                game_id = game.id,
                "no locked spread for pick, leaving ungraded"
            );
            return GradeResult::NotGradable;
        };
        if rules.force_hooks {
            spread = apply_hook(spread);
        }

        let margin = Decimal::from(actual_margin);
        // A hooked nonzero spread ends in .5 and can never equal a
        // whole-number margin; a pick'em (0) still pushes on a tie.
        if margin == -spread {
            return GradeResult::Graded(PickOutcome::Push);
        }
        let home_covered = margin > -spread;
        let correct = if pick.picked_team_id == game.home_team_id {
            home_covered
        } else {
            !home_covered
        };
        GradeResult::Graded(if correct { PickOutcome::Correct } else { PickOutcome::Incorrect })
    } else {
        // Straight-up winner; an exact tie voids every pick.
        if actual_margin == 0 {
            return GradeResult::Graded(PickOutcome::Push);
        }
        let home_won = actual_margin > 0;
        let correct = if pick.picked_team_id == game.home_team_id {
            home_won
        } else {
            !home_won
        };
        GradeResult::Graded(if correct { PickOutcome::Correct } else { PickOutcome::Incorrect })
    }
}
