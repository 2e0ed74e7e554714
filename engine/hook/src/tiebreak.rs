//! Tiebreak keys for weekly and season standings
//!
//! A `TiebreakKey` is an ordered pair compared lexicographically;
//! larger sorts as better. The rank assigner combines it with the
//! primary points metric, so a key may repeat points without harm.

use crate::config::{LeagueRules, Tiebreaker};
use crate::types::MemberWeek;

/// Secondary comparison key used when points are tied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TiebreakKey(pub i64, pub i64);

/// Tiebreak key for one member's week under the league's configured
/// mode.
///
/// For `TotalPointsGuess`, a smaller absolute difference from the
/// actual combined score is better, hence the negation; a member with
/// no guess (or no graded tiebreaker game) sorts last.
pub fn week_key(week: &MemberWeek, rules: &LeagueRules) -> TiebreakKey {
    match rules.tiebreaker {
        Tiebreaker::CorrectKeyPicks => {
            TiebreakKey(i64::from(week.correct_key), i64::from(week.points))
        }
        Tiebreaker::TotalPointsGuess => {
            let closeness = match week.tiebreak_abs_diff {
                Some(diff) => -i64::from(diff),
                None => i64::MIN,
            };
            TiebreakKey(closeness, i64::from(week.correct_key))
        }
        Tiebreaker::CorrectPicks => {
            TiebreakKey(i64::from(week.correct), i64::from(week.points))
        }
        Tiebreaker::None => TiebreakKey(i64::from(week.points), i64::from(week.correct)),
    }
}

/// Tiebreak key for season standings, computed from either full or
/// drop-adjusted totals.
///
/// There is no season-level total-points guess, so `TotalPointsGuess`
/// falls back to correct-pick count, as does `None`.
pub fn season_key(points: i32, correct: u32, correct_key: u32, rules: &LeagueRules) -> TiebreakKey {
    match rules.tiebreaker {
        Tiebreaker::CorrectKeyPicks => TiebreakKey(i64::from(correct_key), i64::from(points)),
        Tiebreaker::CorrectPicks | Tiebreaker::TotalPointsGuess | Tiebreaker::None => {
            TiebreakKey(i64::from(correct), i64::from(points))
        }
    }
}

/// Ascending ordering key used to find a member's worst weeks for the
/// drop-weeks adjustment. The first `drop_weeks` entries under this
/// ordering are the ones dropped.
pub fn drop_week_key(week: &MemberWeek, rules: &LeagueRules) -> (i64, i64) {
    match rules.tiebreaker {
        Tiebreaker::CorrectKeyPicks => (i64::from(week.points), i64::from(week.correct_key)),
        _ => (i64::from(week.points), i64::from(week.correct)),
    }
}
