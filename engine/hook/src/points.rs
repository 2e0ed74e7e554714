//! Points calculator for graded picks

use crate::config::LeagueRules;
use crate::grading::PickOutcome;
use crate::types::Pick;

/// Points earned by one graded pick.
///
/// Incorrect and pushed picks score zero. A correct pick earns
/// `points_per_correct_pick`, plus the key-pick bonus when the pick is
/// flagged and key picks are enabled. The per-week key-pick cap is
/// enforced at submission time, so the stored flag is trusted here.
pub fn pick_points(pick: &Pick, outcome: PickOutcome, rules: &LeagueRules) -> i32 {
    match outcome {
        PickOutcome::Correct => {
            let mut points = rules.points_per_correct_pick;
            if pick.is_key_pick && rules.key_picks_enabled {
                points += rules.key_pick_extra_points;
            }
            points
        }
        PickOutcome::Incorrect | PickOutcome::Push => 0,
    }
}
