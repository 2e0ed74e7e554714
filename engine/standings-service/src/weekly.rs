//! Weekly aggregation: one member's stats for one league+week
//!
//! The member-week row is always rebuilt in full from the member's
//! picks, so recomputing after each of several finalizations in the
//! same week converges on the same row with no double-counting.

use hook::{grade_pick, pick_points, GradeResult, LeagueRules, MemberWeek, PickOutcome};
use hook::{LeagueId, UserId, WeekId};

use crate::store::WeekPickRow;

/// Compute one member's week row from their picks for that week.
///
/// Pushes count as `ties` and `picks_made = correct + incorrect +
/// ties`; picks that cannot be graded yet (game not final, no locked
/// spread) are excluded entirely. The rank field is left at 0 for the
/// rank pass.
pub fn compute_member_week(
    league: LeagueId,
    week: WeekId,
    user: UserId,
    rows: &[&WeekPickRow],
    rules: &LeagueRules,
) -> MemberWeek {
    let mut out = MemberWeek {
        league_id: league,
        week_id: week,
        user_id: user,
        picks_made: 0,
        correct: 0,
        incorrect: 0,
        ties: 0,
        correct_key: 0,
        points: 0,
        rank: 0,
        points_guess: None,
        points_actual: None,
        tiebreak_abs_diff: None,
    };

    for row in rows {
        let result = grade_pick(&row.pick, &row.game, row.locked_spread(), rules);
        let GradeResult::Graded(outcome) = result else {
            continue;
        };
        match outcome {
            PickOutcome::Correct => {
                out.correct += 1;
                if row.pick.is_key_pick {
                    out.correct_key += 1;
                }
            }
            PickOutcome::Incorrect => out.incorrect += 1,
            PickOutcome::Push => out.ties += 1,
        }
        out.points += pick_points(&row.pick, outcome, rules);
    }
    out.picks_made = out.correct + out.incorrect + out.ties;

    if rules.tiebreaker == hook::Tiebreaker::TotalPointsGuess {
        apply_total_points_tiebreak(&mut out, rows);
    }

    out
}

/// Populate guess/actual/diff from the week's designated total-points
/// game, when the member picked it and the game has scores.
fn apply_total_points_tiebreak(out: &mut MemberWeek, rows: &[&WeekPickRow]) {
    let Some(row) = rows
        .iter()
        .find(|r| r.league_game.as_ref().is_some_and(|lg| lg.is_total_points_game))
    else {
        return;
    };
    out.points_guess = row.pick.points_guess;
    out.points_actual = row.game.actual_total();
    if let (Some(guess), Some(actual)) = (out.points_guess, out.points_actual) {
        out.tiebreak_abs_diff = Some((guess - actual).abs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hook::{Game, LeagueGame, Pick, Tiebreaker};
    use rust_decimal::Decimal;

    fn game(id: u64, home: i32, away: i32, is_final: bool) -> Game {
        Game {
            id,
            season_id: 2025,
            week_id: 1,
            home_team_id: 100,
            away_team_id: 200,
            kickoff: Utc::now(),
            home_score: is_final.then_some(home),
            away_score: is_final.then_some(away),
            is_final,
        }
    }

    fn row(pick_id: u64, game: Game, spread: i64, picked: u32, is_key: bool) -> WeekPickRow {
        WeekPickRow {
            pick: Pick {
                id: pick_id,
                league_id: 1,
                game_id: game.id,
                user_id: 10,
                picked_team_id: picked,
                is_key_pick: is_key,
                is_correct: None,
                points_guess: None,
                is_total_points_game: false,
            },
            league_game: Some(LeagueGame {
                league_id: 1,
                game_id: game.id,
                locked_home_spread: Some(Decimal::from(spread)),
                is_total_points_game: false,
                is_active: true,
            }),
            game,
        }
    }

    #[test]
    fn test_counts_and_points_from_mixed_outcomes() {
        let rules = LeagueRules::default();
        let rows = vec![
            // home -3, wins by 4: correct key pick, 2 points
            row(1, game(1, 24, 20, true), -3, 100, true),
            // home -7, wins by 4: incorrect
            row(2, game(2, 24, 20, true), -7, 100, false),
            // home -4, wins by 4: push
            row(3, game(3, 24, 20, true), -4, 100, false),
            // not final: excluded
            row(4, game(4, 0, 0, false), -3, 100, false),
        ];
        let refs: Vec<&WeekPickRow> = rows.iter().collect();
        let mw = compute_member_week(1, 1, 10, &refs, &rules);

        assert_eq!(mw.correct, 1);
        assert_eq!(mw.incorrect, 1);
        assert_eq!(mw.ties, 1);
        assert_eq!(mw.correct_key, 1);
        assert_eq!(mw.picks_made, 3);
        assert_eq!(mw.points, 2);
        assert_eq!(mw.rank, 0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let rules = LeagueRules::default();
        let rows = vec![
            row(1, game(1, 24, 20, true), -3, 100, false),
            row(2, game(2, 17, 27, true), 3, 200, true),
        ];
        let refs: Vec<&WeekPickRow> = rows.iter().collect();
        let first = compute_member_week(1, 1, 10, &refs, &rules);
        let second = compute_member_week(1, 1, 10, &refs, &rules);
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_points_tiebreak_populated() {
        let rules =
            LeagueRules { tiebreaker: Tiebreaker::TotalPointsGuess, ..Default::default() };
        let mut tb_row = row(1, game(1, 24, 20, true), -3, 100, false);
        tb_row.pick.points_guess = Some(51);
        tb_row.pick.is_total_points_game = true;
        tb_row.league_game.as_mut().unwrap().is_total_points_game = true;

        let rows = vec![tb_row, row(2, game(2, 24, 20, true), -3, 100, false)];
        let refs: Vec<&WeekPickRow> = rows.iter().collect();
        let mw = compute_member_week(1, 1, 10, &refs, &rules);

        assert_eq!(mw.points_guess, Some(51));
        assert_eq!(mw.points_actual, Some(44));
        assert_eq!(mw.tiebreak_abs_diff, Some(7));
    }

    #[test]
    fn test_missing_spread_leaves_pick_ungraded() {
        let rules = LeagueRules::default();
        let mut no_spread = row(1, game(1, 24, 20, true), 0, 100, false);
        no_spread.league_game.as_mut().unwrap().locked_home_spread = None;

        let rows = vec![no_spread];
        let refs: Vec<&WeekPickRow> = rows.iter().collect();
        let mw = compute_member_week(1, 1, 10, &refs, &rules);
        assert_eq!(mw.picks_made, 0);
        assert_eq!(mw.points, 0);
    }
}
