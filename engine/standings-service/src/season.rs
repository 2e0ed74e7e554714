//! Season aggregation and the drop-weeks adjustment
//!
//! Season rows sum a member's qualifying week rows (weeks with at
//! least one finalized league game); the `_dropped` fields hold the
//! contribution of the worst `drop_weeks` weeks so adjusted standings
//! can be read as full minus dropped.

use std::collections::{HashMap, HashSet};

use hook::{drop_week_key, LeagueRules, MemberSeason, MemberWeek};
use hook::{LeagueId, SeasonId, UserId, WeekId};

/// Roll one member's week rows into their season row.
///
/// `week_numbers` maps the season's week ids to their ordering
/// numbers; rows outside `qualifying_weeks` are excluded entirely, not
/// zero-valued. Ranks are left at 0 for the rank pass.
pub fn compute_member_season(
    league: LeagueId,
    season: SeasonId,
    user: UserId,
    member_weeks: &[MemberWeek],
    week_numbers: &HashMap<WeekId, u32>,
    qualifying_weeks: &HashSet<WeekId>,
    rules: &LeagueRules,
) -> MemberSeason {
    let mut qualifying: Vec<&MemberWeek> = member_weeks
        .iter()
        .filter(|mw| qualifying_weeks.contains(&mw.week_id))
        .collect();
    // Week order keeps the drop sort deterministic when weeks tie.
    qualifying.sort_by_key(|mw| week_numbers.get(&mw.week_id).copied().unwrap_or(0));

    let mut out = MemberSeason::empty(league, season, user);
    if qualifying.is_empty() {
        return out;
    }

    for mw in &qualifying {
        out.picks_made += mw.picks_made;
        out.correct += mw.correct;
        out.incorrect += mw.incorrect;
        out.ties += mw.ties;
        out.correct_key += mw.correct_key;
        out.points += mw.points;
        let number = week_numbers.get(&mw.week_id).copied().unwrap_or(0);
        out.through_week = out.through_week.max(number);
    }

    if rules.drop_weeks > 0 && qualifying.len() > rules.drop_weeks as usize {
        qualifying.sort_by_key(|mw| drop_week_key(mw, rules));
        for dropped in qualifying.iter().take(rules.drop_weeks as usize) {
            out.picks_made_dropped += dropped.picks_made;
            out.correct_dropped += dropped.correct;
            out.incorrect_dropped += dropped.incorrect;
            out.ties_dropped += dropped.ties;
            out.correct_key_dropped += dropped.correct_key;
            out.points_dropped += dropped.points;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week_row(week_id: WeekId, points: i32, correct: u32) -> MemberWeek {
        MemberWeek {
            league_id: 1,
            week_id,
            user_id: 10,
            picks_made: correct + 1,
            correct,
            incorrect: 1,
            ties: 0,
            correct_key: 0,
            points,
            rank: 0,
            points_guess: None,
            points_actual: None,
            tiebreak_abs_diff: None,
        }
    }

    fn week_numbers(ids: &[WeekId]) -> HashMap<WeekId, u32> {
        ids.iter().enumerate().map(|(i, id)| (*id, i as u32 + 1)).collect()
    }

    #[test]
    fn test_sums_only_qualifying_weeks() {
        let rules = LeagueRules::default();
        let weeks = vec![week_row(1, 5, 5), week_row(2, 3, 3), week_row(3, 8, 8)];
        let numbers = week_numbers(&[1, 2, 3]);
        // Week 2 has no finalized league game.
        let qualifying: HashSet<WeekId> = [1, 3].into();

        let ms = compute_member_season(1, 2025, 10, &weeks, &numbers, &qualifying, &rules);
        assert_eq!(ms.points, 13);
        assert_eq!(ms.correct, 13);
        assert_eq!(ms.through_week, 3);
        assert_eq!(ms.points_dropped, 0);
    }

    #[test]
    fn test_no_qualifying_weeks_yields_zero_row() {
        let rules = LeagueRules::default();
        let weeks = vec![week_row(1, 5, 5)];
        let numbers = week_numbers(&[1]);
        let qualifying = HashSet::new();

        let ms = compute_member_season(1, 2025, 10, &weeks, &numbers, &qualifying, &rules);
        assert_eq!(ms, MemberSeason::empty(1, 2025, 10));
    }

    #[test]
    fn test_drop_weeks_removes_worst_weeks() {
        let rules = LeagueRules { drop_weeks: 2, ..Default::default() };
        let weeks = vec![
            week_row(1, 9, 9),
            week_row(2, 2, 2),
            week_row(3, 7, 7),
            week_row(4, 4, 4),
        ];
        let numbers = week_numbers(&[1, 2, 3, 4]);
        let qualifying: HashSet<WeekId> = [1, 2, 3, 4].into();

        let ms = compute_member_season(1, 2025, 10, &weeks, &numbers, &qualifying, &rules);
        assert_eq!(ms.points, 22);
        assert_eq!(ms.points_dropped, 6); // weeks 2 and 4
        assert_eq!(ms.correct_dropped, 6);
        assert_eq!(ms.adjusted_points(), 16);
        assert!(ms.adjusted_points() <= ms.points);
    }

    #[test]
    fn test_too_few_weeks_drops_nothing() {
        let rules = LeagueRules { drop_weeks: 2, ..Default::default() };
        let weeks = vec![week_row(1, 3, 3), week_row(2, 6, 6)];
        let numbers = week_numbers(&[1, 2]);
        let qualifying: HashSet<WeekId> = [1, 2].into();

        let ms = compute_member_season(1, 2025, 10, &weeks, &numbers, &qualifying, &rules);
        assert_eq!(ms.points_dropped, 0);
        assert_eq!(ms.adjusted_points(), ms.points);
    }
}
