//! Data model for the pick'em scoring core
//!
//! Identity is already resolved by the time rows reach this crate:
//! teams, games, and users are plain integer ids.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type LeagueId = u64;
pub type SeasonId = u32;
pub type WeekId = u64;
pub type GameId = u64;
pub type PickId = u64;
pub type UserId = u64;
pub type TeamId = u32;

/// One week of a season; `number` is the ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub id: WeekId,
    pub season_id: SeasonId,
    pub number: u32,
}

/// A scheduled game. Scores are only present once reported; both must
/// be present (and `is_final` set) before the game is gradable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub season_id: SeasonId,
    pub week_id: WeekId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub kickoff: DateTime<Utc>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub is_final: bool,
}

impl Game {
    /// Combined final score, if both sides have reported.
    pub fn actual_total(&self) -> Option<i32> {
        Some(self.home_score? + self.away_score?)
    }
}

/// A game selected into a league's weekly pool, carrying the spread
/// that was locked for this league (frozen independently from the
/// globally-current line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueGame {
    pub league_id: LeagueId,
    pub game_id: GameId,
    /// Home-team perspective; negative means home is favored.
    pub locked_home_spread: Option<Decimal>,
    /// Marks the week's total-points tiebreaker game.
    pub is_total_points_game: bool,
    pub is_active: bool,
}

/// One member's selection for one game in one league.
///
/// `is_correct` starts as `None` and is written exactly once when the
/// game finalizes. A push leaves it `None` permanently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub id: PickId,
    pub league_id: LeagueId,
    pub game_id: GameId,
    pub user_id: UserId,
    pub picked_team_id: TeamId,
    pub is_key_pick: bool,
    pub is_correct: Option<bool>,
    pub points_guess: Option<i32>,
    pub is_total_points_game: bool,
}

/// Per (league, week, user) aggregate. A derived, disposable row:
/// always fully rewritten from the member's graded picks, never
/// incrementally patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberWeek {
    pub league_id: LeagueId,
    pub week_id: WeekId,
    pub user_id: UserId,
    pub picks_made: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub ties: u32,
    pub correct_key: u32,
    pub points: i32,
    /// 0 until ranks for the week have been assigned.
    pub rank: u32,
    pub points_guess: Option<i32>,
    pub points_actual: Option<i32>,
    pub tiebreak_abs_diff: Option<i32>,
}

/// Per (league, season, user) aggregate with parallel `_dropped` sums
/// holding the contribution of the dropped worst weeks. The adjusted
/// value of any metric is full minus dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSeason {
    pub league_id: LeagueId,
    pub season_id: SeasonId,
    pub user_id: UserId,
    /// Highest qualifying week number this member has a row for.
    pub through_week: u32,
    pub picks_made: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub ties: u32,
    pub correct_key: u32,
    pub points: i32,
    pub picks_made_dropped: u32,
    pub correct_dropped: u32,
    pub incorrect_dropped: u32,
    pub ties_dropped: u32,
    pub correct_key_dropped: u32,
    pub points_dropped: i32,
    /// Full-season rank; 0 until assigned.
    pub rank: u32,
    /// Drop-adjusted rank; 0 when drops are disabled.
    pub rank_with_drops: u32,
}

impl MemberSeason {
    /// Zeroed row for a member with no qualifying weeks yet.
    pub fn empty(league_id: LeagueId, season_id: SeasonId, user_id: UserId) -> Self {
        Self {
            league_id,
            season_id,
            user_id,
            through_week: 0,
            picks_made: 0,
            correct: 0,
            incorrect: 0,
            ties: 0,
            correct_key: 0,
            points: 0,
            picks_made_dropped: 0,
            correct_dropped: 0,
            incorrect_dropped: 0,
            ties_dropped: 0,
            correct_key_dropped: 0,
            points_dropped: 0,
            rank: 0,
            rank_with_drops: 0,
        }
    }

    pub fn adjusted_points(&self) -> i32 {
        self.points - self.points_dropped
    }

    pub fn adjusted_correct(&self) -> u32 {
        self.correct - self.correct_dropped
    }

    pub fn adjusted_correct_key(&self) -> u32 {
        self.correct_key - self.correct_key_dropped
    }

    pub fn adjusted_picks_made(&self) -> u32 {
        self.picks_made - self.picks_made_dropped
    }
}
