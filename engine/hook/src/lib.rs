// Hook - deterministic pick grading and ranking core
//
// Named for the half-point "hook" that keeps a spread off whole numbers.
// Everything here is pure and synchronous: the service layer hands in
// picks, final scores, and locked spreads, and gets outcomes, points,
// tiebreak keys, and competition ranks back.

mod config;
mod grading;
mod points;
mod rank;
mod tiebreak;
mod types;

pub use config::{LeagueRules, RulesError, Tiebreaker};
pub use grading::{apply_hook, grade_pick, GradeResult, PickOutcome};
pub use points::pick_points;
pub use rank::{assign_ranks, RankEntry};
pub use tiebreak::{drop_week_key, season_key, week_key, TiebreakKey};
pub use types::{
    Game, LeagueGame, MemberSeason, MemberWeek, Pick, Week,
};
pub use types::{GameId, LeagueId, PickId, SeasonId, TeamId, UserId, WeekId};
