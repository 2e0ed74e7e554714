//! Standings service: turns graded picks into weekly and season
//! standings
//!
//! The finalize-game workflow calls `StandingsService::on_game_finalized`
//! synchronously when a game goes final; the service grades the game's
//! picks, rewrites the affected member-week rows, assigns week ranks,
//! and rolls the league's season rows (full and drop-adjusted) before
//! returning. An administrative `recalculate_season` rebuilds every
//! derived row from scratch.

mod error;
mod season;
mod service;
mod store;
mod weekly;

pub use error::{Result, StandingsError};
pub use season::compute_member_season;
pub use service::{RecalcStats, StandingsService};
pub use store::{InMemoryStore, StandingsStore, WeekPickRow};
pub use weekly::compute_member_week;

/// Re-export commonly used core types
pub use hook::{
    GradeResult, LeagueRules, MemberSeason, MemberWeek, PickOutcome, Tiebreaker,
};
pub use hook::{GameId, LeagueId, PickId, SeasonId, TeamId, UserId, WeekId};
