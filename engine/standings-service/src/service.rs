//! Standings service implementation
//!
//! One finalize event drives the whole cascade for each league
//! carrying the game: grade picks, rewrite the week, rank the week,
//! rewrite the season, rank the season. Leagues are independent and
//! processed concurrently; within a league a per-league lock keeps the
//! week rewrite, rank pass, and season rewrite a single critical
//! section so readers never observe partially-updated ranks.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use hook::{
    assign_ranks, grade_pick, season_key, week_key, GradeResult, LeagueRules, RankEntry,
};
use hook::{Game, GameId, LeagueGame, LeagueId, SeasonId, UserId, WeekId};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::{Result, StandingsError};
use crate::season::compute_member_season;
use crate::store::StandingsStore;
use crate::weekly::compute_member_week;

/// Outcome summary of a full recalculation run.
#[derive(Debug, Clone, Serialize)]
pub struct RecalcStats {
    pub leagues_processed: usize,
    pub member_weeks_updated: usize,
    pub member_seasons_updated: usize,
    pub errors: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Scoring and standings orchestrator
pub struct StandingsService {
    store: Arc<dyn StandingsStore>,
    league_locks: DashMap<LeagueId, Arc<Mutex<()>>>,
}

impl StandingsService {
    pub fn new(store: Arc<dyn StandingsStore>) -> Self {
        Self { store, league_locks: DashMap::new() }
    }

    fn league_lock(&self, league: LeagueId) -> Arc<Mutex<()>> {
        self.league_locks.entry(league).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Entry point for the finalize-game workflow.
    ///
    /// A no-op when the game is not final or a score is still missing.
    /// Leagues that carry the game are processed independently; one
    /// league failing (or missing its rules row) never blocks the
    /// others. Returns the number of member-week rows rewritten.
    pub async fn on_game_finalized(&self, game_id: GameId) -> Result<usize> {
        let game = self
            .store
            .game(game_id)
            .await?
            .ok_or(StandingsError::GameNotFound(game_id))?;
        if !game.is_final || game.home_score.is_none() || game.away_score.is_none() {
            debug!(game_id, "game not gradable yet, skipping finalization");
            return Ok(0);
        }

        let league_games = self.store.league_games_for_game(game_id).await?;
        if league_games.is_empty() {
            return Ok(0);
        }

        let runs = league_games
            .into_iter()
            .map(|lg| self.finalize_for_league(lg, &game));
        let mut updated = 0;
        for (result, league) in join_all(runs).await {
            match result {
                Ok(count) => updated += count,
                Err(err) => {
                    error!(league, game_id, %err, "league finalization failed");
                }
            }
        }

        info!(game_id, updated, "member weeks rewritten for finalized game");
        Ok(updated)
    }

    async fn finalize_for_league(
        &self,
        league_game: LeagueGame,
        game: &Game,
    ) -> (Result<usize>, LeagueId) {
        let league = league_game.league_id;
        (self.finalize_for_league_inner(league_game, game).await, league)
    }

    async fn finalize_for_league_inner(
        &self,
        league_game: LeagueGame,
        game: &Game,
    ) -> Result<usize> {
        let league = league_game.league_id;
        let lock = self.league_lock(league);
        let _guard = lock.lock().await;

        let Some(rules) = self.store.league_rules(league, game.season_id).await? else {
            warn!(league, season = game.season_id, "no league rules, skipping league");
            return Ok(0);
        };
        rules.validate()?;

        self.grade_game_picks(league, game, &rules).await?;
        let updated = self.rewrite_week(league, game.week_id, &rules).await?;
        self.rewrite_season(league, game.season_id, &rules).await?;
        Ok(updated)
    }

    /// Persist results for this game's still-ungraded picks. Picks that
    /// already carry a result are never re-graded, so duplicate
    /// finalize events cannot flip or double-apply anything. Pushes
    /// leave the result unset permanently.
    async fn grade_game_picks(
        &self,
        league: LeagueId,
        game: &Game,
        rules: &LeagueRules,
    ) -> Result<()> {
        let rows = self.store.week_picks(league, game.week_id).await?;
        for row in rows.iter().filter(|r| r.pick.game_id == game.id) {
            if row.pick.is_correct.is_some() {
                continue;
            }
            match grade_pick(&row.pick, game, row.locked_spread(), rules) {
                GradeResult::Graded(outcome) => {
                    if let Some(flag) = outcome.as_correct_flag() {
                        if let Err(err) =
                            self.store.set_pick_result(row.pick.id, Some(flag)).await
                        {
                            // One bad write must not strand the rest of
                            // the game's picks; aggregation re-grades
                            // from source data anyway.
                            error!(
                                pick_id = row.pick.id,
                                game_id = game.id,
                                %err,
                                "failed to persist pick result"
                            );
                        }
                    }
                }
                GradeResult::NotGradable => {
                    warn!(pick_id = row.pick.id, game_id = game.id, "pick not gradable");
                }
            }
        }
        Ok(())
    }

    /// Rewrite every member-week row for the league+week and assign
    /// week ranks. Returns the number of rows rewritten.
    async fn rewrite_week(
        &self,
        league: LeagueId,
        week: WeekId,
        rules: &LeagueRules,
    ) -> Result<usize> {
        let rows = self.store.week_picks(league, week).await?;
        let mut by_user: BTreeMap<UserId, Vec<_>> = BTreeMap::new();
        for row in &rows {
            by_user.entry(row.pick.user_id).or_default().push(row);
        }

        let mut updated = 0;
        for (user, user_rows) in &by_user {
            let member_week = compute_member_week(league, week, *user, user_rows, rules);
            match self.store.upsert_member_week(member_week).await {
                Ok(()) => updated += 1,
                Err(err) => {
                    // One bad row must not abort the rest of the week.
                    error!(league, week, user, %err, "failed to persist member week");
                }
            }
        }

        let member_weeks = self.store.member_weeks(league, week).await?;
        let entries: Vec<RankEntry<UserId>> = member_weeks
            .iter()
            .map(|mw| RankEntry {
                id: mw.user_id,
                points: i64::from(mw.points),
                tiebreak: week_key(mw, rules),
            })
            .collect();
        for (user, rank) in assign_ranks(&entries) {
            if let Err(err) = self.store.set_week_rank(league, week, user, rank).await {
                error!(league, week, user, %err, "failed to persist week rank");
            }
        }

        Ok(updated)
    }

    /// Rewrite every member's season row for the league and assign
    /// both season rank sets. Returns the number of rows rewritten.
    async fn rewrite_season(
        &self,
        league: LeagueId,
        season: SeasonId,
        rules: &LeagueRules,
    ) -> Result<usize> {
        let week_numbers: HashMap<WeekId, u32> =
            self.store.weeks(season).await?.iter().map(|w| (w.id, w.number)).collect();
        let qualifying = self.store.qualifying_weeks(league, season).await?;

        let mut updated = 0;
        for user in self.store.league_members(league).await? {
            let member_weeks =
                self.store.member_weeks_for_season(league, season, user).await?;
            let member_season = compute_member_season(
                league,
                season,
                user,
                &member_weeks,
                &week_numbers,
                &qualifying,
                rules,
            );
            match self.store.upsert_member_season(member_season).await {
                Ok(()) => updated += 1,
                Err(err) => {
                    error!(league, season, user, %err, "failed to persist member season");
                }
            }
        }

        let member_seasons = self.store.member_seasons(league, season).await?;
        let full: Vec<RankEntry<UserId>> = member_seasons
            .iter()
            .map(|ms| RankEntry {
                id: ms.user_id,
                points: i64::from(ms.points),
                tiebreak: season_key(ms.points, ms.correct, ms.correct_key, rules),
            })
            .collect();
        let full_ranks = assign_ranks(&full);

        // Adjusted ranks only mean something when drops are on;
        // otherwise they are reported as 0.
        let drop_ranks: HashMap<UserId, u32> = if rules.drop_weeks > 0 {
            let adjusted: Vec<RankEntry<UserId>> = member_seasons
                .iter()
                .map(|ms| RankEntry {
                    id: ms.user_id,
                    points: i64::from(ms.adjusted_points()),
                    tiebreak: season_key(
                        ms.adjusted_points(),
                        ms.adjusted_correct(),
                        ms.adjusted_correct_key(),
                        rules,
                    ),
                })
                .collect();
            assign_ranks(&adjusted)
        } else {
            HashMap::new()
        };

        for ms in &member_seasons {
            let rank = full_ranks.get(&ms.user_id).copied().unwrap_or(0);
            let rank_with_drops = drop_ranks.get(&ms.user_id).copied().unwrap_or(0);
            if let Err(err) = self
                .store
                .set_season_ranks(league, season, ms.user_id, rank, rank_with_drops)
                .await
            {
                error!(league, season, user = ms.user_id, %err, "failed to persist season ranks");
            }
        }

        Ok(updated)
    }

    /// Administrative backfill/repair: wipe and rebuild every derived
    /// row for the season, league by league, in week order. Produces
    /// the same rows the incremental path would for the same pick and
    /// game state, and is safe to run repeatedly.
    pub async fn recalculate_season(&self, season: SeasonId) -> Result<RecalcStats> {
        let mut stats = RecalcStats {
            leagues_processed: 0,
            member_weeks_updated: 0,
            member_seasons_updated: 0,
            errors: Vec::new(),
            completed_at: Utc::now(),
        };

        for league in self.store.leagues().await? {
            stats.leagues_processed += 1;
            match self.recalculate_league(league, season).await {
                Ok((weeks_updated, seasons_updated)) => {
                    stats.member_weeks_updated += weeks_updated;
                    stats.member_seasons_updated += seasons_updated;
                }
                Err(err) => {
                    error!(league, season, %err, "league recalculation failed");
                    stats.errors.push(format!("league {league}: {err}"));
                }
            }
        }

        stats.completed_at = Utc::now();
        info!(
            season,
            leagues = stats.leagues_processed,
            member_weeks = stats.member_weeks_updated,
            member_seasons = stats.member_seasons_updated,
            "season recalculation complete"
        );
        Ok(stats)
    }

    async fn recalculate_league(
        &self,
        league: LeagueId,
        season: SeasonId,
    ) -> Result<(usize, usize)> {
        let lock = self.league_lock(league);
        let _guard = lock.lock().await;

        let Some(rules) = self.store.league_rules(league, season).await? else {
            warn!(league, season, "no league rules, skipping league");
            return Ok((0, 0));
        };
        rules.validate()?;

        self.store.delete_member_weeks(league, season).await?;
        self.store.delete_member_seasons(league, season).await?;

        // Only weeks with a finalized league game have ever seen a
        // finalize event, so only they get rows on the incremental
        // path; the rebuild mirrors that exactly.
        let qualifying = self.store.qualifying_weeks(league, season).await?;
        let mut weeks_updated = 0;
        for week in self.store.weeks(season).await? {
            if !qualifying.contains(&week.id) {
                continue;
            }
            weeks_updated += self.rewrite_week(league, week.id, &rules).await?;
        }
        let seasons_updated = self.rewrite_season(league, season, &rules).await?;
        Ok((weeks_updated, seasons_updated))
    }
}
