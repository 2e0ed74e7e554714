//! Store abstraction over picks, games, and standings rows
//!
//! The engine performs no I/O of its own; everything it reads or
//! writes goes through `StandingsStore`. `InMemoryStore` is the
//! reference backend used by the tests.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use async_trait::async_trait;
use hook::{
    Game, GameId, LeagueGame, LeagueId, LeagueRules, MemberSeason, MemberWeek, Pick, PickId,
    SeasonId, UserId, Week, WeekId,
};
use tokio::sync::RwLock;

use crate::error::Result;

/// One pick joined with its game and (when the game was selected into
/// the league pool) its league-specific row with the locked spread.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekPickRow {
    pub pick: Pick,
    pub game: Game,
    pub league_game: Option<LeagueGame>,
}

impl WeekPickRow {
    /// The league's frozen home spread for this pick's game, if any.
    pub fn locked_spread(&self) -> Option<rust_decimal::Decimal> {
        self.league_game.as_ref().and_then(|lg| lg.locked_home_spread)
    }
}

/// Abstract trait for standings persistence backends
#[async_trait]
pub trait StandingsStore: Send + Sync {
    async fn game(&self, game_id: GameId) -> Result<Option<Game>>;

    /// Weeks of a season, ordered by week number.
    async fn weeks(&self, season: SeasonId) -> Result<Vec<Week>>;

    async fn leagues(&self) -> Result<Vec<LeagueId>>;

    async fn league_members(&self, league: LeagueId) -> Result<Vec<UserId>>;

    async fn league_rules(&self, league: LeagueId, season: SeasonId)
        -> Result<Option<LeagueRules>>;

    /// Active league-pool rows carrying this game.
    async fn league_games_for_game(&self, game_id: GameId) -> Result<Vec<LeagueGame>>;

    /// Every pick in the league whose game belongs to the week, joined
    /// with game and pool rows. Deterministically ordered by pick id.
    async fn week_picks(&self, league: LeagueId, week: WeekId) -> Result<Vec<WeekPickRow>>;

    /// Persist a grading result. Callers only write picks whose
    /// result is currently unset; a push never writes a value.
    async fn set_pick_result(&self, pick_id: PickId, is_correct: Option<bool>) -> Result<()>;

    async fn member_weeks(&self, league: LeagueId, week: WeekId) -> Result<Vec<MemberWeek>>;

    async fn member_weeks_for_season(
        &self,
        league: LeagueId,
        season: SeasonId,
        user: UserId,
    ) -> Result<Vec<MemberWeek>>;

    async fn upsert_member_week(&self, row: MemberWeek) -> Result<()>;

    async fn set_week_rank(
        &self,
        league: LeagueId,
        week: WeekId,
        user: UserId,
        rank: u32,
    ) -> Result<()>;

    async fn member_seasons(&self, league: LeagueId, season: SeasonId)
        -> Result<Vec<MemberSeason>>;

    async fn upsert_member_season(&self, row: MemberSeason) -> Result<()>;

    async fn set_season_ranks(
        &self,
        league: LeagueId,
        season: SeasonId,
        user: UserId,
        rank: u32,
        rank_with_drops: u32,
    ) -> Result<()>;

    /// Weeks with at least one finalized, active, league-selected
    /// game. Weeks outside this set contribute nothing to season
    /// totals.
    async fn qualifying_weeks(&self, league: LeagueId, season: SeasonId)
        -> Result<HashSet<WeekId>>;

    /// Wipe derived rows ahead of a full recalculation.
    async fn delete_member_weeks(&self, league: LeagueId, season: SeasonId) -> Result<()>;

    async fn delete_member_seasons(&self, league: LeagueId, season: SeasonId) -> Result<()>;
}

#[derive(Default)]
struct StoreInner {
    games: BTreeMap<GameId, Game>,
    weeks: BTreeMap<WeekId, Week>,
    league_games: BTreeMap<(LeagueId, GameId), LeagueGame>,
    picks: BTreeMap<PickId, Pick>,
    members: BTreeMap<LeagueId, BTreeSet<UserId>>,
    rules: BTreeMap<(LeagueId, SeasonId), LeagueRules>,
    member_weeks: BTreeMap<(LeagueId, WeekId, UserId), MemberWeek>,
    member_seasons: BTreeMap<(LeagueId, SeasonId, UserId), MemberSeason>,
}

/// In-memory standings store (reference backend, used by tests)
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_week(&self, week: Week) {
        self.inner.write().await.weeks.insert(week.id, week);
    }

    pub async fn insert_game(&self, game: Game) {
        self.inner.write().await.games.insert(game.id, game);
    }

    /// Mark a game final with its scores.
    pub async fn finalize_game(&self, game_id: GameId, home_score: i32, away_score: i32) {
        let mut inner = self.inner.write().await;
        if let Some(game) = inner.games.get_mut(&game_id) {
            game.home_score = Some(home_score);
            game.away_score = Some(away_score);
            game.is_final = true;
        }
    }

    pub async fn insert_league_game(&self, league_game: LeagueGame) {
        self.inner
            .write()
            .await
            .league_games
            .insert((league_game.league_id, league_game.game_id), league_game);
    }

    pub async fn insert_pick(&self, pick: Pick) {
        self.inner.write().await.picks.insert(pick.id, pick);
    }

    pub async fn pick(&self, pick_id: PickId) -> Option<Pick> {
        self.inner.read().await.picks.get(&pick_id).cloned()
    }

    pub async fn add_member(&self, league: LeagueId, user: UserId) {
        self.inner.write().await.members.entry(league).or_default().insert(user);
    }

    pub async fn insert_rules(&self, league: LeagueId, season: SeasonId, rules: LeagueRules) {
        self.inner.write().await.rules.insert((league, season), rules);
    }

    pub async fn member_week(
        &self,
        league: LeagueId,
        week: WeekId,
        user: UserId,
    ) -> Option<MemberWeek> {
        self.inner.read().await.member_weeks.get(&(league, week, user)).cloned()
    }

    pub async fn member_season(
        &self,
        league: LeagueId,
        season: SeasonId,
        user: UserId,
    ) -> Option<MemberSeason> {
        self.inner.read().await.member_seasons.get(&(league, season, user)).cloned()
    }

    /// JSON snapshot of every derived row, in key order. Two runs that
    /// produced identical standings serialize identically, which is
    /// what the recalculation tests compare.
    pub async fn standings_snapshot(&self) -> serde_json::Result<serde_json::Value> {
        let inner = self.inner.read().await;
        let member_weeks: Vec<&MemberWeek> = inner.member_weeks.values().collect();
        let member_seasons: Vec<&MemberSeason> = inner.member_seasons.values().collect();
        Ok(serde_json::json!({
            "member_weeks": serde_json::to_value(member_weeks)?,
            "member_seasons": serde_json::to_value(member_seasons)?,
        }))
    }
}

#[async_trait]
impl StandingsStore for InMemoryStore {
    async fn game(&self, game_id: GameId) -> Result<Option<Game>> {
        Ok(self.inner.read().await.games.get(&game_id).cloned())
    }

    async fn weeks(&self, season: SeasonId) -> Result<Vec<Week>> {
        let inner = self.inner.read().await;
        let mut weeks: Vec<Week> =
            inner.weeks.values().filter(|w| w.season_id == season).copied().collect();
        weeks.sort_by_key(|w| w.number);
        Ok(weeks)
    }

    async fn leagues(&self) -> Result<Vec<LeagueId>> {
        let inner = self.inner.read().await;
        let mut leagues: BTreeSet<LeagueId> = inner.members.keys().copied().collect();
        leagues.extend(inner.league_games.keys().map(|(league, _)| *league));
        Ok(leagues.into_iter().collect())
    }

    async fn league_members(&self, league: LeagueId) -> Result<Vec<UserId>> {
        let inner = self.inner.read().await;
        Ok(inner.members.get(&league).map(|m| m.iter().copied().collect()).unwrap_or_default())
    }

    async fn league_rules(
        &self,
        league: LeagueId,
        season: SeasonId,
    ) -> Result<Option<LeagueRules>> {
        Ok(self.inner.read().await.rules.get(&(league, season)).copied())
    }

    async fn league_games_for_game(&self, game_id: GameId) -> Result<Vec<LeagueGame>> {
        let inner = self.inner.read().await;
        Ok(inner
            .league_games
            .values()
            .filter(|lg| lg.game_id == game_id && lg.is_active)
            .cloned()
            .collect())
    }

    async fn week_picks(&self, league: LeagueId, week: WeekId) -> Result<Vec<WeekPickRow>> {
        let inner = self.inner.read().await;
        let mut rows = Vec::new();
        for pick in inner.picks.values() {
            if pick.league_id != league {
                continue;
            }
            let Some(game) = inner.games.get(&pick.game_id) else {
                continue;
            };
            if game.week_id != week {
                continue;
            }
            let league_game = inner.league_games.get(&(league, pick.game_id)).cloned();
            rows.push(WeekPickRow { pick: pick.clone(), game: game.clone(), league_game });
        }
        Ok(rows)
    }

    async fn set_pick_result(&self, pick_id: PickId, is_correct: Option<bool>) -> Result<()> {
        let mut inner = self.inner.write().await;
        match inner.picks.get_mut(&pick_id) {
            Some(pick) => {
                pick.is_correct = is_correct;
                Ok(())
            }
            None => Err(format!("pick {pick_id} not found").into()),
        }
    }

    async fn member_weeks(&self, league: LeagueId, week: WeekId) -> Result<Vec<MemberWeek>> {
        let inner = self.inner.read().await;
        Ok(inner
            .member_weeks
            .range((league, week, UserId::MIN)..=(league, week, UserId::MAX))
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn member_weeks_for_season(
        &self,
        league: LeagueId,
        season: SeasonId,
        user: UserId,
    ) -> Result<Vec<MemberWeek>> {
        let inner = self.inner.read().await;
        Ok(inner
            .member_weeks
            .values()
            .filter(|row| {
                row.league_id == league
                    && row.user_id == user
                    && inner.weeks.get(&row.week_id).is_some_and(|w| w.season_id == season)
            })
            .cloned()
            .collect())
    }

    async fn upsert_member_week(&self, row: MemberWeek) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.member_weeks.insert((row.league_id, row.week_id, row.user_id), row);
        Ok(())
    }

    async fn set_week_rank(
        &self,
        league: LeagueId,
        week: WeekId,
        user: UserId,
        rank: u32,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        match inner.member_weeks.get_mut(&(league, week, user)) {
            Some(row) => {
                row.rank = rank;
                Ok(())
            }
            None => Err(format!("no member week for league {league} week {week} user {user}").into()),
        }
    }

    async fn member_seasons(
        &self,
        league: LeagueId,
        season: SeasonId,
    ) -> Result<Vec<MemberSeason>> {
        let inner = self.inner.read().await;
        Ok(inner
            .member_seasons
            .range((league, season, UserId::MIN)..=(league, season, UserId::MAX))
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn upsert_member_season(&self, row: MemberSeason) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.member_seasons.insert((row.league_id, row.season_id, row.user_id), row);
        Ok(())
    }

    async fn set_season_ranks(
        &self,
        league: LeagueId,
        season: SeasonId,
        user: UserId,
        rank: u32,
        rank_with_drops: u32,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        match inner.member_seasons.get_mut(&(league, season, user)) {
            Some(row) => {
                row.rank = rank;
                row.rank_with_drops = rank_with_drops;
                Ok(())
            }
            None => {
                Err(format!("no member season for league {league} season {season} user {user}")
                    .into())
            }
        }
    }

    async fn qualifying_weeks(
        &self,
        league: LeagueId,
        season: SeasonId,
    ) -> Result<HashSet<WeekId>> {
        let inner = self.inner.read().await;
        let mut weeks = HashSet::new();
        for lg in inner.league_games.values() {
            if lg.league_id != league || !lg.is_active {
                continue;
            }
            if let Some(game) = inner.games.get(&lg.game_id) {
                if game.season_id == season && game.is_final {
                    weeks.insert(game.week_id);
                }
            }
        }
        Ok(weeks)
    }

    async fn delete_member_weeks(&self, league: LeagueId, season: SeasonId) -> Result<()> {
        let mut inner = self.inner.write().await;
        let season_weeks: HashSet<WeekId> = inner
            .weeks
            .values()
            .filter(|w| w.season_id == season)
            .map(|w| w.id)
            .collect();
        inner
            .member_weeks
            .retain(|(row_league, week, _), _| *row_league != league || !season_weeks.contains(week));
        Ok(())
    }

    async fn delete_member_seasons(&self, league: LeagueId, season: SeasonId) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .member_seasons
            .retain(|(row_league, row_season, _), _| *row_league != league || *row_season != season);
        Ok(())
    }
}
