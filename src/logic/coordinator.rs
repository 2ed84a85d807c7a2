//! Consistency coordinator: keeps derived stats and the bracket in step with result writes.
//!
//! [`affected_by`] works out what a write touches; [`Coordinator`] applies the
//! recomputation. Recomputation failures are logged and never fail the write itself.

use crate::logic::knockout;
use crate::logic::standings::{
    rebuild_finish_positions, rebuild_player_season_stats, rebuild_team_season_stats,
};
use crate::models::{
    ClubId, ErrorKind, FixtureId, KnockoutMatchId, League, LeagueError, MatchId, MatchRef, MatchResult, PlayerId,
    PlayerMatchStats, PlayerMatchStatsId, SeasonId,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// A result-bearing write.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResultChange {
    MatchSaved(MatchId),
    /// Evaluated while the match still exists, before it is removed.
    MatchDeleted(MatchId),
    KnockoutMatchSaved(KnockoutMatchId),
    PlayerMatchStatsSaved(PlayerMatchStatsId),
}

/// Rows to rebuild after a change. Sets, so repeated requests coalesce.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct AffectedEntities {
    pub season: SeasonId,
    pub clubs: BTreeSet<ClubId>,
    pub players: BTreeSet<PlayerId>,
}

impl AffectedEntities {
    fn new(season: SeasonId) -> Self {
        Self {
            season,
            ..Self::default()
        }
    }

    /// Rosters plus every player holding a stats row on the result.
    fn add_players(&mut self, league: &League, match_ref: MatchRef, rosters: &[&[PlayerId]]) {
        for roster in rosters {
            self.players.extend(roster.iter().copied());
        }
        self.players.extend(
            league
                .player_match_stats
                .iter()
                .filter(|row| row.match_ref == match_ref)
                .map(|row| row.player),
        );
    }
}

/// What `change` touches, read from the store as it currently is.
pub fn affected_by(league: &League, change: ResultChange) -> Result<AffectedEntities, LeagueError> {
    match change {
        ResultChange::MatchSaved(id) | ResultChange::MatchDeleted(id) => {
            let m = league.match_record(id)?;
            let fixture = league.fixture(m.fixture)?;
            let mut affected = AffectedEntities::new(fixture.season);
            affected.clubs.extend([fixture.home_club, fixture.away_club]);
            affected.add_players(
                league,
                MatchRef::GroupFixture(id),
                &[m.home_players.as_slice(), m.away_players.as_slice()],
            );
            // Stats rows may point at the bare fixture instead of its Match.
            affected.add_players(league, MatchRef::Standalone(fixture.id), &[]);
            Ok(affected)
        }
        ResultChange::KnockoutMatchSaved(id) => {
            let km = league.knockout_match(id)?;
            let mut affected = AffectedEntities::new(league.knockout_match_season(id)?);
            affected.clubs.extend(km.home.club());
            affected.clubs.extend(km.away.club());
            affected.add_players(
                league,
                MatchRef::Knockout(id),
                &[km.home_players.as_slice(), km.away_players.as_slice()],
            );
            Ok(affected)
        }
        ResultChange::PlayerMatchStatsSaved(id) => {
            let row = league.player_match_stats(id)?;
            let season = league
                .match_ref_season(&row.match_ref)
                .ok_or(LeagueError::PlayerMatchStatsNotFound(id))?;
            let mut affected = AffectedEntities::new(season);
            affected.players.insert(row.player);
            Ok(affected)
        }
    }
}

/// Recomputation context: which seasons are mid-resolution or being deleted.
#[derive(Debug, Default)]
pub struct Coordinator {
    resolving: HashSet<SeasonId>,
    suspended: HashSet<SeasonId>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resolving(&self, season: SeasonId) -> bool {
        self.resolving.contains(&season)
    }

    pub fn is_suspended(&self, season: SeasonId) -> bool {
        self.suspended.contains(&season)
    }

    /// React to a write. Returns what was recomputed, or None if nothing was.
    pub fn on_change(&mut self, league: &mut League, change: ResultChange) -> Option<AffectedEntities> {
        let affected = match affected_by(league, change) {
            Ok(affected) => affected,
            Err(e) => {
                log::warn!("Cannot recompute after {:?}: {}", change, e);
                return None;
            }
        };
        if self.is_suspended(affected.season) {
            log::debug!("Season {} is being deleted; skipping recompute", affected.season);
            return None;
        }
        if matches!(change, ResultChange::KnockoutMatchSaved(_)) && self.is_resolving(affected.season) {
            return None;
        }
        self.apply(league, &affected);
        Some(affected)
    }

    /// Rebuild the affected rows, then re-run placeholder resolution for the season.
    fn apply(&mut self, league: &mut League, affected: &AffectedEntities) {
        let season = affected.season;
        let active = league.season(season).map(|s| s.is_active).unwrap_or(false);
        if active {
            let result = league.transaction(|league| {
                for &club in &affected.clubs {
                    rebuild_team_season_stats(league, club, season)?;
                }
                for &player in &affected.players {
                    match rebuild_player_season_stats(league, player, season) {
                        Ok(_) => {}
                        Err(e) if e.kind() == ErrorKind::NotFound => {
                            log::warn!("Skipping player {}: {}", player, e);
                        }
                        Err(e) => return Err(e),
                    }
                }
                rebuild_finish_positions(league, season);
                Ok(())
            });
            if let Err(e) = result {
                log::warn!("Stats recompute failed for season {}: {}", season, e);
            }
        }
        self.resolve_placeholders(league, season);
    }

    /// Run one placeholder-resolution pass for the season.
    ///
    /// Saves made by the pass are fed back through [`Coordinator::on_change`] but ignored
    /// while the pass is running. Returns false if a pass was already running or failed.
    pub fn resolve_placeholders(&mut self, league: &mut League, season: SeasonId) -> bool {
        if self.is_suspended(season) || !self.resolving.insert(season) {
            return false;
        }
        let ok = match knockout::resolve_placeholders(league, season) {
            Ok(changed) => {
                for id in changed {
                    self.on_change(league, ResultChange::KnockoutMatchSaved(id));
                }
                true
            }
            Err(e) => {
                log::warn!("Placeholder resolution failed for season {}: {}", season, e);
                false
            }
        };
        self.resolving.remove(&season);
        ok
    }

    /// Record a fixture's result and recompute.
    pub fn record_match_result(
        &mut self,
        league: &mut League,
        id: MatchId,
        result: &MatchResult,
    ) -> Result<Option<AffectedEntities>, LeagueError> {
        league.match_record_mut(id)?.apply(result);
        Ok(self.on_change(league, ResultChange::MatchSaved(id)))
    }

    /// Record a fixture's result, creating its Match record on the first write.
    /// Knockout and final legs are created without one.
    pub fn record_fixture_result(
        &mut self,
        league: &mut League,
        fixture: FixtureId,
        result: &MatchResult,
    ) -> Result<Option<AffectedEntities>, LeagueError> {
        let id = league.ensure_fixture_match(fixture)?;
        self.record_match_result(league, id, result)
    }

    /// Delete a Match record (and its stats rows), then recompute without it.
    pub fn delete_match(
        &mut self,
        league: &mut League,
        id: MatchId,
    ) -> Result<Option<AffectedEntities>, LeagueError> {
        let affected = affected_by(league, ResultChange::MatchDeleted(id))?;
        league.matches.retain(|m| m.id != id);
        league
            .player_match_stats
            .retain(|row| row.match_ref != MatchRef::GroupFixture(id));
        if self.is_suspended(affected.season) {
            return Ok(None);
        }
        self.apply(league, &affected);
        Ok(Some(affected))
    }

    /// Record a knockout tie's own result and recompute.
    pub fn record_knockout_result(
        &mut self,
        league: &mut League,
        id: KnockoutMatchId,
        result: &MatchResult,
    ) -> Result<Option<AffectedEntities>, LeagueError> {
        league.knockout_match_mut(id)?.apply(result);
        Ok(self.on_change(league, ResultChange::KnockoutMatchSaved(id)))
    }

    /// Insert or replace a player's stats for one match and recompute that player.
    pub fn record_player_match_stats(
        &mut self,
        league: &mut League,
        stats: PlayerMatchStats,
    ) -> Result<PlayerMatchStatsId, LeagueError> {
        league.player(stats.player)?;
        if league.match_ref_season(&stats.match_ref).is_none() {
            return Err(match stats.match_ref {
                MatchRef::GroupFixture(id) => LeagueError::MatchNotFound(id),
                MatchRef::Knockout(id) => LeagueError::KnockoutMatchNotFound(id),
                MatchRef::Standalone(id) => LeagueError::FixtureNotFound(id),
            });
        }
        let id = stats.id;
        match league.player_match_stats.iter_mut().find(|row| row.id == id) {
            Some(row) => *row = stats,
            None => league.player_match_stats.push(stats),
        }
        self.on_change(league, ResultChange::PlayerMatchStatsSaved(id));
        Ok(id)
    }

    /// Delete a player's match stats row and rebuild that player's season.
    pub fn delete_player_match_stats(
        &mut self,
        league: &mut League,
        id: PlayerMatchStatsId,
    ) -> Result<(), LeagueError> {
        let affected = affected_by(league, ResultChange::PlayerMatchStatsSaved(id))?;
        league.player_match_stats.retain(|row| row.id != id);
        if !self.is_suspended(affected.season) {
            self.apply(league, &affected);
        }
        Ok(())
    }

    /// Remove a season and everything it owns, with recomputation suspended throughout.
    pub fn delete_season(&mut self, league: &mut League, season: SeasonId) -> Result<(), LeagueError> {
        league.season(season)?;
        self.suspended.insert(season);

        let match_ids: Vec<MatchId> = league
            .fixtures
            .iter()
            .filter(|f| f.season == season)
            .filter_map(|f| league.fixture_match(f.id).map(|m| m.id))
            .collect();
        for id in match_ids {
            if let Err(e) = self.delete_match(league, id) {
                log::warn!("Skipping match {} while deleting season: {}", id, e);
            }
        }

        let rounds: Vec<_> = league
            .knockout_rounds
            .iter()
            .filter(|r| r.season == season)
            .map(|r| r.id)
            .collect();
        let ties: Vec<KnockoutMatchId> = league
            .knockout_matches
            .iter()
            .filter(|m| rounds.contains(&m.round))
            .map(|m| m.id)
            .collect();
        let fixtures: Vec<_> = league
            .fixtures
            .iter()
            .filter(|f| f.season == season)
            .map(|f| f.id)
            .collect();

        league.player_match_stats.retain(|row| match row.match_ref {
            MatchRef::Knockout(id) => !ties.contains(&id),
            MatchRef::Standalone(id) => !fixtures.contains(&id),
            MatchRef::GroupFixture(_) => true,
        });
        league.knockout_matches.retain(|m| !rounds.contains(&m.round));
        league.knockout_rounds.retain(|r| r.season != season);
        league.fixtures.retain(|f| f.season != season);
        league.groups.retain(|g| g.season != season);
        league.team_stats.retain(|s| s.season != season);
        league.player_season_stats.retain(|s| s.season != season);
        league.seasons.retain(|s| s.id != season);

        self.suspended.remove(&season);
        log::info!("Deleted season {}", season);
        Ok(())
    }
}
