//! Standings: team and player season stats, always rebuilt from recorded results.

use crate::logic::finals::tie_winner;
use crate::models::{
    ClubId, FinishPosition, GroupId, KnockoutMatch, League, LeagueError, MatchRef, PlayerId,
    PlayerSeasonStats, RoundType, SeasonId, TeamSeasonStats,
};
use std::collections::BTreeSet;

/// A group's table: member clubs with a stats row, best first.
pub fn group_standings(
    league: &League,
    season: SeasonId,
    group: GroupId,
) -> Result<Vec<TeamSeasonStats>, LeagueError> {
    let members = &league.group(group)?.members;
    let mut rows: Vec<TeamSeasonStats> = league
        .team_stats
        .iter()
        .filter(|s| s.season == season && members.contains(&s.club))
        .cloned()
        .collect();
    rows.sort_by(TeamSeasonStats::standings_cmp);
    Ok(rows)
}

/// Played results of `club` in `season`, as (goals for, goals against).
///
/// Counts fixture Match records (group or standalone) and knockout ties that carry their
/// own score. A tie whose pairing already has a played fixture Match is skipped, since the
/// fixture is the authoritative record of that encounter.
pub fn club_results(league: &League, club: ClubId, season: SeasonId) -> Vec<(u32, u32)> {
    let mut results = Vec::new();

    for fixture in league
        .fixtures
        .iter()
        .filter(|f| f.season == season && f.involves(club))
    {
        let Some(m) = league.fixture_match(fixture.id).filter(|m| m.is_played) else {
            continue;
        };
        if fixture.home_club == club {
            results.push((m.home_goals, m.away_goals));
        } else {
            results.push((m.away_goals, m.home_goals));
        }
    }

    let rounds: Vec<_> = league
        .knockout_rounds
        .iter()
        .filter(|r| r.season == season)
        .map(|r| r.id)
        .collect();
    for km in league
        .knockout_matches
        .iter()
        .filter(|km| rounds.contains(&km.round) && km.is_played && km.involves(club))
    {
        let Some((home, away)) = km.clubs() else {
            continue;
        };
        if tie_has_played_fixture(league, season, home, away) {
            continue;
        }
        if home == club {
            results.push((km.home_goals, km.away_goals));
        } else {
            results.push((km.away_goals, km.home_goals));
        }
    }

    results
}

fn tie_has_played_fixture(league: &League, season: SeasonId, a: ClubId, b: ClubId) -> bool {
    league
        .standalone_fixtures_between(season, a, b)
        .iter()
        .any(|f| league.fixture_match(f.id).is_some_and(|m| m.is_played))
}

/// Recompute a club's season row from scratch and store it.
pub fn rebuild_team_season_stats(
    league: &mut League,
    club: ClubId,
    season: SeasonId,
) -> Result<TeamSeasonStats, LeagueError> {
    league.club(club)?;
    league.season(season)?;

    let mut stats = TeamSeasonStats::new(club, season);
    for (goals_for, goals_against) in club_results(league, club, season) {
        stats.record(goals_for, goals_against);
    }
    stats.finish_position = finish_position(league, club, season);
    league.put_team_stats(stats.clone());
    log::debug!(
        "Rebuilt team stats for {} in {}: {} played, {} pts",
        club,
        season,
        stats.played,
        stats.points
    );
    Ok(stats)
}

fn tie_in_round<'a>(
    league: &'a League,
    season: SeasonId,
    club: ClubId,
    round_type: RoundType,
) -> Option<&'a KnockoutMatch> {
    let round = league.knockout_round(season, round_type)?;
    league.round_matches(round.id).find(|m| m.involves(club))
}

/// How far `club` got in the season's bracket.
///
/// Finalists are Champion or RunnerUp once the final is decided, and the third-place
/// winner is Third. A club knocked out in the semifinals (or losing the third-place
/// tie) is Semis. Once the bracket holds only real clubs, a group member that appears in
/// no tie is Groups. Anything still undecided, and exits before the semifinals, is None.
pub fn finish_position(league: &League, club: ClubId, season: SeasonId) -> Option<FinishPosition> {
    if let Some(tie) = tie_in_round(league, season, club, RoundType::F) {
        return tie_winner(league, season, tie).map(|winner| {
            if winner == club {
                FinishPosition::Champion
            } else {
                FinishPosition::RunnerUp
            }
        });
    }
    if let Some(tie) = tie_in_round(league, season, club, RoundType::ThirdPlace) {
        return tie_winner(league, season, tie).map(|winner| {
            if winner == club {
                FinishPosition::Third
            } else {
                FinishPosition::Semis
            }
        });
    }
    if let Some(tie) = tie_in_round(league, season, club, RoundType::SF) {
        return tie_winner(league, season, tie)
            .filter(|&winner| winner != club)
            .map(|_| FinishPosition::Semis);
    }

    let rounds: Vec<_> = league
        .knockout_rounds
        .iter()
        .filter(|r| r.season == season)
        .map(|r| r.id)
        .collect();
    let mut ties = league
        .knockout_matches
        .iter()
        .filter(|m| rounds.contains(&m.round))
        .peekable();
    ties.peek()?;
    let mut bracket_known = true;
    for tie in ties {
        if tie.involves(club) {
            return None;
        }
        bracket_known &= tie.is_resolved();
    }
    let in_group = league.season_groups(season).any(|g| g.members.contains(&club));
    (bracket_known && in_group).then_some(FinishPosition::Groups)
}

/// Refresh `finish_position` on every team row of the season. Returns how many changed.
pub fn rebuild_finish_positions(league: &mut League, season: SeasonId) -> usize {
    let positions: Vec<(ClubId, Option<FinishPosition>)> = league
        .team_stats
        .iter()
        .filter(|s| s.season == season)
        .map(|s| (s.club, finish_position(league, s.club, season)))
        .collect();
    let mut changed = 0;
    for row in league.team_stats.iter_mut().filter(|s| s.season == season) {
        let Some(&(_, position)) = positions.iter().find(|(club, _)| *club == row.club) else {
            continue;
        };
        if row.finish_position != position {
            row.finish_position = position;
            changed += 1;
        }
    }
    changed
}

/// Result seen through a match reference: score, played flag, and rosters.
struct ReferencedResult<'a> {
    season: SeasonId,
    home_goals: u32,
    away_goals: u32,
    is_played: bool,
    home_players: &'a [PlayerId],
    away_players: &'a [PlayerId],
}

fn referenced_result<'a>(league: &'a League, match_ref: &MatchRef) -> Option<ReferencedResult<'a>> {
    match match_ref {
        MatchRef::GroupFixture(id) => {
            let m = league.match_record(*id).ok()?;
            let fixture = league.fixture(m.fixture).ok()?;
            Some(ReferencedResult {
                season: fixture.season,
                home_goals: m.home_goals,
                away_goals: m.away_goals,
                is_played: m.is_played,
                home_players: &m.home_players,
                away_players: &m.away_players,
            })
        }
        MatchRef::Knockout(id) => {
            let km = league.knockout_match(*id).ok()?;
            Some(ReferencedResult {
                season: league.knockout_match_season(*id).ok()?,
                home_goals: km.home_goals,
                away_goals: km.away_goals,
                is_played: km.is_played,
                home_players: &km.home_players,
                away_players: &km.away_players,
            })
        }
        MatchRef::Standalone(id) => {
            let fixture = league.fixture(*id).ok()?;
            match league.fixture_match(fixture.id) {
                Some(m) => Some(ReferencedResult {
                    season: fixture.season,
                    home_goals: m.home_goals,
                    away_goals: m.away_goals,
                    is_played: m.is_played,
                    home_players: &m.home_players,
                    away_players: &m.away_players,
                }),
                None => Some(ReferencedResult {
                    season: fixture.season,
                    home_goals: 0,
                    away_goals: 0,
                    is_played: false,
                    home_players: &[],
                    away_players: &[],
                }),
            }
        }
    }
}

/// Recompute a player's season row from every match-stats row of that season.
///
/// Returns `Ok(false)` without writing when the season is inactive or the existing row
/// is maintained by hand. Appearances count when minutes > 0 or the player is on either
/// roster; a clean sheet needs a played result where the player's side conceded nothing;
/// rating is the plain mean of the nonzero match ratings.
pub fn rebuild_player_season_stats(
    league: &mut League,
    player: PlayerId,
    season: SeasonId,
) -> Result<bool, LeagueError> {
    let club = league.player(player)?.club;
    if !league.season(season)?.is_active {
        log::debug!("Season {} is archived; player stats left manual", season);
        return Ok(false);
    }
    if league
        .player_season_stats(player, season)
        .is_some_and(|row| row.manual)
    {
        return Ok(false);
    }

    let mut stats = PlayerSeasonStats::new(player, season, club);
    let mut ratings = Vec::new();
    for row in league.player_match_stats.iter().filter(|s| s.player == player) {
        let Some(result) = referenced_result(league, &row.match_ref) else {
            continue;
        };
        if result.season != season {
            continue;
        }
        stats.goals += row.goals;
        stats.assists += row.assists;

        let on_home = result.home_players.contains(&player);
        let on_away = result.away_players.contains(&player);
        if row.minutes_played > 0 || on_home || on_away {
            stats.appearances += 1;
        }
        if result.is_played
            && ((on_home && result.away_goals == 0) || (on_away && result.home_goals == 0))
        {
            stats.clean_sheets += 1;
        }
        if row.rating > 0.0 {
            ratings.push(row.rating);
        }
    }
    if !ratings.is_empty() {
        stats.rating = ratings.iter().sum::<f64>() / ratings.len() as f64;
    }

    league.put_player_season_stats(stats);
    Ok(true)
}

/// Rebuild every (player, season) pair reachable from match-stats rows.
///
/// Rows whose match or player no longer exists are skipped. Returns how many rows were
/// rewritten.
pub fn rebuild_all_player_season_stats(league: &mut League) -> usize {
    let pairs: BTreeSet<(PlayerId, SeasonId)> = league
        .player_match_stats
        .iter()
        .filter_map(|row| Some((row.player, league.match_ref_season(&row.match_ref)?)))
        .collect();
    log::info!("Found {} player+season pairs to rebuild", pairs.len());

    let mut rebuilt = 0;
    for (player, season) in pairs {
        match rebuild_player_season_stats(league, player, season) {
            Ok(true) => rebuilt += 1,
            Ok(false) => {}
            Err(e) => log::warn!("Skipping player {} in season {}: {}", player, season, e),
        }
    }
    rebuilt
}
