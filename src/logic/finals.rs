//! Final round: pick the semifinal winners and build the final tie with its fixtures.

use crate::logic::knockout::{create_tie_fixtures, tie_aggregate, MatchFormat};
use crate::logic::standings::rebuild_finish_positions;
use crate::models::{
    ClubId, FixtureId, KnockoutMatch, KnockoutMatchId, KnockoutRoundId, League, LeagueError,
    RoundType, SeasonId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum FinalOutcome {
    Created {
        round: KnockoutRoundId,
        tie: KnockoutMatchId,
        fixtures: Vec<FixtureId>,
    },
    /// A final between the same two winners already exists (either orientation).
    AlreadyExists {
        round: KnockoutRoundId,
        tie: KnockoutMatchId,
    },
}

/// Winner of one semifinal tie.
///
/// A played tie is decided by its own score. Otherwise the played legs of the tie's
/// standalone fixtures are aggregated. Level scores and missing results are errors.
pub fn semifinal_winner(league: &League, season: SeasonId, tie: &KnockoutMatch) -> Result<ClubId, LeagueError> {
    let (home, away) = tie
        .clubs()
        .ok_or(LeagueError::SemifinalWithoutResult(tie.id))?;
    if tie.is_played {
        return match tie.home_goals.cmp(&tie.away_goals) {
            Ordering::Greater => Ok(home),
            Ordering::Less => Ok(away),
            Ordering::Equal => Err(LeagueError::SemifinalDrawn(tie.id)),
        };
    }
    let (home_total, away_total) =
        tie_aggregate(league, season, home, away).ok_or(LeagueError::SemifinalWithoutResult(tie.id))?;
    match home_total.cmp(&away_total) {
        Ordering::Greater => Ok(home),
        Ordering::Less => Ok(away),
        Ordering::Equal => Err(LeagueError::AggregateTie(tie.id)),
    }
}

/// Winner of any knockout tie by the same rule, or None while it is undecided.
pub fn tie_winner(league: &League, season: SeasonId, tie: &KnockoutMatch) -> Option<ClubId> {
    semifinal_winner(league, season, tie).ok()
}

/// Semifinal ties with duplicate pairings (either orientation) dropped.
fn distinct_semifinals(league: &League, season: SeasonId) -> Result<Vec<KnockoutMatch>, LeagueError> {
    let round = league
        .knockout_round(season, RoundType::SF)
        .ok_or(LeagueError::MissingSemifinals(season))?;
    let mut semis: Vec<KnockoutMatch> = Vec::new();
    for tie in league.round_matches(round.id) {
        let duplicate = match tie.clubs() {
            Some((h, a)) => semis.iter().any(|s| s.is_between(h, a)),
            None => false,
        };
        if !duplicate {
            semis.push(tie.clone());
        }
    }
    Ok(semis)
}

/// Create the final from the season's semifinals, unless it already exists.
///
/// Fixtures follow `format` (1, 2 or 3 legs, alternating venue weekly from `start_date`,
/// defaulting to now) and carry no Match records. One transaction.
pub fn generate_final(
    league: &mut League,
    season: SeasonId,
    format: MatchFormat,
    start_date: Option<DateTime<Utc>>,
) -> Result<FinalOutcome, LeagueError> {
    league.transaction(|league| {
        league.season(season)?;
        let semis = distinct_semifinals(league, season)?;
        if semis.len() < 2 {
            return Err(LeagueError::NotEnoughSemifinalWinners { found: semis.len() });
        }
        let home = semifinal_winner(league, season, &semis[0])?;
        let away = semifinal_winner(league, season, &semis[1])?;

        if let Some(round) = league.knockout_round(season, RoundType::F) {
            if let Some(tie) = league.round_matches(round.id).find(|m| m.is_between(home, away)) {
                log::info!("Final already exists for season {}", season);
                return Ok(FinalOutcome::AlreadyExists {
                    round: round.id,
                    tie: tie.id,
                });
            }
        }

        let round = league.get_or_create_round(season, RoundType::F);
        let tie = KnockoutMatch::between(round, home, away);
        let tie_id = tie.id;
        league.knockout_matches.push(tie);
        let start = start_date.unwrap_or_else(Utc::now);
        let fixtures = create_tie_fixtures(league, season, home, away, format, start);
        rebuild_finish_positions(league, season);
        log::info!(
            "Final fixtures created for season {}: {} fixture(s)",
            season,
            fixtures.len()
        );
        Ok(FinalOutcome::Created {
            round,
            tie: tie_id,
            fixtures,
        })
    })
}

/// Generate finals for several seasons; each season succeeds or fails on its own.
pub fn generate_finals(
    league: &mut League,
    seasons: &[SeasonId],
    format: MatchFormat,
    start_date: Option<DateTime<Utc>>,
) -> Vec<(SeasonId, Result<FinalOutcome, LeagueError>)> {
    seasons
        .iter()
        .map(|&season| {
            let result = generate_final(league, season, format, start_date);
            if let Err(e) = &result {
                log::warn!("Final not generated for season {}: {}", season, e);
            }
            (season, result)
        })
        .collect()
}
