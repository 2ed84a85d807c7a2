//! Season awards, picked from the season's player stats rows.

use crate::models::{League, LeagueError, PlayerId, PlayerSeasonStats, SeasonAwards, SeasonId};
use std::cmp::Ordering;

const DEFENSIVE_POSITIONS: [&str; 4] = ["GK", "CB", "LB", "RB"];
const MIDFIELD_POSITIONS: [&str; 3] = ["CM", "CDM", "CAM"];

fn by_rating(a: &PlayerSeasonStats, b: &PlayerSeasonStats) -> Ordering {
    a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal)
}

/// Highest row by `cmp`; the earliest row wins a tie.
fn best<'a, I, F>(rows: I, cmp: F) -> Option<PlayerId>
where
    I: Iterator<Item = &'a PlayerSeasonStats>,
    F: Fn(&PlayerSeasonStats, &PlayerSeasonStats) -> Ordering,
{
    rows.min_by(|a, b| cmp(b, a)).map(|row| row.player)
}

fn plays_in(league: &League, player: PlayerId, positions: &[&str]) -> bool {
    league.player(player).is_ok_and(|p| {
        positions
            .iter()
            .any(|pos| p.position.eq_ignore_ascii_case(pos))
    })
}

/// Awards for one season.
///
/// - top scorer: most goals, then assists (needs a goal)
/// - top assister: most assists, then goals (needs an assist)
/// - MVP: best rating, then goals plus assists (needs a rating)
/// - best defender: best rating among GK/CB/LB/RB, then clean sheets
/// - best midfielder: best rating among CM/CDM/CAM, then assists
pub fn season_awards(league: &League, season: SeasonId) -> Result<SeasonAwards, LeagueError> {
    league.season(season)?;
    let rows: Vec<&PlayerSeasonStats> = league
        .player_season_stats
        .iter()
        .filter(|s| s.season == season)
        .collect();

    let awards = SeasonAwards {
        season,
        top_scorer: best(rows.iter().copied().filter(|s| s.goals > 0), |a, b| {
            a.goals.cmp(&b.goals).then(a.assists.cmp(&b.assists))
        }),
        top_assister: best(rows.iter().copied().filter(|s| s.assists > 0), |a, b| {
            a.assists.cmp(&b.assists).then(a.goals.cmp(&b.goals))
        }),
        mvp: best(rows.iter().copied().filter(|s| s.rating > 0.0), |a, b| {
            by_rating(a, b).then((a.goals + a.assists).cmp(&(b.goals + b.assists)))
        }),
        best_defender: best(
            rows.iter()
                .copied()
                .filter(|s| plays_in(league, s.player, &DEFENSIVE_POSITIONS)),
            |a, b| by_rating(a, b).then(a.clean_sheets.cmp(&b.clean_sheets)),
        ),
        best_midfielder: best(
            rows.iter()
                .copied()
                .filter(|s| plays_in(league, s.player, &MIDFIELD_POSITIONS)),
            |a, b| by_rating(a, b).then(a.assists.cmp(&b.assists)),
        ),
    };
    log::debug!("Awards for season {}: {:?}", season, awards);
    Ok(awards)
}
