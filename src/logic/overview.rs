//! Read-only bracket overview for display: rounds in bracket order, one line per pairing.

use crate::logic::knockout::tie_aggregate;
use crate::models::{KnockoutMatchId, League, RoundType, SeasonId, Slot};
use serde::Serialize;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TieOverview {
    pub tie: KnockoutMatchId,
    pub home: String,
    pub away: String,
    pub played: bool,
    /// "3-1" when played; aggregate over fixtures when the tie has no own score.
    pub score: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RoundOverview {
    pub round_type: RoundType,
    pub name: &'static str,
    pub ties: Vec<TieOverview>,
}

fn slot_label(league: &League, slot: &Slot) -> String {
    match slot {
        Slot::Club(id) => league
            .club(*id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|_| id.to_string()),
        Slot::Placeholder(p) => p.to_string(),
    }
}

/// The season's knockout rounds, with duplicate pairings (either orientation) shown once.
pub fn bracket_overview(league: &League, season: SeasonId) -> Vec<RoundOverview> {
    let mut rounds: Vec<_> = league
        .knockout_rounds
        .iter()
        .filter(|r| r.season == season)
        .collect();
    rounds.sort_by_key(|r| r.round_type);

    rounds
        .into_iter()
        .map(|round| {
            let mut seen: Vec<(Slot, Slot)> = Vec::new();
            let mut ties = Vec::new();
            for km in league.round_matches(round.id) {
                if seen.contains(&(km.home, km.away)) || seen.contains(&(km.away, km.home)) {
                    continue;
                }
                seen.push((km.home, km.away));

                let aggregate = km
                    .clubs()
                    .and_then(|(home, away)| tie_aggregate(league, season, home, away));
                let (played, score) = if km.is_played {
                    (true, Some((km.home_goals, km.away_goals)))
                } else {
                    (aggregate.is_some(), aggregate)
                };
                ties.push(TieOverview {
                    tie: km.id,
                    home: slot_label(league, &km.home),
                    away: slot_label(league, &km.away),
                    played,
                    score: score.map(|(h, a)| format!("{}-{}", h, a)),
                });
            }
            RoundOverview {
                round_type: round.round_type,
                name: round.round_type.display_name(),
                ties,
            }
        })
        .collect()
}
