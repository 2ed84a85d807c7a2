//! Knockout bracket: qualifier ranking, placeholder ties, real ties, tie fixtures.
//!
//! A season's knockout round moves Empty -> Placeholders -> Resolved. Placeholder ties
//! ("A1 vs B2") are drawn while standings are incomplete; once every group has enough
//! ranked clubs the placeholders are replaced by a real bracket.

use crate::logic::standings::{group_standings, rebuild_finish_positions};
use crate::models::{
    ClubId, Fixture, FixtureId, Group, KnockoutMatch, KnockoutMatchId, KnockoutRoundId, League,
    LeagueError, MatchRef, Placeholder, RoundType, SeasonId, Slot, TeamSeasonStats,
};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// How many clubs leave each group.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifiers {
    PerGroup(usize),
    /// Split evenly across the season's groups.
    Total(usize),
}

impl Qualifiers {
    pub fn per_group(self, groups: usize) -> Result<usize, LeagueError> {
        match self {
            Qualifiers::PerGroup(k) => Ok(k),
            Qualifiers::Total(total) => {
                if groups == 0 || total % groups != 0 {
                    return Err(LeagueError::QualifiersNotDivisible { total, groups });
                }
                Ok(total / groups)
            }
        }
    }
}

/// Number of fixtures played per tie.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFormat {
    #[default]
    Single,
    TwoLeg,
    BestOfThree,
}

impl MatchFormat {
    pub fn legs(self) -> usize {
        match self {
            MatchFormat::Single => 1,
            MatchFormat::TwoLeg => 2,
            MatchFormat::BestOfThree => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutOptions {
    pub qualifiers: Qualifiers,
    /// Pair best against worst by group standings.
    #[serde(default = "default_true")]
    pub seeded_bracket: bool,
    /// Shuffle the qualifiers (takes precedence over seeding).
    #[serde(default)]
    pub random_bracket: bool,
    #[serde(default)]
    pub two_leg_rounds: bool,
    #[serde(default)]
    pub create_fixtures: bool,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Default for KnockoutOptions {
    fn default() -> Self {
        Self {
            qualifiers: Qualifiers::PerGroup(2),
            seeded_bracket: true,
            random_bracket: false,
            two_leg_rounds: false,
            create_fixtures: false,
            start_date: None,
        }
    }
}

impl KnockoutOptions {
    pub fn format(&self) -> MatchFormat {
        if self.two_leg_rounds {
            MatchFormat::TwoLeg
        } else {
            MatchFormat::Single
        }
    }
}

/// What a call to [`generate_knockouts`] did to the round.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketStatus {
    /// Standings incomplete; placeholder ties were drawn.
    PlaceholdersCreated,
    /// Standings incomplete and the round already has ties; nothing changed.
    AlreadyExists,
    /// Real ties exist (created now or reused).
    Resolved,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutOutcome {
    pub round: KnockoutRoundId,
    pub round_type: RoundType,
    pub status: BracketStatus,
    pub matches: Vec<KnockoutMatchId>,
    /// Fixtures of the round's ties, whether created by this call or already present.
    pub fixtures: Vec<FixtureId>,
}

/// Symbolic ties for groups paired two at a time: `(X q) vs (Y k-q+1)` and the mirror.
pub fn placeholder_pairs(
    letters: &[char],
    qualifiers_per_group: usize,
) -> Result<Vec<(Placeholder, Placeholder)>, LeagueError> {
    if letters.len() % 2 != 0 {
        return Err(LeagueError::OddGroupCount(letters.len()));
    }
    let k = u32::try_from(qualifiers_per_group)
        .map_err(|_| LeagueError::UnsupportedBracketSize(qualifiers_per_group))?;
    let mut pairs = Vec::with_capacity(letters.len() * qualifiers_per_group);
    for chunk in letters.chunks_exact(2) {
        let (x, y) = (chunk[0], chunk[1]);
        for q in 1..=k {
            pairs.push((Placeholder::new(x, q), Placeholder::new(y, k - q + 1)));
            pairs.push((Placeholder::new(y, q), Placeholder::new(x, k - q + 1)));
        }
    }
    Ok(pairs)
}

/// Top `k` of every group, in group order; None while any group has fewer than `k` ranked.
pub fn qualified_clubs(
    league: &League,
    season: SeasonId,
    groups: &[Group],
    k: usize,
) -> Result<Option<Vec<TeamSeasonStats>>, LeagueError> {
    let mut qualified = Vec::with_capacity(groups.len() * k);
    for group in groups {
        let table = group_standings(league, season, group.id)?;
        if table.len() < k {
            return Ok(None);
        }
        qualified.extend(table.into_iter().take(k));
    }
    Ok(Some(qualified))
}

/// Order qualifiers so that pairing `[0,1],[2,3],..` gives the bracket.
///
/// Random shuffles. Seeded ranks everyone by standings and interleaves best with worst.
/// Neither keeps group order.
fn bracket_order(mut qualified: Vec<TeamSeasonStats>, seeded: bool, random: bool) -> Vec<ClubId> {
    if random {
        let mut clubs: Vec<ClubId> = qualified.iter().map(|s| s.club).collect();
        clubs.shuffle(&mut rand::thread_rng());
        return clubs;
    }
    if !seeded {
        return qualified.iter().map(|s| s.club).collect();
    }
    qualified.sort_by(TeamSeasonStats::standings_cmp);
    let n = qualified.len();
    let mut clubs = Vec::with_capacity(n);
    for i in 0..n / 2 {
        clubs.push(qualified[i].club);
        clubs.push(qualified[n - 1 - i].club);
    }
    clubs
}

fn group_letters(groups: &[Group]) -> Result<Vec<char>, LeagueError> {
    groups
        .iter()
        .map(|g| g.letter().ok_or_else(|| LeagueError::UnlabelledGroup(g.name.clone())))
        .collect()
}

/// Build (or advance) the season's first knockout round from group standings.
///
/// Configuration is validated before any write. With incomplete standings the round gets
/// placeholder ties once; with complete standings the placeholder ties are replaced by a
/// real bracket, and existing real ties are reused. With `create_fixtures`, each unique
/// pairing gets its tie fixtures unless it already has some. One transaction.
pub fn generate_knockouts(
    league: &mut League,
    season: SeasonId,
    options: &KnockoutOptions,
) -> Result<KnockoutOutcome, LeagueError> {
    league.transaction(|league| {
        league.season(season)?;
        let groups: Vec<Group> = league.season_groups(season).cloned().collect();
        if groups.is_empty() {
            return Err(LeagueError::NoGroups(season));
        }
        let k = options.qualifiers.per_group(groups.len())?;
        let teams = groups.len() * k;
        let round_type =
            RoundType::for_team_count(teams).ok_or(LeagueError::UnsupportedBracketSize(teams))?;

        let Some(qualified) = qualified_clubs(league, season, &groups, k)? else {
            let pairs = placeholder_pairs(&group_letters(&groups)?, k)?;
            let round = league.get_or_create_round(season, round_type);
            let existing: Vec<KnockoutMatchId> = league.round_matches(round).map(|m| m.id).collect();
            if !existing.is_empty() {
                log::info!("{} placeholders already exist for season {}", round_type.code(), season);
                return Ok(KnockoutOutcome {
                    round,
                    round_type,
                    status: BracketStatus::AlreadyExists,
                    matches: existing,
                    fixtures: Vec::new(),
                });
            }
            let ties: Vec<KnockoutMatch> = pairs
                .into_iter()
                .map(|(home, away)| KnockoutMatch::from_placeholders(round, home, away))
                .collect();
            let matches = ties.iter().map(|m| m.id).collect();
            league.knockout_matches.extend(ties);
            log::info!("Created {} placeholder ties for season {}", round_type.code(), season);
            return Ok(KnockoutOutcome {
                round,
                round_type,
                status: BracketStatus::PlaceholdersCreated,
                matches,
                fixtures: Vec::new(),
            });
        };

        let round = league.get_or_create_round(season, round_type);
        remove_placeholder_ties(league, round);

        let existing: Vec<KnockoutMatchId> = league.round_matches(round).map(|m| m.id).collect();
        let matches = if existing.is_empty() {
            let order = bracket_order(qualified, options.seeded_bracket, options.random_bracket);
            let ties: Vec<KnockoutMatch> = order
                .chunks_exact(2)
                .map(|pair| KnockoutMatch::between(round, pair[0], pair[1]))
                .collect();
            let ids = ties.iter().map(|m| m.id).collect();
            league.knockout_matches.extend(ties);
            log::info!("Drew {} bracket for season {}", round_type.code(), season);
            ids
        } else {
            existing
        };

        let fixtures = if options.create_fixtures {
            let start = options.start_date.unwrap_or_else(Utc::now);
            round_fixtures(league, season, round, options.format(), start)
        } else {
            Vec::new()
        };
        rebuild_finish_positions(league, season);

        Ok(KnockoutOutcome {
            round,
            round_type,
            status: BracketStatus::Resolved,
            matches,
            fixtures,
        })
    })
}

/// Delete the round's placeholder-drawn ties along with their match-stats rows.
fn remove_placeholder_ties(league: &mut League, round: KnockoutRoundId) {
    let removed: Vec<KnockoutMatchId> = league
        .round_matches(round)
        .filter(|m| m.from_placeholders)
        .map(|m| m.id)
        .collect();
    if removed.is_empty() {
        return;
    }
    league.knockout_matches.retain(|m| !removed.contains(&m.id));
    league.player_match_stats.retain(|row| match row.match_ref {
        MatchRef::Knockout(id) => !removed.contains(&id),
        _ => true,
    });
    log::debug!("Removed {} placeholder ties", removed.len());
}

/// Fixtures for every unique pairing of the round, creating them where none exist.
fn round_fixtures(
    league: &mut League,
    season: SeasonId,
    round: KnockoutRoundId,
    format: MatchFormat,
    start: DateTime<Utc>,
) -> Vec<FixtureId> {
    let pairings: Vec<(ClubId, ClubId)> = league.round_matches(round).filter_map(|m| m.clubs()).collect();
    let mut seen: Vec<(ClubId, ClubId)> = Vec::new();
    let mut fixtures = Vec::new();
    for (home, away) in pairings {
        let key = if home <= away { (home, away) } else { (away, home) };
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        let existing: Vec<FixtureId> = league
            .standalone_fixtures_between(season, home, away)
            .iter()
            .map(|f| f.id)
            .collect();
        if existing.is_empty() {
            fixtures.extend(create_tie_fixtures(league, season, home, away, format, start));
        } else {
            fixtures.extend(existing);
        }
    }
    fixtures
}

/// Standalone fixtures for one tie, alternating venue weekly. No Match records are
/// created: the tie (or a result recorded later) is authoritative.
pub(crate) fn create_tie_fixtures(
    league: &mut League,
    season: SeasonId,
    home: ClubId,
    away: ClubId,
    format: MatchFormat,
    start: DateTime<Utc>,
) -> Vec<FixtureId> {
    (0..format.legs())
        .map(|leg| {
            let (h, a) = if leg % 2 == 0 { (home, away) } else { (away, home) };
            let date = start + Duration::weeks(leg as i64);
            league.add_fixture(Fixture::new(season, h, a, date), false)
        })
        .collect()
}

/// Aggregate score of a tie's played fixtures, oriented to `home`. None if none are played.
pub fn tie_aggregate(league: &League, season: SeasonId, home: ClubId, away: ClubId) -> Option<(u32, u32)> {
    let mut played = false;
    let (mut home_total, mut away_total) = (0, 0);
    for fixture in league.standalone_fixtures_between(season, home, away) {
        let Some(m) = league.fixture_match(fixture.id).filter(|m| m.is_played) else {
            continue;
        };
        played = true;
        if fixture.home_club == home {
            home_total += m.home_goals;
            away_total += m.away_goals;
        } else {
            home_total += m.away_goals;
            away_total += m.home_goals;
        }
    }
    played.then_some((home_total, away_total))
}

fn resolve_placeholder(league: &League, season: SeasonId, placeholder: Placeholder) -> Option<ClubId> {
    let group = league.group_by_letter(season, placeholder.group)?;
    let table = group_standings(league, season, group.id).ok()?;
    let index = usize::try_from(placeholder.rank).ok()?.checked_sub(1)?;
    table.get(index).map(|row| row.club)
}

/// Replace every placeholder slot whose group rank is now known with the real club.
///
/// Slots that cannot be resolved yet are left alone, and resolved slots never revert,
/// so the pass is safe to repeat. Returns the ties that changed.
pub fn resolve_placeholders(
    league: &mut League,
    season: SeasonId,
) -> Result<Vec<KnockoutMatchId>, LeagueError> {
    league.season(season)?;
    let rounds: Vec<KnockoutRoundId> = league
        .knockout_rounds
        .iter()
        .filter(|r| r.season == season)
        .map(|r| r.id)
        .collect();

    let mut updates = Vec::new();
    for km in league.knockout_matches.iter().filter(|m| rounds.contains(&m.round)) {
        let home = km.home.placeholder().and_then(|p| resolve_placeholder(league, season, p));
        let away = km.away.placeholder().and_then(|p| resolve_placeholder(league, season, p));
        if home.is_some() || away.is_some() {
            updates.push((km.id, home, away));
        }
    }

    let mut changed = Vec::with_capacity(updates.len());
    for (id, home, away) in updates {
        let km = league.knockout_match_mut(id)?;
        if let Some(club) = home {
            km.home = Slot::Club(club);
        }
        if let Some(club) = away {
            km.away = Slot::Club(club);
        }
        changed.push(id);
    }
    if !changed.is_empty() {
        log::info!("Resolved placeholders on {} ties in season {}", changed.len(), season);
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_pairs_cross_seed_adjacent_groups() {
        let pairs = placeholder_pairs(&['A', 'B', 'C', 'D'], 2).unwrap();
        let codes: Vec<String> = pairs.iter().map(|(h, a)| format!("{} v {}", h, a)).collect();
        assert_eq!(
            codes,
            vec!["A1 v B2", "B1 v A2", "A2 v B1", "B2 v A1", "C1 v D2", "D1 v C2", "C2 v D1", "D2 v C1"]
        );
    }

    #[test]
    fn placeholder_pairs_need_even_group_count() {
        assert_eq!(
            placeholder_pairs(&['A', 'B', 'C'], 2),
            Err(LeagueError::OddGroupCount(3))
        );
    }

    #[test]
    fn total_qualifiers_must_split_evenly() {
        assert_eq!(Qualifiers::Total(8).per_group(4), Ok(2));
        assert_eq!(
            Qualifiers::Total(6).per_group(4),
            Err(LeagueError::QualifiersNotDivisible { total: 6, groups: 4 })
        );
    }
}
