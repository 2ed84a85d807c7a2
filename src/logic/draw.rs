//! Group draw: partition a season's clubs into balanced groups.

use crate::models::{Club, FixtureId, Group, GroupId, League, LeagueError, MatchId, MatchRef, SeasonId};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// How the draw orders clubs before dealing them into groups.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DrawOptions {
    pub num_groups: usize,
    /// Shuffle after the seed sort (overrides seeding).
    #[serde(default = "default_true")]
    pub random_draw: bool,
    #[serde(default = "default_true")]
    pub use_seeds: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            num_groups: 4,
            random_draw: true,
            use_seeds: true,
        }
    }
}

/// Replace the season's groups with a fresh draw.
///
/// 1. Load the season's clubs (unknown ids are skipped with a warning).
/// 2. If `use_seeds`, stable-sort by seed rank, unseeded last.
/// 3. If `random_draw`, shuffle (so a random draw overrides seeding).
/// 4. Reuse or create "Group A".., clear memberships and deal clubs by `index % num_groups`.
///    Groups left over from a larger draw are deleted along with their fixtures.
///
/// Runs as one transaction: on error nothing changes.
pub fn generate_groups(
    league: &mut League,
    season: SeasonId,
    options: &DrawOptions,
) -> Result<Vec<GroupId>, LeagueError> {
    league.transaction(|league| {
        let roster = league.season(season)?.clubs.clone();
        let mut clubs: Vec<Club> = Vec::with_capacity(roster.len());
        for id in roster {
            match league.club(id) {
                Ok(club) => clubs.push(club.clone()),
                Err(e) => log::warn!("Skipping club {} in draw: {}", id, e),
            }
        }
        if clubs.is_empty() {
            return Err(LeagueError::NoClubs(season));
        }
        let names: Vec<String> = (0..options.num_groups)
            .map(Group::name_for_index)
            .collect::<Option<_>>()
            .filter(|names: &Vec<String>| !names.is_empty())
            .ok_or(LeagueError::InvalidGroupCount(options.num_groups))?;

        if options.use_seeds {
            clubs.sort_by_key(Club::seed_key);
        }
        if options.random_draw {
            clubs.shuffle(&mut rand::thread_rng());
        }

        let ids: Vec<GroupId> = names
            .iter()
            .map(|name| league.get_or_create_group(season, name))
            .collect();
        remove_stale_groups(league, season, &ids);
        for group in league.groups.iter_mut().filter(|g| g.season == season) {
            group.members.clear();
        }

        let group_count = ids.len();
        for (idx, club) in clubs.iter().enumerate() {
            if let Some(group) = league.groups.iter_mut().find(|g| g.id == ids[idx % group_count]) {
                group.add_member(club.id);
            }
        }
        for group in league.season_groups(season) {
            log::debug!("{}: {} clubs", group.name, group.members.len());
        }
        log::info!(
            "Drew {} clubs into {} groups for season {}",
            clubs.len(),
            group_count,
            season
        );
        Ok(ids)
    })
}

/// Delete the season's groups that are not part of the new draw, with their fixtures,
/// Match records and match-stats rows. Group fixtures never outlive their group.
fn remove_stale_groups(league: &mut League, season: SeasonId, keep: &[GroupId]) {
    let stale: Vec<GroupId> = league
        .season_groups(season)
        .map(|g| g.id)
        .filter(|id| !keep.contains(id))
        .collect();
    if stale.is_empty() {
        return;
    }
    let fixtures: Vec<FixtureId> = league
        .fixtures
        .iter()
        .filter(|f| f.group.is_some_and(|g| stale.contains(&g)))
        .map(|f| f.id)
        .collect();
    let matches: Vec<MatchId> = league
        .matches
        .iter()
        .filter(|m| fixtures.contains(&m.fixture))
        .map(|m| m.id)
        .collect();
    league.player_match_stats.retain(|row| match row.match_ref {
        MatchRef::GroupFixture(id) => !matches.contains(&id),
        MatchRef::Standalone(id) => !fixtures.contains(&id),
        MatchRef::Knockout(_) => true,
    });
    league.matches.retain(|m| !matches.contains(&m.id));
    league.fixtures.retain(|f| !fixtures.contains(&f.id));
    league.groups.retain(|g| !stale.contains(&g.id));
    log::debug!(
        "Removed {} groups and {} fixtures from the previous draw",
        stale.len(),
        fixtures.len()
    );
}
