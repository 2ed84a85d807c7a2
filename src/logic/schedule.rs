//! Fixture scheduling: round-robin pairings inside each group.

use crate::models::{ClubId, Fixture, FixtureId, Group, GroupId, League, LeagueError, SeasonId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Which groups to schedule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureScope {
    Season(SeasonId),
    Group(GroupId),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleOptions {
    /// Also create the reverse fixture for every pair.
    pub double_round_robin: bool,
    pub auto_week_numbers: bool,
    /// Defaults to now.
    pub start_date: Option<DateTime<Utc>>,
    pub spacing_days: i64,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            double_round_robin: false,
            auto_week_numbers: true,
            start_date: None,
            spacing_days: 7,
        }
    }
}

impl ScheduleOptions {
    fn start(&self) -> DateTime<Utc> {
        self.start_date.unwrap_or_else(Utc::now)
    }
}

/// Every unordered pair `(i, j)` with `i < j`, in member order.
pub fn round_robin_pairs(clubs: &[ClubId]) -> Vec<(ClubId, ClubId)> {
    let mut pairs = Vec::with_capacity(clubs.len() * clubs.len().saturating_sub(1) / 2);
    for i in 0..clubs.len() {
        for j in (i + 1)..clubs.len() {
            pairs.push((clubs[i], clubs[j]));
        }
    }
    pairs
}

/// Create one fixture per pair in each group (two with `double_round_robin`).
///
/// Week numbers start at 1 in every group and advance per pair; the date advances by
/// `spacing_days`. A reverse fixture is dated half a spacing later with week + 1.
pub fn generate_group_fixtures(
    league: &mut League,
    scope: FixtureScope,
    options: &ScheduleOptions,
) -> Result<Vec<FixtureId>, LeagueError> {
    league.transaction(|league| {
        let groups = groups_in_scope(league, scope)?;
        let start = options.start();
        let spacing = Duration::days(options.spacing_days);
        let half_spacing = Duration::days(options.spacing_days / 2);

        let mut created = Vec::new();
        for group in groups {
            let members = existing_members(league, &group);
            let mut week: u32 = 1;
            let mut date = start;
            for (home, away) in round_robin_pairs(&members) {
                let week_number = options.auto_week_numbers.then_some(week);
                let fixture = Fixture::new(group.season, home, away, date).in_group(group.id, week_number);
                created.push(league.add_fixture(fixture, true));

                if options.double_round_robin {
                    let week_number = options.auto_week_numbers.then_some(week + 1);
                    let fixture = Fixture::new(group.season, away, home, date + half_spacing)
                        .in_group(group.id, week_number);
                    created.push(league.add_fixture(fixture, true));
                }

                week += 1;
                date += spacing;
            }
            log::debug!("{}: scheduled through week {}", group.name, week - 1);
        }
        log::info!("Created {} group fixtures", created.len());
        Ok(created)
    })
}

/// Top a group up to exactly `repeats` fixtures per pair. Never deletes.
///
/// Existing fixtures count in either orientation; new ones alternate home and away
/// with the running count. Returns the number of fixtures created.
pub fn generate_group_fixtures_repeats(
    league: &mut League,
    group: GroupId,
    repeats: usize,
    options: &ScheduleOptions,
) -> Result<usize, LeagueError> {
    league.transaction(|league| {
        let group = league.group(group)?.clone();
        let members = existing_members(league, &group);
        let pairs = round_robin_pairs(&members);
        let start = options.start();

        let mut created = 0;
        for (pair_idx, &(a, b)) in pairs.iter().enumerate() {
            let existing = league
                .fixtures
                .iter()
                .filter(|f| f.group == Some(group.id) && f.is_between(a, b))
                .count();
            for leg in existing..repeats {
                let (home, away) = if leg % 2 == 0 { (a, b) } else { (b, a) };
                let slot = leg * pairs.len() + pair_idx;
                let week = u32::try_from(slot + 1).unwrap_or(u32::MAX);
                let date = start + Duration::days(options.spacing_days * slot as i64);
                let week_number = options.auto_week_numbers.then_some(week);
                league.add_fixture(
                    Fixture::new(group.season, home, away, date).in_group(group.id, week_number),
                    true,
                );
                created += 1;
            }
        }
        log::info!("{}: created {} fixtures ({}x each pair)", group.name, created, repeats);
        Ok(created)
    })
}

fn groups_in_scope(league: &League, scope: FixtureScope) -> Result<Vec<Group>, LeagueError> {
    match scope {
        FixtureScope::Season(season) => {
            league.season(season)?;
            Ok(league.season_groups(season).cloned().collect())
        }
        FixtureScope::Group(id) => Ok(vec![league.group(id)?.clone()]),
    }
}

/// Group members that still exist; missing clubs are skipped with a warning.
fn existing_members(league: &League, group: &Group) -> Vec<ClubId> {
    group
        .members
        .iter()
        .copied()
        .filter(|&id| match league.club(id) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Skipping club {} in {}: {}", id, group.name, e);
                false
            }
        })
        .collect()
}
