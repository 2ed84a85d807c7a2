//! Integration tests for round-robin scheduling.

use chrono::{Duration, TimeZone, Utc};
use league_core::{
    generate_group_fixtures, generate_group_fixtures_repeats, generate_groups, round_robin_pairs, Club,
    ClubId, DrawOptions, FixtureScope, GroupId, League, ScheduleOptions, SeasonId,
};

fn drawn_season(clubs: usize, groups: usize) -> (League, SeasonId) {
    let mut league = League::new();
    let season = league.add_season("Season 1", 2024, true);
    for i in 0..clubs {
        let id = league
            .add_club(Club::seeded(format!("Club {i}"), i as u32 + 1))
            .unwrap();
        league.enter_club(season, id).unwrap();
    }
    let options = DrawOptions {
        num_groups: groups,
        random_draw: false,
        use_seeds: true,
    };
    generate_groups(&mut league, season, &options).unwrap();
    (league, season)
}

fn first_group(league: &League, season: SeasonId) -> GroupId {
    league.group_by_letter(season, 'A').unwrap().id
}

fn fixed_start() -> ScheduleOptions {
    ScheduleOptions {
        start_date: Some(Utc.with_ymd_and_hms(2024, 9, 1, 18, 0, 0).unwrap()),
        ..ScheduleOptions::default()
    }
}

fn fixtures_between(league: &League, group: GroupId, a: ClubId, b: ClubId) -> usize {
    league
        .fixtures
        .iter()
        .filter(|f| f.group == Some(group) && f.is_between(a, b))
        .count()
}

#[test]
fn round_robin_pairs_cover_each_pair_once() {
    let clubs: Vec<ClubId> = (0..5).map(|_| uuid::Uuid::new_v4()).collect();
    let pairs = round_robin_pairs(&clubs);
    assert_eq!(pairs.len(), 10);
    assert_eq!(pairs[0], (clubs[0], clubs[1]));
    assert_eq!(pairs[9], (clubs[3], clubs[4]));
    assert!(round_robin_pairs(&clubs[..1]).is_empty());
}

#[test]
fn single_round_robin_creates_one_fixture_per_pair() {
    let (mut league, season) = drawn_season(8, 2);
    let created =
        generate_group_fixtures(&mut league, FixtureScope::Season(season), &fixed_start()).unwrap();

    // Two groups of 4: 4*3/2 each.
    assert_eq!(created.len(), 12);
    assert_eq!(league.matches.len(), 12);
    let group = first_group(&league, season);
    let weeks: Vec<Option<u32>> = league
        .fixtures
        .iter()
        .filter(|f| f.group == Some(group))
        .map(|f| f.week_number)
        .collect();
    assert_eq!(weeks, (1..=6).map(Some).collect::<Vec<_>>());
}

#[test]
fn fixtures_advance_by_spacing() {
    let (mut league, season) = drawn_season(4, 1);
    let options = fixed_start();
    let created =
        generate_group_fixtures(&mut league, FixtureScope::Season(season), &options).unwrap();

    let start = options.start_date.unwrap();
    let first = league.fixture(created[0]).unwrap();
    let second = league.fixture(created[1]).unwrap();
    assert_eq!(first.date, start);
    assert_eq!(second.date, start + Duration::days(7));
}

#[test]
fn double_round_robin_plays_each_orientation_once() {
    let (mut league, season) = drawn_season(4, 1);
    let options = ScheduleOptions {
        double_round_robin: true,
        ..fixed_start()
    };
    let created =
        generate_group_fixtures(&mut league, FixtureScope::Season(season), &options).unwrap();
    assert_eq!(created.len(), 12);

    let group = league.group_by_letter(season, 'A').unwrap();
    for &(a, b) in &round_robin_pairs(&group.members) {
        let home = league.fixtures.iter().filter(|f| f.home_club == a && f.away_club == b).count();
        let away = league.fixtures.iter().filter(|f| f.home_club == b && f.away_club == a).count();
        assert_eq!((home, away), (1, 1));
    }

    let forward = league.fixture(created[0]).unwrap();
    let reverse = league.fixture(created[1]).unwrap();
    assert_eq!(reverse.week_number, Some(2));
    assert_eq!(reverse.date, forward.date + Duration::days(3));
}

#[test]
fn week_numbers_can_be_left_unset() {
    let (mut league, season) = drawn_season(3, 1);
    let options = ScheduleOptions {
        auto_week_numbers: false,
        ..fixed_start()
    };
    generate_group_fixtures(&mut league, FixtureScope::Season(season), &options).unwrap();
    assert!(league.fixtures.iter().all(|f| f.week_number.is_none()));
}

#[test]
fn repeats_top_up_existing_fixtures() {
    let (mut league, season) = drawn_season(4, 1);
    let group = first_group(&league, season);
    generate_group_fixtures(&mut league, FixtureScope::Group(group), &fixed_start()).unwrap();

    let created = generate_group_fixtures_repeats(&mut league, group, 2, &fixed_start()).unwrap();
    assert_eq!(created, 6);
    let again = generate_group_fixtures_repeats(&mut league, group, 2, &fixed_start()).unwrap();
    assert_eq!(again, 0);

    let members = league.group(group).unwrap().members.clone();
    for &(a, b) in &round_robin_pairs(&members) {
        assert_eq!(fixtures_between(&league, group, a, b), 2);
        assert!(league.fixtures.iter().any(|f| f.home_club == b && f.away_club == a));
    }
}

#[test]
fn repeats_never_delete() {
    let (mut league, season) = drawn_season(3, 1);
    let group = first_group(&league, season);

    assert_eq!(generate_group_fixtures_repeats(&mut league, group, 3, &fixed_start()).unwrap(), 9);
    assert_eq!(generate_group_fixtures_repeats(&mut league, group, 1, &fixed_start()).unwrap(), 0);
    assert_eq!(league.fixtures.len(), 9);
}

#[test]
fn repeats_schedule_legs_after_each_other() {
    let (mut league, season) = drawn_season(3, 1);
    let group = first_group(&league, season);
    let options = fixed_start();
    generate_group_fixtures_repeats(&mut league, group, 2, &options).unwrap();

    let mut weeks: Vec<u32> = league.fixtures.iter().filter_map(|f| f.week_number).collect();
    weeks.sort();
    assert_eq!(weeks, vec![1, 2, 3, 4, 5, 6]);
    let last = league.fixtures.iter().max_by_key(|f| f.date).unwrap();
    assert_eq!(last.date, options.start_date.unwrap() + Duration::days(35));
}

#[test]
fn unknown_group_is_not_found() {
    let (mut league, _) = drawn_season(4, 1);
    let missing = uuid::Uuid::new_v4();
    assert!(generate_group_fixtures(&mut league, FixtureScope::Group(missing), &fixed_start()).is_err());
    assert!(generate_group_fixtures_repeats(&mut league, missing, 2, &fixed_start()).is_err());
    assert!(league.fixtures.is_empty());
}
