//! Integration tests for the group draw.

use league_core::{
    generate_final, generate_group_fixtures, generate_groups, Club, ClubId, DrawOptions, ErrorKind,
    FixtureScope, KnockoutMatch, League, LeagueError, MatchFormat, MatchRef, MatchResult,
    PlayerMatchStats, RoundType, ScheduleOptions, SeasonId,
};
use std::collections::HashSet;

fn season_with_clubs(n: usize) -> (League, SeasonId, Vec<ClubId>) {
    let mut league = League::new();
    let season = league.add_season("Season 1", 2024, true);
    let mut clubs = Vec::with_capacity(n);
    for i in 0..n {
        let id = league
            .add_club(Club::seeded(format!("Club {i}"), i as u32 + 1))
            .unwrap();
        league.enter_club(season, id).unwrap();
        clubs.push(id);
    }
    (league, season, clubs)
}

fn seeded_options(num_groups: usize) -> DrawOptions {
    DrawOptions {
        num_groups,
        random_draw: false,
        use_seeds: true,
    }
}

#[test]
fn draw_partitions_every_club_into_balanced_groups() {
    let (mut league, season, clubs) = season_with_clubs(10);
    let ids = generate_groups(&mut league, season, &DrawOptions::default()).unwrap();
    assert_eq!(ids.len(), 4);

    let groups: Vec<_> = league.season_groups(season).collect();
    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Group A", "Group B", "Group C", "Group D"]);

    let mut sizes: Vec<usize> = groups.iter().map(|g| g.members.len()).collect();
    sizes.sort();
    assert_eq!(sizes, vec![2, 2, 3, 3]);

    let drawn: HashSet<ClubId> = groups.iter().flat_map(|g| g.members.iter().copied()).collect();
    assert_eq!(drawn.len(), 10);
    assert!(clubs.iter().all(|c| drawn.contains(c)));
}

#[test]
fn seeded_draw_deals_by_seed_rank() {
    let (mut league, season, clubs) = season_with_clubs(8);
    generate_groups(&mut league, season, &seeded_options(4)).unwrap();

    let a = league.group_by_letter(season, 'A').unwrap();
    assert_eq!(a.members, vec![clubs[0], clubs[4]]);
    let d = league.group_by_letter(season, 'D').unwrap();
    assert_eq!(d.members, vec![clubs[3], clubs[7]]);
}

#[test]
fn unseeded_clubs_are_dealt_last() {
    let (mut league, season, clubs) = season_with_clubs(3);
    let unseeded = league.add_club(Club::new("Latecomers")).unwrap();
    league.enter_club(season, unseeded).unwrap();
    // Entered first, but carries no seed.
    league.season_mut(season).unwrap().clubs.rotate_right(1);

    generate_groups(&mut league, season, &seeded_options(4)).unwrap();
    assert_eq!(league.group_by_letter(season, 'A').unwrap().members, vec![clubs[0]]);
    assert_eq!(league.group_by_letter(season, 'D').unwrap().members, vec![unseeded]);
}

#[test]
fn redraw_reuses_groups_and_keeps_fixtures_attached() {
    let (mut league, season, clubs) = season_with_clubs(8);
    let first = generate_groups(&mut league, season, &seeded_options(2)).unwrap();
    let created =
        generate_group_fixtures(&mut league, FixtureScope::Season(season), &ScheduleOptions::default())
            .unwrap();
    assert_eq!(created.len(), 12);

    let second = generate_groups(&mut league, season, &seeded_options(4)).unwrap();
    assert_eq!(&second[..2], first.as_slice());
    assert_eq!(league.season_groups(season).count(), 4);
    assert_eq!(league.group_by_letter(season, 'A').unwrap().members, vec![clubs[0], clubs[4]]);
    assert_eq!(league.fixtures.len(), 12);
    assert!(league.fixtures.iter().all(|f| f.group.is_some()));
    assert_eq!(league.matches.len(), 12);
}

#[test]
fn shrinking_redraw_deletes_extra_groups_with_their_fixtures() {
    let (mut league, season, _) = season_with_clubs(8);
    generate_groups(&mut league, season, &seeded_options(4)).unwrap();
    generate_group_fixtures(&mut league, FixtureScope::Season(season), &ScheduleOptions::default())
        .unwrap();
    assert_eq!(league.fixtures.len(), 4);
    let c = league.group_by_letter(season, 'C').unwrap().id;
    let c_fixture = league.fixtures.iter().find(|f| f.group == Some(c)).unwrap().id;
    let c_match = league.fixture_match(c_fixture).unwrap().id;
    league
        .player_match_stats
        .push(PlayerMatchStats::new(uuid::Uuid::new_v4(), MatchRef::GroupFixture(c_match)));

    generate_groups(&mut league, season, &seeded_options(2)).unwrap();
    let names: Vec<_> = league.season_groups(season).map(|g| g.name.clone()).collect();
    assert_eq!(names, vec!["Group A", "Group B"]);
    assert_eq!(league.fixtures.len(), 2);
    assert_eq!(league.matches.len(), 2);
    assert!(league.fixtures.iter().all(|f| f.group.is_some()));
    assert!(league.player_match_stats.is_empty());
}

#[test]
fn group_results_never_decide_a_semifinal_after_a_redraw() {
    let (mut league, season, clubs) = season_with_clubs(4);
    generate_groups(&mut league, season, &seeded_options(2)).unwrap();
    generate_group_fixtures(&mut league, FixtureScope::Season(season), &ScheduleOptions::default())
        .unwrap();
    // Group A is clubs 0 and 2.
    let group_game = league
        .fixtures
        .iter()
        .find(|f| f.home_club == clubs[0] && f.away_club == clubs[2])
        .unwrap()
        .id;
    let id = league.fixture_match(group_game).unwrap().id;
    league.match_record_mut(id).unwrap().apply(&MatchResult::played(0, 3));

    generate_groups(&mut league, season, &seeded_options(2)).unwrap();

    let round = league.get_or_create_round(season, RoundType::SF);
    let pending = KnockoutMatch::between(round, clubs[0], clubs[2]);
    let pending_id = pending.id;
    league.knockout_matches.push(pending);
    let mut decided = KnockoutMatch::between(round, clubs[1], clubs[3]);
    decided.apply(&MatchResult::played(1, 0));
    league.knockout_matches.push(decided);

    let err = generate_final(&mut league, season, MatchFormat::Single, None).unwrap_err();
    assert_eq!(err, LeagueError::SemifinalWithoutResult(pending_id));
}

#[test]
fn draw_without_clubs_fails() {
    let mut league = League::new();
    let season = league.add_season("Empty", 2024, true);
    let err = generate_groups(&mut league, season, &DrawOptions::default()).unwrap_err();
    assert_eq!(err, LeagueError::NoClubs(season));
    assert_eq!(err.kind(), ErrorKind::Input);
}

#[test]
fn invalid_group_count_leaves_previous_draw() {
    let (mut league, season, _) = season_with_clubs(6);
    let first = generate_groups(&mut league, season, &seeded_options(2)).unwrap();

    for bad in [0, 27] {
        let err = generate_groups(&mut league, season, &seeded_options(bad)).unwrap_err();
        assert_eq!(err, LeagueError::InvalidGroupCount(bad));
    }
    let kept: Vec<_> = league.season_groups(season).map(|g| g.id).collect();
    assert_eq!(kept, first);
}

#[test]
fn unknown_season_is_not_found() {
    let (mut league, _, _) = season_with_clubs(4);
    let err = generate_groups(&mut league, uuid::Uuid::new_v4(), &DrawOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
