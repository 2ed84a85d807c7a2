//! Integration tests for recomputation after result writes.

use league_core::{
    affected_by, generate_group_fixtures, generate_groups, generate_knockouts, Club, ClubId,
    Coordinator, DrawOptions, ErrorKind, FixtureScope, KnockoutMatch, KnockoutOptions, League,
    MatchId, MatchRef, MatchResult, Player, PlayerMatchStats, ResultChange, RoundType,
    ScheduleOptions, SeasonId,
};

/// Eight clubs in four groups of two; group A plays first.
fn league_with_groups(active: bool) -> (League, SeasonId, Vec<ClubId>) {
    let mut league = League::new();
    let season = league.add_season("Season 1", 2024, active);
    let mut clubs = Vec::new();
    for i in 0..8 {
        let id = league
            .add_club(Club::seeded(format!("Club {i}"), i + 1))
            .unwrap();
        league.enter_club(season, id).unwrap();
        clubs.push(id);
    }
    let draw = DrawOptions {
        num_groups: 4,
        random_draw: false,
        use_seeds: true,
    };
    generate_groups(&mut league, season, &draw).unwrap();
    generate_group_fixtures(&mut league, FixtureScope::Season(season), &ScheduleOptions::default())
        .unwrap();
    (league, season, clubs)
}

fn group_matches(league: &League) -> Vec<MatchId> {
    league.matches.iter().map(|m| m.id).collect()
}

#[test]
fn recording_a_result_rebuilds_both_clubs() {
    let (mut league, season, clubs) = league_with_groups(true);
    let mut coordinator = Coordinator::new();
    let first = group_matches(&league)[0];

    let affected = coordinator
        .record_match_result(&mut league, first, &MatchResult::played(2, 1))
        .unwrap()
        .unwrap();
    assert_eq!(affected.season, season);
    assert_eq!(affected.clubs.len(), 2);

    let winner = league.team_stats(clubs[0], season).unwrap();
    assert_eq!((winner.played, winner.wins, winner.points), (1, 1, 3));
    let loser = league.team_stats(clubs[4], season).unwrap();
    assert_eq!((loser.losses, loser.goal_difference), (1, -1));
}

#[test]
fn corrected_scores_replace_earlier_ones() {
    let (mut league, season, clubs) = league_with_groups(true);
    let mut coordinator = Coordinator::new();
    let first = group_matches(&league)[0];

    coordinator
        .record_match_result(&mut league, first, &MatchResult::played(2, 0))
        .unwrap();
    coordinator
        .record_match_result(&mut league, first, &MatchResult::played(0, 1))
        .unwrap();

    let home = league.team_stats(clubs[0], season).unwrap();
    assert_eq!((home.played, home.wins, home.losses, home.points), (1, 0, 1, 0));
    assert_eq!((home.goals_for, home.goals_against), (0, 1));
}

#[test]
fn deleting_a_match_removes_its_result() {
    let (mut league, season, clubs) = league_with_groups(true);
    let mut coordinator = Coordinator::new();
    let first = group_matches(&league)[0];
    coordinator
        .record_match_result(&mut league, first, &MatchResult::played(3, 0))
        .unwrap();

    coordinator.delete_match(&mut league, first).unwrap();
    assert!(league.match_record(first).is_err());
    let home = league.team_stats(clubs[0], season).unwrap();
    assert_eq!((home.played, home.points), (0, 0));
}

#[test]
fn archived_seasons_keep_their_stats() {
    let (mut league, _, _) = league_with_groups(false);
    let mut coordinator = Coordinator::new();
    let first = group_matches(&league)[0];

    let affected = coordinator
        .record_match_result(&mut league, first, &MatchResult::played(1, 0))
        .unwrap();
    assert!(affected.is_some());
    assert!(league.team_stats.is_empty());
    assert!(league.match_record(first).unwrap().is_played);
}

#[test]
fn placeholders_resolve_as_groups_finish() {
    let (mut league, season, clubs) = league_with_groups(true);
    let mut coordinator = Coordinator::new();
    generate_knockouts(&mut league, season, &KnockoutOptions::default()).unwrap();

    let matches = group_matches(&league);
    coordinator
        .record_match_result(&mut league, matches[0], &MatchResult::played(1, 0))
        .unwrap();
    // Group A is decided: A1 is known everywhere it appears.
    let a1_ties: Vec<&KnockoutMatch> = league
        .knockout_matches
        .iter()
        .filter(|m| m.home.club() == Some(clubs[0]))
        .collect();
    assert_eq!(a1_ties.len(), 1);
    assert!(a1_ties[0].away.placeholder().is_some());

    for &id in &matches[1..] {
        coordinator
            .record_match_result(&mut league, id, &MatchResult::played(2, 2))
            .unwrap();
    }
    assert!(league.knockout_matches.iter().all(|m| m.is_resolved()));
    assert!(!coordinator.is_resolving(season));
}

#[test]
fn explicit_resolution_pass_reports_success() {
    let (mut league, season, _) = league_with_groups(true);
    let mut coordinator = Coordinator::new();
    generate_knockouts(&mut league, season, &KnockoutOptions::default()).unwrap();

    assert!(coordinator.resolve_placeholders(&mut league, season));
    assert!(!coordinator.is_resolving(season));
    assert!(!coordinator.resolve_placeholders(&mut league, uuid::Uuid::new_v4()));
}

#[test]
fn knockout_results_feed_team_stats() {
    let (mut league, season, clubs) = league_with_groups(true);
    let mut coordinator = Coordinator::new();
    let round = league.get_or_create_round(season, RoundType::F);
    let tie = KnockoutMatch::between(round, clubs[0], clubs[1]);
    let tie_id = tie.id;
    league.knockout_matches.push(tie);

    let affected = coordinator
        .record_knockout_result(&mut league, tie_id, &MatchResult::played(0, 2))
        .unwrap()
        .unwrap();
    assert_eq!(affected.clubs.len(), 2);
    assert_eq!(league.team_stats(clubs[1], season).unwrap().wins, 1);
}

#[test]
fn player_stats_follow_match_stats_writes() {
    let (mut league, season, clubs) = league_with_groups(true);
    let mut coordinator = Coordinator::new();
    let player = league.add_player(Player::new("nine", "ST", clubs[0])).unwrap();
    let matches = group_matches(&league);

    let mut first = PlayerMatchStats::new(player, MatchRef::GroupFixture(matches[0]));
    first.goals = 2;
    first.minutes_played = 90;
    first.rating = 9.0;
    let mut second = PlayerMatchStats::new(player, MatchRef::GroupFixture(matches[0]));
    second.goals = 1;
    second.minutes_played = 45;
    second.rating = 6.0;
    coordinator.record_player_match_stats(&mut league, first).unwrap();
    let second_id = coordinator.record_player_match_stats(&mut league, second).unwrap();

    let row = league.player_season_stats(player, season).unwrap();
    assert_eq!((row.goals, row.appearances), (3, 2));
    assert!((row.rating - 7.5).abs() < 1e-9);

    coordinator.delete_player_match_stats(&mut league, second_id).unwrap();
    let row = league.player_season_stats(player, season).unwrap();
    assert_eq!((row.goals, row.appearances), (2, 1));
    assert!((row.rating - 9.0).abs() < 1e-9);
}

#[test]
fn match_stats_for_unknown_match_are_rejected() {
    let (mut league, _, clubs) = league_with_groups(true);
    let mut coordinator = Coordinator::new();
    let player = league.add_player(Player::new("ghost", "GK", clubs[0])).unwrap();
    let row = PlayerMatchStats::new(player, MatchRef::Knockout(uuid::Uuid::new_v4()));

    let err = coordinator.record_player_match_stats(&mut league, row).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(league.player_match_stats.is_empty());
}

#[test]
fn affected_entities_include_rosters_and_stats_rows() {
    let (mut league, season, clubs) = league_with_groups(true);
    let home = league.add_player(Player::new("home", "CM", clubs[0])).unwrap();
    let away = league.add_player(Player::new("away", "CM", clubs[4])).unwrap();
    let sub = league.add_player(Player::new("sub", "CM", clubs[0])).unwrap();
    let first = group_matches(&league)[0];
    league
        .match_record_mut(first)
        .unwrap()
        .apply(&MatchResult::played(1, 1).with_rosters(vec![home], vec![away]));
    league
        .player_match_stats
        .push(PlayerMatchStats::new(sub, MatchRef::GroupFixture(first)));

    let affected = affected_by(&league, ResultChange::MatchSaved(first)).unwrap();
    assert_eq!(affected.season, season);
    assert_eq!(affected.players.len(), 3);
    assert!(affected.clubs.contains(&clubs[0]) && affected.clubs.contains(&clubs[4]));
    // Pure: nothing was rebuilt.
    assert!(league.team_stats.is_empty());
}

#[test]
fn deleting_a_season_removes_everything_it_owns() {
    let (mut league, season, clubs) = league_with_groups(true);
    let other = league.add_season("Season 2", 2025, true);
    let mut coordinator = Coordinator::new();
    let player = league.add_player(Player::new("nine", "ST", clubs[0])).unwrap();
    generate_knockouts(&mut league, season, &KnockoutOptions::default()).unwrap();
    let first = group_matches(&league)[0];
    coordinator
        .record_match_result(&mut league, first, &MatchResult::played(1, 0))
        .unwrap();
    coordinator
        .record_player_match_stats(
            &mut league,
            PlayerMatchStats::new(player, MatchRef::GroupFixture(first)),
        )
        .unwrap();

    coordinator.delete_season(&mut league, season).unwrap();
    assert!(league.season(season).is_err());
    assert!(league.fixtures.is_empty());
    assert!(league.matches.is_empty());
    assert!(league.groups.is_empty());
    assert!(league.knockout_rounds.is_empty());
    assert!(league.knockout_matches.is_empty());
    assert!(league.team_stats.is_empty());
    assert!(league.player_match_stats.is_empty());
    assert!(league.player_season_stats.is_empty());
    assert!(!coordinator.is_suspended(season));

    assert!(league.season(other).is_ok());
    assert_eq!(league.clubs.len(), 8);
    assert_eq!(league.players.len(), 1);
}
