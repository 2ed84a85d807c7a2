//! Integration tests for season awards.

use league_core::{
    season_awards, Club, ClubId, ErrorKind, League, Player, PlayerId, PlayerSeasonStats, SeasonAwards,
    SeasonId,
};

fn league_with_club() -> (League, SeasonId, ClubId) {
    let mut league = League::new();
    let season = league.add_season("Season 1", 2024, true);
    let club = league.add_club(Club::new("Northside FC")).unwrap();
    league.enter_club(season, club).unwrap();
    (league, season, club)
}

fn with_stats(
    league: &mut League,
    season: SeasonId,
    club: ClubId,
    tag: &str,
    position: &str,
    (goals, assists, clean_sheets, rating): (u32, u32, u32, f64),
) -> PlayerId {
    let player = league.add_player(Player::new(tag, position, club)).unwrap();
    let mut row = PlayerSeasonStats::new(player, season, club);
    row.goals = goals;
    row.assists = assists;
    row.clean_sheets = clean_sheets;
    row.rating = rating;
    league.player_season_stats.push(row);
    player
}

#[test]
fn awards_pick_the_leading_rows() {
    let (mut league, season, club) = league_with_club();
    let striker = with_stats(&mut league, season, club, "nine", "ST", (12, 3, 0, 7.4));
    let winger = with_stats(&mut league, season, club, "wide", "LW", (4, 9, 0, 8.1));
    let keeper = with_stats(&mut league, season, club, "wall", "GK", (0, 0, 6, 7.0));
    let back = with_stats(&mut league, season, club, "stopper", "CB", (1, 0, 4, 7.0));
    let playmaker = with_stats(&mut league, season, club, "ten", "cam", (3, 7, 0, 7.8));

    let awards = season_awards(&league, season).unwrap();
    assert_eq!(awards.top_scorer, Some(striker));
    assert_eq!(awards.top_assister, Some(winger));
    assert_eq!(awards.mvp, Some(winger));
    // Same rating: more clean sheets wins.
    assert_eq!(awards.best_defender, Some(keeper));
    assert_eq!(awards.best_midfielder, Some(playmaker));

    assert_eq!(awards.titles_for(winger), vec!["MVP", "Top Assister"]);
    assert!(awards.titles_for(back).is_empty());
}

#[test]
fn ties_go_to_the_earliest_row() {
    let (mut league, season, club) = league_with_club();
    let first = with_stats(&mut league, season, club, "first", "ST", (5, 2, 0, 7.0));
    with_stats(&mut league, season, club, "second", "ST", (5, 2, 0, 7.0));

    let awards = season_awards(&league, season).unwrap();
    assert_eq!(awards.top_scorer, Some(first));
    assert_eq!(awards.mvp, Some(first));
}

#[test]
fn empty_season_has_no_award_holders() {
    let (mut league, season, club) = league_with_club();
    // Other seasons and zero rows never qualify.
    let other = league.add_season("Season 2", 2025, true);
    with_stats(&mut league, other, club, "elsewhere", "ST", (9, 9, 9, 9.0));
    with_stats(&mut league, season, club, "bench", "CM", (0, 0, 0, 0.0));

    let awards = season_awards(&league, season).unwrap();
    assert_eq!(awards.top_scorer, None);
    assert_eq!(awards.top_assister, None);
    assert_eq!(awards.mvp, None);
    assert_eq!(awards.best_defender, None);
    assert!(awards.best_midfielder.is_some());
    assert_eq!(
        SeasonAwards {
            best_midfielder: None,
            ..awards
        },
        SeasonAwards {
            season,
            ..SeasonAwards::default()
        }
    );

    let err = season_awards(&league, uuid::Uuid::new_v4()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
