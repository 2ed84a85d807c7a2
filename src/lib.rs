//! League organizer: library with models and competition logic.

pub mod logic;
pub mod models;

pub use logic::{
    affected_by, bracket_overview, club_results, finish_position, generate_final, generate_finals,
    generate_group_fixtures, generate_group_fixtures_repeats, generate_groups, generate_knockouts,
    group_standings, import_clubs_csv, import_players_csv, placeholder_pairs, qualified_clubs,
    rebuild_all_player_season_stats, rebuild_finish_positions, rebuild_player_season_stats,
    rebuild_team_season_stats, resolve_placeholders, round_robin_pairs, season_awards,
    semifinal_winner, tie_aggregate, tie_winner, AffectedEntities, BracketStatus, Coordinator,
    DrawOptions, FinalOutcome, FixtureScope, ImportSummary, KnockoutOptions, KnockoutOutcome,
    MatchFormat, Qualifiers, ResultChange, RoundOverview, ScheduleOptions, TieOverview,
};
pub use models::{
    Club, ClubId, ErrorKind, FinishPosition, Fixture, FixtureId, Group, GroupId, KnockoutMatch,
    KnockoutMatchId, KnockoutRound, KnockoutRoundId, League, LeagueError, Match, MatchId, MatchRef,
    MatchResult, Placeholder, Player, PlayerId, PlayerMatchStats, PlayerMatchStatsId,
    PlayerSeasonStats, RoundType, Season, SeasonAwards, SeasonId, Slot, TeamSeasonStats,
    POINTS_FOR_DRAW, POINTS_FOR_WIN,
};
