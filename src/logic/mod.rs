//! League business logic: draw, scheduling, standings, knockouts, finals, consistency.

mod awards;
mod coordinator;
mod draw;
mod finals;
mod import;
mod knockout;
mod overview;
mod schedule;
mod standings;

pub use awards::season_awards;
pub use coordinator::{affected_by, AffectedEntities, Coordinator, ResultChange};
pub use draw::{generate_groups, DrawOptions};
pub use finals::{generate_final, generate_finals, semifinal_winner, tie_winner, FinalOutcome};
pub use import::{import_clubs_csv, import_players_csv, ImportSummary};
pub use knockout::{
    generate_knockouts, placeholder_pairs, qualified_clubs, resolve_placeholders, tie_aggregate,
    BracketStatus, KnockoutOptions, KnockoutOutcome, MatchFormat, Qualifiers,
};
pub use overview::{bracket_overview, RoundOverview, TieOverview};
pub use schedule::{
    generate_group_fixtures, generate_group_fixtures_repeats, round_robin_pairs, FixtureScope,
    ScheduleOptions,
};
pub use standings::{
    club_results, finish_position, group_standings, rebuild_all_player_season_stats,
    rebuild_finish_positions, rebuild_player_season_stats, rebuild_team_season_stats,
};
