//! Data structures for the league: clubs, seasons, groups, fixtures, knockouts, stats.

mod club;
mod fixture;
mod group;
mod knockout;
mod league;
mod player;
mod stats;

pub use club::{Club, ClubId, Season, SeasonId};
pub use fixture::{Fixture, FixtureId, Match, MatchId, MatchResult};
pub use group::{Group, GroupId};
pub use knockout::{
    KnockoutMatch, KnockoutMatchId, KnockoutRound, KnockoutRoundId, Placeholder, RoundType, Slot,
};
pub use league::{ErrorKind, League, LeagueError};
pub use player::{Player, PlayerId};
pub use stats::{
    FinishPosition, MatchRef, PlayerMatchStats, PlayerMatchStatsId, PlayerSeasonStats,
    SeasonAwards, TeamSeasonStats, POINTS_FOR_DRAW, POINTS_FOR_WIN,
};
