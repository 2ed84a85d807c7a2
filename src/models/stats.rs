//! Derived statistics rows: team per season, player per match, player per season.

use crate::models::club::{ClubId, SeasonId};
use crate::models::fixture::{FixtureId, MatchId};
use crate::models::knockout::KnockoutMatchId;
use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Points for a win (3-1-0 scoring).
pub const POINTS_FOR_WIN: u32 = 3;
/// Points for a draw.
pub const POINTS_FOR_DRAW: u32 = 1;

/// League table row for one club in one season.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonStats {
    pub club: ClubId,
    pub season: SeasonId,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub clean_sheets: u32,
    /// How far the club got; None until the bracket says.
    #[serde(default)]
    pub finish_position: Option<FinishPosition>,
}

/// Where a club finished the season.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishPosition {
    Champion,
    RunnerUp,
    Third,
    Semis,
    /// Went out in the group stage.
    Groups,
}

impl FinishPosition {
    pub fn display_name(&self) -> &'static str {
        match self {
            FinishPosition::Champion => "Champion",
            FinishPosition::RunnerUp => "Runner Up",
            FinishPosition::Third => "Third Place",
            FinishPosition::Semis => "Semi Finalist",
            FinishPosition::Groups => "Group Stage",
        }
    }
}

impl TeamSeasonStats {
    /// Empty row.
    pub fn new(club: ClubId, season: SeasonId) -> Self {
        Self {
            club,
            season,
            ..Self::default()
        }
    }

    /// Add one played result, seen from this club's side.
    pub fn record(&mut self, goals_for: u32, goals_against: u32) {
        self.played += 1;
        self.goals_for += goals_for;
        self.goals_against += goals_against;
        self.goal_difference = i64::from(self.goals_for) - i64::from(self.goals_against);
        if goals_against == 0 {
            self.clean_sheets += 1;
        }
        match goals_for.cmp(&goals_against) {
            Ordering::Greater => {
                self.wins += 1;
                self.points += POINTS_FOR_WIN;
            }
            Ordering::Less => self.losses += 1,
            Ordering::Equal => {
                self.draws += 1;
                self.points += POINTS_FOR_DRAW;
            }
        }
    }

    /// Table order: points, then goal difference, then goals for (all descending).
    pub fn standings_cmp(&self, other: &Self) -> Ordering {
        other
            .points
            .cmp(&self.points)
            .then(other.goal_difference.cmp(&self.goal_difference))
            .then(other.goals_for.cmp(&self.goals_for))
    }
}

/// Which result a player's match stats belong to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum MatchRef {
    /// The Match record of a fixture.
    GroupFixture(MatchId),
    Knockout(KnockoutMatchId),
    /// A fixture tracked without its own Match record.
    Standalone(FixtureId),
}

/// Unique identifier for a player match stats row.
pub type PlayerMatchStatsId = Uuid;

/// One player's numbers for one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatchStats {
    pub id: PlayerMatchStatsId,
    pub player: PlayerId,
    pub match_ref: MatchRef,
    pub goals: u32,
    pub assists: u32,
    pub minutes_played: u32,
    pub rating: f64,
}

impl PlayerMatchStats {
    pub fn new(player: PlayerId, match_ref: MatchRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            player,
            match_ref,
            goals: 0,
            assists: 0,
            minutes_played: 0,
            rating: 0.0,
        }
    }
}

/// One player's aggregate for one season.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonStats {
    pub player: PlayerId,
    pub season: SeasonId,
    pub club: ClubId,
    pub goals: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub appearances: u32,
    pub rating: f64,
    /// Maintained by hand; never overwritten by a rebuild.
    pub manual: bool,
}

impl PlayerSeasonStats {
    pub fn new(player: PlayerId, season: SeasonId, club: ClubId) -> Self {
        Self {
            player,
            season,
            club,
            goals: 0,
            assists: 0,
            clean_sheets: 0,
            appearances: 0,
            rating: 0.0,
            manual: false,
        }
    }
}

/// Individual season awards. Every slot is empty when nobody qualifies.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeasonAwards {
    pub season: SeasonId,
    pub mvp: Option<PlayerId>,
    pub top_scorer: Option<PlayerId>,
    pub top_assister: Option<PlayerId>,
    pub best_defender: Option<PlayerId>,
    pub best_midfielder: Option<PlayerId>,
}

impl SeasonAwards {
    /// Award titles held by `player`, in display order.
    pub fn titles_for(&self, player: PlayerId) -> Vec<&'static str> {
        [
            (self.mvp, "MVP"),
            (self.top_scorer, "Top Scorer"),
            (self.top_assister, "Top Assister"),
            (self.best_defender, "Best Defender"),
            (self.best_midfielder, "Best Midfielder"),
        ]
        .into_iter()
        .filter(|(holder, _)| *holder == Some(player))
        .map(|(_, title)| title)
        .collect()
    }
}
