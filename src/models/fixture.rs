//! Fixture (scheduled encounter) and Match (its recorded result).

use crate::models::club::{ClubId, SeasonId};
use crate::models::group::GroupId;
use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a fixture.
pub type FixtureId = Uuid;

/// Unique identifier for a match result record.
pub type MatchId = Uuid;

/// A scheduled encounter between two clubs.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub season: SeasonId,
    pub home_club: ClubId,
    pub away_club: ClubId,
    pub date: DateTime<Utc>,
    pub week_number: Option<u32>,
    /// None for knockout / standalone fixtures.
    pub group: Option<GroupId>,
}

impl Fixture {
    pub fn new(season: SeasonId, home_club: ClubId, away_club: ClubId, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            season,
            home_club,
            away_club,
            date,
            week_number: None,
            group: None,
        }
    }

    pub fn in_group(mut self, group: GroupId, week_number: Option<u32>) -> Self {
        self.group = Some(group);
        self.week_number = week_number;
        self
    }

    pub fn involves(&self, club: ClubId) -> bool {
        self.home_club == club || self.away_club == club
    }

    /// True if the fixture is between `a` and `b` in either orientation.
    pub fn is_between(&self, a: ClubId, b: ClubId) -> bool {
        (self.home_club == a && self.away_club == b) || (self.home_club == b && self.away_club == a)
    }
}

/// The authoritative result record of a fixture.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub fixture: FixtureId,
    pub home_goals: u32,
    pub away_goals: u32,
    pub is_played: bool,
    pub home_players: Vec<PlayerId>,
    pub away_players: Vec<PlayerId>,
}

impl Match {
    /// Unplayed 0-0 record for a fixture.
    pub fn new(fixture: FixtureId) -> Self {
        Self {
            id: Uuid::new_v4(),
            fixture,
            home_goals: 0,
            away_goals: 0,
            is_played: false,
            home_players: Vec::new(),
            away_players: Vec::new(),
        }
    }

    /// Overwrite the result with `result`. Rosters are only replaced when given.
    pub fn apply(&mut self, result: &MatchResult) {
        self.home_goals = result.home_goals;
        self.away_goals = result.away_goals;
        self.is_played = result.is_played;
        if let Some(players) = &result.home_players {
            self.home_players = players.clone();
        }
        if let Some(players) = &result.away_players {
            self.away_players = players.clone();
        }
    }
}

/// A result write for a Match or a KnockoutMatch.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub home_goals: u32,
    pub away_goals: u32,
    #[serde(default = "default_played")]
    pub is_played: bool,
    #[serde(default)]
    pub home_players: Option<Vec<PlayerId>>,
    #[serde(default)]
    pub away_players: Option<Vec<PlayerId>>,
}

fn default_played() -> bool {
    true
}

impl MatchResult {
    /// A played result with rosters left untouched.
    pub fn played(home_goals: u32, away_goals: u32) -> Self {
        Self {
            home_goals,
            away_goals,
            is_played: true,
            home_players: None,
            away_players: None,
        }
    }

    pub fn with_rosters(mut self, home: Vec<PlayerId>, away: Vec<PlayerId>) -> Self {
        self.home_players = Some(home);
        self.away_players = Some(away);
        self
    }
}
