//! Knockout rounds, ties, and the placeholder slots they start from.

use crate::models::club::{ClubId, SeasonId};
use crate::models::fixture::MatchResult;
use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a knockout round.
pub type KnockoutRoundId = Uuid;

/// Unique identifier for a knockout tie.
pub type KnockoutMatchId = Uuid;

/// Stage of the knockout bracket, in bracket order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum RoundType {
    R16,
    QF,
    SF,
    F,
    #[serde(rename = "3P")]
    ThirdPlace,
}

impl RoundType {
    /// Round that starts with `teams` clubs, if the bracket size is supported.
    pub fn for_team_count(teams: usize) -> Option<Self> {
        match teams {
            16 => Some(RoundType::R16),
            8 => Some(RoundType::QF),
            4 => Some(RoundType::SF),
            2 => Some(RoundType::F),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RoundType::R16 => "R16",
            RoundType::QF => "QF",
            RoundType::SF => "SF",
            RoundType::F => "F",
            RoundType::ThirdPlace => "3P",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RoundType::R16 => "Round of 16",
            RoundType::QF => "Quarterfinals",
            RoundType::SF => "Semifinals",
            RoundType::F => "Final",
            RoundType::ThirdPlace => "Third Place Match",
        }
    }
}

/// A knockout stage of one season.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutRound {
    pub id: KnockoutRoundId,
    pub season: SeasonId,
    pub round_type: RoundType,
}

impl KnockoutRound {
    pub fn new(season: SeasonId, round_type: RoundType) -> Self {
        Self {
            id: Uuid::new_v4(),
            season,
            round_type,
        }
    }
}

/// Symbolic bracket slot: the club finishing `rank` in group `group` ("A1").
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Placeholder {
    pub group: char,
    pub rank: u32,
}

impl Placeholder {
    pub fn new(group: char, rank: u32) -> Self {
        Self { group, rank }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.group, self.rank)
    }
}

impl FromStr for Placeholder {
    type Err = String;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let mut chars = code.trim().chars();
        let group = chars
            .next()
            .filter(|c| c.is_ascii_alphabetic())
            .ok_or_else(|| format!("invalid placeholder '{}'", code))?;
        let rank: u32 = chars
            .as_str()
            .parse()
            .map_err(|_| format!("invalid placeholder '{}'", code))?;
        if rank == 0 {
            return Err(format!("invalid placeholder '{}'", code));
        }
        Ok(Self::new(group.to_ascii_uppercase(), rank))
    }
}

impl TryFrom<String> for Placeholder {
    type Error = String;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl From<Placeholder> for String {
    fn from(p: Placeholder) -> Self {
        p.to_string()
    }
}

/// One side of a tie: a placeholder until resolved, then a real club.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Placeholder(Placeholder),
    Club(ClubId),
}

impl Slot {
    pub fn club(&self) -> Option<ClubId> {
        match self {
            Slot::Club(id) => Some(*id),
            Slot::Placeholder(_) => None,
        }
    }

    pub fn placeholder(&self) -> Option<Placeholder> {
        match self {
            Slot::Placeholder(p) => Some(*p),
            Slot::Club(_) => None,
        }
    }
}

/// One knockout pairing. Carries its own score for ties not backed by fixtures.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KnockoutMatch {
    pub id: KnockoutMatchId,
    pub round: KnockoutRoundId,
    pub home: Slot,
    pub away: Slot,
    /// Drawn from group placeholders rather than from final standings.
    pub from_placeholders: bool,
    pub home_goals: u32,
    pub away_goals: u32,
    pub is_played: bool,
    pub home_players: Vec<PlayerId>,
    pub away_players: Vec<PlayerId>,
}

impl KnockoutMatch {
    pub fn between(round: KnockoutRoundId, home: ClubId, away: ClubId) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            home: Slot::Club(home),
            away: Slot::Club(away),
            from_placeholders: false,
            home_goals: 0,
            away_goals: 0,
            is_played: false,
            home_players: Vec::new(),
            away_players: Vec::new(),
        }
    }

    pub fn from_placeholders(round: KnockoutRoundId, home: Placeholder, away: Placeholder) -> Self {
        Self {
            home: Slot::Placeholder(home),
            away: Slot::Placeholder(away),
            from_placeholders: true,
            ..Self::between(round, Uuid::nil(), Uuid::nil())
        }
    }

    /// Both clubs, once both sides are resolved.
    pub fn clubs(&self) -> Option<(ClubId, ClubId)> {
        Some((self.home.club()?, self.away.club()?))
    }

    pub fn is_resolved(&self) -> bool {
        self.clubs().is_some()
    }

    pub fn involves(&self, club: ClubId) -> bool {
        self.home.club() == Some(club) || self.away.club() == Some(club)
    }

    /// True if the tie is between `a` and `b` in either orientation.
    pub fn is_between(&self, a: ClubId, b: ClubId) -> bool {
        match self.clubs() {
            Some((h, w)) => (h == a && w == b) || (h == b && w == a),
            None => false,
        }
    }

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
