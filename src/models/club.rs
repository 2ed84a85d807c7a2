//! Club and Season data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a club.
pub type ClubId = Uuid;

/// Unique identifier for a season.
pub type SeasonId = Uuid;

/// A club (team) that can be entered into seasons.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub id: ClubId,
    pub name: String,
    pub short_name: Option<String>,
    /// Lower = stronger seed (1 is top seed). None = unseeded.
    pub seed_rank: Option<u32>,
}

impl Club {
    /// Create an unseeded club with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            short_name: None,
            seed_rank: None,
        }
    }

    /// Create a club carrying a seed rank.
    pub fn seeded(name: impl Into<String>, seed_rank: u32) -> Self {
        Self {
            seed_rank: Some(seed_rank),
            ..Self::new(name)
        }
    }

    /// Sort key for the draw: unseeded clubs sort after every seeded one.
    pub fn seed_key(&self) -> u32 {
        self.seed_rank.unwrap_or(u32::MAX)
    }
}

/// One competition instance with its roster of participating clubs.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    pub name: String,
    pub year: i32,
    /// Inactive (archived) seasons are never recomputed automatically.
    pub is_active: bool,
    pub clubs: Vec<ClubId>,
}

impl Season {
    pub fn new(name: impl Into<String>, year: i32, is_active: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            year,
            is_active,
            clubs: Vec::new(),
        }
    }

    /// Enter a club into the season. Returns false if it was already entered.
    pub fn enter_club(&mut self, club: ClubId) -> bool {
        if self.clubs.contains(&club) {
            return false;
        }
        self.clubs.push(club);
        true
    }
}
