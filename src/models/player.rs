//! Player data structure.

use crate::models::club::ClubId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in rosters and stats rows).
pub type PlayerId = Uuid;

/// A registered player belonging to one club.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub gamertag: String,
    pub position: String,
    pub club: ClubId,
}

impl Player {
    /// Create a new player for the given club.
    pub fn new(gamertag: impl Into<String>, position: impl Into<String>, club: ClubId) -> Self {
        Self {
            id: Uuid::new_v4(),
            gamertag: gamertag.into(),
            position: position.into(),
            club,
        }
    }
}
