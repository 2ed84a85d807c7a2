//! Group stage: groups and their member clubs.

use crate::models::club::{ClubId, SeasonId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// A group within a season ("Group A", "Group B", ...).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub season: SeasonId,
    pub name: String,
    /// Member clubs, unique within the group.
    pub members: Vec<ClubId>,
}

impl Group {
    pub fn new(season: SeasonId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            season,
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Name for the group at `index` in the draw: 0 -> "Group A".
    pub fn name_for_index(index: usize) -> Option<String> {
        let letter = u8::try_from(index).ok().and_then(|i| b'A'.checked_add(i))?;
        if letter > b'Z' {
            return None;
        }
        Some(format!("Group {}", letter as char))
    }

    /// The group's letter: first character of the last word of its name.
    pub fn letter(&self) -> Option<char> {
        self.name
            .split_whitespace()
            .last()
            .and_then(|word| word.chars().next())
            .map(|c| c.to_ascii_uppercase())
    }

    /// Add a member club. Returns false if it is already a member.
    pub fn add_member(&mut self, club: ClubId) -> bool {
        if self.members.contains(&club) {
            return false;
        }
        self.members.push(club);
        true
    }
}
