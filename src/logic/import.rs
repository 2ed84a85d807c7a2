//! Roster import from CSV: clubs (optionally entered into a season) and players.

use crate::models::{Club, League, LeagueError, Player, SeasonId};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Counts reported after an import.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub existing: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct ClubRow {
    name: String,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    seed_rank: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct PlayerRow {
    gamertag: String,
    club: String,
    #[serde(default)]
    position: String,
}

fn csv_error(e: csv::Error) -> LeagueError {
    LeagueError::InvalidCsv(e.to_string())
}

/// Import clubs from CSV with headers `name,short_name,seed_rank`.
///
/// Clubs are matched by name (case-insensitive); existing ones are left as they are.
/// With `season`, every imported club is entered into it. All or nothing.
pub fn import_clubs_csv<R: Read>(
    league: &mut League,
    season: Option<SeasonId>,
    reader: R,
) -> Result<ImportSummary, LeagueError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let rows: Vec<ClubRow> = rdr.deserialize().collect::<Result<_, _>>().map_err(csv_error)?;

    league.transaction(|league| {
        let mut summary = ImportSummary::default();
        for row in rows {
            if row.name.is_empty() {
                summary.skipped += 1;
                continue;
            }
            let id = match league.club_by_name(&row.name) {
                Some(club) => {
                    log::debug!("Exists: {}", club.name);
                    summary.existing += 1;
                    club.id
                }
                None => {
                    let mut club = Club::new(row.name);
                    club.short_name = row.short_name.filter(|s| !s.is_empty());
                    club.seed_rank = row.seed_rank;
                    log::debug!("Created: {}", club.name);
                    summary.created += 1;
                    league.add_club(club)?
                }
            };
            if let Some(season) = season {
                league.enter_club(season, id)?;
            }
        }
        log::info!(
            "Clubs imported: {} created, {} existing",
            summary.created,
            summary.existing
        );
        Ok(summary)
    })
}

/// Import players from CSV with headers `gamertag,club,position`.
///
/// Rows naming an unknown club are skipped with a warning.
pub fn import_players_csv<R: Read>(league: &mut League, reader: R) -> Result<ImportSummary, LeagueError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let rows: Vec<PlayerRow> = rdr.deserialize().collect::<Result<_, _>>().map_err(csv_error)?;

    league.transaction(|league| {
        let mut summary = ImportSummary::default();
        for row in rows {
            let Some(club) = league.club_by_name(&row.club).map(|c| c.id) else {
                log::warn!("Skipping player {}: club '{}' not found", row.gamertag, row.club);
                summary.skipped += 1;
                continue;
            };
            let exists = league
                .players
                .iter()
                .any(|p| p.club == club && p.gamertag.eq_ignore_ascii_case(&row.gamertag));
            if exists {
                summary.existing += 1;
                continue;
            }
            league.add_player(Player::new(row.gamertag, row.position, club))?;
            summary.created += 1;
        }
        log::info!("Players imported: {} created", summary.created);
        Ok(summary)
    })
}
