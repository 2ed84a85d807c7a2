//! League: the in-memory store every generator and rebuild works against.

use crate::models::club::{Club, ClubId, Season, SeasonId};
use crate::models::fixture::{Fixture, FixtureId, Match, MatchId};
use crate::models::group::{Group, GroupId};
use crate::models::knockout::{KnockoutMatch, KnockoutMatchId, KnockoutRound, KnockoutRoundId, RoundType};
use crate::models::player::{Player, PlayerId};
use crate::models::stats::{
    MatchRef, PlayerMatchStats, PlayerMatchStatsId, PlayerSeasonStats, TeamSeasonStats,
};
use serde::{Deserialize, Serialize};

/// Broad category of a [`LeagueError`], used by callers to decide how to report it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad caller input (no clubs, malformed rows).
    Input,
    /// The requested bracket or draw shape is impossible.
    Configuration,
    /// A result cannot be decided from the recorded data.
    Decision,
    /// A referenced entity does not exist.
    NotFound,
}

/// Errors that can occur during league operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LeagueError {
    /// Season has no clubs entered.
    NoClubs(SeasonId),
    /// Group count must be between 1 and 26.
    InvalidGroupCount(usize),
    /// A club with this name already exists (names are unique, case-insensitive).
    DuplicateClubName(String),
    /// A CSV import could not be read.
    InvalidCsv(String),
    /// Season has no groups to build a bracket from.
    NoGroups(SeasonId),
    /// Total qualifiers cannot be split evenly across groups.
    QualifiersNotDivisible { total: usize, groups: usize },
    /// Bracket must start with 16, 8, 4 or 2 clubs.
    UnsupportedBracketSize(usize),
    /// Placeholder ties pair groups two at a time.
    OddGroupCount(usize),
    /// Group name carries no letter to build placeholder codes from.
    UnlabelledGroup(String),
    /// Season has no semifinal round.
    MissingSemifinals(SeasonId),
    /// Semifinal tie ended level in a single match.
    SemifinalDrawn(KnockoutMatchId),
    /// Semifinal legs ended level on aggregate.
    AggregateTie(KnockoutMatchId),
    /// Semifinal has no result (or its clubs are not resolved yet).
    SemifinalWithoutResult(KnockoutMatchId),
    /// Fewer than two semifinal ties exist.
    NotEnoughSemifinalWinners { found: usize },
    SeasonNotFound(SeasonId),
    ClubNotFound(ClubId),
    PlayerNotFound(PlayerId),
    GroupNotFound(GroupId),
    FixtureNotFound(FixtureId),
    MatchNotFound(MatchId),
    KnockoutMatchNotFound(KnockoutMatchId),
    PlayerMatchStatsNotFound(PlayerMatchStatsId),
}

impl LeagueError {
    pub fn kind(&self) -> ErrorKind {
        use LeagueError::*;
        match self {
            NoClubs(_) | InvalidGroupCount(_) | DuplicateClubName(_) | InvalidCsv(_) => ErrorKind::Input,
            NoGroups(_)
            | QualifiersNotDivisible { .. }
            | UnsupportedBracketSize(_)
            | OddGroupCount(_)
            | UnlabelledGroup(_) => ErrorKind::Configuration,
            MissingSemifinals(_)
            | SemifinalDrawn(_)
            | AggregateTie(_)
            | SemifinalWithoutResult(_)
            | NotEnoughSemifinalWinners { .. } => ErrorKind::Decision,
            SeasonNotFound(_)
            | ClubNotFound(_)
            | PlayerNotFound(_)
            | GroupNotFound(_)
            | FixtureNotFound(_)
            | MatchNotFound(_)
            | KnockoutMatchNotFound(_)
            | PlayerMatchStatsNotFound(_) => ErrorKind::NotFound,
        }
    }
}

impl std::fmt::Display for LeagueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeagueError::NoClubs(_) => write!(f, "No clubs assigned to this season"),
            LeagueError::InvalidGroupCount(n) => write!(f, "Cannot draw {} groups (must be 1 to 26)", n),
            LeagueError::DuplicateClubName(name) => write!(f, "A club named '{}' already exists", name),
            LeagueError::InvalidCsv(msg) => write!(f, "Invalid CSV: {}", msg),
            LeagueError::NoGroups(_) => write!(f, "No groups found for this season"),
            LeagueError::QualifiersNotDivisible { total, groups } => write!(
                f,
                "Total qualified ({}) is not divisible by number of groups ({})",
                total, groups
            ),
            LeagueError::UnsupportedBracketSize(n) => {
                write!(f, "Unsupported number of teams for knockout: {}", n)
            }
            LeagueError::OddGroupCount(n) => {
                write!(f, "Cannot pair {} groups for placeholder ties (need an even count)", n)
            }
            LeagueError::UnlabelledGroup(name) => write!(f, "Group '{}' has no letter", name),
            LeagueError::MissingSemifinals(_) => write!(f, "Season has no semifinals defined"),
            LeagueError::SemifinalDrawn(_) => write!(f, "Semifinal is a draw; cannot decide winner"),
            LeagueError::AggregateTie(_) => write!(f, "Aggregate tie in semifinal; cannot decide winner"),
            LeagueError::SemifinalWithoutResult(_) => {
                write!(f, "Semifinal has no played fixtures or results")
            }
            LeagueError::NotEnoughSemifinalWinners { found } => {
                write!(f, "Not enough semifinal winners to create a final (found {})", found)
            }
            LeagueError::SeasonNotFound(_) => write!(f, "Season not found"),
            LeagueError::ClubNotFound(_) => write!(f, "Club not found"),
            LeagueError::PlayerNotFound(_) => write!(f, "Player not found"),
            LeagueError::GroupNotFound(_) => write!(f, "Group not found"),
            LeagueError::FixtureNotFound(_) => write!(f, "Fixture not found"),
            LeagueError::MatchNotFound(_) => write!(f, "Match not found"),
            LeagueError::KnockoutMatchNotFound(_) => write!(f, "Knockout match not found"),
            LeagueError::PlayerMatchStatsNotFound(_) => write!(f, "Player match stats not found"),
        }
    }
}

impl std::error::Error for LeagueError {}

/// Every entity of every season. Stats rows are derived and safe to rebuild.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct League {
    pub seasons: Vec<Season>,
    pub clubs: Vec<Club>,
    pub players: Vec<Player>,
    pub groups: Vec<Group>,
    pub fixtures: Vec<Fixture>,
    pub matches: Vec<Match>,
    pub knockout_rounds: Vec<KnockoutRound>,
    pub knockout_matches: Vec<KnockoutMatch>,
    pub team_stats: Vec<TeamSeasonStats>,
    pub player_match_stats: Vec<PlayerMatchStats>,
    pub player_season_stats: Vec<PlayerSeasonStats>,
}

impl League {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` as one unit: if it fails, every change it made is rolled back.
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut League) -> Result<T, LeagueError>,
    ) -> Result<T, LeagueError> {
        let snapshot = self.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                *self = snapshot;
                Err(e)
            }
        }
    }

    pub fn add_season(&mut self, name: impl Into<String>, year: i32, is_active: bool) -> SeasonId {
        let season = Season::new(name, year, is_active);
        let id = season.id;
        self.seasons.push(season);
        id
    }

    /// Add a club. Names must be unique (case-insensitive).
    pub fn add_club(&mut self, club: Club) -> Result<ClubId, LeagueError> {
        let name = club.name.trim();
        if self.clubs.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
            return Err(LeagueError::DuplicateClubName(name.to_string()));
        }
        let id = club.id;
        self.clubs.push(club);
        Ok(id)
    }

    pub fn add_player(&mut self, player: Player) -> Result<PlayerId, LeagueError> {
        self.club(player.club)?;
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    /// Enter an existing club into a season's roster (no-op if already entered).
    pub fn enter_club(&mut self, season: SeasonId, club: ClubId) -> Result<(), LeagueError> {
        self.club(club)?;
        self.season_mut(season)?.enter_club(club);
        Ok(())
    }

    pub fn season(&self, id: SeasonId) -> Result<&Season, LeagueError> {
        self.seasons
            .iter()
            .find(|s| s.id == id)
            .ok_or(LeagueError::SeasonNotFound(id))
    }

    pub fn season_mut(&mut self, id: SeasonId) -> Result<&mut Season, LeagueError> {
        self.seasons
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(LeagueError::SeasonNotFound(id))
    }

    pub fn club(&self, id: ClubId) -> Result<&Club, LeagueError> {
        self.clubs
            .iter()
            .find(|c| c.id == id)
            .ok_or(LeagueError::ClubNotFound(id))
    }

    pub fn club_by_name(&self, name: &str) -> Option<&Club> {
        let name = name.trim();
        self.clubs.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, LeagueError> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(LeagueError::PlayerNotFound(id))
    }

    pub fn group(&self, id: GroupId) -> Result<&Group, LeagueError> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .ok_or(LeagueError::GroupNotFound(id))
    }

    /// Groups of a season, in creation (draw) order.
    pub fn season_groups(&self, season: SeasonId) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(move |g| g.season == season)
    }

    pub fn group_by_letter(&self, season: SeasonId, letter: char) -> Option<&Group> {
        self.season_groups(season).find(|g| g.letter() == Some(letter))
    }

    /// The season's group called `name`, created if missing.
    pub fn get_or_create_group(&mut self, season: SeasonId, name: &str) -> GroupId {
        if let Some(group) = self.groups.iter().find(|g| g.season == season && g.name == name) {
            return group.id;
        }
        let group = Group::new(season, name);
        let id = group.id;
        self.groups.push(group);
        id
    }

    pub fn fixture(&self, id: FixtureId) -> Result<&Fixture, LeagueError> {
        self.fixtures
            .iter()
            .find(|f| f.id == id)
            .ok_or(LeagueError::FixtureNotFound(id))
    }

    /// Store a fixture; `create_match` controls whether its Match record is created with it.
    pub fn add_fixture(&mut self, fixture: Fixture, create_match: bool) -> FixtureId {
        let id = fixture.id;
        self.fixtures.push(fixture);
        if create_match {
            self.matches.push(Match::new(id));
        }
        id
    }

    /// Standalone (group-less) fixtures of a season between two clubs, in date order.
    pub fn standalone_fixtures_between(&self, season: SeasonId, a: ClubId, b: ClubId) -> Vec<&Fixture> {
        let mut fixtures: Vec<&Fixture> = self
            .fixtures
            .iter()
            .filter(|f| f.season == season && f.group.is_none() && f.is_between(a, b))
            .collect();
        fixtures.sort_by_key(|f| f.date);
        fixtures
    }

    pub fn match_record(&self, id: MatchId) -> Result<&Match, LeagueError> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(LeagueError::MatchNotFound(id))
    }

    pub fn match_record_mut(&mut self, id: MatchId) -> Result<&mut Match, LeagueError> {
        self.matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(LeagueError::MatchNotFound(id))
    }

    /// The Match record of a fixture, if one was created.
    pub fn fixture_match(&self, fixture: FixtureId) -> Option<&Match> {
        self.matches.iter().find(|m| m.fixture == fixture)
    }

    /// The fixture's Match record, created on first use.
    pub fn ensure_fixture_match(&mut self, fixture: FixtureId) -> Result<MatchId, LeagueError> {
        self.fixture(fixture)?;
        if let Some(m) = self.fixture_match(fixture) {
            return Ok(m.id);
        }
        let record = Match::new(fixture);
        let id = record.id;
        self.matches.push(record);
        Ok(id)
    }

    pub fn knockout_round(&self, season: SeasonId, round_type: RoundType) -> Option<&KnockoutRound> {
        self.knockout_rounds
            .iter()
            .find(|r| r.season == season && r.round_type == round_type)
    }

    pub fn knockout_round_by_id(&self, id: KnockoutRoundId) -> Option<&KnockoutRound> {
        self.knockout_rounds.iter().find(|r| r.id == id)
    }

    pub fn get_or_create_round(&mut self, season: SeasonId, round_type: RoundType) -> KnockoutRoundId {
        if let Some(round) = self.knockout_round(season, round_type) {
            return round.id;
        }
        let round = KnockoutRound::new(season, round_type);
        let id = round.id;
        self.knockout_rounds.push(round);
        id
    }

    pub fn round_matches(&self, round: KnockoutRoundId) -> impl Iterator<Item = &KnockoutMatch> {
        self.knockout_matches.iter().filter(move |m| m.round == round)
    }

    pub fn knockout_match(&self, id: KnockoutMatchId) -> Result<&KnockoutMatch, LeagueError> {
        self.knockout_matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(LeagueError::KnockoutMatchNotFound(id))
    }

    pub fn knockout_match_mut(&mut self, id: KnockoutMatchId) -> Result<&mut KnockoutMatch, LeagueError> {
        self.knockout_matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(LeagueError::KnockoutMatchNotFound(id))
    }

    /// Season a knockout tie belongs to (through its round).
    pub fn knockout_match_season(&self, id: KnockoutMatchId) -> Result<SeasonId, LeagueError> {
        let km = self.knockout_match(id)?;
        self.knockout_round_by_id(km.round)
            .map(|r| r.season)
            .ok_or(LeagueError::KnockoutMatchNotFound(id))
    }

    /// Season a match reference belongs to, if the referenced record still exists.
    pub fn match_ref_season(&self, match_ref: &MatchRef) -> Option<SeasonId> {
        match match_ref {
            MatchRef::GroupFixture(id) => {
                let m = self.match_record(*id).ok()?;
                self.fixture(m.fixture).ok().map(|f| f.season)
            }
            MatchRef::Knockout(id) => self.knockout_match_season(*id).ok(),
            MatchRef::Standalone(id) => self.fixture(*id).ok().map(|f| f.season),
        }
    }

    pub fn team_stats(&self, club: ClubId, season: SeasonId) -> Option<&TeamSeasonStats> {
        self.team_stats
            .iter()
            .find(|s| s.club == club && s.season == season)
    }

    /// Insert or replace the row for `(stats.club, stats.season)`.
    pub fn put_team_stats(&mut self, stats: TeamSeasonStats) {
        match self
            .team_stats
            .iter_mut()
            .find(|s| s.club == stats.club && s.season == stats.season)
        {
            Some(row) => *row = stats,
            None => self.team_stats.push(stats),
        }
    }

    pub fn player_season_stats(&self, player: PlayerId, season: SeasonId) -> Option<&PlayerSeasonStats> {
        self.player_season_stats
            .iter()
            .find(|s| s.player == player && s.season == season)
    }

    /// Insert or replace the row for `(stats.player, stats.season)`.
    pub fn put_player_season_stats(&mut self, stats: PlayerSeasonStats) {
        match self
            .player_season_stats
            .iter_mut()
            .find(|s| s.player == stats.player && s.season == stats.season)
        {
            Some(row) => *row = stats,
            None => self.player_season_stats.push(stats),
        }
    }

    pub fn player_match_stats(&self, id: PlayerMatchStatsId) -> Result<&PlayerMatchStats, LeagueError> {
        self.player_match_stats
            .iter()
            .find(|s| s.id == id)
            .ok_or(LeagueError::PlayerMatchStatsNotFound(id))
    }
}
