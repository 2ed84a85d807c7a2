//! Single binary JSON API for league administration.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).
//! Set CLUBS_CSV to a file path to preload clubs at startup.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, Utc};
use league_core::{
    bracket_overview, generate_final, generate_group_fixtures, generate_group_fixtures_repeats,
    generate_groups, generate_knockouts, group_standings, import_clubs_csv, import_players_csv,
    rebuild_player_season_stats, rebuild_team_season_stats, season_awards, Club, ClubId, Coordinator,
    DrawOptions, ErrorKind, FixtureId, FixtureScope, GroupId, KnockoutMatchId, KnockoutOptions,
    League, LeagueError, MatchFormat, MatchId, MatchRef, MatchResult, Player, PlayerId,
    PlayerMatchStats, ScheduleOptions, SeasonId,
};
use serde::Deserialize;
use std::sync::RwLock;

/// Store plus the recomputation context that watches writes to it.
#[derive(Default)]
struct LeagueState {
    league: League,
    coordinator: Coordinator,
}

type AppState = Data<RwLock<LeagueState>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateSeasonBody {
    name: String,
    year: i32,
    #[serde(default)]
    is_active: bool,
}

#[derive(Deserialize)]
struct CreateClubBody {
    name: String,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    seed_rank: Option<u32>,
}

#[derive(Deserialize)]
struct EnterClubBody {
    club_id: ClubId,
}

#[derive(Deserialize)]
struct CreatePlayerBody {
    gamertag: String,
    #[serde(default)]
    position: String,
    club_id: ClubId,
}

#[derive(Deserialize)]
struct ImportQuery {
    season: Option<SeasonId>,
}

#[derive(Deserialize)]
struct RepeatFixturesBody {
    repeats: usize,
    #[serde(default)]
    options: ScheduleOptions,
}

#[derive(Deserialize)]
struct GenerateFinalBody {
    #[serde(default)]
    match_format: MatchFormat,
    #[serde(default)]
    start_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct PlayerMatchStatsBody {
    player_id: PlayerId,
    match_ref: MatchRef,
    #[serde(default)]
    goals: u32,
    #[serde(default)]
    assists: u32,
    #[serde(default)]
    minutes_played: u32,
    #[serde(default)]
    rating: f64,
}

/// Path segment: season id (e.g. /api/seasons/{id})
#[derive(Deserialize)]
struct SeasonPath {
    id: SeasonId,
}

/// Path segments: season id and group id.
#[derive(Deserialize)]
struct SeasonGroupPath {
    id: SeasonId,
    group_id: GroupId,
}

#[derive(Deserialize)]
struct GroupPath {
    id: GroupId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

#[derive(Deserialize)]
struct FixturePath {
    id: FixtureId,
}

#[derive(Deserialize)]
struct KnockoutMatchPath {
    id: KnockoutMatchId,
}

fn error_response(e: &LeagueError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "kind": e.kind() });
    match e.kind() {
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "league-core",
    })
}

/// Whole store (seasons, clubs, fixtures, brackets and stats).
#[get("/api/league")]
async fn api_get_league(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(&g.league)
}

#[post("/api/seasons")]
async fn api_create_season(state: AppState, body: Json<CreateSeasonBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let id = g.league.add_season(body.name.trim(), body.year, body.is_active);
    match g.league.season(id) {
        Ok(season) => HttpResponse::Ok().json(season),
        Err(e) => error_response(&e),
    }
}

/// Delete a season and everything it owns.
#[delete("/api/seasons/{id}")]
async fn api_delete_season(state: AppState, path: Path<SeasonPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let LeagueState { league, coordinator } = &mut *g;
    match coordinator.delete_season(league, path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

#[post("/api/clubs")]
async fn api_create_club(state: AppState, body: Json<CreateClubBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    let mut club = Club::new(body.name.trim());
    club.short_name = body.short_name;
    club.seed_rank = body.seed_rank;
    match g.league.add_club(club) {
        Ok(id) => HttpResponse::Ok().json(g.league.club(id).ok()),
        Err(e) => error_response(&e),
    }
}

/// Import clubs from a CSV body (`name,short_name,seed_rank`), optionally into a season.
#[post("/api/clubs/import")]
async fn api_import_clubs(state: AppState, query: Query<ImportQuery>, body: String) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match import_clubs_csv(&mut g.league, query.season, body.as_bytes()) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => error_response(&e),
    }
}

/// Enter an existing club into a season.
#[post("/api/seasons/{id}/clubs")]
async fn api_enter_club(state: AppState, path: Path<SeasonPath>, body: Json<EnterClubBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.league.enter_club(path.id, body.club_id) {
        Ok(()) => HttpResponse::Ok().json(g.league.season(path.id).ok()),
        Err(e) => error_response(&e),
    }
}

#[post("/api/players")]
async fn api_create_player(state: AppState, body: Json<CreatePlayerBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    match g
        .league
        .add_player(Player::new(body.gamertag.trim(), body.position, body.club_id))
    {
        Ok(id) => HttpResponse::Ok().json(g.league.player(id).ok()),
        Err(e) => error_response(&e),
    }
}

/// Import players from a CSV body (`gamertag,club,position`).
#[post("/api/players/import")]
async fn api_import_players(state: AppState, body: String) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match import_players_csv(&mut g.league, body.as_bytes()) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => error_response(&e),
    }
}

/// Draw the season's groups (replaces any previous draw).
#[post("/api/seasons/{id}/groups/generate")]
async fn api_generate_groups(state: AppState, path: Path<SeasonPath>, body: Json<DrawOptions>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match generate_groups(&mut g.league, path.id, &body) {
        Ok(ids) => {
            let groups: Vec<_> = g.league.groups.iter().filter(|gr| ids.contains(&gr.id)).collect();
            HttpResponse::Ok().json(groups)
        }
        Err(e) => error_response(&e),
    }
}

/// Round-robin fixtures for every group of the season.
#[post("/api/seasons/{id}/fixtures/generate")]
async fn api_generate_fixtures(
    state: AppState,
    path: Path<SeasonPath>,
    body: Option<Json<ScheduleOptions>>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let options = body.map(|b| b.into_inner()).unwrap_or_default();
    match generate_group_fixtures(&mut g.league, FixtureScope::Season(path.id), &options) {
        Ok(ids) => HttpResponse::Ok().json(serde_json::json!({ "created": ids.len(), "fixtures": ids })),
        Err(e) => error_response(&e),
    }
}

/// Top a group up to `repeats` fixtures per pair.
#[post("/api/groups/{id}/fixtures/repeat")]
async fn api_repeat_fixtures(state: AppState, path: Path<GroupPath>, body: Json<RepeatFixturesBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match generate_group_fixtures_repeats(&mut g.league, path.id, body.repeats, &body.options) {
        Ok(created) => HttpResponse::Ok().json(serde_json::json!({ "created": created })),
        Err(e) => error_response(&e),
    }
}

#[get("/api/seasons/{id}/groups/{group_id}/standings")]
async fn api_group_standings(state: AppState, path: Path<SeasonGroupPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match group_standings(&g.league, path.id, path.group_id) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => error_response(&e),
    }
}

#[post("/api/seasons/{id}/knockouts/generate")]
async fn api_generate_knockouts(
    state: AppState,
    path: Path<SeasonPath>,
    body: Json<KnockoutOptions>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match generate_knockouts(&mut g.league, path.id, &body) {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(&e),
    }
}

#[post("/api/seasons/{id}/knockouts/resolve")]
async fn api_resolve_placeholders(state: AppState, path: Path<SeasonPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let LeagueState { league, coordinator } = &mut *g;
    let resolved = coordinator.resolve_placeholders(league, path.id);
    HttpResponse::Ok().json(serde_json::json!({ "resolved": resolved }))
}

/// Build the final from the season's semifinals.
#[post("/api/seasons/{id}/final")]
async fn api_generate_final(state: AppState, path: Path<SeasonPath>, body: Json<GenerateFinalBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match generate_final(&mut g.league, path.id, body.match_format, body.start_date) {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(&e),
    }
}

#[get("/api/seasons/{id}/bracket")]
async fn api_bracket(state: AppState, path: Path<SeasonPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Err(e) = g.league.season(path.id) {
        return error_response(&e);
    }
    HttpResponse::Ok().json(bracket_overview(&g.league, path.id))
}

#[get("/api/seasons/{id}/awards")]
async fn api_season_awards(state: AppState, path: Path<SeasonPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match season_awards(&g.league, path.id) {
        Ok(awards) => HttpResponse::Ok().json(awards),
        Err(e) => error_response(&e),
    }
}

/// Rebuild every team and player row of the season from recorded results.
#[post("/api/seasons/{id}/stats/rebuild")]
async fn api_rebuild_stats(state: AppState, path: Path<SeasonPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let league = &mut g.league;
    let clubs = match league.season(path.id) {
        Ok(season) => season.clubs.clone(),
        Err(e) => return error_response(&e),
    };
    let players: Vec<PlayerId> = league
        .players
        .iter()
        .filter(|p| clubs.contains(&p.club))
        .map(|p| p.id)
        .collect();
    let result = league.transaction(|league| {
        for &club in &clubs {
            rebuild_team_season_stats(league, club, path.id)?;
        }
        let mut rebuilt = 0usize;
        for &player in &players {
            if rebuild_player_season_stats(league, player, path.id)? {
                rebuilt += 1;
            }
        }
        Ok(rebuilt)
    });
    match result {
        Ok(rebuilt) => HttpResponse::Ok().json(serde_json::json!({
            "teams": clubs.len(),
            "players": rebuilt,
        })),
        Err(e) => error_response(&e),
    }
}

#[put("/api/matches/{id}/result")]
async fn api_record_match_result(state: AppState, path: Path<MatchPath>, body: Json<MatchResult>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let LeagueState { league, coordinator } = &mut *g;
    match coordinator.record_match_result(league, path.id, &body) {
        Ok(affected) => HttpResponse::Ok().json(serde_json::json!({ "affected": affected })),
        Err(e) => error_response(&e),
    }
}

/// Result for any fixture; knockout legs get their Match record here.
#[put("/api/fixtures/{id}/result")]
async fn api_record_fixture_result(state: AppState, path: Path<FixturePath>, body: Json<MatchResult>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let LeagueState { league, coordinator } = &mut *g;
    match coordinator.record_fixture_result(league, path.id, &body) {
        Ok(affected) => HttpResponse::Ok().json(serde_json::json!({ "affected": affected })),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/matches/{id}")]
async fn api_delete_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let LeagueState { league, coordinator } = &mut *g;
    match coordinator.delete_match(league, path.id) {
        Ok(affected) => HttpResponse::Ok().json(serde_json::json!({ "affected": affected })),
        Err(e) => error_response(&e),
    }
}

#[put("/api/knockout-matches/{id}/result")]
async fn api_record_knockout_result(
    state: AppState,
    path: Path<KnockoutMatchPath>,
    body: Json<MatchResult>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let LeagueState { league, coordinator } = &mut *g;
    match coordinator.record_knockout_result(league, path.id, &body) {
        Ok(affected) => HttpResponse::Ok().json(serde_json::json!({ "affected": affected })),
        Err(e) => error_response(&e),
    }
}

#[post("/api/player-match-stats")]
async fn api_record_player_match_stats(state: AppState, body: Json<PlayerMatchStatsBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    let mut stats = PlayerMatchStats::new(body.player_id, body.match_ref);
    stats.goals = body.goals;
    stats.assists = body.assists;
    stats.minutes_played = body.minutes_played;
    stats.rating = body.rating;
    let LeagueState { league, coordinator } = &mut *g;
    match coordinator.record_player_match_stats(league, stats) {
        Ok(id) => HttpResponse::Ok().json(serde_json::json!({ "id": id })),
        Err(e) => error_response(&e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Load the clubs file named by CLUBS_CSV, if set.
fn preload_clubs(league: &mut League) {
    let Ok(path) = std::env::var("CLUBS_CSV") else {
        return;
    };
    match std::fs::File::open(&path) {
        Ok(file) => match import_clubs_csv(league, None, file) {
            Ok(summary) => log::info!("Preloaded {} clubs from {}", summary.created, path),
            Err(e) => log::warn!("Could not import {}: {}", path, e),
        },
        Err(e) => log::warn!("Could not open {}: {}", path, e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let mut initial = LeagueState::default();
    preload_clubs(&mut initial.league);
    let state = Data::new(RwLock::new(initial));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_get_league)
            .service(api_create_season)
            .service(api_delete_season)
            .service(api_create_club)
            .service(api_import_clubs)
            .service(api_enter_club)
            .service(api_create_player)
            .service(api_import_players)
            .service(api_generate_groups)
            .service(api_generate_fixtures)
            .service(api_repeat_fixtures)
            .service(api_group_standings)
            .service(api_generate_knockouts)
            .service(api_resolve_placeholders)
            .service(api_generate_final)
            .service(api_bracket)
            .service(api_season_awards)
            .service(api_rebuild_stats)
            .service(api_record_match_result)
            .service(api_record_fixture_result)
            .service(api_delete_match)
            .service(api_record_knockout_result)
            .service(api_record_player_match_stats)
    })
    .bind(bind)?
    .run()
    .await
}
