//! Progression worker: runs the periodic sweep and a small admin HTTP surface.
//! Run with: cargo run --bin progressor
//! Configuration comes from the environment (HOST, PORT, SWEEP_INTERVAL_SECS,
//! ADMIN_RECIPIENTS, BRACKET_SHUFFLE_SEED, TOURNAMENTS_FILE, REGISTRATIONS_CSV).

use actix_web::{
    get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use pool_ladder::notify::{LogNotifier, StaticAdmins};
use pool_ladder::scheduler::{run_periodic, run_sweep};
use pool_ladder::store::CsvRegistrations;
use pool_ladder::{
    start_tournament, BracketGenerator, EngineConfig, GroupKey, Level, MatchId, MatchResult,
    MemoryStore, ProgressionCoordinator, RegistrationSource, TournamentError, TournamentId,
};
use serde::Deserialize;
use std::sync::Arc;

struct AppState {
    coordinator: Arc<ProgressionCoordinator>,
    store: Arc<MemoryStore>,
}

type State = Data<AppState>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and level (e.g. /api/tournaments/{id}/levels/county)
#[derive(Deserialize)]
struct LevelPath {
    id: TournamentId,
    level: Level,
}

#[derive(Deserialize)]
struct MatchPath {
    match_id: MatchId,
}

#[derive(Deserialize)]
struct NextRoundBody {
    group: GroupKey,
}

/// Optional group filter: `?community=12` or `?county=3`; neither means the whole level.
#[derive(Deserialize)]
struct GroupQuery {
    community: Option<u64>,
    county: Option<u64>,
    #[serde(default)]
    unplaced: bool,
}

impl GroupQuery {
    fn key(&self) -> Option<GroupKey> {
        match (self.community, self.county) {
            (Some(id), _) => Some(GroupKey::Community(id)),
            (None, Some(id)) => Some(GroupKey::County(id)),
            (None, None) if self.unplaced => Some(GroupKey::Unplaced),
            (None, None) => None,
        }
    }
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::TournamentNotFound(_) => HttpResponse::NotFound().json(body),
        TournamentError::AlreadyInitialized { .. }
        | TournamentError::RoundNotComplete
        | TournamentError::GroupDecided { .. }
        | TournamentError::InvalidState { .. } => HttpResponse::Conflict().json(body),
        TournamentError::NotInitialized { .. } | TournamentError::LevelNotInFormat { .. } => {
            HttpResponse::BadRequest().json(body)
        }
        TournamentError::LockPoisoned | TournamentError::Persistence(_) => {
            log::error!("Request failed: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pool-ladder-progressor",
    })
}

/// Run a sweep now instead of waiting for the next tick.
#[post("/api/sweep")]
async fn api_sweep(state: State) -> HttpResponse {
    match run_sweep(state.coordinator.clone()).await {
        Some(report) => HttpResponse::Ok().json(report),
        None => HttpResponse::InternalServerError().json(serde_json::json!({ "error": "sweep failed" })),
    }
}

/// Upcoming -> Ongoing, and bracket the first level.
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: State, path: Path<TournamentPath>) -> HttpResponse {
    let store = state.store.clone();
    let coordinator = state.coordinator.clone();
    let id = path.id;
    let result =
        actix_web::web::block(move || start_tournament(&*store, coordinator.bracket(), id)).await;
    match result {
        Ok(Ok(outcome)) => HttpResponse::Ok().json(outcome),
        Ok(Err(e)) => error_response(&e),
        Err(_) => HttpResponse::InternalServerError().body("worker error"),
    }
}

/// Admin-triggered level initialisation (manual mode).
#[post("/api/tournaments/{id}/levels/{level}/initialize")]
async fn api_initialize_level(state: State, path: Path<LevelPath>) -> HttpResponse {
    let coordinator = state.coordinator.clone();
    let LevelPath { id, level } = path.into_inner();
    let result = actix_web::web::block(move || coordinator.bracket().initialize(id, level)).await;
    match result {
        Ok(Ok(outcome)) => HttpResponse::Ok().json(outcome),
        Ok(Err(e)) => error_response(&e),
        Err(_) => HttpResponse::InternalServerError().body("worker error"),
    }
}

/// Generate one group's next round (fails while the current round is open).
#[post("/api/tournaments/{id}/levels/{level}/next-round")]
async fn api_next_round(
    state: State,
    path: Path<LevelPath>,
    body: Json<NextRoundBody>,
) -> HttpResponse {
    let coordinator = state.coordinator.clone();
    let LevelPath { id, level } = path.into_inner();
    let group = body.group;
    let result =
        actix_web::web::block(move || coordinator.bracket().generate_next_round(id, level, group))
            .await;
    match result {
        Ok(Ok(outcome)) => HttpResponse::Ok().json(outcome),
        Ok(Err(e)) => error_response(&e),
        Err(_) => HttpResponse::InternalServerError().body("worker error"),
    }
}

#[get("/api/tournaments/{id}/levels/{level}/completion")]
async fn api_level_completion(
    state: State,
    path: Path<LevelPath>,
    query: Query<GroupQuery>,
) -> HttpResponse {
    let coordinator = state.coordinator.clone();
    let LevelPath { id, level } = path.into_inner();
    let group = query.key();
    let result = actix_web::web::block(move || {
        coordinator.detector().check_level_completion(id, level, group)
    })
    .await;
    match result {
        Ok(Ok(completion)) => HttpResponse::Ok().json(completion),
        Ok(Err(e)) => error_response(&e),
        Err(_) => HttpResponse::InternalServerError().body("worker error"),
    }
}

/// Match-play hook for the in-memory store: record a reported result.
#[put("/api/matches/{match_id}/result")]
async fn api_record_result(
    state: State,
    path: Path<MatchPath>,
    body: Json<MatchResult>,
) -> HttpResponse {
    match state.store.record_result(path.match_id, body.into_inner()) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = EngineConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let store = Arc::new(MemoryStore::new());
    if let Some(path) = &config.tournaments_file {
        let file = std::fs::File::open(path)?;
        let loaded = store
            .load_tournaments(file)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        log::info!("Loaded {} tournament(s) from {}", loaded, path.display());
    }
    let registrations: Arc<dyn RegistrationSource> = match &config.registrations_csv {
        Some(path) => Arc::new(
            CsvRegistrations::from_path(path)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
        ),
        None => store.clone(),
    };

    let bracket = BracketGenerator::new(store.clone(), registrations.clone(), config.seeding);
    let coordinator = Arc::new(ProgressionCoordinator::new(
        store.clone(),
        registrations,
        Arc::new(LogNotifier),
        Arc::new(StaticAdmins(config.admin_recipients.clone())),
        bracket,
    ));

    actix_web::rt::spawn(run_periodic(coordinator.clone(), config.sweep_interval));

    let state = Data::new(AppState { coordinator, store });
    let bind = (config.host.clone(), config.port);
    log::info!("Starting admin server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_sweep)
            .service(api_start_tournament)
            .service(api_initialize_level)
            .service(api_next_round)
            .service(api_level_completion)
            .service(api_record_result)
    })
    .bind(bind)?
    .run()
    .await
}
