//! HTTP API over the creature graph and the battle log

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use dexgraph_battle_log::{
    BattleFilter, BattleLog, BattleLogError, BattleLogGateway, BattleRecord, FileBattleLog,
    InMemoryBattleLog, RecordPage,
};
use dexgraph_kb::data::creature_ids;
use dexgraph_kb::{
    CoreError, CounterTarget, Creature, CreatureId, DexConfig, Neo4jSessionProvider, Page,
    PokedexService, SearchQuery, SlotOutcome, TraceContext, Winner,
};

#[derive(Clone)]
struct AppState {
    pokedex: PokedexService,
    battles: BattleLogGateway,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dexgraph_kb::init_tracing();
    let config = DexConfig::from_env();

    info!("Connecting to Neo4j at: {}", config.neo4j.uri);
    let provider = Neo4jSessionProvider::connect(config.neo4j.clone())
        .await
        .context("connecting to the creature graph")?;
    let pokedex = PokedexService::new(Arc::new(provider), config.neo4j.query_timeout);

    let log: Arc<dyn BattleLog> = match &config.battle_log_path {
        Some(path) => {
            info!("Battle log at {}", path.display());
            Arc::new(FileBattleLog::open(path.clone()).await.context("opening the battle log")?)
        }
        None => {
            warn!("BATTLE_LOG_PATH not set, battles are kept in memory");
            Arc::new(InMemoryBattleLog::new())
        }
    };

    let state = AppState {
        pokedex,
        battles: BattleLogGateway::new(log),
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/pokemon", get(list_creatures).post(search_creatures))
        .route("/pokemon/evolutions/:pid", get(evolution_chain))
        .route("/simulate-battle", post(simulate_battle))
        .route("/find-strong-against", post(find_strong_against))
        .route("/save-battle", post(save_battle))
        .route("/find-battle", post(find_battle))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .context("parsing the server address")?;
    info!("Starting server on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .context("serving HTTP")?;
    Ok(())
}

/// Rejected requests. Graph outages never show up here: the core answers them
/// with empty results.
#[derive(Debug)]
enum ApiError {
    BadRequest(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<BattleLogError> for ApiError {
    fn from(err: BattleLogError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::BadRequest(message) = self;
        let body = Json(json!({
            "error": message,
            "code": "ERR_BAD_REQUEST",
        }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

async fn health_check() -> &'static str {
    "OK"
}

fn default_limit() -> i64 {
    10
}

fn unbounded() -> i64 {
    -1
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: Value,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BattleRequest {
    team_a: Vec<i64>,
    team_b: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct BattleResponse {
    result: Vec<SlotOutcome>,
    winner: Winner,
}

#[derive(Debug, Deserialize)]
struct CounterRequest {
    pid: Value,
}

#[derive(Debug, Deserialize)]
struct FindBattleRequest {
    #[serde(flatten)]
    filter: BattleFilter,
    #[serde(default = "unbounded")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

async fn list_creatures(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Creature>>, ApiError> {
    let page = Page::from_raw(params.limit, params.offset)?;
    let creatures = state
        .pokedex
        .list_creatures(&TraceContext::new_root(), page)
        .await;
    Ok(Json(creatures))
}

async fn search_creatures(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<Creature>>, ApiError> {
    let query = SearchQuery::from_json(&request.query)?;
    let page = Page::from_raw(request.limit, request.offset)?;
    let creatures = state
        .pokedex
        .search_creatures(&TraceContext::new_root(), &query, page)
        .await;
    Ok(Json(creatures))
}

async fn evolution_chain(
    State(state): State<AppState>,
    Path(pid): Path<i64>,
) -> Json<Vec<Creature>> {
    Json(
        state
            .pokedex
            .evolution_chain(&TraceContext::new_root(), CreatureId(pid))
            .await,
    )
}

async fn simulate_battle(
    State(state): State<AppState>,
    Json(request): Json<BattleRequest>,
) -> Result<Json<BattleResponse>, ApiError> {
    let team_a = creature_ids(&request.team_a);
    let team_b = creature_ids(&request.team_b);
    let result = state
        .pokedex
        .resolve_battle(&TraceContext::new_root(), &team_a, &team_b)
        .await?;
    let winner = Winner::from_outcomes(&result);
    Ok(Json(BattleResponse { result, winner }))
}

async fn find_strong_against(
    State(state): State<AppState>,
    Json(request): Json<CounterRequest>,
) -> Result<Json<Option<Creature>>, ApiError> {
    let target = CounterTarget::from_json(&request.pid)?;
    let counter = state
        .pokedex
        .find_counter(&TraceContext::new_root(), &target)
        .await?;
    Ok(Json(counter))
}

async fn save_battle(
    State(state): State<AppState>,
    Json(record): Json<BattleRecord>,
) -> Json<bool> {
    Json(state.battles.save_battle_record(&record).await)
}

async fn find_battle(
    State(state): State<AppState>,
    Json(request): Json<FindBattleRequest>,
) -> Result<Json<Vec<BattleRecord>>, ApiError> {
    let page = RecordPage::from_raw(request.limit, request.offset)?;
    Ok(Json(
        state
            .battles
            .query_battle_records(&request.filter, page)
            .await,
    ))
}
