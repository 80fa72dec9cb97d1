//! JSON payload builders for the HTTP routes. Each takes the game (and the
//! raw request body where needed) and returns the response body.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::combat::playback::{playback_steps, PlaybackStep};
use crate::combat::pool::PoolError;
use crate::combat::session::{CombatOutcome, CombatSession};
use crate::combat::turn::TurnResult;
use crate::game::rejection::Rejection;
use crate::game::save::GameSnapshot;
use crate::game::state::{ActiveCombat, GameState};
use crate::optimizer::optimize_squad;
use crate::optimizer::ranking::RankedSquad;
use crate::optimizer::squad_generator::SquadStrategy;

const DEFAULT_OPTIMIZE_LIMIT: usize = 10;
const MAX_OPTIMIZE_LIMIT: usize = 100;

#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be parsed.
    Parse(serde_json::Error),
    /// The game refused the action.
    Rejected(Rejection),
    /// Imported state breaks a pool invariant.
    InvalidState(PoolError),
    /// Response could not be serialized.
    Internal(serde_json::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "Invalid request body: {err}"),
            Self::Rejected(rejection) => write!(f, "{rejection}"),
            Self::InvalidState(err) => write!(f, "Invalid state: {err}"),
            Self::Internal(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<Rejection> for ApiError {
    fn from(value: Rejection) -> Self {
        Self::Rejected(value)
    }
}

#[derive(Debug, Deserialize)]
struct TroopRequest {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct BonusRequest {
    id: String,
}

#[derive(Debug, Deserialize)]
struct NameRequest {
    name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombatView<'a> {
    pub status: &'static str,
    pub combat: Option<&'a ActiveCombat>,
    pub rerolls_left: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub status: &'static str,
    pub outcome: CombatOutcome,
    pub result: TurnResult,
    pub playback: Vec<PlaybackStep>,
    pub session: CombatSession,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopResponse {
    pub status: &'static str,
    pub id: String,
    pub count: u32,
    pub malus_disabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeResponse {
    pub status: &'static str,
    pub candidates: usize,
    pub squads: Vec<RankedSquad>,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(ApiError::Internal)
}

fn parse<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(ApiError::Parse)
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "escouade-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn catalog_payload(game: &GameState) -> Result<String, ApiError> {
    to_json(game.catalog())
}

pub fn state_payload(game: &GameState) -> Result<String, ApiError> {
    to_json(&game.snapshot())
}

pub fn state_put_payload(game: &mut GameState, body: &str) -> Result<String, ApiError> {
    let snapshot: GameSnapshot = parse(body)?;
    snapshot.check().map_err(ApiError::InvalidState)?;
    game.restore(snapshot);
    tracing::info!(target: "game.save", "state imported");
    state_payload(game)
}

fn combat_view(game: &GameState) -> Result<String, ApiError> {
    let combat = game.combat();
    to_json(&CombatView {
        status: "ok",
        combat,
        rerolls_left: combat.map(|c| c.session.rerolls_left()),
    })
}

pub fn combat_start_payload(game: &mut GameState) -> Result<String, ApiError> {
    game.start_combat()?;
    combat_view(game)
}

pub fn combat_select_payload(game: &mut GameState, body: &str) -> Result<String, ApiError> {
    let request: TroopRequest = parse(body)?;
    game.select(request.id)?;
    combat_view(game)
}

pub fn combat_deselect_payload(game: &mut GameState, body: &str) -> Result<String, ApiError> {
    let request: TroopRequest = parse(body)?;
    game.deselect(request.id)?;
    combat_view(game)
}

pub fn combat_reroll_payload(game: &mut GameState) -> Result<String, ApiError> {
    let swaps = game.reroll()?;
    let combat = game.combat();
    to_json(&serde_json::json!({
        "status": "ok",
        "swapped": swaps.iter().map(|(old, new)| serde_json::json!({ "old": old, "new": new })).collect::<Vec<_>>(),
        "combat": combat,
        "rerolls_left": combat.map(|c| c.session.rerolls_left()),
    }))
}

pub fn combat_turn_payload(game: &mut GameState) -> Result<String, ApiError> {
    let report = game.play_turn()?;
    let playback = playback_steps(&report.result, report.session.boss_name.as_deref());
    to_json(&TurnResponse {
        status: "ok",
        outcome: report.outcome,
        result: report.result,
        playback,
        session: report.session,
    })
}

pub fn combat_abandon_payload(game: &mut GameState) -> Result<String, ApiError> {
    let session = game.abandon_combat()?;
    to_json(&serde_json::json!({ "status": "ok", "session": session }))
}

fn shop_response(game: &GameState, id: String, count: u32) -> Result<String, ApiError> {
    to_json(&ShopResponse {
        status: "ok",
        id,
        count,
        malus_disabled: game
            .combat()
            .map_or(false, |c| c.session.malus_disabled),
    })
}

pub fn shop_unlock_bonus_payload(game: &mut GameState, body: &str) -> Result<String, ApiError> {
    let request: BonusRequest = parse(body)?;
    let count = game.unlock_bonus(&request.id)?;
    shop_response(game, request.id, count)
}

pub fn shop_purchase_unit_payload(game: &mut GameState, body: &str) -> Result<String, ApiError> {
    let request: NameRequest = parse(body)?;
    let count = game.purchase_unit(&request.name)?;
    shop_response(game, request.name, count)
}

pub fn shop_sell_bonus_payload(game: &mut GameState, body: &str) -> Result<String, ApiError> {
    let request: BonusRequest = parse(body)?;
    let count = game.sell_bonus(&request.id)?;
    shop_response(game, request.id, count)
}

pub fn synergy_upgrade_payload(game: &mut GameState, body: &str) -> Result<String, ApiError> {
    let request: NameRequest = parse(body)?;
    let level = game.upgrade_synergy(&request.name)?;
    to_json(&serde_json::json!({ "status": "ok", "name": request.name, "level": level }))
}

/// Parse `limit=<n>` from the query string, clamped to `1..=MAX_OPTIMIZE_LIMIT`.
fn parse_limit(query: &str) -> usize {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == "limit")
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_OPTIMIZE_LIMIT)
        .clamp(1, MAX_OPTIMIZE_LIMIT)
}

pub fn optimize_squad_payload(game: &GameState, query: &str) -> Result<String, ApiError> {
    let mut squads = optimize_squad(game, &SquadStrategy::default())?;
    let candidates = squads.len();
    squads.truncate(parse_limit(query));
    to_json(&OptimizeResponse {
        status: "ok",
        candidates,
        squads,
    })
}
