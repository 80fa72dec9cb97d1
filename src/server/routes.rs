use crate::server::api::{self, ApiError};
use crate::server::store::GameStore;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn ok(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

/// Routes one `/api` request. `path` may carry a query string.
pub fn route_request(store: &GameStore, method: &str, path: &str, body: &str) -> HttpResponse {
    let (route, query) = path.split_once('?').unwrap_or((path, ""));

    let (result, mutated) = match (method, route) {
        ("GET", "/api/health") => {
            return match api::health_payload() {
                Ok(payload) => HttpResponse::ok(payload),
                Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
            };
        }
        ("GET", "/api/catalog") => (store.with_game(|game| api::catalog_payload(game)), false),
        ("GET", "/api/state") => (store.with_game(|game| api::state_payload(game)), false),
        ("PUT", "/api/state") => (store.with_game(|game| api::state_put_payload(game, body)), true),
        ("POST", "/api/combat/start") => (store.with_game(api::combat_start_payload), true),
        ("POST", "/api/combat/select") => {
            (store.with_game(|game| api::combat_select_payload(game, body)), true)
        }
        ("POST", "/api/combat/deselect") => {
            (store.with_game(|game| api::combat_deselect_payload(game, body)), true)
        }
        ("POST", "/api/combat/reroll") => (store.with_game(api::combat_reroll_payload), true),
        ("POST", "/api/combat/turn") => (store.with_game(api::combat_turn_payload), true),
        ("POST", "/api/combat/abandon") => (store.with_game(api::combat_abandon_payload), true),
        ("POST", "/api/shop/unlock-bonus") => {
            (store.with_game(|game| api::shop_unlock_bonus_payload(game, body)), true)
        }
        ("POST", "/api/shop/purchase-unit") => {
            (store.with_game(|game| api::shop_purchase_unit_payload(game, body)), true)
        }
        ("POST", "/api/shop/sell-bonus") => {
            (store.with_game(|game| api::shop_sell_bonus_payload(game, body)), true)
        }
        ("POST", "/api/consumables/synergy") => {
            (store.with_game(|game| api::synergy_upgrade_payload(game, body)), true)
        }
        ("GET", "/api/optimize/squad") => {
            (store.with_game(|game| api::optimize_squad_payload(game, query)), false)
        }
        _ => return error_response(404, "Not Found", "Route not found"),
    };

    match result {
        Ok(payload) => {
            if mutated {
                store.persist();
            }
            HttpResponse::ok(payload)
        }
        Err(err) => api_error_response(&err),
    }
}

fn api_error_response(err: &ApiError) -> HttpResponse {
    match err {
        ApiError::Parse(_) | ApiError::InvalidState(_) => {
            error_response(400, "Bad Request", &err.to_string())
        }
        ApiError::Rejected(rejection) => {
            tracing::debug!(target: "server", %rejection, "request rejected");
            error_response(409, "Conflict", &err.to_string())
        }
        ApiError::Internal(_) => error_response(500, "Internal Server Error", &err.to_string()),
    }
}

pub fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
