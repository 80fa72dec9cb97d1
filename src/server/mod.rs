pub mod api;
pub mod routes;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::server::routes::HttpResponse;
use crate::server::store::GameStore;

pub fn run_server(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(GameStore::open(config)?);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config, store))?;
    Ok(())
}

async fn serve(config: &AppConfig, store: Arc<GameStore>) -> std::io::Result<()> {
    let app = router(store, &config.static_dir);
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(target: "server", bind = %config.bind, static_dir = %config.static_dir.display(), "escouade server listening");
    println!("escouade server listening on http://{}", config.bind);
    axum::serve(listener, app).await
}

/// `/api/*` goes through [routes::route_request]; everything else is served from `static_dir`.
pub fn router(store: Arc<GameStore>, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/*rest", any(dispatch))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(store)
}

async fn dispatch(
    State(store): State<Arc<GameStore>>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let method_name = method.as_str().to_string();
    // The store lock and autosave are blocking.
    let handled = tokio::task::spawn_blocking(move || {
        routes::route_request(&store, &method_name, &path, &body)
    })
    .await;

    match handled {
        Ok(response) => into_axum(response),
        Err(err) => {
            tracing::error!(target: "server", error = %err, "request handler failed");
            into_axum(routes::error_response(500, "Internal Server Error", "request handler failed"))
        }
    }
}

fn into_axum(response: HttpResponse) -> Response {
    let status = StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, response.content_type)],
        Body::from(response.body),
    )
        .into_response()
}
