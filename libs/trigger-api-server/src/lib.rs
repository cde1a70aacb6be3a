mod http;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio_util::sync::CancellationToken;

use events_engine::BatchRunner;

pub use http::resolve_count;

#[derive(Clone)]
struct AppState {
    runner: Arc<BatchRunner>,
    /// Родитель для токенов batch'ей: shutdown прерывает генерацию.
    shutdown: CancellationToken,
}

/// Router HTTP-триггера, без привязки к сокету.
pub fn router(runner: Arc<BatchRunner>, shutdown: CancellationToken) -> Router {
    let state = AppState { runner, shutdown };

    Router::new()
        .route("/api/events", get(http::handle_trigger).post(http::handle_trigger))
        .route("/api/health", get(http::handle_health))
        .with_state(state)
}

/// HTTP trigger сервер.
pub async fn run(port: u16, runner: Arc<BatchRunner>, shutdown: CancellationToken) -> Result<(), String> {
    let app = router(runner, shutdown.clone());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| format!("bind api :{port}: {e}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| format!("axum serve: {e}"))?;

    Ok(())
}
