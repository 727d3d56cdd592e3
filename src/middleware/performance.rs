//! Middleware de rendimiento
//!
//! Registra la duración de cada request y avisa de las lentas.

use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::state::AppState;

pub async fn performance_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let elapsed = started.elapsed();
    let threshold = Duration::from_millis(state.config.slow_request_threshold_ms);
    if elapsed > threshold {
        warn!(
            "🐢 Request lenta: {} {} -> {} en {}ms",
            method,
            uri,
            response.status(),
            elapsed.as_millis()
        );
    } else {
        debug!("⚡ {} {} -> {} en {}ms", method, uri, response.status(), elapsed.as_millis());
    }

    response
}
