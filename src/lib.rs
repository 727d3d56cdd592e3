//! Motor de reservas de alquiler de coches
//!
//! Disponibilidad sin solapes, precios con descuentos, ciclo de vida de las
//! reservas y reconciliación periódica, expuestos como API HTTP con axum.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    BoxError, Json, Router,
};
use serde_json::json;
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::warn;

use crate::middleware::{cors_layer, performance_middleware, security_headers_middleware};
use crate::state::AppState;

/// Router completo con las capas transversales aplicadas
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    routes::create_api_router(state.clone())
        .layer(from_fn_with_state(state.clone(), performance_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(timeout),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> impl IntoResponse {
    if err.is::<Elapsed>() {
        warn!("⏱️ Request cancelada por timeout");
        return (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({
                "error": "Request Timeout",
                "message": "La petición tardó demasiado",
                "code": "REQUEST_TIMEOUT",
            })),
        );
    }

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal Server Error",
            "message": err.to_string(),
            "code": "INTERNAL_ERROR",
        })),
    )
}
