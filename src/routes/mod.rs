pub mod admin_routes;
pub mod auth_routes;
pub mod booking_routes;
pub mod car_routes;
pub mod favorite_routes;
pub mod owner_routes;
pub mod webhook_routes;

use axum::{routing::get, Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Todas las rutas de la API, sin capas transversales
pub fn create_api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes::create_auth_router(state.clone()))
        .nest("/api/cars", car_routes::create_car_router())
        .nest("/api/bookings", booking_routes::create_booking_router(state.clone()))
        .nest("/api/customer", booking_routes::create_customer_router(state.clone()))
        .nest("/api/favorites", favorite_routes::create_favorite_router(state.clone()))
        .nest("/api/owner", owner_routes::create_owner_router(state))
        .nest("/api/webhooks", webhook_routes::create_webhook_router())
        .nest("/api/admin", admin_routes::create_admin_router())
}

/// Listado de rutas para el log de arranque
pub const ROUTE_TABLE: &[(&str, &str)] = &[
    ("GET", "/health"),
    ("POST", "/api/auth/register"),
    ("POST", "/api/auth/login"),
    ("GET", "/api/auth/me"),
    ("GET", "/api/cars"),
    ("GET", "/api/cars/:car_id"),
    ("GET", "/api/cars/:car_id/reviews"),
    ("GET", "/api/cars/:car_id/availability"),
    ("POST", "/api/bookings"),
    ("GET", "/api/bookings"),
    ("GET", "/api/bookings/history"),
    ("GET", "/api/bookings/:booking_id"),
    ("POST", "/api/bookings/:booking_id/cancel"),
    ("POST", "/api/bookings/:booking_id/payment"),
    ("PUT", "/api/bookings/:booking_id/dates"),
    ("POST", "/api/bookings/:booking_id/review"),
    ("GET", "/api/customer/dashboard"),
    ("POST", "/api/favorites/:car_id"),
    ("GET", "/api/favorites"),
    ("POST", "/api/owner/cars"),
    ("GET", "/api/owner/cars"),
    ("PUT", "/api/owner/cars/:car_id"),
    ("DELETE", "/api/owner/cars/:car_id"),
    ("GET", "/api/owner/rentals"),
    ("POST", "/api/owner/rentals/:booking_id/action"),
    ("GET", "/api/owner/dashboard"),
    ("POST", "/api/webhooks/payment"),
    ("POST", "/api/admin/reconcile"),
];

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "car_rental",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
