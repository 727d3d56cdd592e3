use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::controllers::car_controller::CarController;
use crate::dto::booking_dto::{AvailabilityQuery, AvailabilityResponse};
use crate::dto::car_dto::{CarDetailResponse, CarResponse, CarSearchQuery};
use crate::dto::ApiResponse;
use crate::middleware::auth::optional_user;
use crate::models::review::Review;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas públicas del catálogo
pub fn create_car_router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_cars))
        .route("/:car_id", get(get_car))
        .route("/:car_id/reviews", get(list_reviews))
        .route("/:car_id/availability", get(check_availability))
}

async fn search_cars(
    State(state): State<AppState>,
    Query(query): Query<CarSearchQuery>,
) -> Result<Json<ApiResponse<Vec<CarResponse>>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    Ok(Json(controller.search(query).await?))
}

async fn get_car(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CarDetailResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    Ok(Json(controller.detail(car_id).await?))
}

async fn list_reviews(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Review>>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    Ok(Json(controller.reviews(car_id).await?))
}

/// Pública; con un token de cliente válido aplica su descuento de fidelidad
async fn check_availability(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
    headers: HeaderMap,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let viewer = optional_user(&headers, &state.jwt_config());
    let controller = BookingController::new(&state);
    Ok(Json(controller.availability(car_id, query, viewer).await?))
}
