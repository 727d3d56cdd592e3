use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::car_controller::CarController;
use crate::controllers::owner_controller::OwnerController;
use crate::dto::booking_dto::{BookingListQuery, BookingResponse, OwnerActionRequest, OwnerDashboard};
use crate::dto::car_dto::{CarResponse, CreateCarRequest, UpdateCarRequest};
use crate::dto::ApiResponse;
use crate::middleware::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas del propietario: flota, solicitudes y panel
pub fn create_owner_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/cars", post(create_car).get(list_cars))
        .route("/cars/:car_id", put(update_car).delete(delete_car))
        .route("/rentals", get(list_rentals))
        .route("/rentals/:booking_id/action", post(rental_action))
        .route("/dashboard", get(owner_dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn create_car(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateCarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let owner_id = user.require_owner()?;
    let controller = CarController::new(state.pool.clone());
    Ok(Json(controller.create(owner_id, request).await?))
}

async fn list_cars(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<CarResponse>>>, AppError> {
    let owner_id = user.require_owner()?;
    let controller = CarController::new(state.pool.clone());
    Ok(Json(controller.list_owned(owner_id).await?))
}

async fn update_car(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(car_id): Path<Uuid>,
    Json(request): Json<UpdateCarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let owner_id = user.require_owner()?;
    let controller = CarController::new(state.pool.clone());
    Ok(Json(controller.update(car_id, owner_id, request).await?))
}

async fn delete_car(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(car_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let owner_id = user.require_owner()?;
    let controller = CarController::new(state.pool.clone());
    Ok(Json(controller.delete(car_id, owner_id).await?))
}

async fn list_rentals(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<ApiResponse<Vec<BookingResponse>>>, AppError> {
    let owner_id = user.require_owner()?;
    let controller = OwnerController::new(&state);
    Ok(Json(controller.rentals(owner_id, query).await?))
}

async fn rental_action(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<OwnerActionRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let owner_id = user.require_owner()?;
    let controller = OwnerController::new(&state);
    Ok(Json(controller.action(owner_id, booking_id, request).await?))
}

async fn owner_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<OwnerDashboard>>, AppError> {
    let owner_id = user.require_owner()?;
    let controller = OwnerController::new(&state);
    Ok(Json(controller.dashboard(owner_id).await?))
}
