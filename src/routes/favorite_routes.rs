use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::favorite_controller::FavoriteController;
use crate::dto::review_dto::FavoriteToggleResponse;
use crate::dto::ApiResponse;
use crate::middleware::{auth_middleware, AuthenticatedUser};
use crate::models::review::FavoriteCar;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_favorite_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_favorites))
        .route("/:car_id", post(toggle_favorite))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(car_id): Path<Uuid>,
) -> Result<Json<ApiResponse<FavoriteToggleResponse>>, AppError> {
    let customer_id = user.require_customer()?;
    let controller = FavoriteController::new(state.pool.clone());
    Ok(Json(controller.toggle(customer_id, car_id).await?))
}

async fn list_favorites(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<FavoriteCar>>>, AppError> {
    let customer_id = user.require_customer()?;
    let controller = FavoriteController::new(state.pool.clone());
    Ok(Json(controller.list(customer_id).await?))
}
