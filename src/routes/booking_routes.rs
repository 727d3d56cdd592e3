use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{
    BookingListQuery, BookingResponse, CreateBookingRequest, CustomerDashboard, PaymentIntentResponse,
    RescheduleRequest,
};
use crate::dto::review_dto::CreateReviewRequest;
use crate::dto::ApiResponse;
use crate::middleware::{auth_middleware, AuthenticatedUser};
use crate::models::review::Review;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de reservas del cliente (requieren token)
pub fn create_booking_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking).get(list_bookings))
        .route("/history", get(booking_history))
        .route("/:booking_id", get(get_booking))
        .route("/:booking_id/cancel", post(cancel_booking))
        .route("/:booking_id/payment", post(start_payment))
        .route("/:booking_id/dates", put(reschedule_booking))
        .route("/:booking_id/review", post(review_booking))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Panel del cliente
pub fn create_customer_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(customer_dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let customer_id = user.require_customer()?;
    let controller = BookingController::new(&state);
    Ok(Json(controller.create(customer_id, request).await?))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<ApiResponse<Vec<BookingResponse>>>, AppError> {
    let customer_id = user.require_customer()?;
    let controller = BookingController::new(&state);
    Ok(Json(controller.list(customer_id, query).await?))
}

async fn booking_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<BookingResponse>>>, AppError> {
    let customer_id = user.require_customer()?;
    let controller = BookingController::new(&state);
    Ok(Json(controller.history(customer_id).await?))
}

/// Cliente o propietario del coche
async fn get_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(&state);
    Ok(Json(controller.detail(&user, booking_id).await?))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let customer_id = user.require_customer()?;
    let controller = BookingController::new(&state);
    Ok(Json(controller.cancel(customer_id, booking_id).await?))
}

async fn start_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<PaymentIntentResponse>>, AppError> {
    let customer_id = user.require_customer()?;
    let controller = BookingController::new(&state);
    Ok(Json(controller.start_payment(customer_id, booking_id).await?))
}

async fn reschedule_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let customer_id = user.require_customer()?;
    let controller = BookingController::new(&state);
    Ok(Json(controller.reschedule(customer_id, booking_id, request).await?))
}

async fn review_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Json<ApiResponse<Review>>, AppError> {
    let customer_id = user.require_customer()?;
    let controller = BookingController::new(&state);
    Ok(Json(controller.review(customer_id, booking_id, request).await?))
}

async fn customer_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<CustomerDashboard>>, AppError> {
    let customer_id = user.require_customer()?;
    let controller = BookingController::new(&state);
    Ok(Json(controller.dashboard(customer_id).await?))
}
