use axum::{extract::State, routing::post, Json, Router};
use tracing::info;

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::WebhookAck;
use crate::services::payment_webhook::PaymentEvent;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Webhooks del proveedor de pagos (sin token de usuario)
pub fn create_webhook_router() -> Router<AppState> {
    Router::new().route("/payment", post(payment_webhook))
}

async fn payment_webhook(
    State(state): State<AppState>,
    Json(event): Json<PaymentEvent>,
) -> Result<Json<WebhookAck>, AppError> {
    info!("💳 Webhook de pago recibido: {}", event.event_type);
    let controller = BookingController::new(&state);
    Ok(Json(controller.payment_webhook(event).await?))
}
