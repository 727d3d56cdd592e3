//! Webhook del proveedor de pagos
//!
//! Solo dos eventos tienen efecto. Cualquier otro, o un payment intent que
//! no corresponde a ninguna reserva, se registra y se acepta igualmente
//! para que el proveedor no reintente.

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::booking_lifecycle::BookingLifecycleService;
use crate::utils::errors::{AppError, AppResult};

pub const PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const PAYMENT_FAILED: &str = "payment_intent.payment_failed";

/// Evento tal como lo envía el proveedor
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEvent {
    #[serde(alias = "type")]
    pub event_type: String,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Confirmed(Uuid),
    PaymentFailed(Uuid),
    Ignored(String),
}

#[derive(Clone)]
pub struct PaymentWebhookService {
    lifecycle: BookingLifecycleService,
}

impl PaymentWebhookService {
    pub fn new(lifecycle: BookingLifecycleService) -> Self {
        Self { lifecycle }
    }

    pub async fn handle(&self, event: &PaymentEvent) -> AppResult<WebhookOutcome> {
        if event.event_type != PAYMENT_SUCCEEDED && event.event_type != PAYMENT_FAILED {
            info!("🪝 Evento de pago ignorado: {}", event.event_type);
            return Ok(WebhookOutcome::Ignored(format!("unhandled event {}", event.event_type)));
        }

        let Some(intent_id) = event.payment_intent_id.as_deref().filter(|id| !id.is_empty()) else {
            warn!("🪝 Evento {} sin payment intent", event.event_type);
            return Ok(WebhookOutcome::Ignored("missing payment intent".to_string()));
        };

        let Some(booking) = self.lifecycle.store().find_booking_by_payment_intent(intent_id).await? else {
            warn!("🪝 Payment intent desconocido: {}", intent_id);
            return Ok(WebhookOutcome::Ignored(format!("unknown payment intent {}", intent_id)));
        };

        let result = if event.event_type == PAYMENT_SUCCEEDED {
            self.lifecycle
                .record_payment_success(&booking)
                .await
                .map(|saved| WebhookOutcome::Confirmed(saved.id))
        } else {
            self.lifecycle
                .mark_payment_failed(&booking)
                .await
                .map(|saved| WebhookOutcome::PaymentFailed(saved.id))
        };

        // El proveedor reintenta todo lo que no sea 2xx: una transición
        // imposible se registra y se reconoce igualmente
        match result {
            Err(AppError::InvalidTransition(reason)) => {
                warn!(
                    "🪝 Evento {} no aplicable a la reserva {}: {}",
                    event.event_type, booking.id, reason
                );
                Ok(WebhookOutcome::Ignored(format!(
                    "booking {} is {}: {}",
                    booking.id, booking.status, reason
                )))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::models::{BookingStatus, PaymentStatus};
    use crate::repositories::booking_store::BookingStore;
    use crate::repositories::memory_store::InMemoryBookingStore;
    use crate::services::notification_service::NotificationService;
    use crate::services::pricing_service::PricingPolicy;
    use crate::services::test_support::{booking_between, date, sample_car};
    use serde_json::json;

    fn event(event_type: &str, intent: &str) -> PaymentEvent {
        serde_json::from_value(json!({
            "event_type": event_type,
            "payment_intent_id": intent
        }))
        .unwrap()
    }

    async fn setup() -> (PaymentWebhookService, Arc<InMemoryBookingStore>, Uuid) {
        let store = Arc::new(InMemoryBookingStore::new());
        let car = sample_car(Uuid::new_v4());
        let mut booking = booking_between(car.id, date(6, 1), date(6, 4), BookingStatus::Pending);
        booking.payment_intent_id = Some("pi_test".to_string());
        let booking_id = booking.id;
        store.insert_car(car).await;
        store.insert_booking(booking).await;

        let lifecycle = BookingLifecycleService::new(
            store.clone(),
            PricingPolicy::default(),
            NotificationService::new(None),
        );
        (PaymentWebhookService::new(lifecycle), store, booking_id)
    }

    #[tokio::test]
    async fn test_succeeded_confirms_booking() {
        let (service, store, booking_id) = setup().await;
        let outcome = service.handle(&event(PAYMENT_SUCCEEDED, "pi_test")).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Confirmed(booking_id));

        let booking = store.find_booking(booking_id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.payment_status, PaymentStatus::Paid);

        let payment = store.find_payment(booking_id).await.unwrap().unwrap();
        assert_eq!(payment.payment_intent_id.as_deref(), Some("pi_test"));

        // reintento del proveedor
        let again = service.handle(&event(PAYMENT_SUCCEEDED, "pi_test")).await.unwrap();
        assert_eq!(again, WebhookOutcome::Confirmed(booking_id));
    }

    #[tokio::test]
    async fn test_failed_marks_payment() {
        let (service, store, booking_id) = setup().await;
        let outcome = service.handle(&event(PAYMENT_FAILED, "pi_test")).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::PaymentFailed(booking_id));

        let booking = store.find_booking(booking_id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_unknown_intent_and_event_are_ignored() {
        let (service, store, booking_id) = setup().await;

        let unknown = service.handle(&event(PAYMENT_SUCCEEDED, "pi_other")).await.unwrap();
        assert!(matches!(unknown, WebhookOutcome::Ignored(_)));

        let other = service.handle(&event("charge.refunded", "pi_test")).await.unwrap();
        assert!(matches!(other, WebhookOutcome::Ignored(_)));

        let missing: PaymentEvent = serde_json::from_value(json!({ "type": PAYMENT_SUCCEEDED })).unwrap();
        let missing = service.handle(&missing).await.unwrap();
        assert!(matches!(missing, WebhookOutcome::Ignored(_)));

        let booking = store.find_booking(booking_id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_success_on_closed_booking_is_acknowledged() {
        let (service, store, _) = setup().await;
        for (status, intent) in [
            (BookingStatus::Cancelled, "pi_cancelled"),
            (BookingStatus::Rejected, "pi_rejected"),
            (BookingStatus::Completed, "pi_completed"),
        ] {
            let mut closed = booking_between(Uuid::new_v4(), date(7, 1), date(7, 3), status);
            closed.payment_intent_id = Some(intent.to_string());
            let closed_id = closed.id;
            store.insert_booking(closed).await;

            let outcome = service.handle(&event(PAYMENT_SUCCEEDED, intent)).await.unwrap();
            assert!(matches!(outcome, WebhookOutcome::Ignored(_)), "{}", status);

            let stored = store.find_booking(closed_id).await.unwrap().unwrap();
            assert_eq!(stored.status, status);
            assert_eq!(stored.payment_status, PaymentStatus::Pending);
            assert!(store.find_payment(closed_id).await.unwrap().is_none());
        }
    }
}
