//! Ciclo de vida de las reservas
//!
//! Toda mutación de estado pasa por `apply`, que consulta la tabla de
//! transiciones, escribe con compare-and-set, ajusta el pago asociado,
//! resincroniza la disponibilidad del coche y dispara las notificaciones.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::payment::{METHOD_CARD, METHOD_ON_RETURN};
use crate::models::{Booking, BookingAction, BookingStatus, Car, NewBooking, Payment, PaymentStatus};
use crate::repositories::booking_store::{BookingStore, BookingVersion, PaymentWrite};
use crate::services::availability_sync::AvailabilitySynchronizer;
use crate::services::notification_service::{BookingEvent, BookingNotification, NotificationService};
use crate::services::pricing_service::PricingPolicy;
use crate::utils::errors::{forbidden_error, not_found_error, validation_error, AppError, AppResult};
use crate::utils::validation::validate_date_order;

/// Quién ejecuta una operación sobre una reserva
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Customer(Uuid),
    Owner(Uuid),
    System,
}

/// Datos de una solicitud de reserva ya parseados
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub car_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub special_requests: Option<String>,
}

#[derive(Clone)]
pub struct BookingLifecycleService {
    store: Arc<dyn BookingStore>,
    pricing: PricingPolicy,
    synchronizer: AvailabilitySynchronizer,
    notifier: NotificationService,
}

impl BookingLifecycleService {
    pub fn new(store: Arc<dyn BookingStore>, pricing: PricingPolicy, notifier: NotificationService) -> Self {
        Self {
            synchronizer: AvailabilitySynchronizer::new(store.clone()),
            store,
            pricing,
            notifier,
        }
    }

    pub fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }

    pub fn synchronizer(&self) -> &AvailabilitySynchronizer {
        &self.synchronizer
    }

    async fn bookable_car(&self, car_id: Uuid) -> AppResult<Car> {
        self.store
            .find_car(car_id)
            .await?
            .filter(|car| car.is_active)
            .ok_or_else(|| not_found_error("Car", &car_id.to_string()))
    }

    fn ensure_not_in_past(start_date: NaiveDate, today: NaiveDate) -> AppResult<()> {
        if start_date < today {
            return Err(validation_error("Start date cannot be in the past."));
        }
        Ok(())
    }

    /// Crear una reserva pending con la comprobación de solape atómica
    pub async fn create_booking(&self, customer_id: Uuid, draft: BookingDraft, today: NaiveDate) -> AppResult<Booking> {
        validate_date_order(draft.start_date, draft.end_date)?;
        Self::ensure_not_in_past(draft.start_date, today)?;

        let car = self.bookable_car(draft.car_id).await?;
        let completed = self.store.count_completed_bookings(customer_id).await?;
        let quote = self
            .pricing
            .quote(draft.start_date, draft.end_date, car.daily_rate, completed)?;

        let new_booking = NewBooking {
            customer_id,
            car_id: car.id,
            start_date: draft.start_date,
            end_date: draft.end_date,
            quote,
            pickup_location: draft
                .pickup_location
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| car.pickup_location.clone()),
            dropoff_location: draft.dropoff_location,
            special_requests: draft.special_requests,
        };

        let booking = self.store.insert_if_available(new_booking).await?;
        info!(
            "📝 Reserva {} creada: coche {} [{} - {}), {} a pagar",
            booking.id,
            booking.car_id,
            booking.start_date,
            booking.end_date,
            booking.amount_due()
        );

        self.notifier
            .dispatch(BookingNotification::new(BookingEvent::Created, car.owner_id, &booking));
        Ok(booking)
    }

    /// Cargar una reserva visible para el actor; las ajenas se ven como inexistentes
    pub async fn load_for(&self, actor: Actor, booking_id: Uuid) -> AppResult<Booking> {
        let missing = || not_found_error("Booking", &booking_id.to_string());
        let booking = self.store.find_booking(booking_id).await?.ok_or_else(missing)?;

        match actor {
            Actor::System => Ok(booking),
            Actor::Customer(id) if booking.customer_id == id => Ok(booking),
            Actor::Owner(id) => {
                let car = self.store.find_car(booking.car_id).await?.ok_or_else(missing)?;
                if car.owner_id == id {
                    Ok(booking)
                } else {
                    Err(missing())
                }
            }
            Actor::Customer(_) => Err(missing()),
        }
    }

    /// Núcleo de las transiciones
    pub async fn apply(&self, booking: &Booking, action: BookingAction) -> AppResult<Booking> {
        let next = booking.status.transition(action).ok_or_else(|| {
            AppError::InvalidTransition(format!(
                "Cannot {} a booking that is {}",
                action, booking.status
            ))
        })?;

        let now = Utc::now();
        let mut updated = booking.clone();
        updated.status = next;

        let payment = match action {
            BookingAction::PaymentSucceeded => {
                updated.payment_status = PaymentStatus::Paid;
                Some(PaymentWrite::Record(Payment::paid(
                    booking.id,
                    booking.payment_intent_id.clone(),
                    booking.amount_due(),
                    METHOD_CARD,
                    now,
                )))
            }
            BookingAction::Cancel if booking.payment_status == PaymentStatus::Paid => {
                updated.payment_status = PaymentStatus::Refunded;
                let amount = self
                    .store
                    .find_payment(booking.id)
                    .await?
                    .map(|p| p.amount)
                    .unwrap_or_else(|| booking.amount_due());
                Some(PaymentWrite::Refund {
                    amount,
                    refunded_at: now,
                })
            }
            BookingAction::Complete
                if matches!(booking.payment_status, PaymentStatus::Pending | PaymentStatus::Failed) =>
            {
                updated.payment_status = PaymentStatus::Paid;
                Some(PaymentWrite::Record(Payment::paid(
                    booking.id,
                    booking.payment_intent_id.clone(),
                    booking.amount_due(),
                    METHOD_ON_RETURN,
                    now,
                )))
            }
            _ => None,
        };

        let saved = self.store.update_booking(&updated, BookingVersion::of(booking), payment).await?;
        info!(
            "🔄 Reserva {}: {} --{}--> {} (pago {})",
            saved.id,
            booking.status,
            action,
            saved.status,
            saved.payment_status.as_str()
        );

        // El estado ya está persistido; si falla, el barrido periódico lo corrige
        if let Err(e) = self.synchronizer.sync_car(saved.car_id).await {
            error!("❌ Error sincronizando el coche {}: {}", saved.car_id, e);
        }

        if saved.status != booking.status {
            if let Some(event) = BookingEvent::for_status(saved.status) {
                self.notifier
                    .dispatch(BookingNotification::new(event, saved.customer_id, &saved));
            }
        }

        Ok(saved)
    }

    /// Iniciar el pago: asigna un payment intent a la reserva
    pub async fn start_payment(&self, customer_id: Uuid, booking_id: Uuid) -> AppResult<Booking> {
        let booking = self.load_for(Actor::Customer(customer_id), booking_id).await?;

        let payable = matches!(booking.status, BookingStatus::Pending | BookingStatus::Confirmed)
            && matches!(booking.payment_status, PaymentStatus::Pending | PaymentStatus::Failed);
        if !payable {
            return Err(AppError::InvalidTransition(format!(
                "Cannot start a payment for a booking that is {} with payment {}",
                booking.status,
                booking.payment_status.as_str()
            )));
        }

        if booking.payment_intent_id.is_some() && booking.payment_status == PaymentStatus::Pending {
            debug!("💳 Reserva {} ya tiene payment intent", booking.id);
            return Ok(booking);
        }

        let mut updated = booking.clone();
        updated.payment_intent_id = Some(format!("pi_{}", Uuid::new_v4().simple()));
        updated.payment_status = PaymentStatus::Pending;

        let saved = self.store.update_booking(&updated, BookingVersion::of(&booking), None).await?;
        info!("💳 Payment intent asignado a la reserva {}", saved.id);
        Ok(saved)
    }

    /// Pago confirmado (webhook o propietario). Repetirlo no tiene efecto.
    pub async fn record_payment_success(&self, booking: &Booking) -> AppResult<Booking> {
        if booking.payment_status == PaymentStatus::Paid {
            debug!("💳 Pago de la reserva {} ya registrado", booking.id);
            return Ok(booking.clone());
        }
        self.apply(booking, BookingAction::PaymentSucceeded).await
    }

    /// Pago fallido: solo cambia payment_status
    pub async fn mark_payment_failed(&self, booking: &Booking) -> AppResult<Booking> {
        if booking.payment_status != PaymentStatus::Pending {
            debug!(
                "💳 Fallo de pago ignorado para la reserva {} (pago {})",
                booking.id,
                booking.payment_status.as_str()
            );
            return Ok(booking.clone());
        }

        let mut updated = booking.clone();
        updated.payment_status = PaymentStatus::Failed;
        let saved = self.store.update_booking(&updated, BookingVersion::of(booking), None).await?;
        info!("💳 Pago fallido para la reserva {}", saved.id);
        Ok(saved)
    }

    /// Cancelación por parte del cliente
    pub async fn cancel(&self, customer_id: Uuid, booking_id: Uuid) -> AppResult<Booking> {
        let booking = self.load_for(Actor::Customer(customer_id), booking_id).await?;
        self.apply(&booking, BookingAction::Cancel).await
    }

    /// Acciones del propietario sobre los alquileres de sus coches
    pub async fn owner_action(&self, owner_id: Uuid, booking_id: Uuid, action: BookingAction) -> AppResult<Booking> {
        let booking = self.load_for(Actor::Owner(owner_id), booking_id).await?;
        match action {
            BookingAction::PaymentSucceeded => self.record_payment_success(&booking).await,
            BookingAction::Cancel => Err(forbidden_error("cancel a booking", "owners reject bookings instead")),
            _ => self.apply(&booking, action).await,
        }
    }

    /// Cambiar las fechas de una reserva pending
    pub async fn reschedule(
        &self,
        customer_id: Uuid,
        booking_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        today: NaiveDate,
    ) -> AppResult<Booking> {
        let booking = self.load_for(Actor::Customer(customer_id), booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "Cannot reschedule a booking that is {}",
                booking.status
            )));
        }

        validate_date_order(start_date, end_date)?;
        Self::ensure_not_in_past(start_date, today)?;

        let car = self.bookable_car(booking.car_id).await?;
        let completed = self.store.count_completed_bookings(customer_id).await?;
        let quote = self.pricing.quote(start_date, end_date, car.daily_rate, completed)?;

        let mut updated = booking.clone();
        updated.apply_quote(start_date, end_date, &quote);
        let saved = self.store.reschedule_if_available(&updated).await?;

        info!(
            "📅 Reserva {} reprogramada a [{} - {})",
            saved.id, saved.start_date, saved.end_date
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory_store::InMemoryBookingStore;
    use crate::services::test_support::{booking_between, date, sample_car};
    use rust_decimal::Decimal;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    struct Fixture {
        store: Arc<InMemoryBookingStore>,
        service: BookingLifecycleService,
        outbox: UnboundedReceiver<BookingNotification>,
        car: Car,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryBookingStore::new());
        let car = sample_car(Uuid::new_v4());
        store.insert_car(car.clone()).await;

        let (tx, outbox) = mpsc::unbounded_channel();
        let service = BookingLifecycleService::new(
            store.clone(),
            PricingPolicy::default(),
            NotificationService::new(None).with_outbox(tx),
        );
        Fixture { store, service, outbox, car }
    }

    fn draft(car_id: Uuid, start: NaiveDate, end: NaiveDate) -> BookingDraft {
        BookingDraft {
            car_id,
            start_date: start,
            end_date: end,
            pickup_location: None,
            dropoff_location: None,
            special_requests: None,
        }
    }

    fn today() -> NaiveDate {
        date(5, 1)
    }

    async fn car_available(store: &InMemoryBookingStore, car_id: Uuid) -> bool {
        store.find_car(car_id).await.unwrap().unwrap().is_available
    }

    #[tokio::test]
    async fn test_create_booking_prices_and_notifies_owner() {
        let mut fx = fixture().await;
        let customer = Uuid::new_v4();

        let booking = fx
            .service
            .create_booking(customer, draft(fx.car.id, date(6, 1), date(6, 11)), today())
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert_eq!(booking.total_days, 10);
        assert_eq!(booking.total_amount, Decimal::new(500, 0));
        assert_eq!(booking.discount_amount, Decimal::new(50, 0));
        assert_eq!(booking.pickup_location, "Airport");
        // pending no ocupa el coche
        assert!(car_available(&fx.store, fx.car.id).await);

        let sent = fx.outbox.recv().await.unwrap();
        assert_eq!(sent.event, BookingEvent::Created);
        assert_eq!(sent.recipient_id, fx.car.owner_id);
    }

    #[tokio::test]
    async fn test_create_booking_validation() {
        let fx = fixture().await;
        let customer = Uuid::new_v4();

        let past = fx
            .service
            .create_booking(customer, draft(fx.car.id, date(4, 20), date(4, 25)), today())
            .await;
        assert!(matches!(past, Err(AppError::ValidationError(_))));

        let inverted = fx
            .service
            .create_booking(customer, draft(fx.car.id, date(6, 5), date(6, 1)), today())
            .await;
        assert!(matches!(inverted, Err(AppError::ValidationError(_))));

        let unknown = fx
            .service
            .create_booking(customer, draft(Uuid::new_v4(), date(6, 1), date(6, 3)), today())
            .await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_overlapping_booking_is_a_conflict() {
        let fx = fixture().await;
        fx.service
            .create_booking(Uuid::new_v4(), draft(fx.car.id, date(6, 5), date(6, 10)), today())
            .await
            .unwrap();

        let overlap = fx
            .service
            .create_booking(Uuid::new_v4(), draft(fx.car.id, date(6, 8), date(6, 12)), today())
            .await;
        assert!(matches!(overlap, Err(AppError::Conflict(_))));

        let back_to_back = fx
            .service
            .create_booking(Uuid::new_v4(), draft(fx.car.id, date(6, 10), date(6, 12)), today())
            .await;
        assert!(back_to_back.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_creates_only_one_wins() {
        let fx = fixture().await;
        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = fx.service.clone();
            let car_id = fx.car.id;
            handles.push(tokio::spawn(async move {
                service
                    .create_booking(Uuid::new_v4(), draft(car_id, date(7, 1), date(7, 5)), today())
                    .await
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AppError::Conflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn test_approve_occupies_car_and_notifies_customer() {
        let mut fx = fixture().await;
        let customer = Uuid::new_v4();
        let booking = fx
            .service
            .create_booking(customer, draft(fx.car.id, date(6, 1), date(6, 3)), today())
            .await
            .unwrap();
        let _created = fx.outbox.recv().await.unwrap();

        let confirmed = fx
            .service
            .owner_action(fx.car.owner_id, booking.id, BookingAction::Approve)
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert!(!car_available(&fx.store, fx.car.id).await);

        let sent = fx.outbox.recv().await.unwrap();
        assert_eq!(sent.event, BookingEvent::Confirmed);
        assert_eq!(sent.recipient_id, customer);
    }

    #[tokio::test]
    async fn test_other_owner_cannot_see_booking() {
        let fx = fixture().await;
        let booking = fx
            .service
            .create_booking(Uuid::new_v4(), draft(fx.car.id, date(6, 1), date(6, 3)), today())
            .await
            .unwrap();

        let result = fx
            .service
            .owner_action(Uuid::new_v4(), booking.id, BookingAction::Approve)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = fx.service.cancel(Uuid::new_v4(), booking.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_full_lifecycle_with_payment_on_return() {
        let fx = fixture().await;
        let customer = Uuid::new_v4();
        let owner = fx.car.owner_id;
        let booking = fx
            .service
            .create_booking(customer, draft(fx.car.id, date(6, 1), date(6, 4)), today())
            .await
            .unwrap();

        fx.service.owner_action(owner, booking.id, BookingAction::Approve).await.unwrap();
        let active = fx.service.owner_action(owner, booking.id, BookingAction::Start).await.unwrap();
        assert_eq!(active.status, BookingStatus::Active);
        assert!(!car_available(&fx.store, fx.car.id).await);

        let done = fx.service.owner_action(owner, booking.id, BookingAction::Complete).await.unwrap();
        assert_eq!(done.status, BookingStatus::Completed);
        assert_eq!(done.payment_status, PaymentStatus::Paid);
        assert!(car_available(&fx.store, fx.car.id).await);

        let payment = fx.store.find_payment(booking.id).await.unwrap().unwrap();
        assert_eq!(payment.payment_method, METHOD_ON_RETURN);
        assert_eq!(payment.amount, booking.amount_due());
    }

    #[tokio::test]
    async fn test_illegal_transitions_leave_state_untouched() {
        let fx = fixture().await;
        let owner = fx.car.owner_id;
        let booking = fx
            .service
            .create_booking(Uuid::new_v4(), draft(fx.car.id, date(6, 1), date(6, 4)), today())
            .await
            .unwrap();

        let start = fx.service.owner_action(owner, booking.id, BookingAction::Start).await;
        assert!(matches!(start, Err(AppError::InvalidTransition(_))));

        fx.service.owner_action(owner, booking.id, BookingAction::Reject).await.unwrap();
        let approve = fx.service.owner_action(owner, booking.id, BookingAction::Approve).await;
        assert!(matches!(approve, Err(AppError::InvalidTransition(_))));

        let stored = fx.store.find_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Rejected);
    }

    #[tokio::test]
    async fn test_stale_write_loses_compare_and_set() {
        let fx = fixture().await;
        let booking = fx
            .service
            .create_booking(Uuid::new_v4(), draft(fx.car.id, date(6, 1), date(6, 4)), today())
            .await
            .unwrap();

        fx.service.apply(&booking, BookingAction::Approve).await.unwrap();
        // copia vieja aún en pending
        let stale = fx.service.apply(&booking, BookingAction::Reject).await;
        assert!(matches!(stale, Err(AppError::InvalidTransition(_))));

        let stored = fx.store.find_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_payment_on_confirmed_booking_invalidates_stale_copies() {
        let fx = fixture().await;
        let booking = fx
            .service
            .create_booking(Uuid::new_v4(), draft(fx.car.id, date(6, 1), date(6, 4)), today())
            .await
            .unwrap();

        let confirmed = fx.service.apply(&booking, BookingAction::Approve).await.unwrap();
        let paid = fx.service.record_payment_success(&confirmed).await.unwrap();
        assert_eq!(paid.status, BookingStatus::Confirmed);
        assert_eq!(paid.payment_status, PaymentStatus::Paid);

        // copias leídas antes del pago: el estado coincide pero el pago no
        for action in [BookingAction::Cancel, BookingAction::Start] {
            let stale = fx.service.apply(&confirmed, action).await;
            assert!(matches!(stale, Err(AppError::InvalidTransition(_))), "{:?}", action);
        }

        let stored = fx.store.find_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
        assert_eq!(stored.payment_status, PaymentStatus::Paid);

        // releyendo, la cancelación sí reembolsa
        let cancelled = fx.service.apply(&stored, BookingAction::Cancel).await.unwrap();
        assert_eq!(cancelled.payment_status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn test_cancel_paid_booking_refunds() {
        let mut fx = fixture().await;
        let customer = Uuid::new_v4();
        let booking = fx
            .service
            .create_booking(customer, draft(fx.car.id, date(6, 1), date(6, 4)), today())
            .await
            .unwrap();

        let booking = fx.service.start_payment(customer, booking.id).await.unwrap();
        assert!(booking.payment_intent_id.as_deref().unwrap().starts_with("pi_"));

        let paid = fx.service.record_payment_success(&booking).await.unwrap();
        assert_eq!(paid.status, BookingStatus::Confirmed);
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert!(!car_available(&fx.store, fx.car.id).await);

        let cancelled = fx.service.cancel(customer, booking.id).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.payment_status, PaymentStatus::Refunded);
        assert!(car_available(&fx.store, fx.car.id).await);

        let payment = fx.store.find_payment(booking.id).await.unwrap().unwrap();
        assert_eq!(payment.refund_amount, booking.amount_due());
        assert!(payment.refunded_at.is_some());

        let events: Vec<BookingEvent> = std::iter::from_fn(|| fx.outbox.try_recv().ok())
            .map(|n| n.event)
            .collect();
        assert_eq!(
            events,
            vec![BookingEvent::Created, BookingEvent::Confirmed, BookingEvent::Cancelled]
        );
    }

    #[tokio::test]
    async fn test_cancel_unpaid_keeps_payment_pending() {
        let fx = fixture().await;
        let customer = Uuid::new_v4();
        let booking = fx
            .service
            .create_booking(customer, draft(fx.car.id, date(6, 1), date(6, 4)), today())
            .await
            .unwrap();

        let cancelled = fx.service.cancel(customer, booking.id).await.unwrap();
        assert_eq!(cancelled.payment_status, PaymentStatus::Pending);

        let again = fx.service.cancel(customer, booking.id).await;
        assert!(matches!(again, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_duplicate_payment_success_is_a_no_op() {
        let fx = fixture().await;
        let customer = Uuid::new_v4();
        let booking = fx
            .service
            .create_booking(customer, draft(fx.car.id, date(6, 1), date(6, 4)), today())
            .await
            .unwrap();

        let paid = fx.service.record_payment_success(&booking).await.unwrap();
        let again = fx.service.record_payment_success(&paid).await.unwrap();
        assert_eq!(again.status, BookingStatus::Confirmed);
        assert_eq!(again.updated_at, paid.updated_at);
    }

    #[tokio::test]
    async fn test_payment_on_confirmed_booking_keeps_status() {
        let fx = fixture().await;
        let booking = fx
            .service
            .create_booking(Uuid::new_v4(), draft(fx.car.id, date(6, 1), date(6, 4)), today())
            .await
            .unwrap();
        let confirmed = fx
            .service
            .owner_action(fx.car.owner_id, booking.id, BookingAction::Approve)
            .await
            .unwrap();

        let paid = fx
            .service
            .owner_action(fx.car.owner_id, confirmed.id, BookingAction::PaymentSucceeded)
            .await
            .unwrap();
        assert_eq!(paid.status, BookingStatus::Confirmed);
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_failed_payment_can_be_retried() {
        let fx = fixture().await;
        let customer = Uuid::new_v4();
        let booking = fx
            .service
            .create_booking(customer, draft(fx.car.id, date(6, 1), date(6, 4)), today())
            .await
            .unwrap();
        let booking = fx.service.start_payment(customer, booking.id).await.unwrap();
        let first_intent = booking.payment_intent_id.clone();

        let failed = fx.service.mark_payment_failed(&booking).await.unwrap();
        assert_eq!(failed.payment_status, PaymentStatus::Failed);
        assert_eq!(failed.status, BookingStatus::Pending);

        let retried = fx.service.start_payment(customer, booking.id).await.unwrap();
        assert_eq!(retried.payment_status, PaymentStatus::Pending);
        assert_ne!(retried.payment_intent_id, first_intent);
    }

    #[tokio::test]
    async fn test_reschedule_pending_booking() {
        let fx = fixture().await;
        let customer = Uuid::new_v4();
        let booking = fx
            .service
            .create_booking(customer, draft(fx.car.id, date(6, 1), date(6, 3)), today())
            .await
            .unwrap();
        fx.service
            .create_booking(Uuid::new_v4(), draft(fx.car.id, date(6, 10), date(6, 15)), today())
            .await
            .unwrap();

        // se solapa consigo misma pero no cuenta
        let moved = fx
            .service
            .reschedule(customer, booking.id, date(6, 2), date(6, 9), today())
            .await
            .unwrap();
        assert_eq!(moved.total_days, 7);
        assert_eq!(moved.total_amount, Decimal::new(350, 0));
        assert_eq!(moved.discount_amount, Decimal::new(35, 0));

        let clash = fx
            .service
            .reschedule(customer, booking.id, date(6, 8), date(6, 12), today())
            .await;
        assert!(matches!(clash, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_reschedule_requires_pending() {
        let fx = fixture().await;
        let customer = Uuid::new_v4();
        let booking = fx
            .service
            .create_booking(customer, draft(fx.car.id, date(6, 1), date(6, 3)), today())
            .await
            .unwrap();
        fx.service
            .owner_action(fx.car.owner_id, booking.id, BookingAction::Approve)
            .await
            .unwrap();

        let result = fx
            .service
            .reschedule(customer, booking.id, date(6, 5), date(6, 7), today())
            .await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_owner_cannot_cancel() {
        let fx = fixture().await;
        let booking = booking_between(fx.car.id, date(6, 1), date(6, 3), BookingStatus::Pending);
        fx.store.insert_booking(booking.clone()).await;

        let result = fx
            .service
            .owner_action(fx.car.owner_id, booking.id, BookingAction::Cancel)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
