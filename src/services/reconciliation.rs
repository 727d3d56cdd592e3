//! Job de reconciliación
//!
//! Avanza las reservas según la fecha (confirmed → active al llegar el día
//! de inicio, active → completed pasada la fecha de fin) y después repasa
//! el flag de disponibilidad de todos los coches. Ejecutarlo dos veces con
//! la misma fecha no cambia nada la segunda vez.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::models::{Booking, BookingAction};
use crate::services::booking_lifecycle::BookingLifecycleService;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub activated: usize,
    pub completed: usize,
    /// Reservas que otro escritor movió antes que nosotros
    pub skipped: usize,
    pub failed: usize,
    pub cars_checked: usize,
    pub cars_updated: usize,
}

#[derive(Default)]
struct Tally {
    applied: usize,
    skipped: usize,
    failed: usize,
}

#[derive(Clone)]
pub struct ReconciliationJob {
    lifecycle: BookingLifecycleService,
}

impl ReconciliationJob {
    pub fn new(lifecycle: BookingLifecycleService) -> Self {
        Self { lifecycle }
    }

    async fn advance(&self, due: Vec<Booking>, action: BookingAction) -> Tally {
        let mut tally = Tally::default();
        for booking in due {
            match self.lifecycle.apply(&booking, action).await {
                Ok(_) => tally.applied += 1,
                Err(AppError::InvalidTransition(msg)) => {
                    debug!("⏭️ Reserva {} omitida: {}", booking.id, msg);
                    tally.skipped += 1;
                }
                Err(e) => {
                    error!("❌ Error aplicando {} a la reserva {}: {}", action, booking.id, e);
                    tally.failed += 1;
                }
            }
        }
        tally
    }

    pub async fn run(&self, today: NaiveDate) -> AppResult<ReconcileReport> {
        let store = self.lifecycle.store();

        // Primero activar: una reserva confirmed ya vencida pasa a active y
        // en la fase siguiente a completed, en la misma pasada
        let to_activate = store.find_due_for_activation(today).await?;
        let activation = self.advance(to_activate, BookingAction::Start).await;

        let to_complete = store.find_due_for_completion(today).await?;
        let completion = self.advance(to_complete, BookingAction::Complete).await;

        let sweep = self.lifecycle.synchronizer().sync_all().await?;

        let report = ReconcileReport {
            activated: activation.applied,
            completed: completion.applied,
            skipped: activation.skipped + completion.skipped,
            failed: activation.failed + completion.failed + sweep.failures,
            cars_checked: sweep.cars_checked,
            cars_updated: sweep.cars_updated,
        };

        info!(
            "🧹 Reconciliación {}: {} activadas, {} completadas, {} coches actualizados",
            today, report.activated, report.completed, report.cars_updated
        );
        Ok(report)
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
    use uuid::Uuid;

    async fn job_with_store() -> (ReconciliationJob, Arc<InMemoryBookingStore>, Uuid) {
        let store = Arc::new(InMemoryBookingStore::new());
        let car = sample_car(Uuid::new_v4());
        let car_id = car.id;
        store.insert_car(car).await;

        let lifecycle = BookingLifecycleService::new(
            store.clone(),
            PricingPolicy::default(),
            NotificationService::new(None),
        );
        (ReconciliationJob::new(lifecycle), store, car_id)
    }

    #[tokio::test]
    async fn test_activates_and_completes_by_date() {
        let (job, store, car_id) = job_with_store().await;
        let starting = booking_between(car_id, date(6, 10), date(6, 14), BookingStatus::Confirmed);
        let ending = booking_between(car_id, date(6, 1), date(6, 9), BookingStatus::Active);
        let future = booking_between(car_id, date(7, 1), date(7, 5), BookingStatus::Confirmed);
        for b in [&starting, &ending, &future] {
            store.insert_booking(b.clone()).await;
        }

        let report = job.run(date(6, 10)).await.unwrap();
        assert_eq!(report.activated, 1);
        assert_eq!(report.completed, 1);
        assert_eq!(report.failed, 0);

        let starting = store.find_booking(starting.id).await.unwrap().unwrap();
        assert_eq!(starting.status, BookingStatus::Active);
        let ending = store.find_booking(ending.id).await.unwrap().unwrap();
        assert_eq!(ending.status, BookingStatus::Completed);
        assert_eq!(ending.payment_status, PaymentStatus::Paid);
        let future = store.find_booking(future.id).await.unwrap().unwrap();
        assert_eq!(future.status, BookingStatus::Confirmed);

        assert!(!store.find_car(car_id).await.unwrap().unwrap().is_available);
    }

    #[tokio::test]
    async fn test_stale_confirmed_booking_finishes_in_one_pass() {
        let (job, store, car_id) = job_with_store().await;
        let stale = booking_between(car_id, date(6, 1), date(6, 5), BookingStatus::Confirmed);
        store.insert_booking(stale.clone()).await;

        let report = job.run(date(6, 20)).await.unwrap();
        assert_eq!(report.activated, 1);
        assert_eq!(report.completed, 1);

        let stale = store.find_booking(stale.id).await.unwrap().unwrap();
        assert_eq!(stale.status, BookingStatus::Completed);
        assert!(store.find_car(car_id).await.unwrap().unwrap().is_available);
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let (job, store, car_id) = job_with_store().await;
        store
            .insert_booking(booking_between(car_id, date(6, 1), date(6, 5), BookingStatus::Confirmed))
            .await;
        store
            .insert_booking(booking_between(car_id, date(6, 3), date(6, 8), BookingStatus::Active))
            .await;

        job.run(date(6, 4)).await.unwrap();
        let before = store.bookings().await;

        let report = job.run(date(6, 4)).await.unwrap();
        assert_eq!(report.activated, 0);
        assert_eq!(report.completed, 0);
        assert_eq!(report.cars_updated, 0);

        let mut after = store.bookings().await;
        let mut before = before;
        before.sort_by_key(|b| b.id);
        after.sort_by_key(|b| b.id);
        let statuses = |v: &[Booking]| v.iter().map(|b| (b.id, b.status)).collect::<Vec<_>>();
        assert_eq!(statuses(&before), statuses(&after));
    }
}
