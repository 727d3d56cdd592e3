//! Servicio de disponibilidad
//!
//! Responde si un coche puede reservarse en un rango de fechas. Los rangos
//! son semiabiertos [start, end), así que una reserva puede empezar el
//! mismo día en que termina otra.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Car, PriceQuote};
use crate::repositories::booking_store::BookingStore;
use crate::services::pricing_service::PricingPolicy;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::validation::validate_date_order;

/// ¿Alguna reserva bloqueante se solapa con [start, end)?
pub fn has_conflict<'a, I>(bookings: I, start_date: NaiveDate, end_date: NaiveDate, exclude: Option<Uuid>) -> bool
where
    I: IntoIterator<Item = &'a Booking>,
{
    bookings.into_iter().any(|booking| {
        booking.status.blocks_dates() && Some(booking.id) != exclude && booking.overlaps(start_date, end_date)
    })
}

/// Disponibilidad + precio para un rango concreto
#[derive(Debug, Clone)]
pub struct AvailabilityQuote {
    pub car: Car,
    pub available: bool,
    pub quote: PriceQuote,
}

#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn BookingStore>,
    pricing: PricingPolicy,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn BookingStore>, pricing: PricingPolicy) -> Self {
        Self { store, pricing }
    }

    /// Coche reservable: existe y está activo
    pub async fn bookable_car(&self, car_id: Uuid) -> AppResult<Car> {
        self.store
            .find_car(car_id)
            .await?
            .filter(|car| car.is_active)
            .ok_or_else(|| not_found_error("Car", &car_id.to_string()))
    }

    pub async fn is_available(
        &self,
        car_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        validate_date_order(start_date, end_date)?;
        self.bookable_car(car_id).await?;

        let bookings = self.store.bookings_for_car(car_id, &BookingStatus::BLOCKING).await?;
        let available = !has_conflict(&bookings, start_date, end_date, exclude);

        debug!(
            "📅 Disponibilidad coche {} [{} - {}): {}",
            car_id, start_date, end_date, available
        );
        Ok(available)
    }

    /// Disponibilidad y cotización para un cliente (la fidelidad depende
    /// de sus reservas completadas)
    pub async fn check_with_quote(
        &self,
        car_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        customer_id: Option<Uuid>,
    ) -> AppResult<AvailabilityQuote> {
        let available = self.is_available(car_id, start_date, end_date, None).await?;
        let car = self.bookable_car(car_id).await?;

        let completed = match customer_id {
            Some(id) => self.store.count_completed_bookings(id).await?,
            None => 0,
        };
        let quote = self.pricing.quote(start_date, end_date, car.daily_rate, completed)?;

        Ok(AvailabilityQuote { car, available, quote })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory_store::InMemoryBookingStore;
    use crate::services::test_support::{booking_between, date, sample_car};
    use crate::utils::errors::AppError;
    use rust_decimal::Decimal;

    #[test]
    fn test_touching_ranges_do_not_conflict() {
        let car_id = Uuid::new_v4();
        let existing = vec![booking_between(car_id, date(6, 5), date(6, 10), BookingStatus::Confirmed)];

        assert!(!has_conflict(&existing, date(6, 10), date(6, 12), None));
        assert!(!has_conflict(&existing, date(6, 1), date(6, 5), None));
        assert!(has_conflict(&existing, date(6, 9), date(6, 11), None));
        assert!(has_conflict(&existing, date(6, 1), date(6, 20), None));
    }

    #[test]
    fn test_non_blocking_statuses_are_ignored() {
        let car_id = Uuid::new_v4();
        let existing = vec![
            booking_between(car_id, date(6, 5), date(6, 10), BookingStatus::Cancelled),
            booking_between(car_id, date(6, 5), date(6, 10), BookingStatus::Rejected),
            booking_between(car_id, date(6, 5), date(6, 10), BookingStatus::Completed),
        ];
        assert!(!has_conflict(&existing, date(6, 6), date(6, 8), None));

        let pending = vec![booking_between(car_id, date(6, 5), date(6, 10), BookingStatus::Pending)];
        assert!(has_conflict(&pending, date(6, 6), date(6, 8), None));
    }

    #[test]
    fn test_excluded_booking_does_not_conflict_with_itself() {
        let car_id = Uuid::new_v4();
        let own = booking_between(car_id, date(6, 5), date(6, 10), BookingStatus::Pending);
        let own_id = own.id;
        assert!(!has_conflict(&[own], date(6, 6), date(6, 12), Some(own_id)));
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_cars_are_not_found() {
        let store = Arc::new(InMemoryBookingStore::new());
        let mut inactive = sample_car(Uuid::new_v4());
        inactive.is_active = false;
        let inactive_id = inactive.id;
        store.insert_car(inactive).await;

        let service = AvailabilityService::new(store, PricingPolicy::default());
        let unknown = service.is_available(Uuid::new_v4(), date(6, 1), date(6, 3), None).await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));

        let inactive = service.is_available(inactive_id, date(6, 1), date(6, 3), None).await;
        assert!(matches!(inactive, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_range_is_rejected() {
        let store = Arc::new(InMemoryBookingStore::new());
        let car = sample_car(Uuid::new_v4());
        let car_id = car.id;
        store.insert_car(car).await;

        let service = AvailabilityService::new(store, PricingPolicy::default());
        let result = service.is_available(car_id, date(6, 5), date(6, 5), None).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_quote_includes_loyalty() {
        let store = Arc::new(InMemoryBookingStore::new());
        let car = sample_car(Uuid::new_v4());
        let car_id = car.id;
        store.insert_car(car).await;

        let customer_id = Uuid::new_v4();
        for month in 1..=5 {
            let mut done = booking_between(car_id, date(month, 1), date(month, 3), BookingStatus::Completed);
            done.customer_id = customer_id;
            store.insert_booking(done).await;
        }

        let service = AvailabilityService::new(store, PricingPolicy::default());
        let result = service
            .check_with_quote(car_id, date(7, 1), date(7, 8), Some(customer_id))
            .await
            .unwrap();

        assert!(result.available);
        assert_eq!(result.quote.discount_percent, Decimal::new(15, 0));
        assert_eq!(result.quote.total_amount, Decimal::new(350, 0));
    }
}
