//! Implementación en memoria del BookingStore
//!
//! Un único Mutex serializa todas las operaciones, así que la comprobación
//! de disponibilidad y la inserción son atómicas igual que en PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Car, NewBooking, Payment};
use crate::repositories::booking_store::{BookingStore, BookingVersion, PaymentWrite};
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Default)]
struct Tables {
    cars: HashMap<Uuid, Car>,
    bookings: HashMap<Uuid, Booking>,
    payments: HashMap<Uuid, Payment>,
}

impl Tables {
    fn active_car(&self, car_id: Uuid) -> AppResult<&Car> {
        self.cars
            .get(&car_id)
            .filter(|car| car.is_active)
            .ok_or_else(|| not_found_error("Car", &car_id.to_string()))
    }

    fn has_overlap(&self, car_id: Uuid, start_date: NaiveDate, end_date: NaiveDate, exclude: Option<Uuid>) -> bool {
        self.bookings.values().any(|b| {
            b.car_id == car_id
                && b.status.blocks_dates()
                && Some(b.id) != exclude
                && b.overlaps(start_date, end_date)
        })
    }
}

#[derive(Default)]
pub struct InMemoryBookingStore {
    tables: Mutex<Tables>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_car(&self, car: Car) {
        self.tables.lock().await.cars.insert(car.id, car);
    }

    /// Insertar una reserva tal cual, sin comprobar disponibilidad
    pub async fn insert_booking(&self, booking: Booking) {
        self.tables.lock().await.bookings.insert(booking.id, booking);
    }

    pub async fn bookings(&self) -> Vec<Booking> {
        self.tables.lock().await.bookings.values().cloned().collect()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn find_car(&self, car_id: Uuid) -> AppResult<Option<Car>> {
        Ok(self.tables.lock().await.cars.get(&car_id).cloned())
    }

    async fn list_car_ids(&self) -> AppResult<Vec<Uuid>> {
        Ok(self.tables.lock().await.cars.keys().copied().collect())
    }

    async fn set_car_availability(&self, car_id: Uuid, is_available: bool) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        match tables.cars.get_mut(&car_id) {
            Some(car) if car.is_available != is_available => {
                car.is_available = is_available;
                car.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.tables.lock().await.bookings.get(&booking_id).cloned())
    }

    async fn find_booking_by_payment_intent(&self, payment_intent_id: &str) -> AppResult<Option<Booking>> {
        Ok(self
            .tables
            .lock()
            .await
            .bookings
            .values()
            .find(|b| b.payment_intent_id.as_deref() == Some(payment_intent_id))
            .cloned())
    }

    async fn bookings_for_car(&self, car_id: Uuid, statuses: &[BookingStatus]) -> AppResult<Vec<Booking>> {
        let tables = self.tables.lock().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| b.car_id == car_id && statuses.contains(&b.status))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.start_date);
        Ok(bookings)
    }

    async fn count_completed_bookings(&self, customer_id: Uuid) -> AppResult<i64> {
        let tables = self.tables.lock().await;
        let count = tables
            .bookings
            .values()
            .filter(|b| b.customer_id == customer_id && b.status == BookingStatus::Completed)
            .count();
        Ok(count as i64)
    }

    async fn find_due_for_activation(&self, today: NaiveDate) -> AppResult<Vec<Booking>> {
        let tables = self.tables.lock().await;
        let mut due: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| b.status == BookingStatus::Confirmed && b.start_date <= today)
            .cloned()
            .collect();
        due.sort_by_key(|b| b.start_date);
        Ok(due)
    }

    async fn find_due_for_completion(&self, today: NaiveDate) -> AppResult<Vec<Booking>> {
        let tables = self.tables.lock().await;
        let mut due: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| b.is_overdue(today))
            .cloned()
            .collect();
        due.sort_by_key(|b| b.end_date);
        Ok(due)
    }

    async fn insert_if_available(&self, new_booking: NewBooking) -> AppResult<Booking> {
        let mut tables = self.tables.lock().await;
        tables.active_car(new_booking.car_id)?;

        if tables.has_overlap(new_booking.car_id, new_booking.start_date, new_booking.end_date, None) {
            return Err(AppError::Conflict("Car is not available for the selected dates".to_string()));
        }

        let booking = new_booking.into_booking(Uuid::new_v4(), Utc::now());
        tables.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn reschedule_if_available(&self, booking: &Booking) -> AppResult<Booking> {
        let mut tables = self.tables.lock().await;
        tables.active_car(booking.car_id)?;

        if tables.has_overlap(booking.car_id, booking.start_date, booking.end_date, Some(booking.id)) {
            return Err(AppError::Conflict("Car is not available for the selected dates".to_string()));
        }

        let stored = tables
            .bookings
            .get_mut(&booking.id)
            .filter(|b| b.status == BookingStatus::Pending)
            .ok_or_else(|| AppError::InvalidTransition("Only pending bookings can be rescheduled".to_string()))?;

        stored.start_date = booking.start_date;
        stored.end_date = booking.end_date;
        stored.total_days = booking.total_days;
        stored.total_amount = booking.total_amount;
        stored.discount_amount = booking.discount_amount;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn update_booking(
        &self,
        booking: &Booking,
        expected: BookingVersion,
        payment: Option<PaymentWrite>,
    ) -> AppResult<Booking> {
        let mut tables = self.tables.lock().await;

        let stored = tables
            .bookings
            .get_mut(&booking.id)
            .filter(|b| expected.matches(b))
            .ok_or_else(|| AppError::InvalidTransition(format!("Booking {} is no longer {}", booking.id, expected)))?;

        stored.status = booking.status;
        stored.payment_status = booking.payment_status;
        stored.payment_intent_id = booking.payment_intent_id.clone();
        stored.updated_at = Utc::now();
        let saved = stored.clone();

        match payment {
            Some(PaymentWrite::Record(payment)) => {
                tables.payments.insert(payment.booking_id, payment);
            }
            Some(PaymentWrite::Refund { amount, refunded_at }) => {
                if let Some(existing) = tables.payments.get_mut(&booking.id) {
                    existing.refund_amount = amount;
                    existing.refunded_at = Some(refunded_at);
                }
            }
            None => {}
        }

        Ok(saved)
    }

    async fn find_payment(&self, booking_id: Uuid) -> AppResult<Option<Payment>> {
        Ok(self.tables.lock().await.payments.get(&booking_id).cloned())
    }
}
