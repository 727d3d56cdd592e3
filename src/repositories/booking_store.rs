//! Puerto de persistencia del motor de reservas
//!
//! El motor (disponibilidad, ciclo de vida, sincronizador) solo habla con
//! este trait. Existe una implementación PostgreSQL y otra en memoria.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use std::fmt;

use crate::models::{Booking, BookingStatus, Car, NewBooking, Payment, PaymentStatus};
use crate::utils::errors::AppResult;

/// Escritura de pago que acompaña a un cambio de estado
#[derive(Debug, Clone)]
pub enum PaymentWrite {
    /// Crear (o reemplazar) el pago de la reserva
    Record(Payment),
    /// Marcar el pago existente como reembolsado
    Refund {
        amount: Decimal,
        refunded_at: DateTime<Utc>,
    },
}

/// Estado observado de una reserva al leerla. El compare-and-set compara
/// ambos campos: un pago sobre una reserva confirmed no cambia `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingVersion {
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
}

impl BookingVersion {
    pub fn of(booking: &Booking) -> Self {
        Self {
            status: booking.status,
            payment_status: booking.payment_status,
        }
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        booking.status == self.status && booking.payment_status == self.payment_status
    }
}

impl fmt::Display for BookingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (pago {})", self.status, self.payment_status.as_str())
    }
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_car(&self, car_id: Uuid) -> AppResult<Option<Car>>;

    async fn list_car_ids(&self) -> AppResult<Vec<Uuid>>;

    /// Devuelve true si el flag cambió
    async fn set_car_availability(&self, car_id: Uuid, is_available: bool) -> AppResult<bool>;

    async fn find_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>>;

    async fn find_booking_by_payment_intent(&self, payment_intent_id: &str) -> AppResult<Option<Booking>>;

    async fn bookings_for_car(&self, car_id: Uuid, statuses: &[BookingStatus]) -> AppResult<Vec<Booking>>;

    async fn count_completed_bookings(&self, customer_id: Uuid) -> AppResult<i64>;

    /// Reservas confirmed cuya fecha de inicio ya llegó
    async fn find_due_for_activation(&self, today: NaiveDate) -> AppResult<Vec<Booking>>;

    /// Reservas active cuya fecha de fin ya pasó
    async fn find_due_for_completion(&self, today: NaiveDate) -> AppResult<Vec<Booking>>;

    /// Comprobación de disponibilidad + inserción como una unidad atómica.
    /// Devuelve Conflict si el rango se solapa con una reserva bloqueante.
    async fn insert_if_available(&self, new_booking: NewBooking) -> AppResult<Booking>;

    /// Persistir nuevas fechas y totales de una reserva pending, revalidando
    /// la disponibilidad (excluyéndose a sí misma) en la misma unidad atómica.
    async fn reschedule_if_available(&self, booking: &Booking) -> AppResult<Booking>;

    /// Compare-and-set: solo escribe si la reserva sigue en `expected`
    /// (estado y estado de pago). Si otro escritor se adelantó devuelve
    /// InvalidTransition.
    async fn update_booking(
        &self,
        booking: &Booking,
        expected: BookingVersion,
        payment: Option<PaymentWrite>,
    ) -> AppResult<Booking>;

    async fn find_payment(&self, booking_id: Uuid) -> AppResult<Option<Payment>>;
}
