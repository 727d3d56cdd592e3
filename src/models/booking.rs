//! Modelo de Booking
//!
//! Este módulo contiene el struct Booking, los enums cerrados de estado
//! y la tabla explícita de transiciones del ciclo de vida.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::models::pricing::PriceQuote;

/// Estado de la reserva - mapea al ENUM booking_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
    Rejected,
}

/// Estado del pago - mapea al ENUM payment_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
    PartiallyRefunded,
}

/// Acciones que mueven una reserva dentro del ciclo de vida
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Approve,
    Reject,
    PaymentSucceeded,
    Cancel,
    Start,
    Complete,
}

/// Tabla de transiciones válidas: (estado origen, acción) -> estado destino
const TRANSITIONS: &[(BookingStatus, BookingAction, BookingStatus)] = &[
    (BookingStatus::Pending, BookingAction::Approve, BookingStatus::Confirmed),
    (BookingStatus::Pending, BookingAction::Reject, BookingStatus::Rejected),
    (BookingStatus::Pending, BookingAction::PaymentSucceeded, BookingStatus::Confirmed),
    (BookingStatus::Confirmed, BookingAction::PaymentSucceeded, BookingStatus::Confirmed),
    (BookingStatus::Pending, BookingAction::Cancel, BookingStatus::Cancelled),
    (BookingStatus::Confirmed, BookingAction::Cancel, BookingStatus::Cancelled),
    (BookingStatus::Confirmed, BookingAction::Start, BookingStatus::Active),
    (BookingStatus::Active, BookingAction::Complete, BookingStatus::Completed),
];

impl BookingStatus {
    pub const ALL: [BookingStatus; 6] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Active,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::Rejected,
    ];

    /// Estados que bloquean el rango de fechas para nuevas reservas
    pub const BLOCKING: [BookingStatus; 3] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Active,
    ];

    /// Estados que marcan el coche como no disponible
    pub const OCCUPYING: [BookingStatus; 2] = [BookingStatus::Confirmed, BookingStatus::Active];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|status| status.as_str() == s)
    }

    /// Estado destino para una acción, o None si la tabla no la permite
    pub fn transition(self, action: BookingAction) -> Option<BookingStatus> {
        TRANSITIONS
            .iter()
            .find(|(from, candidate, _)| *from == self && *candidate == action)
            .map(|(_, _, to)| *to)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Rejected
        )
    }

    pub fn blocks_dates(self) -> bool {
        Self::BLOCKING.contains(&self)
    }

    pub fn occupies_car(self) -> bool {
        Self::OCCUPYING.contains(&self)
    }

    pub fn can_be_cancelled(self) -> bool {
        self.transition(BookingAction::Cancel).is_some()
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::PartiallyRefunded => "partially_refunded",
        }
    }
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Approve => "approve",
            BookingAction::Reject => "reject",
            BookingAction::PaymentSucceeded => "payment_succeeded",
            BookingAction::Cancel => "cancel",
            BookingAction::Start => "start",
            BookingAction::Complete => "complete",
        }
    }

    /// Acciones que un propietario puede ejecutar sobre sus alquileres
    pub fn from_owner_action(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(BookingAction::Approve),
            "reject" => Some(BookingAction::Reject),
            "start" => Some(BookingAction::Start),
            "complete" => Some(BookingAction::Complete),
            "mark_paid" => Some(BookingAction::PaymentSucceeded),
            _ => None,
        }
    }
}

impl std::fmt::Display for BookingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking principal - mapea exactamente a la tabla bookings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub car_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub pickup_location: String,
    pub dropoff_location: Option<String>,
    pub special_requests: Option<String>,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Importe a cobrar tras aplicar el descuento
    pub fn amount_due(&self) -> Decimal {
        self.total_amount - self.discount_amount
    }

    /// Intervalo semiabierto [start, end): permite reservas consecutivas
    pub fn overlaps(&self, start_date: NaiveDate, end_date: NaiveDate) -> bool {
        self.start_date < end_date && self.end_date > start_date
    }

    pub fn days_until_start(&self, today: NaiveDate) -> i64 {
        if self.start_date > today {
            (self.start_date - today).num_days()
        } else {
            0
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == BookingStatus::Active && self.end_date < today
    }

    /// Recalcular los campos derivados a partir de una cotización
    pub fn apply_quote(&mut self, start_date: NaiveDate, end_date: NaiveDate, quote: &PriceQuote) {
        self.start_date = start_date;
        self.end_date = end_date;
        self.total_days = quote.total_days;
        self.total_amount = quote.total_amount;
        self.discount_amount = quote.discount;
    }
}

/// Datos para insertar una reserva nueva (siempre en pending)
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_id: Uuid,
    pub car_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub quote: PriceQuote,
    pub pickup_location: String,
    pub dropoff_location: Option<String>,
    pub special_requests: Option<String>,
}

impl NewBooking {
    pub fn into_booking(self, id: Uuid, now: DateTime<Utc>) -> Booking {
        Booking {
            id,
            customer_id: self.customer_id,
            car_id: self.car_id,
            start_date: self.start_date,
            end_date: self.end_date,
            total_days: self.quote.total_days,
            total_amount: self.quote.total_amount,
            discount_amount: self.quote.discount,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            pickup_location: self.pickup_location,
            dropoff_location: self.dropoff_location,
            special_requests: self.special_requests,
            payment_intent_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn booking(start: NaiveDate, end: NaiveDate, status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            car_id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
            total_days: (end - start).num_days() as i32,
            total_amount: Decimal::new(400, 0),
            discount_amount: Decimal::new(20, 0),
            status,
            payment_status: PaymentStatus::Pending,
            pickup_location: "Airport".to_string(),
            dropoff_location: None,
            special_requests: None,
            payment_intent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        let status = BookingStatus::Pending;
        let status = status.transition(BookingAction::Approve).unwrap();
        assert_eq!(status, BookingStatus::Confirmed);
        let status = status.transition(BookingAction::Start).unwrap();
        assert_eq!(status, BookingStatus::Active);
        let status = status.transition(BookingAction::Complete).unwrap();
        assert_eq!(status, BookingStatus::Completed);
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        let actions = [
            BookingAction::Approve,
            BookingAction::Reject,
            BookingAction::PaymentSucceeded,
            BookingAction::Cancel,
            BookingAction::Start,
            BookingAction::Complete,
        ];
        for status in BookingStatus::ALL.iter().filter(|s| s.is_terminal()) {
            for action in actions {
                assert_eq!(status.transition(action), None, "{} + {}", status, action);
            }
        }
    }

    #[test]
    fn test_illegal_transitions() {
        assert_eq!(BookingStatus::Pending.transition(BookingAction::Start), None);
        assert_eq!(BookingStatus::Confirmed.transition(BookingAction::Reject), None);
        assert_eq!(BookingStatus::Active.transition(BookingAction::Cancel), None);
        assert_eq!(BookingStatus::Pending.transition(BookingAction::Complete), None);
    }

    #[test]
    fn test_payment_success_from_pending_and_confirmed() {
        assert_eq!(
            BookingStatus::Pending.transition(BookingAction::PaymentSucceeded),
            Some(BookingStatus::Confirmed)
        );
        assert_eq!(
            BookingStatus::Confirmed.transition(BookingAction::PaymentSucceeded),
            Some(BookingStatus::Confirmed)
        );
        assert_eq!(BookingStatus::Active.transition(BookingAction::PaymentSucceeded), None);
    }

    #[test]
    fn test_can_be_cancelled() {
        assert!(BookingStatus::Pending.can_be_cancelled());
        assert!(BookingStatus::Confirmed.can_be_cancelled());
        assert!(!BookingStatus::Active.can_be_cancelled());
        assert!(!BookingStatus::Completed.can_be_cancelled());
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in BookingStatus::ALL {
            assert_eq!(BookingStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::from_str("archived"), None);
    }

    #[test]
    fn test_owner_actions() {
        assert_eq!(BookingAction::from_owner_action("approve"), Some(BookingAction::Approve));
        assert_eq!(BookingAction::from_owner_action("complete"), Some(BookingAction::Complete));
        assert_eq!(BookingAction::from_owner_action("cancel"), None);
        assert_eq!(
            BookingAction::from_owner_action("mark_paid"),
            Some(BookingAction::PaymentSucceeded)
        );
        assert_eq!(BookingAction::from_owner_action("payment_succeeded"), None);
    }

    #[test]
    fn test_half_open_overlap() {
        let existing = booking(date(6, 3), date(6, 10), BookingStatus::Confirmed);
        assert!(existing.overlaps(date(6, 1), date(6, 5)));
        assert!(existing.overlaps(date(6, 9), date(6, 12)));
        assert!(existing.overlaps(date(6, 4), date(6, 6)));
        assert!(!existing.overlaps(date(6, 1), date(6, 3)));
        assert!(!existing.overlaps(date(6, 10), date(6, 15)));
    }

    #[test]
    fn test_derived_values() {
        let b = booking(date(6, 10), date(6, 14), BookingStatus::Active);
        assert_eq!(b.amount_due(), Decimal::new(380, 0));
        assert_eq!(b.days_until_start(date(6, 1)), 9);
        assert_eq!(b.days_until_start(date(6, 12)), 0);
        assert!(!b.is_overdue(date(6, 14)));
        assert!(b.is_overdue(date(6, 15)));
    }
}
