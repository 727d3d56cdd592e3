use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Booking, BookingStatus, PaymentStatus};
use crate::services::availability_service::AvailabilityQuote;
use crate::services::booking_lifecycle::BookingDraft;
use crate::utils::errors::{validation_error, AppResult};
use crate::utils::validation::parse_required_date;

// Query de disponibilidad: las fechas llegan como texto para devolver 400
// con un mensaje claro si faltan o están mal formadas
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl AvailabilityQuery {
    pub fn dates(&self) -> AppResult<(NaiveDate, NaiveDate)> {
        parse_date_pair(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

fn parse_date_pair(start: Option<&str>, end: Option<&str>) -> AppResult<(NaiveDate, NaiveDate)> {
    Ok((
        parse_required_date("start_date", start)?,
        parse_required_date("end_date", end)?,
    ))
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub car_id: Uuid,
    pub available: bool,
    pub total_days: i32,
    pub daily_rate: Decimal,
    pub total_amount: Decimal,
    pub discount: Decimal,
    pub discount_percent: Decimal,
    pub amount_due: Decimal,
}

impl From<AvailabilityQuote> for AvailabilityResponse {
    fn from(result: AvailabilityQuote) -> Self {
        Self {
            car_id: result.car.id,
            available: result.available,
            total_days: result.quote.total_days,
            daily_rate: result.quote.daily_rate,
            total_amount: result.quote.total_amount,
            discount: result.quote.discount,
            discount_percent: result.quote.discount_percent,
            amount_due: result.quote.amount_due(),
        }
    }
}

// Request para crear una reserva
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub car_id: Uuid,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[validate(length(max = 255))]
    pub pickup_location: Option<String>,
    #[validate(length(max = 255))]
    pub dropoff_location: Option<String>,
    #[validate(length(max = 1000))]
    pub special_requests: Option<String>,
}

impl CreateBookingRequest {
    pub fn into_draft(self) -> AppResult<BookingDraft> {
        let (start_date, end_date) = parse_date_pair(self.start_date.as_deref(), self.end_date.as_deref())?;
        Ok(BookingDraft {
            car_id: self.car_id,
            start_date,
            end_date,
            pickup_location: self.pickup_location,
            dropoff_location: self.dropoff_location,
            special_requests: self.special_requests,
        })
    }
}

// Request para cambiar las fechas
#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RescheduleRequest {
    pub fn dates(&self) -> AppResult<(NaiveDate, NaiveDate)> {
        parse_date_pair(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub status: Option<String>,
}

impl BookingListQuery {
    pub fn status_filter(&self) -> AppResult<Option<BookingStatus>> {
        match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => BookingStatus::from_str(raw)
                .map(Some)
                .ok_or_else(|| validation_error(format!("Unknown booking status '{}'", raw))),
        }
    }
}

// Acción del propietario: approve | reject | start | complete | mark_paid
#[derive(Debug, Deserialize)]
pub struct OwnerActionRequest {
    pub action: String,
}

// Response de reserva
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub car_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub amount_due: Decimal,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub pickup_location: String,
    pub dropoff_location: Option<String>,
    pub special_requests: Option<String>,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            amount_due: booking.amount_due(),
            id: booking.id,
            customer_id: booking.customer_id,
            car_id: booking.car_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            total_days: booking.total_days,
            total_amount: booking.total_amount,
            discount_amount: booking.discount_amount,
            status: booking.status,
            payment_status: booking.payment_status,
            pickup_location: booking.pickup_location,
            dropoff_location: booking.dropoff_location,
            special_requests: booking.special_requests,
            payment_intent_id: booking.payment_intent_id,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

// Datos para que el cliente complete el pago con el proveedor
#[derive(Debug, Serialize)]
pub struct PaymentIntentResponse {
    pub booking_id: Uuid,
    pub payment_intent_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub outcome: String,
}

#[derive(Debug, Serialize)]
pub struct CustomerDashboard {
    pub total_bookings: i64,
    pub active_bookings: i64,
    pub completed_bookings: i64,
    pub upcoming_bookings: i64,
    pub loyalty_points: i64,
    pub recent_bookings: Vec<BookingResponse>,
}

#[derive(Debug, Serialize)]
pub struct OwnerDashboard {
    pub total_cars: i64,
    pub available_cars: i64,
    pub active_rentals: i64,
    pub pending_requests: i64,
    pub total_earnings: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::AppError;

    #[test]
    fn test_availability_query_requires_both_dates() {
        let query = AvailabilityQuery {
            start_date: Some("2024-06-01".to_string()),
            end_date: None,
        };
        assert!(matches!(query.dates(), Err(AppError::ValidationError(_))));

        let query = AvailabilityQuery {
            start_date: Some("2024-06-01".to_string()),
            end_date: Some("06/05/2024".to_string()),
        };
        assert!(matches!(query.dates(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_status_filter() {
        let query = BookingListQuery { status: Some("confirmed".to_string()) };
        assert_eq!(query.status_filter().unwrap(), Some(BookingStatus::Confirmed));
        assert_eq!(BookingListQuery::default().status_filter().unwrap(), None);

        let query = BookingListQuery { status: Some("archived".to_string()) };
        assert!(query.status_filter().is_err());
    }

    #[test]
    fn test_create_request_into_draft() {
        let request: CreateBookingRequest = serde_json::from_value(serde_json::json!({
            "car_id": Uuid::nil(),
            "start_date": "2024-06-01",
            "end_date": "2024-06-05",
            "pickup_location": "Station"
        }))
        .unwrap();

        let draft = request.into_draft().unwrap();
        assert_eq!(draft.start_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(draft.end_date, NaiveDate::from_ymd_opt(2024, 6, 5).unwrap());
        assert_eq!(draft.pickup_location.as_deref(), Some("Station"));
    }
}
