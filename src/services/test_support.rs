//! Datos de prueba compartidos por los tests de servicios

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Car, PaymentStatus};

pub fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

pub fn sample_car(owner_id: Uuid) -> Car {
    let now = Utc::now();
    Car {
        id: Uuid::new_v4(),
        owner_id,
        make: "Toyota".to_string(),
        model: "Corolla".to_string(),
        year: 2022,
        car_type: "sedan".to_string(),
        fuel_type: "petrol".to_string(),
        transmission: "automatic".to_string(),
        daily_rate: Decimal::new(5000, 2),
        seats: 5,
        color: Some("White".to_string()),
        license_plate: format!("TST-{}", &Uuid::new_v4().simple().to_string()[..6]),
        mileage: Some(12_000),
        pickup_location: "Airport".to_string(),
        city: "Lisbon".to_string(),
        description: None,
        features: Json(vec!["gps".to_string()]),
        is_available: true,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn booking_between(car_id: Uuid, start: NaiveDate, end: NaiveDate, status: BookingStatus) -> Booking {
    let now = Utc::now();
    let days = (end - start).num_days();
    Booking {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        car_id,
        start_date: start,
        end_date: end,
        total_days: days as i32,
        total_amount: Decimal::new(50 * days, 0),
        discount_amount: Decimal::ZERO,
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
