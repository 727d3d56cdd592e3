//! Consultas de lectura sobre reservas (listados y paneles)
//!
//! Las escrituras del ciclo de vida van por el BookingStore.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus};
use crate::utils::errors::AppError;

#[derive(Debug, Default, sqlx::FromRow)]
pub struct CustomerCounts {
    pub total_bookings: i64,
    pub active_bookings: i64,
    pub completed_bookings: i64,
    pub upcoming_bookings: i64,
}

#[derive(Debug, Default, sqlx::FromRow)]
pub struct OwnerCounts {
    pub total_cars: i64,
    pub available_cars: i64,
    pub active_rentals: i64,
    pub pending_requests: i64,
    pub total_earnings: Decimal,
}

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE customer_id = $1 AND ($2::booking_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Solicitudes de alquiler sobre los coches del propietario
    pub async fn list_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.* FROM bookings b
            JOIN cars c ON c.id = b.car_id
            WHERE c.owner_id = $1 AND ($2::booking_status IS NULL OR b.status = $2)
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    pub async fn customer_counts(&self, customer_id: Uuid, today: NaiveDate) -> Result<CustomerCounts, AppError> {
        let counts = sqlx::query_as::<_, CustomerCounts>(
            r#"
            SELECT COUNT(*) AS total_bookings,
                   COUNT(*) FILTER (WHERE status = 'active') AS active_bookings,
                   COUNT(*) FILTER (WHERE status = 'completed') AS completed_bookings,
                   COUNT(*) FILTER (WHERE status IN ('pending', 'confirmed') AND start_date > $2) AS upcoming_bookings
            FROM bookings
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id)
        .bind(today)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    pub async fn owner_counts(&self, owner_id: Uuid) -> Result<OwnerCounts, AppError> {
        let counts = sqlx::query_as::<_, OwnerCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM cars WHERE owner_id = $1) AS total_cars,
                (SELECT COUNT(*) FROM cars WHERE owner_id = $1 AND is_available AND is_active) AS available_cars,
                (SELECT COUNT(*) FROM bookings b JOIN cars c ON c.id = b.car_id
                  WHERE c.owner_id = $1 AND b.status = 'active') AS active_rentals,
                (SELECT COUNT(*) FROM bookings b JOIN cars c ON c.id = b.car_id
                  WHERE c.owner_id = $1 AND b.status = 'pending') AS pending_requests,
                (SELECT COALESCE(SUM(b.total_amount - b.discount_amount), 0) FROM bookings b
                  JOIN cars c ON c.id = b.car_id
                  WHERE c.owner_id = $1 AND b.payment_status = 'paid') AS total_earnings
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }
}
