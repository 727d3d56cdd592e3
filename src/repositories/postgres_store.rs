//! Implementación PostgreSQL del BookingStore
//!
//! La creación y la reprogramación corren en una transacción SERIALIZABLE
//! con la fila del coche bloqueada (`FOR UPDATE`). La restricción de
//! exclusión `bookings_no_overlap` actúa como última barrera.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Car, NewBooking, Payment};
use crate::repositories::booking_store::{BookingStore, BookingVersion, PaymentWrite};
use crate::utils::errors::{is_write_conflict, not_found_error, AppError, AppResult};

const UNAVAILABLE_MESSAGE: &str = "Car is not available for the selected dates";

/// Filtro SQL de los estados que bloquean fechas
const BLOCKING_FILTER: &str = "status IN ('pending', 'confirmed', 'active')";

#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin_serializable(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    /// Bloquear la fila del coche; coches inexistentes o inactivos no se reservan
    async fn lock_active_car(tx: &mut Transaction<'static, Postgres>, car_id: Uuid) -> AppResult<()> {
        let row: Option<(bool,)> = sqlx::query_as("SELECT is_active FROM cars WHERE id = $1 FOR UPDATE")
            .bind(car_id)
            .fetch_optional(&mut **tx)
            .await?;

        match row {
            Some((true,)) => Ok(()),
            _ => Err(not_found_error("Car", &car_id.to_string())),
        }
    }

    async fn has_overlap(
        tx: &mut Transaction<'static, Postgres>,
        car_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        let sql = format!(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE car_id = $1
                  AND {}
                  AND start_date < $3
                  AND end_date > $2
                  AND ($4::uuid IS NULL OR id <> $4)
            )
            "#,
            BLOCKING_FILTER
        );

        let (exists,): (bool,) = sqlx::query_as(&sql)
            .bind(car_id)
            .bind(start_date)
            .bind(end_date)
            .bind(exclude)
            .fetch_one(&mut **tx)
            .await?;

        Ok(exists)
    }
}

/// Los abortos de serialización y las violaciones de exclusión significan
/// que otro escritor ganó la carrera por esas fechas
fn map_race(error: AppError) -> AppError {
    match error {
        AppError::Database(ref e) if is_write_conflict(e) => {
            warn!("⚠️ Carrera de escritura detectada: {}", e);
            AppError::Conflict(UNAVAILABLE_MESSAGE.to_string())
        }
        other => other,
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn find_car(&self, car_id: Uuid) -> AppResult<Option<Car>> {
        let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(car_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(car)
    }

    async fn list_car_ids(&self) -> AppResult<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM cars ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn set_car_availability(&self, car_id: Uuid, is_available: bool) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE cars SET is_available = $2, updated_at = NOW() WHERE id = $1 AND is_available <> $2",
        )
        .bind(car_id)
        .bind(is_available)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    async fn find_booking_by_payment_intent(&self, payment_intent_id: &str) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE payment_intent_id = $1")
            .bind(payment_intent_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    async fn bookings_for_car(&self, car_id: Uuid, statuses: &[BookingStatus]) -> AppResult<Vec<Booking>> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE car_id = $1 AND status::text = ANY($2)
            ORDER BY start_date
            "#,
        )
        .bind(car_id)
        .bind(statuses)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn count_completed_bookings(&self, customer_id: Uuid) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings WHERE customer_id = $1 AND status = 'completed'",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn find_due_for_activation(&self, today: NaiveDate) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE status = 'confirmed' AND start_date <= $1 ORDER BY start_date",
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn find_due_for_completion(&self, today: NaiveDate) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE status = 'active' AND end_date < $1 ORDER BY end_date",
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn insert_if_available(&self, new_booking: NewBooking) -> AppResult<Booking> {
        let result: AppResult<Booking> = async {
            let mut tx = self.begin_serializable().await?;
            Self::lock_active_car(&mut tx, new_booking.car_id).await?;

            if Self::has_overlap(&mut tx, new_booking.car_id, new_booking.start_date, new_booking.end_date, None)
                .await?
            {
                return Err(AppError::Conflict(UNAVAILABLE_MESSAGE.to_string()));
            }

            let booking = new_booking.into_booking(Uuid::new_v4(), Utc::now());
            let saved = sqlx::query_as::<_, Booking>(
                r#"
                INSERT INTO bookings (
                    id, customer_id, car_id, start_date, end_date, total_days,
                    total_amount, discount_amount, status, payment_status,
                    pickup_location, dropoff_location, special_requests,
                    payment_intent_id, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                RETURNING *
                "#,
            )
            .bind(booking.id)
            .bind(booking.customer_id)
            .bind(booking.car_id)
            .bind(booking.start_date)
            .bind(booking.end_date)
            .bind(booking.total_days)
            .bind(booking.total_amount)
            .bind(booking.discount_amount)
            .bind(booking.status)
            .bind(booking.payment_status)
            .bind(&booking.pickup_location)
            .bind(&booking.dropoff_location)
            .bind(&booking.special_requests)
            .bind(&booking.payment_intent_id)
            .bind(booking.created_at)
            .bind(booking.updated_at)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(saved)
        }
        .await;

        result.map_err(map_race)
    }

    async fn reschedule_if_available(&self, booking: &Booking) -> AppResult<Booking> {
        let result: AppResult<Booking> = async {
            let mut tx = self.begin_serializable().await?;
            Self::lock_active_car(&mut tx, booking.car_id).await?;

            if Self::has_overlap(&mut tx, booking.car_id, booking.start_date, booking.end_date, Some(booking.id))
                .await?
            {
                return Err(AppError::Conflict(UNAVAILABLE_MESSAGE.to_string()));
            }

            let saved = sqlx::query_as::<_, Booking>(
                r#"
                UPDATE bookings
                SET start_date = $2, end_date = $3, total_days = $4,
                    total_amount = $5, discount_amount = $6, updated_at = NOW()
                WHERE id = $1 AND status = 'pending'
                RETURNING *
                "#,
            )
            .bind(booking.id)
            .bind(booking.start_date)
            .bind(booking.end_date)
            .bind(booking.total_days)
            .bind(booking.total_amount)
            .bind(booking.discount_amount)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition("Only pending bookings can be rescheduled".to_string())
            })?;

            tx.commit().await?;
            Ok(saved)
        }
        .await;

        result.map_err(map_race)
    }

    async fn update_booking(
        &self,
        booking: &Booking,
        expected: BookingVersion,
        payment: Option<PaymentWrite>,
    ) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        let saved = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $2, payment_status = $3, payment_intent_id = $4, updated_at = NOW()
            WHERE id = $1 AND status = $5 AND payment_status = $6
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(booking.status)
        .bind(booking.payment_status)
        .bind(&booking.payment_intent_id)
        .bind(expected.status)
        .bind(expected.payment_status)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            debug!("🔁 CAS fallido para la reserva {} (esperado {})", booking.id, expected);
            AppError::InvalidTransition(format!(
                "Booking {} is no longer {}",
                booking.id, expected
            ))
        })?;

        match payment {
            Some(PaymentWrite::Record(payment)) => {
                sqlx::query(
                    r#"
                    INSERT INTO booking_payments (
                        id, booking_id, payment_intent_id, amount, currency,
                        payment_method, paid_at, refund_amount, refunded_at, created_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    ON CONFLICT (booking_id) DO UPDATE
                    SET payment_intent_id = EXCLUDED.payment_intent_id,
                        amount = EXCLUDED.amount,
                        payment_method = EXCLUDED.payment_method,
                        paid_at = EXCLUDED.paid_at
                    "#,
                )
                .bind(payment.id)
                .bind(payment.booking_id)
                .bind(&payment.payment_intent_id)
                .bind(payment.amount)
                .bind(&payment.currency)
                .bind(&payment.payment_method)
                .bind(payment.paid_at)
                .bind(payment.refund_amount)
                .bind(payment.refunded_at)
                .bind(payment.created_at)
                .execute(&mut *tx)
                .await?;
            }
            Some(PaymentWrite::Refund { amount, refunded_at }) => {
                sqlx::query(
                    "UPDATE booking_payments SET refund_amount = $2, refunded_at = $3 WHERE booking_id = $1",
                )
                .bind(booking.id)
                .bind(amount)
                .bind(refunded_at)
                .execute(&mut *tx)
                .await?;
            }
            None => {}
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn find_payment(&self, booking_id: Uuid) -> AppResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM booking_payments WHERE booking_id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(payment)
    }
}
