use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::review::{FavoriteCar, Review};
use crate::utils::errors::{is_unique_violation, AppError};

pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Una reseña por reserva
    pub async fn create(&self, booking_id: Uuid, rating: i32, comment: Option<String>) -> Result<Review, AppError> {
        let now = Utc::now();
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO booking_reviews (id, booking_id, rating, comment, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking_id)
        .bind(rating)
        .bind(comment)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("This booking has already been reviewed".to_string())
            } else {
                AppError::Database(e)
            }
        })
    }

    pub async fn list_for_car(&self, car_id: Uuid) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT r.* FROM booking_reviews r
            JOIN bookings b ON b.id = r.booking_id
            WHERE b.car_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(car_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }
}

pub struct FavoriteRepository {
    pool: PgPool,
}

impl FavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Alternar el favorito. Devuelve true si quedó marcado.
    pub async fn toggle(&self, customer_id: Uuid, car_id: Uuid) -> Result<bool, AppError> {
        let removed = sqlx::query("DELETE FROM favorite_cars WHERE customer_id = $1 AND car_id = $2")
            .bind(customer_id)
            .bind(car_id)
            .execute(&self.pool)
            .await?;

        if removed.rows_affected() > 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO favorite_cars (id, customer_id, car_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (customer_id, car_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(customer_id)
        .bind(car_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(true)
    }

    pub async fn list(&self, customer_id: Uuid) -> Result<Vec<FavoriteCar>, AppError> {
        let favorites = sqlx::query_as::<_, FavoriteCar>(
            "SELECT * FROM favorite_cars WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(favorites)
    }
}
