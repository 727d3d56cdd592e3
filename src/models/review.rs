//! Modelo de Review

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Reseña de una reserva completada (una por reserva)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Media y número de reseñas de un coche
#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_reviews: i64,
}

/// Coche marcado como favorito por un cliente
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FavoriteCar {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub car_id: Uuid,
    pub created_at: DateTime<Utc>,
}
