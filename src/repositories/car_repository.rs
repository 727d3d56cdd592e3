use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::car_dto::{CarSearchQuery, CreateCarRequest, UpdateCarRequest};
use crate::models::car::Car;
use crate::models::review::RatingSummary;
use crate::utils::errors::{conflict_error, is_unique_violation, not_found_error, AppError};

pub struct CarRepository {
    pool: PgPool,
}

impl CarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_plate_error(e: sqlx::Error, license_plate: &str) -> AppError {
        if is_unique_violation(&e) {
            conflict_error("Car", "license_plate", license_plate)
        } else {
            AppError::Database(e)
        }
    }

    pub async fn create(&self, owner_id: Uuid, request: CreateCarRequest) -> Result<Car, AppError> {
        let now = Utc::now();
        let license_plate = request.license_plate.trim().to_uppercase();

        sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (
                id, owner_id, make, model, year, car_type, fuel_type, transmission,
                daily_rate, seats, color, license_plate, mileage, pickup_location,
                city, description, features, is_available, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, TRUE, TRUE, $18, $18)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&request.make)
        .bind(&request.model)
        .bind(request.year)
        .bind(request.car_type.as_str())
        .bind(request.fuel_type.as_str())
        .bind(request.transmission.as_str())
        .bind(request.daily_rate)
        .bind(request.seats.unwrap_or(5))
        .bind(&request.color)
        .bind(&license_plate)
        .bind(request.mileage)
        .bind(&request.pickup_location)
        .bind(&request.city)
        .bind(&request.description)
        .bind(Json(&request.features))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_plate_error(e, &license_plate))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Car>, AppError> {
        let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(car)
    }

    /// Coche del propietario; los ajenos se tratan como inexistentes
    pub async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Car, AppError> {
        sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Car", &id.to_string()))
    }

    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Car>, AppError> {
        let cars = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE owner_id = $1 ORDER BY created_at DESC")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(cars)
    }

    pub async fn update(&self, id: Uuid, owner_id: Uuid, request: UpdateCarRequest) -> Result<Car, AppError> {
        let current = self.find_owned(id, owner_id).await?;

        let license_plate = request
            .license_plate
            .map(|p| p.trim().to_uppercase())
            .unwrap_or(current.license_plate);
        let features = request.features.unwrap_or(current.features.0);

        sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET make = $2, model = $3, year = $4, car_type = $5, fuel_type = $6,
                transmission = $7, daily_rate = $8, seats = $9, color = $10,
                license_plate = $11, mileage = $12, pickup_location = $13, city = $14,
                description = $15, features = $16, is_active = $17, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.make.unwrap_or(current.make))
        .bind(request.model.unwrap_or(current.model))
        .bind(request.year.unwrap_or(current.year))
        .bind(request.car_type.map(|t| t.as_str().to_string()).unwrap_or(current.car_type))
        .bind(request.fuel_type.map(|t| t.as_str().to_string()).unwrap_or(current.fuel_type))
        .bind(request.transmission.map(|t| t.as_str().to_string()).unwrap_or(current.transmission))
        .bind(request.daily_rate.unwrap_or(current.daily_rate))
        .bind(request.seats.unwrap_or(current.seats))
        .bind(request.color.or(current.color))
        .bind(&license_plate)
        .bind(request.mileage.or(current.mileage))
        .bind(request.pickup_location.unwrap_or(current.pickup_location))
        .bind(request.city.unwrap_or(current.city))
        .bind(request.description.or(current.description))
        .bind(Json(features))
        .bind(request.is_active.unwrap_or(current.is_active))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_plate_error(e, &license_plate))
    }

    /// Borrar un coche. Con reservas en curso no se permite.
    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        self.find_owned(id, owner_id).await?;

        let (in_use,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE car_id = $1 AND status IN ('pending', 'confirmed', 'active'))",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if in_use {
            return Err(AppError::Conflict(
                "Car has open bookings and cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Búsqueda pública sobre coches activos
    pub async fn search(&self, query: &CarSearchQuery) -> Result<Vec<Car>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM cars WHERE is_active = TRUE");

        if let Some(city) = query.city.as_deref().filter(|c| !c.trim().is_empty()) {
            builder.push(" AND city ILIKE ").push_bind(format!("%{}%", city.trim()));
        }
        if let Some(car_type) = query.car_type {
            builder.push(" AND car_type = ").push_bind(car_type.as_str());
        }
        if let Some(min_price) = query.min_price {
            builder.push(" AND daily_rate >= ").push_bind(min_price);
        }
        if let Some(max_price) = query.max_price {
            builder.push(" AND daily_rate <= ").push_bind(max_price);
        }
        if let Some(seats) = query.seats {
            builder.push(" AND seats >= ").push_bind(seats);
        }
        builder.push(" ORDER BY daily_rate, created_at DESC");

        let cars = builder.build_query_as::<Car>().fetch_all(&self.pool).await?;
        Ok(cars)
    }

    pub async fn rating_summary(&self, car_id: Uuid) -> Result<RatingSummary, AppError> {
        let summary = sqlx::query_as::<_, RatingSummary>(
            r#"
            SELECT COALESCE(AVG(r.rating)::float8, 0) AS average_rating,
                   COUNT(r.id) AS total_reviews
            FROM booking_reviews r
            JOIN bookings b ON b.id = r.booking_id
            WHERE b.car_id = $1
            "#,
        )
        .bind(car_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }
}
