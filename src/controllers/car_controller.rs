use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::car_dto::{CarDetailResponse, CarResponse, CarSearchQuery, CreateCarRequest, UpdateCarRequest};
use crate::dto::ApiResponse;
use crate::models::review::Review;
use crate::repositories::car_repository::CarRepository;
use crate::repositories::review_repository::ReviewRepository;
use crate::utils::errors::{not_found_error, validation_error, AppError};

pub struct CarController {
    cars: CarRepository,
    reviews: ReviewRepository,
}

impl CarController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            cars: CarRepository::new(pool.clone()),
            reviews: ReviewRepository::new(pool),
        }
    }

    pub async fn create(&self, owner_id: Uuid, request: CreateCarRequest) -> Result<ApiResponse<CarResponse>, AppError> {
        request.validate()?;

        let car = self.cars.create(owner_id, request).await?;
        info!("🚗 Coche {} ({}) registrado por {}", car.id, car.license_plate, owner_id);

        Ok(ApiResponse::success_with_message(car.into(), "Coche registrado exitosamente"))
    }

    pub async fn list_owned(&self, owner_id: Uuid) -> Result<ApiResponse<Vec<CarResponse>>, AppError> {
        let cars = self.cars.find_by_owner(owner_id).await?;
        Ok(ApiResponse::success(cars.into_iter().map(CarResponse::from).collect()))
    }

    pub async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        request: UpdateCarRequest,
    ) -> Result<ApiResponse<CarResponse>, AppError> {
        request.validate()?;

        let car = self.cars.update(id, owner_id, request).await?;
        Ok(ApiResponse::success_with_message(car.into(), "Coche actualizado exitosamente"))
    }

    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<ApiResponse<()>, AppError> {
        self.cars.delete(id, owner_id).await?;
        info!("🗑️ Coche {} eliminado", id);
        Ok(ApiResponse::message("Coche eliminado exitosamente"))
    }

    /// Detalle público: los coches inactivos no se muestran
    pub async fn detail(&self, id: Uuid) -> Result<ApiResponse<CarDetailResponse>, AppError> {
        let car = self
            .cars
            .find_by_id(id)
            .await?
            .filter(|car| car.is_active)
            .ok_or_else(|| not_found_error("Car", &id.to_string()))?;

        let rating = self.cars.rating_summary(id).await?;
        Ok(ApiResponse::success(CarDetailResponse::new(car, rating)))
    }

    pub async fn search(&self, query: CarSearchQuery) -> Result<ApiResponse<Vec<CarResponse>>, AppError> {
        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err(validation_error("min_price cannot be greater than max_price"));
            }
        }

        let cars = self.cars.search(&query).await?;
        Ok(ApiResponse::success(cars.into_iter().map(CarResponse::from).collect()))
    }

    pub async fn reviews(&self, car_id: Uuid) -> Result<ApiResponse<Vec<Review>>, AppError> {
        let reviews = self.reviews.list_for_car(car_id).await?;
        Ok(ApiResponse::success(reviews))
    }
}
