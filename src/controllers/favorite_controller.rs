use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::review_dto::FavoriteToggleResponse;
use crate::dto::ApiResponse;
use crate::models::review::FavoriteCar;
use crate::repositories::car_repository::CarRepository;
use crate::repositories::review_repository::FavoriteRepository;
use crate::utils::errors::{not_found_error, AppError};

pub struct FavoriteController {
    favorites: FavoriteRepository,
    cars: CarRepository,
}

impl FavoriteController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            favorites: FavoriteRepository::new(pool.clone()),
            cars: CarRepository::new(pool),
        }
    }

    pub async fn toggle(&self, customer_id: Uuid, car_id: Uuid) -> Result<ApiResponse<FavoriteToggleResponse>, AppError> {
        if self.cars.find_by_id(car_id).await?.is_none() {
            return Err(not_found_error("Car", &car_id.to_string()));
        }

        let is_favorite = self.favorites.toggle(customer_id, car_id).await?;
        Ok(ApiResponse::success(FavoriteToggleResponse { car_id, is_favorite }))
    }

    pub async fn list(&self, customer_id: Uuid) -> Result<ApiResponse<Vec<FavoriteCar>>, AppError> {
        Ok(ApiResponse::success(self.favorites.list(customer_id).await?))
    }
}
