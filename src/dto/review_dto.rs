use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Reseña de una reserva completada
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteToggleResponse {
    pub car_id: Uuid,
    pub is_favorite: bool,
}
