use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::car::{Car, CarType, FuelType, Transmission};
use crate::models::review::RatingSummary;
use crate::utils::validation::{validate_car_year, validate_daily_rate, validate_license_plate};

fn car_year(value: i32) -> Result<(), ValidationError> {
    validate_car_year(value)
}

// Request para registrar un coche
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCarRequest {
    #[validate(length(min = 1, max = 100))]
    pub make: String,
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    #[validate(custom = "car_year")]
    pub year: i32,
    pub car_type: CarType,
    #[serde(default)]
    pub fuel_type: FuelType,
    #[serde(default)]
    pub transmission: Transmission,
    #[validate(custom = "validate_daily_rate")]
    pub daily_rate: Decimal,
    #[validate(range(min = 1, max = 20))]
    pub seats: Option<i32>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,
    #[validate(range(min = 0))]
    pub mileage: Option<i32>,
    #[validate(length(min = 1, max = 200))]
    pub pickup_location: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

// Request para actualizar un coche
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCarRequest {
    #[validate(length(min = 1, max = 100))]
    pub make: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,
    #[validate(custom = "car_year")]
    pub year: Option<i32>,
    pub car_type: Option<CarType>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    #[validate(custom = "validate_daily_rate")]
    pub daily_rate: Option<Decimal>,
    #[validate(range(min = 1, max = 20))]
    pub seats: Option<i32>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    #[validate(custom = "validate_license_plate")]
    pub license_plate: Option<String>,
    #[validate(range(min = 0))]
    pub mileage: Option<i32>,
    #[validate(length(min = 1, max = 200))]
    pub pickup_location: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

// Filtros de la búsqueda pública
#[derive(Debug, Default, Deserialize)]
pub struct CarSearchQuery {
    pub city: Option<String>,
    pub car_type: Option<CarType>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub seats: Option<i32>,
}

// Response de coche
#[derive(Debug, Serialize)]
pub struct CarResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub car_type: String,
    pub fuel_type: String,
    pub transmission: String,
    pub daily_rate: Decimal,
    pub seats: i32,
    pub color: Option<String>,
    pub license_plate: String,
    pub mileage: Option<i32>,
    pub pickup_location: String,
    pub city: String,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub is_available: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        Self {
            name: car.full_name(),
            id: car.id,
            owner_id: car.owner_id,
            make: car.make,
            model: car.model,
            year: car.year,
            car_type: car.car_type,
            fuel_type: car.fuel_type,
            transmission: car.transmission,
            daily_rate: car.daily_rate,
            seats: car.seats,
            color: car.color,
            license_plate: car.license_plate,
            mileage: car.mileage,
            pickup_location: car.pickup_location,
            city: car.city,
            description: car.description,
            features: car.features.0,
            is_available: car.is_available,
            is_active: car.is_active,
            created_at: car.created_at,
        }
    }
}

// Detalle público con valoraciones
#[derive(Debug, Serialize)]
pub struct CarDetailResponse {
    #[serde(flatten)]
    pub car: CarResponse,
    pub average_rating: f64,
    pub total_reviews: i64,
}

impl CarDetailResponse {
    pub fn new(car: Car, rating: RatingSummary) -> Self {
        Self {
            car: car.into(),
            average_rating: rating.average_rating,
            total_reviews: rating.total_reviews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    fn create_request(year: i32) -> CreateCarRequest {
        serde_json::from_value(json!({
            "make": "Toyota",
            "model": "Corolla",
            "year": year,
            "car_type": "sedan",
            "daily_rate": "45.00",
            "license_plate": "AB-123-CD",
            "pickup_location": "Airport",
            "city": "Lisbon"
        }))
        .unwrap()
    }

    #[test]
    fn test_create_car_year_range() {
        assert!(create_request(2020).validate().is_ok());

        let errors = create_request(1985).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("year"));

        let next_next = Utc::now().year() + 2;
        assert!(create_request(next_next).validate().is_err());
    }

    #[test]
    fn test_update_car_year_is_optional() {
        assert!(UpdateCarRequest::default().validate().is_ok());

        let request = UpdateCarRequest { year: Some(1800), ..Default::default() };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("year"));
    }
}
