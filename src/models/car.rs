//! Modelo de Car
//!
//! Este módulo contiene el struct Car y los catálogos cerrados que usa.
//! Mapea exactamente a la tabla cars del schema PostgreSQL.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Tipo de carrocería
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarType {
    Sedan,
    Suv,
    Compact,
    Luxury,
    Sports,
    Van,
    Convertible,
    Electric,
    Hybrid,
}

impl CarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarType::Sedan => "sedan",
            CarType::Suv => "suv",
            CarType::Compact => "compact",
            CarType::Luxury => "luxury",
            CarType::Sports => "sports",
            CarType::Van => "van",
            CarType::Convertible => "convertible",
            CarType::Electric => "electric",
            CarType::Hybrid => "hybrid",
        }
    }
}

/// Tipo de combustible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[default]
    Petrol,
    Diesel,
    Electric,
    Hybrid,
    Cng,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Electric => "electric",
            FuelType::Hybrid => "hybrid",
            FuelType::Cng => "cng",
        }
    }
}

/// Tipo de transmisión
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Manual,
    #[default]
    Automatic,
}

impl Transmission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Manual => "manual",
            Transmission::Automatic => "automatic",
        }
    }
}

/// Car principal - mapea exactamente a la tabla cars
#[derive(Debug, Clone, FromRow)]
pub struct Car {
    pub id: Uuid,
    pub owner_id: Uuid,
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
    pub features: Json<Vec<String>>,
    /// Derivado: lo mantiene el sincronizador de disponibilidad
    pub is_available: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Car {
    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }
}
