//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos.

use chrono::{Datelike, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationError;

use crate::utils::errors::{validation_error, AppError};

lazy_static! {
    /// Matrícula: letras, dígitos, espacios y guiones
    static ref LICENSE_PLATE_RE: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,18}[A-Za-z0-9]$")
        .expect("license plate regex is valid");
}

/// Año más antiguo aceptado para un coche
pub const MIN_CAR_YEAR: i32 = 1990;

/// Validar y convertir string a fecha ISO 8601 (YYYY-MM-DD)
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Parsear un parámetro de fecha obligatorio
pub fn parse_required_date(field: &str, value: Option<&str>) -> Result<NaiveDate, AppError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| validation_error(format!("{} is required", field)))?;

    validate_date(raw)
        .map_err(|_| validation_error(format!("{} must be a valid date in YYYY-MM-DD format", field)))
}

/// Validar que la fecha de fin sea posterior a la de inicio
pub fn validate_date_order(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), AppError> {
    if start_date >= end_date {
        return Err(validation_error("End date must be after start date."));
    }
    Ok(())
}

/// Validar que un valor esté en un rango específico
pub fn validate_range<T: PartialOrd + std::fmt::Display + Serialize>(
    value: T,
    min: T,
    max: T,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validador custom para tarifas diarias
pub fn validate_daily_rate(value: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(*value)
}

/// Validar formato de matrícula de vehículo
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    if !LICENSE_PLATE_RE.is_match(value.trim()) {
        let mut error = ValidationError::new("license_plate");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar el año de fabricación (1990 hasta el año próximo)
pub fn validate_car_year(value: i32) -> Result<(), ValidationError> {
    let max_year = Utc::now().year() + 1;
    validate_range(value, MIN_CAR_YEAR, max_year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2024-06-01").is_ok());
        assert!(validate_date("2024/06/01").is_err());
        assert!(validate_date("2024-02-30").is_err());
    }

    #[test]
    fn test_parse_required_date() {
        assert_eq!(
            parse_required_date("start_date", Some("2024-06-01")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(matches!(
            parse_required_date("start_date", None),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            parse_required_date("start_date", Some("  ")),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            parse_required_date("end_date", Some("01-06-2024")),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_date_order() {
        let d1 = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert!(validate_date_order(d1, d2).is_ok());
        assert!(validate_date_order(d2, d1).is_err());
        assert!(validate_date_order(d1, d1).is_err());
    }

    #[test]
    fn test_validate_daily_rate() {
        assert!(validate_daily_rate(&Decimal::new(4999, 2)).is_ok());
        assert!(validate_daily_rate(&Decimal::ZERO).is_ok());
        assert!(validate_daily_rate(&Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn test_validate_license_plate() {
        assert!(validate_license_plate("AB-123-CD").is_ok());
        assert!(validate_license_plate("KA 01 AB 1234").is_ok());
        assert!(validate_license_plate("A").is_err());
        assert!(validate_license_plate("AB_123").is_err());
    }

    #[test]
    fn test_validate_car_year() {
        assert!(validate_car_year(2020).is_ok());
        assert!(validate_car_year(1989).is_err());
        assert!(validate_car_year(Utc::now().year() + 2).is_err());
    }
}
