//! Servicio de precios
//!
//! Calcula el importe de una reserva: días × tarifa diaria, con descuentos
//! por duración y por fidelidad que se suman en puntos porcentuales.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::PriceQuote;
use crate::utils::errors::{validation_error, AppResult};
use crate::utils::validation::validate_date_order;

/// Reglas de precio configurables
#[derive(Debug, Clone)]
pub struct PricingPolicy {
    pub min_days: i64,
    pub max_days: i64,
    pub weekly_threshold_days: i64,
    pub weekly_discount_percent: Decimal,
    pub short_threshold_days: i64,
    pub short_discount_percent: Decimal,
    pub loyalty_min_completed: i64,
    pub loyalty_discount_percent: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            min_days: 1,
            max_days: 90,
            weekly_threshold_days: 7,
            weekly_discount_percent: Decimal::new(10, 0),
            short_threshold_days: 3,
            short_discount_percent: Decimal::new(5, 0),
            loyalty_min_completed: 5,
            loyalty_discount_percent: Decimal::new(5, 0),
        }
    }
}

impl PricingPolicy {
    /// Validar el rango y devolver el número de días facturables
    pub fn rental_days(&self, start_date: NaiveDate, end_date: NaiveDate) -> AppResult<i64> {
        validate_date_order(start_date, end_date)?;

        let days = (end_date - start_date).num_days();
        if days < self.min_days {
            return Err(validation_error(format!(
                "Minimum rental period is {} day(s)",
                self.min_days
            )));
        }
        if days > self.max_days {
            return Err(validation_error(format!(
                "Maximum rental period is {} days",
                self.max_days
            )));
        }
        Ok(days)
    }

    /// Porcentaje de descuento total para una duración y un historial
    pub fn discount_percent(&self, days: i64, completed_bookings: i64) -> Decimal {
        let mut percent = Decimal::ZERO;

        if days >= self.weekly_threshold_days {
            percent += self.weekly_discount_percent;
        } else if days >= self.short_threshold_days {
            percent += self.short_discount_percent;
        }

        if completed_bookings >= self.loyalty_min_completed {
            percent += self.loyalty_discount_percent;
        }

        percent
    }

    pub fn quote(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        daily_rate: Decimal,
        completed_bookings: i64,
    ) -> AppResult<PriceQuote> {
        let days = self.rental_days(start_date, end_date)?;
        let total_amount = daily_rate * Decimal::from(days);
        let discount_percent = self.discount_percent(days, completed_bookings);
        let discount = (total_amount * discount_percent / Decimal::ONE_HUNDRED).round_dp(2);

        Ok(PriceQuote {
            total_days: days as i32,
            daily_rate,
            total_amount,
            discount,
            discount_percent,
        })
    }
}
