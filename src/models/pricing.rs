//! Cotización de una reserva

use rust_decimal::Decimal;
use serde::Serialize;

/// Resultado del cálculo de precio para un rango de fechas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub total_days: i32,
    pub daily_rate: Decimal,
    /// total_days × daily_rate, antes de descuentos
    pub total_amount: Decimal,
    pub discount: Decimal,
    pub discount_percent: Decimal,
}

impl PriceQuote {
    pub fn amount_due(&self) -> Decimal {
        self.total_amount - self.discount
    }
}
