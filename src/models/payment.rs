//! Modelo de Payment
//!
//! Pago asociado uno a uno con una reserva.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Métodos de pago registrados por el motor
pub const METHOD_CARD: &str = "card";
pub const METHOD_ON_RETURN: &str = "on_return";

/// Payment - mapea a la tabla booking_payments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub payment_intent_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub refund_amount: Decimal,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Pago cobrado en este instante
    pub fn paid(
        booking_id: Uuid,
        payment_intent_id: Option<String>,
        amount: Decimal,
        payment_method: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            payment_intent_id,
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            payment_method: payment_method.to_string(),
            paid_at: Some(now),
            refund_amount: Decimal::ZERO,
            refunded_at: None,
            created_at: now,
        }
    }
}
