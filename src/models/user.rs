//! Modelo de User
//!
//! Este módulo contiene el struct User y los perfiles de cliente y propietario.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Tipo de cuenta - mapea al ENUM account_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type)]
#[sqlx(type_name = "account_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Customer,
    Owner,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Customer => "customer",
            AccountType::Owner => "owner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(AccountType::Customer),
            "owner" => Some(AccountType::Owner),
            _ => None,
        }
    }
}

/// User - mapea exactamente a la tabla users
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub account_type: AccountType,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Perfil de cliente, creado junto con la cuenta
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerProfile {
    pub user_id: Uuid,
    pub date_of_birth: Option<NaiveDate>,
}

/// Perfil de propietario, creado junto con la cuenta
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OwnerProfile {
    pub user_id: Uuid,
    pub company_name: Option<String>,
    pub verified: bool,
}
