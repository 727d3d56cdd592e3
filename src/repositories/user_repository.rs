use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{AccountType, User};
use crate::utils::errors::{conflict_error, is_unique_violation, AppError};

/// Datos ya validados para crear una cuenta con su perfil
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub account_type: AccountType,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub company_name: Option<String>,
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crear usuario y perfil en una sola transacción
    pub async fn create_account(&self, account: NewAccount) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, account_type, phone_number, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.account_type)
        .bind(&account.phone_number)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                conflict_error("User", "username", &account.username)
            } else {
                AppError::Database(e)
            }
        })?;

        match account.account_type {
            AccountType::Customer => {
                sqlx::query("INSERT INTO customer_profiles (user_id, date_of_birth) VALUES ($1, $2)")
                    .bind(user.id)
                    .bind(account.date_of_birth)
                    .execute(&mut *tx)
                    .await?;
            }
            AccountType::Owner => {
                sqlx::query("INSERT INTO owner_profiles (user_id, company_name) VALUES ($1, $2)")
                    .bind(user.id)
                    .bind(&account.company_name)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
