use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::dto::ApiResponse;
use crate::repositories::user_repository::{NewAccount, UserRepository};
use crate::utils::errors::{not_found_error, AppError};
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct AuthController {
    repository: UserRepository,
    jwt: JwtConfig,
}

impl AuthController {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            repository: UserRepository::new(pool),
            jwt,
        }
    }

    /// Registro explícito: la cuenta y su perfil se crean juntos
    pub async fn register(&self, request: RegisterRequest) -> Result<ApiResponse<AuthResponse>, AppError> {
        request.validate()?;

        if self.repository.find_by_username(&request.username).await?.is_some() {
            return Err(AppError::Conflict("El nombre de usuario ya está registrado".to_string()));
        }

        let password_hash =
            hash(&request.password, DEFAULT_COST).map_err(|e| AppError::Hash(e.to_string()))?;

        let user = self
            .repository
            .create_account(NewAccount {
                username: request.username,
                email: request.email,
                password_hash,
                account_type: request.account_type,
                phone_number: request.phone_number,
                date_of_birth: request.date_of_birth,
                company_name: request.company_name,
            })
            .await?;

        info!("👤 Cuenta {} registrada ({})", user.username, user.account_type.as_str());

        let token = generate_token(user.id, user.account_type, &self.jwt)?;
        Ok(ApiResponse::success_with_message(
            AuthResponse {
                token,
                expires_in: self.jwt.expiration,
                user: user.into(),
            },
            "Cuenta creada exitosamente",
        ))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<ApiResponse<AuthResponse>, AppError> {
        request.validate()?;

        let invalid = || AppError::Unauthorized("Credenciales inválidas".to_string());
        let user = self
            .repository
            .find_by_username(&request.username)
            .await?
            .ok_or_else(invalid)?;

        let matches =
            verify(&request.password, &user.password_hash).map_err(|e| AppError::Hash(e.to_string()))?;
        if !matches {
            warn!("🔒 Login fallido para {}", request.username);
            return Err(invalid());
        }

        let token = generate_token(user.id, user.account_type, &self.jwt)?;
        info!("🔑 Login correcto: {}", user.username);

        Ok(ApiResponse::success(AuthResponse {
            token,
            expires_in: self.jwt.expiration,
            user: user.into(),
        }))
    }

    pub async fn me(&self, user_id: Uuid) -> Result<ApiResponse<UserResponse>, AppError> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| not_found_error("User", &user_id.to_string()))?;
        Ok(ApiResponse::success(user.into()))
    }
}
