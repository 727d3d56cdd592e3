//! Middleware de autenticación JWT
//!
//! Este módulo maneja la autenticación JWT, extracción de tokens
//! y verificación de usuarios autenticados.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    models::user::AccountType,
    state::AppState,
    utils::{
        errors::{forbidden_error, AppError, AppResult},
        jwt::{extract_token_from_header, verify_token, JwtConfig},
    },
};

/// Header con el token compartido de administración
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub account_type: AccountType,
}

impl AuthenticatedUser {
    pub fn require_customer(&self) -> AppResult<Uuid> {
        match self.account_type {
            AccountType::Customer => Ok(self.user_id),
            AccountType::Owner => Err(forbidden_error("use this endpoint", "customer account required")),
        }
    }

    pub fn require_owner(&self) -> AppResult<Uuid> {
        match self.account_type {
            AccountType::Owner => Ok(self.user_id),
            AccountType::Customer => Err(forbidden_error("use this endpoint", "owner account required")),
        }
    }
}

/// Validar el bearer token de los headers
pub fn authenticate(headers: &HeaderMap, config: &JwtConfig) -> AppResult<AuthenticatedUser> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, config)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Token inválido".to_string()))?;
    let account_type = AccountType::from_str(&claims.account_type)
        .ok_or_else(|| AppError::Unauthorized("Token inválido".to_string()))?;

    Ok(AuthenticatedUser { user_id, account_type })
}

/// Usuario si hay un token válido, None en cualquier otro caso
pub fn optional_user(headers: &HeaderMap, config: &JwtConfig) -> Option<AuthenticatedUser> {
    if !headers.contains_key(header::AUTHORIZATION) {
        return None;
    }
    authenticate(headers, config)
        .map_err(|e| debug!("🔓 Token opcional ignorado: {}", e))
        .ok()
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(request.headers(), &state.jwt_config())?;
    debug!("🔐 Usuario autenticado: {} ({})", user.user_id, user.account_type.as_str());

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Verificar el token de administración; sin ADMIN_TOKEN configurado no hay acceso
pub fn require_admin(headers: &HeaderMap, admin_token: Option<&str>) -> AppResult<()> {
    let expected = admin_token
        .ok_or_else(|| AppError::Forbidden("Admin access is not configured".to_string()))?;

    let provided = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Admin token required".to_string()))?;

    if provided != expected {
        return Err(AppError::Forbidden("Invalid admin token".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::jwt::generate_token;
    use axum::http::HeaderValue;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        }
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_authenticate_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, AccountType::Owner, &config()).unwrap();

        let user = authenticate(&bearer(&token), &config()).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.require_owner().unwrap(), user_id);
        assert!(matches!(user.require_customer(), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_missing_or_bad_token() {
        assert!(matches!(
            authenticate(&HeaderMap::new(), &config()),
            Err(AppError::Unauthorized(_))
        ));
        assert!(authenticate(&bearer("not-a-jwt"), &config()).is_err());
        assert!(optional_user(&bearer("not-a-jwt"), &config()).is_none());
        assert!(optional_user(&HeaderMap::new(), &config()).is_none());
    }

    #[test]
    fn test_require_admin() {
        let mut headers = HeaderMap::new();
        assert!(require_admin(&headers, None).is_err());
        assert!(matches!(
            require_admin(&headers, Some("secret")),
            Err(AppError::Unauthorized(_))
        ));

        headers.insert(ADMIN_TOKEN_HEADER, HeaderValue::from_static("wrong"));
        assert!(matches!(require_admin(&headers, Some("secret")), Err(AppError::Forbidden(_))));

        headers.insert(ADMIN_TOKEN_HEADER, HeaderValue::from_static("secret"));
        assert!(require_admin(&headers, Some("secret")).is_ok());
    }
}
