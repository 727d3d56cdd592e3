//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::str::FromStr;

use crate::utils::errors::AppError;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub slow_request_threshold_ms: u64,
    pub log_level: String,
    // Job de reconciliación
    pub reconcile_interval_secs: u64,
    // Colaboradores externos
    pub notification_webhook_url: Option<String>,
    pub admin_token: Option<String>,
}

impl EnvironmentConfig {
    /// Cargar la configuración desde las variables de entorno
    pub fn from_env() -> Result<Self, AppError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let default_log_level = if environment == "development" { "debug" } else { "info" };

        Ok(Self {
            port: parse_var("PORT", 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret: required_var("JWT_SECRET")?,
            jwt_expiration: parse_var("JWT_EXPIRATION", 86_400)?,
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", 30)?,
            slow_request_threshold_ms: parse_var("SLOW_REQUEST_THRESHOLD_MS", 2_000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| default_log_level.to_string()),
            reconcile_interval_secs: parse_var("RECONCILE_INTERVAL_SECS", 300)?,
            notification_webhook_url: optional_var("NOTIFICATION_WEBHOOK_URL"),
            admin_token: optional_var("ADMIN_TOKEN"),
            environment,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Nivel de log para tracing-subscriber
    pub fn tracing_level(&self) -> tracing::Level {
        tracing::Level::from_str(&self.log_level).unwrap_or(tracing::Level::INFO)
    }
}

fn required_var(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Internal(format!("{} must be set", name)))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Internal(format!("{} must be a valid number", name))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl EnvironmentConfig {
    /// Configuración fija para tests
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expiration: 3600,
            cors_origins: vec![],
            request_timeout_secs: 5,
            slow_request_threshold_ms: 2_000,
            log_level: "debug".to_string(),
            reconcile_interval_secs: 300,
            notification_webhook_url: None,
            admin_token: Some("admin-secret".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_url_and_mode() {
        let config = EnvironmentConfig::for_tests();
        assert_eq!(config.server_url(), "127.0.0.1:0");
        assert!(!config.is_development());
        assert!(!config.is_production());
    }

    #[test]
    fn test_tracing_level_fallback() {
        let mut config = EnvironmentConfig::for_tests();
        assert_eq!(config.tracing_level(), tracing::Level::DEBUG);
        config.log_level = "verbose".to_string();
        assert_eq!(config.tracing_level(), tracing::Level::INFO);
    }
}
