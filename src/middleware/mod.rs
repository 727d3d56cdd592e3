//! Middleware del sistema
//!
//! Este módulo contiene el middleware para autenticación, CORS, rendimiento
//! y headers de seguridad.

pub mod auth;
pub mod cors;
pub mod performance;
pub mod security_headers;

pub use auth::{auth_middleware, AuthenticatedUser};
pub use cors::cors_layer;
pub use performance::performance_middleware;
pub use security_headers::security_headers_middleware;
