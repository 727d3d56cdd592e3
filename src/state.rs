//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{BookingStore, PgBookingStore};
use crate::services::availability_service::AvailabilityService;
use crate::services::booking_lifecycle::BookingLifecycleService;
use crate::services::notification_service::NotificationService;
use crate::services::payment_webhook::PaymentWebhookService;
use crate::services::pricing_service::PricingPolicy;
use crate::services::reconciliation::ReconciliationJob;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub store: Arc<dyn BookingStore>,
    pub notifier: NotificationService,
    pub pricing: PricingPolicy,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        let store: Arc<dyn BookingStore> = Arc::new(PgBookingStore::new(pool.clone()));
        Self::with_store(pool, config, store)
    }

    /// Estado con un BookingStore concreto (el motor en memoria en los tests)
    pub fn with_store(pool: PgPool, config: EnvironmentConfig, store: Arc<dyn BookingStore>) -> Self {
        let notifier = NotificationService::new(config.notification_webhook_url.clone());
        Self {
            pool,
            config,
            store,
            notifier,
            pricing: PricingPolicy::default(),
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::from(&self.config)
    }

    pub fn availability(&self) -> AvailabilityService {
        AvailabilityService::new(self.store.clone(), self.pricing.clone())
    }

    pub fn lifecycle(&self) -> BookingLifecycleService {
        BookingLifecycleService::new(self.store.clone(), self.pricing.clone(), self.notifier.clone())
    }

    pub fn payment_webhooks(&self) -> PaymentWebhookService {
        PaymentWebhookService::new(self.lifecycle())
    }

    pub fn reconciliation_job(&self) -> ReconciliationJob {
        ReconciliationJob::new(self.lifecycle())
    }
}
