//! Services module
//!
//! Lógica de negocio del motor de reservas: disponibilidad, precios,
//! ciclo de vida, pagos, notificaciones y reconciliación periódica.

pub mod availability_service;
pub mod availability_sync;
pub mod booking_lifecycle;
pub mod notification_service;
pub mod payment_webhook;
pub mod pricing_service;
pub mod reconciliation;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_support;

pub use availability_service::AvailabilityService;
pub use availability_sync::AvailabilitySynchronizer;
pub use booking_lifecycle::{Actor, BookingDraft, BookingLifecycleService};
pub use notification_service::NotificationService;
pub use pricing_service::PricingPolicy;
pub use reconciliation::{ReconcileReport, ReconciliationJob};
