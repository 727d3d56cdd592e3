//! Sincronizador de disponibilidad
//!
//! `cars.is_available` es un valor derivado: un coche está disponible si no
//! tiene ninguna reserva confirmed o active. Se recalcula tras cada cambio
//! de estado y en el barrido periódico.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::{Booking, BookingStatus};
use crate::repositories::booking_store::BookingStore;
use crate::utils::errors::AppResult;

/// Valor derivado del flag a partir de las reservas del coche
pub fn derive_availability<'a, I>(bookings: I) -> bool
where
    I: IntoIterator<Item = &'a Booking>,
{
    !bookings.into_iter().any(|booking| booking.status.occupies_car())
}

/// Resultado de un barrido completo
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub cars_checked: usize,
    pub cars_updated: usize,
    pub failures: usize,
}

#[derive(Clone)]
pub struct AvailabilitySynchronizer {
    store: Arc<dyn BookingStore>,
}

impl AvailabilitySynchronizer {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Recalcular el flag de un coche. Devuelve true si cambió.
    pub async fn sync_car(&self, car_id: Uuid) -> AppResult<bool> {
        let occupying = self.store.bookings_for_car(car_id, &BookingStatus::OCCUPYING).await?;
        let is_available = derive_availability(&occupying);
        let changed = self.store.set_car_availability(car_id, is_available).await?;

        if changed {
            info!("🚗 Coche {} ahora is_available={}", car_id, is_available);
        } else {
            debug!("🚗 Coche {} sin cambios (is_available={})", car_id, is_available);
        }
        Ok(changed)
    }

    /// Recalcular todos los coches en paralelo
    pub async fn sync_all(&self) -> AppResult<SweepReport> {
        let car_ids = self.store.list_car_ids().await?;
        let results = join_all(car_ids.iter().map(|id| self.sync_car(*id))).await;

        let mut report = SweepReport {
            cars_checked: car_ids.len(),
            ..SweepReport::default()
        };
        for (car_id, result) in car_ids.iter().zip(results) {
            match result {
                Ok(true) => report.cars_updated += 1,
                Ok(false) => {}
                Err(e) => {
                    error!("❌ Error sincronizando coche {}: {}", car_id, e);
                    report.failures += 1;
                }
            }
        }
        Ok(report)
    }
}
