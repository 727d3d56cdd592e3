//! Ejecución periódica del job de reconciliación

use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::services::reconciliation::ReconciliationJob;

/// Lanzar el job cada `period` hasta que `shutdown` cambie a true
pub fn spawn_reconciliation(
    job: ReconciliationJob,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("⏰ Reconciliación programada cada {}s", period.as_secs());
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let today = Utc::now().date_naive();
                    if let Err(e) = job.run(today).await {
                        error!("❌ Reconciliación fallida: {}", e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("⏰ Scheduler de reconciliación detenido");
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::repositories::memory_store::InMemoryBookingStore;
    use crate::services::booking_lifecycle::BookingLifecycleService;
    use crate::services::notification_service::NotificationService;
    use crate::services::pricing_service::PricingPolicy;

    #[tokio::test]
    async fn test_scheduler_stops_on_shutdown() {
        let store = Arc::new(InMemoryBookingStore::new());
        let lifecycle = BookingLifecycleService::new(store, PricingPolicy::default(), NotificationService::new(None));
        let (tx, rx) = watch::channel(false);

        let handle = spawn_reconciliation(ReconciliationJob::new(lifecycle), Duration::from_millis(10), rx);
        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }
}
