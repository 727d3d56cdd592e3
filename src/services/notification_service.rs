//! Servicio de notificaciones
//!
//! Envía eventos de reserva a un webhook externo en segundo plano. Un fallo
//! de entrega se registra en el log y nunca afecta a la operación que lo
//! disparó.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{Booking, BookingStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingEvent {
    Created,
    Confirmed,
    Cancelled,
    Rejected,
}

impl BookingEvent {
    /// Evento asociado a la llegada a un estado, si lo hay
    pub fn for_status(status: BookingStatus) -> Option<Self> {
        match status {
            BookingStatus::Confirmed => Some(BookingEvent::Confirmed),
            BookingStatus::Cancelled => Some(BookingEvent::Cancelled),
            BookingStatus::Rejected => Some(BookingEvent::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingNotification {
    pub event: BookingEvent,
    pub recipient_id: Uuid,
    pub booking_id: Uuid,
    pub car_id: Uuid,
    pub status: BookingStatus,
    pub message: String,
}

impl BookingNotification {
    pub fn new(event: BookingEvent, recipient_id: Uuid, booking: &Booking) -> Self {
        let message = match event {
            BookingEvent::Created => format!(
                "New booking request from {} to {}",
                booking.start_date, booking.end_date
            ),
            BookingEvent::Confirmed => "Your booking has been confirmed".to_string(),
            BookingEvent::Cancelled => "Your booking has been cancelled".to_string(),
            BookingEvent::Rejected => "Your booking request was rejected".to_string(),
        };

        Self {
            event,
            recipient_id,
            booking_id: booking.id,
            car_id: booking.car_id,
            status: booking.status,
            message,
        }
    }
}

#[derive(Clone)]
pub struct NotificationService {
    client: Client,
    webhook_url: Option<String>,
    outbox: Option<UnboundedSender<BookingNotification>>,
}

impl NotificationService {
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                warn!("⚠️ No se pudo configurar el cliente HTTP de notificaciones: {}", e);
                Client::new()
            });

        Self {
            client,
            webhook_url,
            outbox: None,
        }
    }

    /// Copiar cada notificación a un canal local además del webhook
    pub fn with_outbox(mut self, outbox: UnboundedSender<BookingNotification>) -> Self {
        self.outbox = Some(outbox);
        self
    }

    /// Despachar sin esperar: la entrega ocurre en una tarea aparte
    pub fn dispatch(&self, notification: BookingNotification) {
        info!(
            "📨 Notificación {:?} para {} (reserva {})",
            notification.event, notification.recipient_id, notification.booking_id
        );

        if let Some(outbox) = &self.outbox {
            let _ = outbox.send(notification.clone());
        }

        let Some(url) = self.webhook_url.clone() else {
            return;
        };

        let client = self.client.clone();
        tokio::spawn(async move {
            match client.post(&url).json(&notification).send().await {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    warn!(
                        "⚠️ Webhook de notificaciones respondió {} para la reserva {}",
                        response.status(),
                        notification.booking_id
                    );
                }
                Err(e) => {
                    error!(
                        "❌ Error enviando notificación de la reserva {}: {}",
                        notification.booking_id, e
                    );
                }
            }
        });
    }
}
