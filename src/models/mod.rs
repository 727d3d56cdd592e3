//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL.

pub mod booking;
pub mod car;
pub mod payment;
pub mod pricing;
pub mod review;
pub mod user;

pub use booking::{Booking, BookingAction, BookingStatus, NewBooking, PaymentStatus};
pub use car::Car;
pub use payment::Payment;
pub use pricing::PriceQuote;
