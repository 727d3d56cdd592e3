pub mod booking_repository;
pub mod booking_store;
pub mod car_repository;
pub mod memory_store;
pub mod postgres_store;
pub mod review_repository;
pub mod user_repository;

pub use booking_store::{BookingStore, BookingVersion, PaymentWrite};
pub use memory_store::InMemoryBookingStore;
pub use postgres_store::PgBookingStore;
