pub mod api_response;
pub mod auth_dto;
pub mod booking_dto;
pub mod car_dto;
pub mod review_dto;

pub use api_response::ApiResponse;
