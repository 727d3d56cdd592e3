use uuid::Uuid;

use crate::dto::booking_dto::{BookingListQuery, BookingResponse, OwnerActionRequest, OwnerDashboard};
use crate::dto::ApiResponse;
use crate::models::BookingAction;
use crate::repositories::booking_repository::BookingRepository;
use crate::services::booking_lifecycle::BookingLifecycleService;
use crate::state::AppState;
use crate::utils::errors::{validation_error, AppError};

pub struct OwnerController {
    lifecycle: BookingLifecycleService,
    bookings: BookingRepository,
}

impl OwnerController {
    pub fn new(state: &AppState) -> Self {
        Self {
            lifecycle: state.lifecycle(),
            bookings: BookingRepository::new(state.pool.clone()),
        }
    }

    /// Solicitudes sobre los coches del propietario
    pub async fn rentals(
        &self,
        owner_id: Uuid,
        query: BookingListQuery,
    ) -> Result<ApiResponse<Vec<BookingResponse>>, AppError> {
        let bookings = self.bookings.list_for_owner(owner_id, query.status_filter()?).await?;
        Ok(ApiResponse::success(bookings.into_iter().map(BookingResponse::from).collect()))
    }

    pub async fn action(
        &self,
        owner_id: Uuid,
        booking_id: Uuid,
        request: OwnerActionRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let action = BookingAction::from_owner_action(request.action.trim())
            .ok_or_else(|| validation_error(format!("Unknown action '{}'", request.action)))?;

        let booking = self.lifecycle.owner_action(owner_id, booking_id, action).await?;
        Ok(ApiResponse::success_with_message(
            booking.into(),
            format!("Acción '{}' aplicada", request.action.trim()),
        ))
    }

    pub async fn dashboard(&self, owner_id: Uuid) -> Result<ApiResponse<OwnerDashboard>, AppError> {
        let counts = self.bookings.owner_counts(owner_id).await?;
        Ok(ApiResponse::success(OwnerDashboard {
            total_cars: counts.total_cars,
            available_cars: counts.available_cars,
            active_rentals: counts.active_rentals,
            pending_requests: counts.pending_requests,
            total_earnings: counts.total_earnings,
        }))
    }
}
