use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::{
    AvailabilityQuery, AvailabilityResponse, BookingListQuery, BookingResponse, CreateBookingRequest,
    CustomerDashboard, PaymentIntentResponse, RescheduleRequest, WebhookAck,
};
use crate::dto::review_dto::CreateReviewRequest;
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::payment::DEFAULT_CURRENCY;
use crate::models::review::Review;
use crate::models::user::AccountType;
use crate::models::BookingStatus;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::review_repository::ReviewRepository;
use crate::services::availability_service::AvailabilityService;
use crate::services::booking_lifecycle::{Actor, BookingLifecycleService};
use crate::services::payment_webhook::{PaymentEvent, PaymentWebhookService, WebhookOutcome};
use crate::state::AppState;
use crate::utils::errors::{validation_error, AppError};

/// Puntos de fidelidad por reserva completada
const LOYALTY_POINTS_PER_BOOKING: i64 = 100;

pub struct BookingController {
    availability: AvailabilityService,
    lifecycle: BookingLifecycleService,
    webhooks: PaymentWebhookService,
    bookings: BookingRepository,
    reviews: ReviewRepository,
}

impl BookingController {
    pub fn new(state: &AppState) -> Self {
        Self {
            availability: state.availability(),
            lifecycle: state.lifecycle(),
            webhooks: state.payment_webhooks(),
            bookings: BookingRepository::new(state.pool.clone()),
            reviews: ReviewRepository::new(state.pool.clone()),
        }
    }

    /// Disponibilidad y precio; la fidelidad solo aplica a clientes identificados
    pub async fn availability(
        &self,
        car_id: Uuid,
        query: AvailabilityQuery,
        viewer: Option<AuthenticatedUser>,
    ) -> Result<AvailabilityResponse, AppError> {
        let (start_date, end_date) = query.dates()?;
        let customer_id = viewer
            .filter(|user| user.account_type == AccountType::Customer)
            .map(|user| user.user_id);

        let result = self
            .availability
            .check_with_quote(car_id, start_date, end_date, customer_id)
            .await?;
        Ok(result.into())
    }

    pub async fn create(
        &self,
        customer_id: Uuid,
        request: CreateBookingRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        request.validate()?;
        let draft = request.into_draft()?;

        let booking = self
            .lifecycle
            .create_booking(customer_id, draft, Utc::now().date_naive())
            .await?;
        Ok(ApiResponse::success_with_message(booking.into(), "Reserva creada exitosamente"))
    }

    pub async fn list(
        &self,
        customer_id: Uuid,
        query: BookingListQuery,
    ) -> Result<ApiResponse<Vec<BookingResponse>>, AppError> {
        let bookings = self
            .bookings
            .list_for_customer(customer_id, query.status_filter()?)
            .await?;
        Ok(ApiResponse::success(bookings.into_iter().map(BookingResponse::from).collect()))
    }

    pub async fn history(&self, customer_id: Uuid) -> Result<ApiResponse<Vec<BookingResponse>>, AppError> {
        let bookings = self
            .bookings
            .list_for_customer(customer_id, Some(BookingStatus::Completed))
            .await?;
        Ok(ApiResponse::success(bookings.into_iter().map(BookingResponse::from).collect()))
    }

    pub async fn detail(&self, user: &AuthenticatedUser, booking_id: Uuid) -> Result<ApiResponse<BookingResponse>, AppError> {
        let actor = match user.account_type {
            AccountType::Customer => Actor::Customer(user.user_id),
            AccountType::Owner => Actor::Owner(user.user_id),
        };
        let booking = self.lifecycle.load_for(actor, booking_id).await?;
        Ok(ApiResponse::success(booking.into()))
    }

    pub async fn cancel(&self, customer_id: Uuid, booking_id: Uuid) -> Result<ApiResponse<BookingResponse>, AppError> {
        let booking = self.lifecycle.cancel(customer_id, booking_id).await?;
        Ok(ApiResponse::success_with_message(booking.into(), "Reserva cancelada"))
    }

    pub async fn start_payment(
        &self,
        customer_id: Uuid,
        booking_id: Uuid,
    ) -> Result<ApiResponse<PaymentIntentResponse>, AppError> {
        let booking = self.lifecycle.start_payment(customer_id, booking_id).await?;
        Ok(ApiResponse::success(PaymentIntentResponse {
            booking_id: booking.id,
            amount: booking.amount_due(),
            payment_intent_id: booking.payment_intent_id,
            currency: DEFAULT_CURRENCY.to_string(),
        }))
    }

    pub async fn reschedule(
        &self,
        customer_id: Uuid,
        booking_id: Uuid,
        request: RescheduleRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let (start_date, end_date) = request.dates()?;
        let booking = self
            .lifecycle
            .reschedule(customer_id, booking_id, start_date, end_date, Utc::now().date_naive())
            .await?;
        Ok(ApiResponse::success_with_message(booking.into(), "Fechas actualizadas"))
    }

    /// Reseña única por reserva, solo sobre reservas completadas
    pub async fn review(
        &self,
        customer_id: Uuid,
        booking_id: Uuid,
        request: CreateReviewRequest,
    ) -> Result<ApiResponse<Review>, AppError> {
        request.validate()?;

        let booking = self.lifecycle.load_for(Actor::Customer(customer_id), booking_id).await?;
        if booking.status != BookingStatus::Completed {
            return Err(validation_error("Only completed bookings can be reviewed"));
        }

        let review = self.reviews.create(booking.id, request.rating, request.comment).await?;
        info!("⭐ Reseña {} para la reserva {}", review.rating, booking.id);
        Ok(ApiResponse::success(review))
    }

    pub async fn payment_webhook(&self, event: PaymentEvent) -> Result<WebhookAck, AppError> {
        let outcome = self.webhooks.handle(&event).await?;
        let outcome = match outcome {
            WebhookOutcome::Confirmed(id) => format!("booking {} paid", id),
            WebhookOutcome::PaymentFailed(id) => format!("booking {} payment failed", id),
            WebhookOutcome::Ignored(reason) => reason,
        };
        Ok(WebhookAck { received: true, outcome })
    }

    pub async fn dashboard(&self, customer_id: Uuid) -> Result<ApiResponse<CustomerDashboard>, AppError> {
        let counts = self
            .bookings
            .customer_counts(customer_id, Utc::now().date_naive())
            .await?;
        let recent = self.bookings.list_for_customer(customer_id, None).await?;

        Ok(ApiResponse::success(CustomerDashboard {
            total_bookings: counts.total_bookings,
            active_bookings: counts.active_bookings,
            completed_bookings: counts.completed_bookings,
            upcoming_bookings: counts.upcoming_bookings,
            loyalty_points: counts.completed_bookings * LOYALTY_POINTS_PER_BOOKING,
            recent_bookings: recent.into_iter().take(5).map(BookingResponse::from).collect(),
        }))
    }
}
