use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use chrono::Utc;
use tracing::info;

use crate::dto::ApiResponse;
use crate::middleware::auth::require_admin;
use crate::services::reconciliation::ReconcileReport;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Operaciones de mantenimiento protegidas por ADMIN_TOKEN
pub fn create_admin_router() -> Router<AppState> {
    Router::new().route("/reconcile", post(run_reconciliation))
}

async fn run_reconciliation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ReconcileReport>>, AppError> {
    require_admin(&headers, state.config.admin_token.as_deref())?;

    info!("🛠️ Reconciliación solicitada manualmente");
    let report = state.reconciliation_job().run(Utc::now().date_naive()).await?;
    Ok(Json(ApiResponse::success(report)))
}
