//! HTTP Handlers

use axum::Json;
use kernel::error::app_error::AppError;

use crate::domain::principal::Principal;
use crate::presentation::dto::{HealthResponse, WhoAmIResponse};

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// GET /api/whoami
pub async fn whoami(principal: Principal) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        user_id: principal.user_id(),
    })
}

/// Fallback for unmatched paths
pub async fn not_found() -> AppError {
    AppError::not_found("Not found")
}
