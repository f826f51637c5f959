//! Response DTOs

use serde::Serialize;

/// GET /health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /api/whoami
#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: i64,
}
