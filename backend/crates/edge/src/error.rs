//! Edge Error Types
//!
//! Every way a request can fail at the edge, and how each one is rendered.
//! Only these shapes ever leave the process:
//! throttled, invalid credential, expired credential, generic internal error,
//! plus client errors produced downstream, which pass through untouched.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind, report::INTERNAL_ERROR_DETAIL};
use platform::rate_limit::PolicyParseError;
use thiserror::Error;

/// Edge result type alias
pub type EdgeResult<T> = Result<T, EdgeError>;

/// Edge error variants
#[derive(Debug, Error)]
pub enum EdgeError {
    /// Client exhausted its budget for this endpoint
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    /// Missing, malformed or badly signed bearer credential
    #[error("Invalid token")]
    CredentialInvalid,

    /// Correctly signed credential past its expiry
    #[error("Token has expired")]
    CredentialExpired,

    /// No network identity to key the rate limiter on
    #[error("Unable to identify client")]
    ClientUnidentified,

    /// Recognized client error raised downstream (not found, forbidden, ...)
    #[error(transparent)]
    ClientRejected(AppError),

    /// Recognized infrastructure error raised downstream
    #[error("Infrastructure failure: {0}")]
    InfrastructureFailure(String),

    /// Anything else that went wrong downstream
    #[error("Unclassified failure: {0}")]
    UnclassifiedFailure(String),
}

impl EdgeError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EdgeError::RateLimitExceeded { .. } => ErrorKind::TooManyRequests,
            EdgeError::CredentialInvalid | EdgeError::CredentialExpired => ErrorKind::Unauthorized,
            EdgeError::ClientUnidentified => ErrorKind::BadRequest,
            EdgeError::ClientRejected(err) => err.kind(),
            EdgeError::InfrastructureFailure(_) | EdgeError::UnclassifiedFailure(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            EdgeError::InfrastructureFailure(detail) => {
                tracing::error!(detail = %detail, "Downstream infrastructure failure");
            }
            EdgeError::UnclassifiedFailure(detail) => {
                tracing::error!(detail = %detail, "Unclassified downstream failure");
            }
            EdgeError::CredentialInvalid => {
                tracing::warn!("Rejected invalid bearer credential");
            }
            EdgeError::CredentialExpired => {
                tracing::warn!("Rejected expired bearer credential");
            }
            EdgeError::ClientUnidentified => {
                tracing::warn!("Request without identifiable client");
            }
            _ => {
                tracing::debug!(error = %self, "Edge error");
            }
        }
    }
}

impl From<AppError> for EdgeError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            EdgeError::ClientRejected(err)
        } else {
            EdgeError::InfrastructureFailure(err.detail())
        }
    }
}

impl From<anyhow::Error> for EdgeError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<AppError>() {
            Ok(app_err) => app_err.into(),
            Err(err) => EdgeError::UnclassifiedFailure(format!("{err:#}")),
        }
    }
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        match self {
            EdgeError::RateLimitExceeded { retry_after_secs } => {
                let body = serde_json::json!({
                    "message": "Too many requests",
                    "retry_after": retry_after_secs,
                });
                (
                    status,
                    [(header::RETRY_AFTER, HeaderValue::from(retry_after_secs))],
                    Json(body),
                )
                    .into_response()
            }
            EdgeError::CredentialInvalid | EdgeError::CredentialExpired => {
                let body = serde_json::json!({ "detail": message });
                (
                    status,
                    [(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
                    Json(body),
                )
                    .into_response()
            }
            EdgeError::ClientUnidentified => {
                (status, Json(serde_json::json!({ "detail": message }))).into_response()
            }
            EdgeError::ClientRejected(err) => err.into_response(),
            EdgeError::InfrastructureFailure(_) | EdgeError::UnclassifiedFailure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "detail": INTERNAL_ERROR_DETAIL })),
            )
                .into_response(),
        }
    }
}

/// Startup configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Signing secret must be at least {min} bytes, got {actual}")]
    SecretTooShort { min: usize, actual: usize },

    #[error("{var} has invalid value `{value}`")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} has invalid address `{value}`")]
    InvalidAddress { var: &'static str, value: String },

    #[error("Invalid rate limit policies: {0}")]
    Policies(#[from] PolicyParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_throttle_body_and_header() {
        let response = EdgeError::RateLimitExceeded { retry_after_secs: 50 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "50");
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "message": "Too many requests", "retry_after": 50 })
        );
    }

    #[tokio::test]
    async fn test_credential_failures_are_distinguishable() {
        let invalid = EdgeError::CredentialInvalid.into_response();
        let expired = EdgeError::CredentialExpired.into_response();

        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(invalid.headers()[header::WWW_AUTHENTICATE], "Bearer");
        assert_eq!(
            body_json(invalid).await,
            serde_json::json!({ "detail": "Invalid token" })
        );
        assert_eq!(
            body_json(expired).await,
            serde_json::json!({ "detail": "Token has expired" })
        );
    }

    #[tokio::test]
    async fn test_internal_failures_share_one_body() {
        for err in [
            EdgeError::InfrastructureFailure("connection to 10.0.0.5:5432 refused".into()),
            EdgeError::UnclassifiedFailure("panicked at src/posts.rs:42".into()),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                body_json(response).await,
                serde_json::json!({ "detail": "Internal server error" })
            );
        }
    }

    #[test]
    fn test_app_error_classification() {
        let rejected: EdgeError = AppError::forbidden("Not the author").into();
        assert!(matches!(rejected, EdgeError::ClientRejected(_)));
        assert_eq!(rejected.status_code(), StatusCode::FORBIDDEN);

        let infra: EdgeError = AppError::service_unavailable("Database unreachable").into();
        assert!(matches!(infra, EdgeError::InfrastructureFailure(_)));
        assert_eq!(infra.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_anyhow_classification() {
        let wrapped: EdgeError = anyhow::Error::new(AppError::not_found("Post not found")).into();
        assert!(matches!(wrapped, EdgeError::ClientRejected(_)));

        let other: EdgeError = anyhow::anyhow!("disk quota exceeded").into();
        assert!(
            matches!(other, EdgeError::UnclassifiedFailure(ref d) if d.contains("disk quota"))
        );
    }
}
