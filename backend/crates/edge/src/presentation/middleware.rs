//! Edge Middleware
//!
//! Runs the [`EdgeChain`] in front of an axum router.

use axum::Json;
use axum::body::Body;
use axum::extract::{ConnectInfo, FromRequestParts, MatchedPath, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::report::{FailureReport, INTERNAL_ERROR_DETAIL};
use platform::client::client_key;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::application::chain::{AuthRequirement, EdgeChain, EdgeRequest};
use crate::application::normalize::classify_response;
use crate::domain::principal::Principal;
use crate::error::EdgeError;

/// Endpoint key shared by every request that matched no route
pub const UNMATCHED_ENDPOINT_KEY: &str = "<unmatched>";

/// Middleware state
#[derive(Clone)]
pub struct EdgeMiddlewareState {
    pub chain: Arc<EdgeChain>,
    pub auth: AuthRequirement,
}

/// Middleware that rate limits, authenticates and normalizes one request
///
/// The endpoint key is the matched route template, so it must be installed
/// with `route_layer`. Without a matched route every request shares
/// [`UNMATCHED_ENDPOINT_KEY`], so random paths cannot mint fresh counters.
pub async fn edge_guard(
    State(state): State<EdgeMiddlewareState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let client_key = client_key(req.headers(), direct_ip, state.chain.trusted_proxies());

    let endpoint_key = req
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ENDPOINT_KEY, |path| path.as_str())
        .to_owned();

    let bearer = bearer_token(req.headers()).map(str::to_owned);

    let request = EdgeRequest {
        client_key: &client_key,
        endpoint_key: &endpoint_key,
        bearer: bearer.as_deref(),
        auth: state.auth,
    };

    state
        .chain
        .run(request, |principal| async move {
            let mut req = req;
            if let Some(principal) = principal {
                req.extensions_mut().insert(principal);
            }
            classify_response(next.run(req).await)
        })
        .await
        .into_response()
}

/// Extract the credential from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Response for a panicking handler, for `CatchPanicLayer::custom`
///
/// The panic message goes into the failure report, never the body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "non-string panic payload".to_string()
    };

    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "detail": INTERNAL_ERROR_DETAIL })),
    )
        .into_response();
    response
        .extensions_mut()
        .insert(FailureReport::unclassified(format!("handler panicked: {message}")));
    response
}

/// Handlers behind a `Bearer` guard take the principal as an extractor
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = EdgeError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .ok_or(EdgeError::CredentialInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(authorization: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(authorization));
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_panic_response_reports_message() {
        let response = panic_response(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let report = response.extensions().get::<FailureReport>().unwrap();
        assert!(report.detail.contains("index out of bounds"));
    }
}
