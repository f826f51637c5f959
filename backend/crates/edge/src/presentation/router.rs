//! Edge Router

use axum::{Router, handler::Handler, middleware, routing::get};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

use crate::application::chain::{AuthRequirement, EdgeChain};
use crate::presentation::handlers;
use crate::presentation::middleware::{EdgeMiddlewareState, edge_guard, panic_response};

/// Put every route of `router` behind the edge chain
///
/// Panics inside handlers are caught inside the guard so they are
/// normalized like any other unclassified failure.
pub fn guard_routes<S>(router: Router<S>, chain: Arc<EdgeChain>, auth: AuthRequirement) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let state = EdgeMiddlewareState { chain, auth };

    router
        .route_layer(CatchPanicLayer::custom(panic_response))
        .route_layer(middleware::from_fn_with_state(state, edge_guard))
}

/// Routes owned by the edge layer itself
///
/// Also installs the fallback: unmatched requests are counted under the
/// default policy before their 404, since `route_layer` never sees them.
pub fn edge_router(chain: Arc<EdgeChain>) -> Router {
    let public = Router::new().route("/health", get(handlers::health));
    let protected = Router::new().route("/api/whoami", get(handlers::whoami));

    let fallback_state = EdgeMiddlewareState {
        chain: chain.clone(),
        auth: AuthRequirement::Public,
    };
    let fallback =
        handlers::not_found.layer(middleware::from_fn_with_state(fallback_state, edge_guard));

    Router::new()
        .merge(guard_routes(public, chain.clone(), AuthRequirement::Public))
        .merge(guard_routes(protected, chain, AuthRequirement::Bearer))
        .fallback(fallback)
}
