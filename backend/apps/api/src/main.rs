//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level failures are
//! normalized by the edge layer.

use axum::{
    Router, http,
    http::{Method, header},
};
use edge::{EdgeChain, EdgeConfig, edge_router, spawn_stale_sweeper};
use platform::clock::SystemClock;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,edge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Edge configuration; a missing or weak secret aborts startup
    let config = EdgeConfig::from_env()?;
    tracing::info!(
        default_max = config.policies.default_policy().max_requests,
        default_window_secs = config.policies.default_policy().window.as_secs(),
        token_ttl_secs = config.token_ttl_secs(),
        trusted_proxies = config.trusted_proxies.len(),
        "Edge configuration loaded"
    );

    let chain = Arc::new(EdgeChain::from_config(&config, Arc::new(SystemClock)));

    if let Some(every) = config.sweep_interval {
        spawn_stale_sweeper(chain.limiter().clone(), chain.clock().clone(), every);
        tracing::info!(every_secs = every.as_secs(), "Stale counter sweeper started");
    }

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .expose_headers([header::RETRY_AFTER])
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .merge(edge_router(chain))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
        .parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
