//! HTTP facade for Praxis.
//!
//! The server authenticates callers, rate-limits per source address, and
//! routes to the execution engine and the scoring pipeline. The two paths
//! never share state. Middleware concerns (compression, CORS, panic
//! translation) live here at the boundary and stay out of the core crates.

pub mod client;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod sanitize;
pub mod state;
pub mod wire;

use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::SizeAbove;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::state::AppState;

/// Responses below this size are not worth compressing.
const COMPRESSION_MIN_BYTES: u16 = 1000;

/// Build the application router with every boundary layer attached.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/execute", post(routes::execute))
        .route("/telemetry/analyze", post(routes::analyze_telemetry))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::require_api_key,
        ));

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/languages", get(routes::languages))
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ))
        .layer(
            CompressionLayer::new().compress_when(SizeAbove::new(COMPRESSION_MIN_BYTES)),
        )
        .layer(cors_layer(&state.config.allowed_origins))
        .layer(tower_http::catch_panic::CatchPanicLayer::custom(
            error::handle_panic,
        ))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-api-key"),
        ])
        .allow_credentials(true)
}
