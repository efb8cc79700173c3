//! HTTP front door and routing orchestrator: wires the fetcher and routing
//! crates into an `axum` service.

pub mod cache;
pub mod config;
pub mod error;
pub mod handler;
pub mod orchestrator;

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use waypath_fetch::FetchConfig;

use crate::cache::GraphCache;
use crate::config::Config;

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub cache: GraphCache,
    pub client: reqwest::Client,
    pub fetch_config: FetchConfig,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .expect("reqwest client configuration is always valid");
        Self {
            cache: GraphCache::new(),
            client,
            fetch_config: FetchConfig {
                upstream_url: config.upstream_url.clone(),
                timeout: config.upstream_timeout,
            },
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handler::route_handler, handler::health_handler),
    components(schemas(
        handler::RouteRequest,
        handler::ErrorResponse,
        handler::HealthResponse,
        orchestrator::RouteResponse,
        orchestrator::Metrics,
        orchestrator::GraphStats,
        orchestrator::DebugInfo,
        waypath_common::Coordinate,
    ))
)]
struct ApiDoc;

/// Builds the full router: the `/route` and `/health` endpoints, the Swagger UI,
/// and CORS/tracing middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/route", post(handler::route_handler))
        .route("/health", get(handler::health_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);
