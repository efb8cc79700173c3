//! Thin HTTP adapter: deserializes the request, calls the orchestrator, maps
//! the result onto a status code and JSON body. No routing logic lives here.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use waypath_common::Coordinate;

use crate::error::Error;
use crate::orchestrator::{self, RouteResponse};
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RouteRequest {
    pub source: Coordinate,
    pub destination: Coordinate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub hint: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.to_string(), hint: kind.hint().to_string() };
        (status, Json(body)).into_response()
    }
}

/// `POST /route`
#[utoipa::path(
    post,
    path = "/route",
    request_body = RouteRequest,
    responses(
        (status = 200, description = "Route found", body = RouteResponse),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse),
        (status = 404, description = "No route or no road data", body = ErrorResponse),
        (status = 500, description = "Internal failure", body = ErrorResponse),
        (status = 503, description = "Upstream unavailable", body = ErrorResponse),
    )
)]
pub async fn route_handler(
    State(state): State<AppState>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, Error> {
    let response = orchestrator::calculate_route(
        &state.cache,
        &state.client,
        &state.fetch_config,
        request.source,
        request.destination,
    )
    .await?;
    Ok(Json(response))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `GET /health`
#[utoipa::path(get, path = "/health", responses((status = 200, description = "Service is live", body = HealthResponse)))]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
