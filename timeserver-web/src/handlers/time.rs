//! Public endpoints

use crate::{openapi::ApiDoc, AppState};
use axum::{extract::State, response::Json};
use utoipa::OpenApi;

/// Current time in the configured zone
#[utoipa::path(
    get,
    path = "/",
    tag = "Time",
    summary = "Current time",
    description = "Current time in the configured time zone, RFC 3339 formatted",
    responses(
        (status = 200, description = "Current time", body = String)
    )
)]
pub async fn get_time(State(state): State<AppState>) -> Json<String> {
    Json(state.timezone.now().to_rfc3339())
}

/// OpenAPI document of this server
#[utoipa::path(
    get,
    path = "/spec",
    tag = "Time",
    summary = "OpenAPI document",
    responses(
        (status = 200, description = "OpenAPI 3 document")
    )
)]
pub async fn get_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
