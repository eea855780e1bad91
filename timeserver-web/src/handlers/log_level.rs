//! Log level handlers

use super::types::LogLevelBody;
use crate::{auth::Identity, error::ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    Extension,
};
use timeserver_core::{level_name, parse_level};
use tracing::info;

/// Get the global log level
#[utoipa::path(
    get,
    path = "/api/log/level",
    tag = "Logging",
    summary = "Get log level",
    responses(
        (status = 200, description = "Current log level", body = LogLevelBody),
        (status = 401, description = "Unauthorized", body = super::ErrorResponse)
    ),
    security(("api_key" = []), ("bearer" = []))
)]
pub async fn get_log_level(State(state): State<AppState>) -> Json<LogLevelBody> {
    Json(LogLevelBody {
        level: level_name(state.log_level.level()).to_string(),
    })
}

/// Change the global log level
#[utoipa::path(
    put,
    path = "/api/log/level",
    tag = "Logging",
    summary = "Set log level",
    request_body = LogLevelBody,
    responses(
        (status = 200, description = "New log level", body = LogLevelBody),
        (status = 400, description = "Unknown level", body = super::ErrorResponse),
        (status = 401, description = "Unauthorized", body = super::ErrorResponse)
    ),
    security(("api_key" = []), ("bearer" = []))
)]
pub async fn set_log_level(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    payload: Result<Json<LogLevelBody>, JsonRejection>,
) -> ApiResult<Json<LogLevelBody>> {
    let Json(request) = payload?;
    let level = parse_level(&request.level)?;
    state.log_level.set_level(level)?;

    info!("Log level set to {} by {}", level_name(level), caller.user);
    Ok(Json(LogLevelBody {
        level: level_name(level).to_string(),
    }))
}
