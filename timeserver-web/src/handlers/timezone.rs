//! Time zone configuration handlers

use super::types::TimezoneBody;
use crate::{
    auth::Identity,
    error::{ApiError, ApiResult},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    Extension,
};
use timeserver_core::resolve_zone;
use tracing::info;

/// Get the configured time zone
#[utoipa::path(
    get,
    path = "/api/timezone",
    tag = "Configuration",
    summary = "Get time zone",
    responses(
        (status = 200, description = "Configured time zone", body = TimezoneBody),
        (status = 401, description = "Unauthorized", body = super::ErrorResponse)
    ),
    security(("api_key" = []), ("bearer" = []))
)]
pub async fn get_timezone(State(state): State<AppState>) -> Json<TimezoneBody> {
    Json(TimezoneBody {
        timezone: state.timezone.get().name().to_string(),
    })
}

/// Set the time zone
#[utoipa::path(
    put,
    path = "/api/timezone",
    tag = "Configuration",
    summary = "Set time zone",
    request_body = TimezoneBody,
    responses(
        (status = 200, description = "New time zone", body = TimezoneBody),
        (status = 400, description = "Empty or unknown time zone", body = super::ErrorResponse),
        (status = 401, description = "Unauthorized", body = super::ErrorResponse)
    ),
    security(("api_key" = []), ("bearer" = []))
)]
pub async fn set_timezone(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    payload: Result<Json<TimezoneBody>, JsonRejection>,
) -> ApiResult<Json<TimezoneBody>> {
    let Json(request) = payload?;
    let name = request.timezone.as_str();
    if name.is_empty() {
        return Err(ApiError::Validation("timezone must be set".to_string()));
    }

    let zone = resolve_zone(name)
        .ok_or_else(|| ApiError::Validation(format!("unknown time zone: {}", name)))?;
    state.timezone.set(zone);

    info!("Time zone set to {} by {}", zone.name(), caller.user);
    Ok(Json(TimezoneBody {
        timezone: zone.name().to_string(),
    }))
}
