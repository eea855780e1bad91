//! API key administration handlers

use super::types::{KeyRecord, MessageResponse};
use crate::{
    auth::Identity,
    error::{ApiError, ApiResult},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    Extension,
};
use timeserver_auth::{KeyInfo, Role};
use tracing::info;

fn key_not_found() -> ApiError {
    ApiError::NotFound("API key not found".to_string())
}

/// List every API key
#[utoipa::path(
    get,
    path = "/api/admin/keys",
    tag = "Administration",
    summary = "List API keys",
    responses(
        (status = 200, description = "All API keys", body = Vec<KeyRecord>),
        (status = 401, description = "Unauthorized", body = super::ErrorResponse)
    ),
    security(("api_key" = []), ("bearer" = []))
)]
pub async fn list_keys(State(state): State<AppState>) -> ApiResult<Json<Vec<KeyRecord>>> {
    let keys = state.registry.all().await?;
    Ok(Json(keys.into_iter().map(KeyRecord::from).collect()))
}

/// Create or replace an API key
#[utoipa::path(
    put,
    path = "/api/admin/keys",
    tag = "Administration",
    summary = "Upsert API key",
    request_body = KeyRecord,
    responses(
        (status = 200, description = "API key stored", body = MessageResponse),
        (status = 400, description = "Invalid record", body = super::ErrorResponse),
        (status = 401, description = "Unauthorized", body = super::ErrorResponse)
    ),
    security(("api_key" = []), ("bearer" = []))
)]
pub async fn put_key(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    payload: Result<Json<KeyRecord>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(record) = payload?;
    let role: Role = record.role.parse()?;
    let info = KeyInfo::new(record.id, record.user, role);
    info.validate()?;

    state.registry.add(&info.id, &info).await?;

    info!(
        "API key for {} with role {} stored by {}",
        info.user, info.role, caller.user
    );
    Ok(Json(MessageResponse::new(format!(
        "created API key: user={:?} role={}",
        info.user, info.role
    ))))
}

/// Get one API key
#[utoipa::path(
    get,
    path = "/api/admin/keys/{id}",
    tag = "Administration",
    summary = "Get API key",
    params(("id" = String, Path, description = "The API key")),
    responses(
        (status = 200, description = "API key record", body = KeyRecord),
        (status = 401, description = "Unauthorized", body = super::ErrorResponse),
        (status = 404, description = "API key not found", body = super::ErrorResponse)
    ),
    security(("api_key" = []), ("bearer" = []))
)]
pub async fn get_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<KeyRecord>> {
    state
        .registry
        .get(&id)
        .await?
        .map(|info| Json(KeyRecord::from(info)))
        .ok_or_else(key_not_found)
}

/// Delete an API key
#[utoipa::path(
    delete,
    path = "/api/admin/keys/{id}",
    tag = "Administration",
    summary = "Delete API key",
    description = "Tokens already issued for the key stay valid until they expire.",
    params(("id" = String, Path, description = "The API key")),
    responses(
        (status = 200, description = "API key deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = super::ErrorResponse),
        (status = 404, description = "API key not found", body = super::ErrorResponse)
    ),
    security(("api_key" = []), ("bearer" = []))
)]
pub async fn delete_key(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.registry.delete(&id).await? {
        return Err(key_not_found());
    }

    info!("API key deleted by {}", caller.user);
    Ok(Json(MessageResponse::new("API key deleted")))
}
