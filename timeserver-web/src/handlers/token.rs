//! Token issuance handler

use super::types::{TokenQuery, TokenResponse};
use crate::{auth::Identity, error::ApiResult, AppState};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
    Extension,
};
use timeserver_auth::Role;
use tracing::info;

/// Issue a signed token for the calling API key
#[utoipa::path(
    get,
    path = "/api/token",
    tag = "Authentication",
    summary = "Issue token",
    description = "Exchange an API key for a bearer token valid for 6 hours. \
                   The token role defaults to the key's role and may only be lowered.",
    params(TokenQuery),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Unknown role", body = super::ErrorResponse),
        (status = 401, description = "Unauthorized or role above the key's role", body = super::ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn issue_token(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Query(query) = query?;
    let requested = query.role.as_deref().map(str::parse::<Role>).transpose()?;

    let issued = state.issuer.issue(&caller, requested)?;

    info!("Issued {} token for {}", issued.role, caller.user);
    Ok(Json(issued.into()))
}
