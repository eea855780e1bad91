//! Route definitions for the timeserver API
//!
//! Routes are grouped by access policy; each group is wrapped in its own
//! guard and the groups are merged under `/api`.

use crate::{auth::enforce, handlers, AppState};
use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use timeserver_auth::AccessPolicy;

fn guarded(router: Router<AppState>, state: &AppState, policy: AccessPolicy) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state.guard(policy), enforce))
}

/// Create API routes
pub fn api_routes(state: &AppState) -> Router<AppState> {
    // Token issuance (API key only)
    let token = guarded(
        Router::new().route("/token", get(handlers::issue_token)),
        state,
        AccessPolicy::token_issuance(),
    );

    let readers = guarded(
        Router::new()
            .route("/log/level", get(handlers::get_log_level))
            .route("/timezone", get(handlers::get_timezone)),
        state,
        AccessPolicy::readers(),
    );

    let writers = guarded(
        Router::new()
            .route("/log/level", put(handlers::set_log_level))
            .route("/timezone", put(handlers::set_timezone)),
        state,
        AccessPolicy::writers(),
    );

    let admin = guarded(
        Router::new()
            .route(
                "/admin/keys",
                get(handlers::list_keys).put(handlers::put_key),
            )
            .route(
                "/admin/keys/{id}",
                get(handlers::get_key).delete(handlers::delete_key),
            ),
        state,
        AccessPolicy::admins(),
    );

    Router::new()
        .merge(token)
        .merge(readers)
        .merge(writers)
        .merge(admin)
}
