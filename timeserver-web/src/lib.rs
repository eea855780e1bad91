//! Timeserver Web Server
//!
//! HTTP surface of the timeserver: the public time endpoint, the OpenAPI
//! document, and the role-gated configuration and administration API.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use error::ApiError;
pub use server::{TimeServer, TimeServerBuilder};
pub use state::AppState;

use axum::{routing::get, Router};
use timeserver_auth::AuthError;
use timeserver_core::TimeserverError;
use tower_http::trace::TraceLayer;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::get_time))
        .route("/spec", get(handlers::get_spec))
        .nest("/api", routes::api_routes(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] TimeserverError),

    #[error("Authentication setup failed: {0}")]
    Auth(#[from] AuthError),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
