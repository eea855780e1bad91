//! Access guard middleware
//!
//! Every protected route group is wrapped in [`enforce`] with its own
//! [`Guard`]. Admitted requests carry the caller's [`Identity`] as a request
//! extension.

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use timeserver_auth::{AccessGate, AccessPolicy, Credential, API_KEY_HEADER};

pub use timeserver_auth::Identity;

/// Gate plus the policy of the routes it protects
#[derive(Debug, Clone)]
pub struct Guard {
    gate: AccessGate,
    policy: AccessPolicy,
}

impl Guard {
    pub fn new(gate: AccessGate, policy: AccessPolicy) -> Self {
        Self { gate, policy }
    }
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Admit the request or answer with a uniform 401
pub async fn enforce(State(guard): State<Guard>, mut request: Request, next: Next) -> Response {
    let api_key = header_value(&request, API_KEY_HEADER);
    let authorization = header_value(&request, AUTHORIZATION.as_str());
    let credential = Credential::select(api_key.as_deref(), authorization.as_deref());

    match guard.gate.admit(credential, &guard.policy).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(_) => ApiError::Unauthorized.into_response(),
    }
}
