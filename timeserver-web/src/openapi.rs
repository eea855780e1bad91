//! OpenAPI specification for the timeserver

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::{
    ErrorResponse, KeyRecord, LogLevelBody, MessageResponse, TimezoneBody, TokenResponse,
};

/// Main OpenAPI specification for the timeserver
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timeserver API",
        description = "Time zone configuration server with API key and token authentication",
        license(
            name = "Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8081", description = "Local server")
    ),
    paths(
        crate::handlers::get_time,
        crate::handlers::get_spec,

        crate::handlers::issue_token,

        crate::handlers::get_log_level,
        crate::handlers::set_log_level,

        crate::handlers::get_timezone,
        crate::handlers::set_timezone,

        crate::handlers::list_keys,
        crate::handlers::put_key,
        crate::handlers::get_key,
        crate::handlers::delete_key,
    ),
    components(
        schemas(
            TimezoneBody,
            LogLevelBody,
            TokenResponse,
            KeyRecord,
            MessageResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Time", description = "Public endpoints"),
        (name = "Authentication", description = "Token issuance"),
        (name = "Logging", description = "Runtime log level"),
        (name = "Configuration", description = "Time zone configuration"),
        (name = "Administration", description = "API key management"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security schemes: API key header and bearer token
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    timeserver_auth::API_KEY_HEADER,
                ))),
            );
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Timeserver API");
        assert!(openapi.paths.paths.contains_key("/api/token"));
        assert!(openapi.paths.paths.contains_key("/api/admin/keys/{id}"));
    }

    #[test]
    fn test_openapi_json_has_security_schemes() {
        let json = ApiDoc::openapi().to_pretty_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let schemes = &value["components"]["securitySchemes"];

        assert_eq!(schemes["api_key"]["name"], "X-API-KEY");
        assert_eq!(schemes["bearer"]["scheme"], "bearer");
    }
}
