//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-annotated user routes into one OpenAPI document,
//! served at `/api/v1/openapi.json` behind the API-key gate.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Assembled OpenAPI spec for the user service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "cruder API",
        version = "0.1.0",
        description = "CRUD service for the user resource, gated by a shared X-API-Key secret.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::users::list_users,
        crate::routes::users::get_user_by_username,
        crate::routes::users::get_user_by_id,
        crate::routes::users::create_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
    ),
    components(schemas(
        crate::routes::users::UserRequest,
        crate::routes::users::UserResponse,
        crate::error::ErrorBody,
    )),
    modifiers(&ApiKeyScheme),
    security(("api_key" = [])),
    tags(
        (name = "users", description = "User resource"),
    )
)]
pub struct ApiDoc;

/// Adds the `X-API-Key` header scheme to the OpenAPI spec.
struct ApiKeyScheme;

impl Modify for ApiKeyScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/openapi.json", get(openapi_json))
}

/// GET /api/v1/openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
