//! OpenAPI document and the interactive documentation pages.
//!
//! These routes live under the default envelope exclusions, so the JSON
//! document and both HTML pages reach clients unmodified.

use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::handlers;
use crate::routes::health;
use crate::schemas::content::{ContentData, ContentIncoming, Tags};
use crate::schemas::security::{
    LoginForm, RefreshToken, TokenData, UserCreate, UserData, UserPasswordPatch,
};
use crate::state::AppState;

pub const OPENAPI_PATH: &str = "/openapi.json";

/// Shape of every enveloped response, for documentation only.
#[derive(Debug, Serialize, ToSchema)]
pub struct EnvelopeSchema {
    /// Logical status code (200, 201, 400, 401, 403, 404, 405, 408, 409, 500, ...).
    pub code: u16,
    pub message: String,
    /// Payload; `null` on failures.
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

/// Register the bearer token scheme used by protected operations.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the HTTP API.
///
/// Every documented response is delivered inside an [`EnvelopeSchema`] at
/// transport status 200; the body types listed per operation describe the
/// envelope's `data`.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Quill API",
        description = "Content and user management API with uniform response envelopes."
    ),
    paths(
        health::health_check,
        handlers::auth::login,
        handlers::auth::refresh_token,
        handlers::profile::my_profile,
        handlers::user::list_users,
        handlers::user::create_user,
        handlers::user::get_user,
        handlers::user::update_user_password,
        handlers::user::delete_user,
        handlers::content::list_content,
        handlers::content::get_content,
        handlers::content::list_user_content,
        handlers::content::create_content,
        handlers::content::update_content,
        handlers::content::delete_content,
    ),
    components(schemas(
        EnvelopeSchema,
        health::HealthResponse,
        TokenData,
        RefreshToken,
        LoginForm,
        UserData,
        UserCreate,
        UserPasswordPatch,
        ContentData,
        ContentIncoming,
        Tags,
    )),
    tags(
        (name = "auth", description = "Token issue and refresh"),
        (name = "user", description = "User management"),
        (name = "content", description = "Content management"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn swagger_ui() -> Html<String> {
    Html(format!(
        r##"<!DOCTYPE html>
<html>
<head>
  <title>Quill API - Swagger UI</title>
  <meta charset="utf-8"/>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>SwaggerUIBundle({{ url: "{OPENAPI_PATH}", dom_id: "#swagger-ui" }});</script>
</body>
</html>"##
    ))
}

async fn redoc() -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Quill API - ReDoc</title>
  <meta charset="utf-8"/>
</head>
<body>
  <redoc spec-url="{OPENAPI_PATH}"></redoc>
  <script src="https://cdn.jsdelivr.net/npm/redoc@2/bundles/redoc.standalone.js"></script>
</body>
</html>"#
    ))
}

/// Mount documentation routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route(OPENAPI_PATH, get(openapi_json))
        .route("/docs", get(swagger_ui))
        .route("/redoc", get(redoc))
}
