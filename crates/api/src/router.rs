//! Shared application router builder.
//!
//! [`build_app_router`] is used by both the binary and the integration
//! tests, so they run the exact same middleware stack.

use std::any::Any;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::error::{unclassified_envelope, AppError};
use crate::middleware::envelope::EnvelopeLayer;
use crate::response::ResponseCode;
use crate::routes;
use crate::state::AppState;

/// Build the full application [`Router`] with all middleware layers.
///
/// From the outside in:
///
/// 1. CORS
/// 2. Set request ID on incoming requests
/// 3. Propagate request ID to the response
/// 4. Envelope normalization (status forced to 200)
/// 5. Structured request/response tracing
/// 6. Request timeout, reported as a `408` envelope
/// 7. Panic recovery, reported as a `500` envelope
///
/// Unknown paths and unsupported methods get `404` / `405` envelopes.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(config);

    Router::new()
        // Health and documentation at root level (not under /api/v1).
        .merge(routes::health::router())
        .merge(routes::docs::router())
        // API v1 routes.
        .nest("/api/v1", routes::api_routes())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        // -- Middleware stack (applied bottom-up) --
        .layer(CatchPanicLayer::custom(panic_to_envelope))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(Duration::from_secs(config.request_timeout_secs)),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(EnvelopeLayer::new(config.excluded_paths.clone()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Build the CORS layer from server configuration.
///
/// Origins that are not valid header values are logged and skipped.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Turn a caught panic into a catch-all `500` envelope.
pub fn panic_to_envelope(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "Handler panicked");
    unclassified_envelope(&detail).into_response()
}

/// Map errors raised by tower middleware (timeouts) onto [`AppError`].
async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::http(StatusCode::REQUEST_TIMEOUT.as_u16(), "request timed out")
    } else {
        AppError::Internal(err.to_string())
    }
}

async fn not_found() -> AppError {
    AppError::http(ResponseCode::NotFound, "Not Found")
}

async fn method_not_allowed() -> AppError {
    AppError::http(ResponseCode::MethodNotAllowed, "Method Not Allowed")
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    async fn envelope_of(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn string_panic_keeps_its_message() {
        let response = panic_to_envelope(Box::new("division by zero".to_string()));
        assert_eq!(response.status(), StatusCode::OK);
        let body = envelope_of(response).await;
        assert_eq!(body["code"], 500);
        assert_eq!(body["message"], "internal server error: division by zero");
    }

    #[tokio::test]
    async fn opaque_panic_payload_is_labelled() {
        let body = envelope_of(panic_to_envelope(Box::new(17_u8))).await;
        assert_eq!(body["message"], "internal server error: unknown panic");
    }

    #[tokio::test]
    async fn elapsed_maps_to_request_timeout() {
        let slow = ServiceBuilder::new()
            .timeout(Duration::from_millis(10))
            .service_fn(|_: ()| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, BoxError>(())
            });
        let elapsed = slow.oneshot(()).await.unwrap_err();

        let err = handle_middleware_error(elapsed).await;
        let body = envelope_of(err.into_response()).await;
        assert_eq!(body["code"], 408);
        assert_eq!(body["message"], "request timed out");
    }

    #[tokio::test]
    async fn other_middleware_errors_are_internal() {
        let err = handle_middleware_error("overloaded".into()).await;
        let body = envelope_of(err.into_response()).await;
        assert_eq!(body["code"], 500);
        assert_eq!(body["message"], "internal server error: overloaded");
    }
}
