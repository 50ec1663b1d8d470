//! Tests for `AppError` -> envelope mapping.
//!
//! Every failure must leave as an envelope at transport status 200 with the
//! logical status in `code`. These call `IntoResponse` directly.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use quill_api::error::{AppError, FieldError};
use quill_core::error::CoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Explicit failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_keeps_entity_message() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Content",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 404);
    assert_eq!(json["message"], "Content with id 42 not found");
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn explicit_http_failure_is_verbatim() {
    let (status, json) = error_to_response(AppError::http(418_u16, "I'm a teapot")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 418);
    assert_eq!(json["message"], "I'm a teapot");
}

#[tokio::test]
async fn conflict_maps_to_409() {
    let err = AppError::Core(CoreError::Conflict("Username already registered".into()));
    let (_, json) = error_to_response(err).await;
    assert_eq!(json["code"], 409);
    assert_eq!(json["message"], "Username already registered");
}

#[tokio::test]
async fn unauthorized_and_forbidden_keep_their_codes() {
    let (_, json) = error_to_response(AppError::Core(CoreError::Unauthorized(
        "Could not validate credentials".into(),
    )))
    .await;
    assert_eq!(json["code"], 401);

    let (_, json) = error_to_response(AppError::Core(CoreError::Forbidden(
        "Not enough permissions".into(),
    )))
    .await;
    assert_eq!(json["code"], 403);
    assert_eq!(json["message"], "Not enough permissions");
}

#[tokio::test]
async fn core_validation_maps_to_400() {
    let (_, json) =
        error_to_response(AppError::Core(CoreError::Validation("Inactive user".into()))).await;
    assert_eq!(json["code"], 400);
    assert_eq!(json["message"], "Inactive user");
}

// ---------------------------------------------------------------------------
// Validation failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_failure_lists_every_field() {
    let err = AppError::Validation(vec![
        FieldError::new(["body", "title"], "field required"),
        FieldError::new(["query", "page"], "page must be between 1 and 1000000"),
    ]);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 400);
    assert_eq!(
        json["message"],
        "request parameter validation failed: body -> title: field required; query -> page: page must be between 1 and 1000000"
    );
    assert!(json["data"].is_null());
}

// ---------------------------------------------------------------------------
// Catch-all
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_failure_carries_its_description() {
    let (status, json) = error_to_response(AppError::Internal("division by zero".into())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 500);
    assert_eq!(json["message"], "internal server error: division by zero");
}

#[tokio::test]
async fn unclassified_database_error_is_500() {
    let (_, json) = error_to_response(AppError::Database(sqlx::Error::PoolTimedOut)).await;
    assert_eq!(json["code"], 500);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("internal server error: "));
}

#[tokio::test]
async fn missing_row_is_404() {
    let (_, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(json["code"], 404);
    assert_eq!(json["message"], "Resource not found");
}
