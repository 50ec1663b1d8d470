//! Application error type and the failure-to-envelope mapper.
//!
//! Every failure raised on the request path ends up as an [`Envelope`] at
//! transport status `200`. Failures are classified by an ordered table of
//! `(predicate, mapper)` pairs; the first matching predicate wins:
//!
//! 1. explicit failures carrying a caller-chosen status and message,
//! 2. request validation failures aggregated from field-level errors,
//! 3. everything else, mapped to `500`.

use std::fmt;

use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use quill_core::error::CoreError;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::response::{Envelope, ResponseCode};

/// Prefix of the aggregated validation message.
pub const VALIDATION_PREFIX: &str = "request parameter validation failed: ";

/// Prefix of the message for unclassified failures.
pub const INTERNAL_PREFIX: &str = "internal server error: ";

/// Separator between location segments of a [`FieldError`].
const LOC_SEPARATOR: &str = " -> ";

/// Separator between rendered field errors.
const ERROR_SEPARATOR: &str = "; ";

/// A single field-level validation error.
///
/// `loc` is the path to the offending value, starting with where it came
/// from (`body`, `query`, `path`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
}

impl FieldError {
    pub fn new<I, S>(loc: I, msg: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            loc: loc.into_iter().map(Into::into).collect(),
            msg: msg.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.loc.join(LOC_SEPARATOR), self.msg)
    }
}

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] so handlers can return `AppResult<T>` and
/// still produce a well-formed envelope on failure.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `quill_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An explicit failure with a status-like code and a verbatim detail.
    #[error("{detail}")]
    Http { status: u16, detail: String },

    /// The inbound request did not match its expected shape.
    #[error("{}", compose_validation_message(.0))]
    Validation(Vec<FieldError>),

    /// A database error from sqlx.
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// An internal error with a human-readable message.
    #[error("{0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn http(status: impl Into<u16>, detail: impl Into<String>) -> Self {
        Self::Http {
            status: status.into(),
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::http(ResponseCode::NotFound, detail)
    }

    /// Flatten `validator` errors into field errors rooted at `source`.
    pub fn from_validation(errors: &ValidationErrors, source: &str) -> Self {
        let mut out = Vec::new();
        flatten_validation_errors(errors, &[source.to_string()], &mut out);
        Self::Validation(out)
    }

    /// Status code and detail for failures the caller classified explicitly.
    fn explicit_status(&self) -> Option<(u16, String)> {
        match self {
            AppError::Http { status, detail } => Some((*status, detail.clone())),
            AppError::Core(core) => {
                let code = match core {
                    CoreError::NotFound { .. } | CoreError::NotFoundByKey { .. } => {
                        ResponseCode::NotFound
                    }
                    CoreError::Validation(_) => ResponseCode::BadRequest,
                    CoreError::Conflict(_) => ResponseCode::Conflict,
                    CoreError::Unauthorized(_) => ResponseCode::Unauthorized,
                    CoreError::Forbidden(_) => ResponseCode::Forbidden,
                    CoreError::Internal(_) => return None,
                };
                Some((code.as_u16(), core.to_string()))
            }
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::Validation(_) | AppError::Internal(_) => None,
        }
    }
}

/// Classify the database errors that have a meaningful client-facing status.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else is left for the catch-all.
fn classify_sqlx_error(err: &sqlx::Error) -> Option<(u16, String)> {
    match err {
        sqlx::Error::RowNotFound => Some((
            ResponseCode::NotFound.as_u16(),
            "Resource not found".to_string(),
        )),
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            constraint.starts_with("uq_").then(|| {
                (
                    ResponseCode::Conflict.as_u16(),
                    format!("Duplicate value violates unique constraint: {constraint}"),
                )
            })
        }
        _ => None,
    }
}

/// Join field errors into the single client-facing validation message.
pub fn compose_validation_message(errors: &[FieldError]) -> String {
    let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!("{VALIDATION_PREFIX}{}", rendered.join(ERROR_SEPARATOR))
}

fn flatten_validation_errors(errors: &ValidationErrors, loc: &[String], out: &mut Vec<FieldError>) {
    // HashMap order is unstable; sort so the composed message is deterministic.
    let mut fields: Vec<(String, &ValidationErrorsKind)> = errors
        .errors()
        .iter()
        .map(|(field, kind)| (field.to_string(), kind))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    for (field, kind) in fields {
        let mut path = loc.to_vec();
        if field != "__all__" {
            path.push(field);
        }
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let msg = err
                        .message
                        .as_ref()
                        .map_or_else(|| err.code.to_string(), ToString::to_string);
                    out.push(FieldError {
                        loc: path.clone(),
                        msg,
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                flatten_validation_errors(nested, &path, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    let mut item_path = path.clone();
                    item_path.push(index.to_string());
                    flatten_validation_errors(nested, &item_path, out);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Failure dispatch
// ---------------------------------------------------------------------------

type Predicate = fn(&AppError) -> bool;
type Mapper = fn(&AppError) -> Envelope;

/// Ordered failure handlers; the first matching predicate wins.
const FAILURE_HANDLERS: [(Predicate, Mapper); 3] = [
    (is_explicit, map_explicit),
    (is_validation, map_validation),
    (is_any, map_unclassified),
];

fn is_explicit(err: &AppError) -> bool {
    err.explicit_status().is_some()
}

fn is_validation(err: &AppError) -> bool {
    matches!(err, AppError::Validation(_))
}

fn is_any(_: &AppError) -> bool {
    true
}

fn map_explicit(err: &AppError) -> Envelope {
    match err.explicit_status() {
        Some((status, detail)) => Envelope::from_exception(status, detail),
        None => map_unclassified(err),
    }
}

fn map_validation(err: &AppError) -> Envelope {
    match err {
        AppError::Validation(errors) => Envelope::from_exception(
            ResponseCode::BadRequest.as_u16(),
            compose_validation_message(errors),
        ),
        other => map_unclassified(other),
    }
}

fn map_unclassified(err: &AppError) -> Envelope {
    unclassified_envelope(err)
}

/// Catch-all envelope for any failure text, including panics.
pub fn unclassified_envelope(failure: &dyn fmt::Display) -> Envelope {
    Envelope::error(
        ResponseCode::InternalError,
        format!("{INTERNAL_PREFIX}{failure}"),
    )
}

/// Map a failure to its envelope through the ordered handler table.
pub fn to_envelope(err: &AppError) -> Envelope {
    FAILURE_HANDLERS
        .iter()
        .find(|(matches, _)| matches(err))
        .map_or_else(|| map_unclassified(err), |(_, map)| map(err))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let envelope = to_envelope(&self);
        if envelope.code >= ResponseCode::InternalError.as_u16() {
            tracing::error!(error = %self, code = envelope.code, "Unhandled failure");
        } else {
            tracing::debug!(error = %self, code = envelope.code, "Request failed");
        }
        envelope.into_response()
    }
}

// ---------------------------------------------------------------------------
// Extractor rejections
// ---------------------------------------------------------------------------

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![FieldError::new(["body"], rejection.body_text())])
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Validation(vec![FieldError::new(["body"], rejection.body_text())])
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(vec![FieldError::new(["query"], rejection.body_text())])
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(vec![FieldError::new(["path"], rejection.body_text())])
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use validator::{Validate, ValidationError};

    use super::*;

    #[test]
    fn validation_message_joins_locations_and_errors() {
        let errors = vec![
            FieldError::new(["body", "title"], "field required"),
            FieldError::new(["body", "tags"], "not a list"),
        ];
        assert_eq!(
            compose_validation_message(&errors),
            "request parameter validation failed: body -> title: field required; body -> tags: not a list"
        );
    }

    #[test]
    fn dispatcher_prefers_explicit_status() {
        let env = to_envelope(&AppError::http(ResponseCode::Conflict, "taken"));
        assert_eq!(env.code, 409);
        assert_eq!(env.message, "taken");
    }

    #[test]
    fn core_internal_falls_through_to_catch_all() {
        let env = to_envelope(&AppError::Core(CoreError::Internal("boom".into())));
        assert_eq!(env.code, 500);
        assert_eq!(env.message, "internal server error: boom");
    }

    #[test]
    fn row_not_found_is_explicit() {
        let env = to_envelope(&AppError::Database(sqlx::Error::RowNotFound));
        assert_eq!(env.code, 404);
    }

    #[test]
    fn other_database_errors_are_unclassified() {
        let env = to_envelope(&AppError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(env.code, 500);
        assert!(env.message.starts_with(INTERNAL_PREFIX));
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(range(min = 1))]
        age: i32,
        #[validate(nested)]
        inner: Inner,
    }

    #[derive(Validate)]
    struct Inner {
        #[validate(custom(function = "always_fails"))]
        field: String,
    }

    fn always_fails(_: &str) -> Result<(), ValidationError> {
        let mut err = ValidationError::new("bad");
        err.message = Some("is bad".into());
        Err(err)
    }

    #[test]
    fn validator_errors_flatten_in_field_order() {
        let sample = Sample {
            name: "ab".into(),
            age: 0,
            inner: Inner {
                field: String::new(),
            },
        };
        let errors = sample.validate().unwrap_err();

        let err = AppError::from_validation(&errors, "body");
        let fields = assert_matches!(&err, AppError::Validation(fields) => fields);
        assert_eq!(
            fields,
            &vec![
                FieldError::new(["body", "age"], "range"),
                FieldError::new(["body", "inner", "field"], "is bad"),
                FieldError::new(["body", "name"], "too short"),
            ]
        );
        assert_eq!(to_envelope(&err).code, 400);
    }
}
