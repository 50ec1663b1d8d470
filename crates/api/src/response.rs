//! Shared response envelope types for API handlers.
//!
//! Every body a client sees on a non-excluded path is a
//! `{ "code": ..., "message": ..., "data": ... }` envelope. The transport
//! status is always `200 OK`; the logical status lives in `code`.
//!
//! Handlers may return an [`Envelope`] directly, or return any serializable
//! value and let [`crate::middleware::envelope::EnvelopeLayer`] wrap it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default message attached to successful envelopes.
pub const SUCCESS_MESSAGE: &str = "operation succeeded";

/// Closed vocabulary of logical status codes carried in [`Envelope::code`].
///
/// The numbers mirror HTTP semantics and are part of the wire contract;
/// clients branch on them, so they must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ResponseCode {
    Success = 200,
    Created = 201,
    Accepted = 202,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    Conflict = 409,
    TooManyRequests = 429,
    InternalError = 500,
    NotImplemented = 501,
    BadGateway = 502,
    ServiceUnavailable = 503,
}

impl ResponseCode {
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

impl From<ResponseCode> for u16 {
    fn from(code: ResponseCode) -> Self {
        code.as_u16()
    }
}

/// Standard `{ code, message, data }` response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(code: impl Into<u16>, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data,
        }
    }

    /// Success envelope with the default message.
    pub fn success(data: T) -> Self {
        Self::success_with_message(data, SUCCESS_MESSAGE)
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ResponseCode::Success.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// Error envelope without a payload.
    pub fn error(code: impl Into<u16>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    pub fn error_with_data(code: impl Into<u16>, message: impl Into<String>, data: T) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// Envelope for a caught failure: the status-like code and detail are
    /// carried over verbatim.
    pub fn from_exception(status_code: u16, detail: impl Into<String>) -> Self {
        Self::error(status_code, detail)
    }
}

impl Envelope<Value> {
    /// Success envelope with no payload (`"data": null`).
    pub fn empty() -> Self {
        Self {
            code: ResponseCode::Success.as_u16(),
            message: SUCCESS_MESSAGE.to_string(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Whether a decoded JSON value already has the envelope shape.
///
/// Only the presence of both `code` and `message` keys is checked; their
/// types are not.
pub fn is_envelope(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key("code") && obj.contains_key("message"))
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Payload of a paginated list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Build a page, deriving `pages`, `has_next` and `has_prev`.
    ///
    /// `pages` is `ceil(total / size)`, or `0` when `size <= 0`.
    pub fn create(items: Vec<T>, total: i64, page: i64, size: i64) -> Self {
        let pages = if size > 0 { (total + size - 1) / size } else { 0 };
        Self {
            items,
            total,
            page,
            size,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }
}

/// Envelope whose payload is a [`Page`].
pub type PaginatedEnvelope<T> = Envelope<Page<T>>;

impl<T> Envelope<Page<T>> {
    pub fn paginated(items: Vec<T>, total: i64, page: i64, size: i64) -> Self {
        Self::success(Page::create(items, total, page, size))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_serializes_with_default_message() {
        let env = Envelope::success(json!({"id": 1}));
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"code": 200, "message": "operation succeeded", "data": {"id": 1}})
        );
    }

    #[test]
    fn error_serializes_null_data() {
        let env: Envelope = Envelope::error(ResponseCode::NotFound, "missing");
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"code": 404, "message": "missing", "data": null})
        );
    }

    #[test]
    fn from_exception_keeps_code_and_detail() {
        let env: Envelope = Envelope::from_exception(418, "teapot");
        assert_eq!(env.code, 418);
        assert_eq!(env.message, "teapot");
        assert!(env.data.is_none());
    }

    #[test]
    fn vocabulary_is_stable() {
        let codes: Vec<u16> = [
            ResponseCode::Success,
            ResponseCode::Created,
            ResponseCode::Accepted,
            ResponseCode::BadRequest,
            ResponseCode::Unauthorized,
            ResponseCode::Forbidden,
            ResponseCode::NotFound,
            ResponseCode::MethodNotAllowed,
            ResponseCode::Conflict,
            ResponseCode::TooManyRequests,
            ResponseCode::InternalError,
            ResponseCode::NotImplemented,
            ResponseCode::BadGateway,
            ResponseCode::ServiceUnavailable,
        ]
        .into_iter()
        .map(u16::from)
        .collect();
        assert_eq!(
            codes,
            vec![200, 201, 202, 400, 401, 403, 404, 405, 409, 429, 500, 501, 502, 503]
        );
    }

    #[test]
    fn envelope_shape_requires_code_and_message() {
        assert!(is_envelope(&json!({"code": 1, "message": "x"})));
        assert!(is_envelope(&json!({"code": null, "message": null, "extra": 1})));
        assert!(!is_envelope(&json!({"code": 200})));
        assert!(!is_envelope(&json!({"message": "hi"})));
        assert!(!is_envelope(&json!([{"code": 1, "message": "x"}])));
        assert!(!is_envelope(&json!("code message")));
    }

    // -- pagination law ------------------------------------------------------

    #[test]
    fn pages_round_up() {
        let page = Page::<()>::create(vec![], 21, 1, 10);
        assert_eq!(page.pages, 3);
        assert!(page.has_next);
        assert!(!page.has_prev);
    }

    #[test]
    fn last_page_has_no_next() {
        let page = Page::<()>::create(vec![], 20, 2, 10);
        assert_eq!(page.pages, 2);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn empty_total_has_zero_pages() {
        let page = Page::<()>::create(vec![], 0, 1, 10);
        assert_eq!(page.pages, 0);
        assert!(!page.has_next);
    }

    #[test]
    fn non_positive_size_yields_zero_pages() {
        for size in [0, -5] {
            let page = Page::<()>::create(vec![], 50, 1, size);
            assert_eq!(page.pages, 0);
            assert!(!page.has_next);
        }
    }

    #[test]
    fn pagination_law_holds_over_a_grid() {
        for total in 0..40_i64 {
            for size in 1..7_i64 {
                for page_no in 1..10_i64 {
                    let page = Page::<()>::create(vec![], total, page_no, size);
                    let expected = (total as f64 / size as f64).ceil() as i64;
                    assert_eq!(page.pages, expected, "total={total} size={size}");
                    assert_eq!(page.has_next, page_no < expected);
                    assert_eq!(page.has_prev, page_no > 1);
                }
            }
        }
    }

    #[test]
    fn paginated_envelope_wraps_page() {
        let env = Envelope::paginated(vec![1, 2], 12, 2, 2);
        assert_eq!(env.code, 200);
        assert_eq!(env.message, SUCCESS_MESSAGE);
        let data = env.data.unwrap();
        assert_eq!(data.items, vec![1, 2]);
        assert_eq!(data.pages, 6);
        assert!(data.has_next);
        assert!(data.has_prev);
    }
}
