//! Response normalization layer.
//!
//! [`EnvelopeLayer`] sits in front of every route and guarantees that each
//! response leaving the service is a `{ code, message, data }` envelope sent
//! with transport status `200 OK`.
//!
//! Per request the layer is in one of two modes:
//!
//! - **passthrough** -- the path starts with an excluded prefix, or the
//!   request is a protocol upgrade (e.g. WebSocket). The response is
//!   forwarded untouched.
//! - **intercepting** -- the response head is rewritten to `200 OK` and the
//!   body is wrapped in [`EnvelopeBody`], which normalizes every data frame
//!   independently (see [`normalize_chunk`]).
//!
//! The layer never fails on its own: anything it cannot parse is forwarded
//! byte-for-byte.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::BoxError;
use bytes::Bytes;
use http_body::{Frame, SizeHint};
use pin_project_lite::pin_project;
use serde_json::Value;
use tower::{Layer, Service};

use crate::response::{is_envelope, Envelope};

/// Path prefixes served untouched by default (API documentation).
pub const DEFAULT_EXCLUDED_PATHS: [&str; 3] = ["/docs", "/redoc", "/openapi.json"];

/// Immutable set of path prefixes for which normalization is skipped.
///
/// Fixed at construction and shared read-only across all requests.
#[derive(Debug, Clone)]
pub struct ExcludedPaths {
    prefixes: Arc<[String]>,
}

impl ExcludedPaths {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `path` starts with any configured prefix.
    pub fn matches(&self, path: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for ExcludedPaths {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_PATHS)
    }
}

/// Tower layer applying [`EnvelopeService`].
///
/// ```ignore
/// let app = Router::new()
///     .route("/items", get(list_items))
///     .layer(EnvelopeLayer::new(ExcludedPaths::default()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvelopeLayer {
    excluded: ExcludedPaths,
}

impl EnvelopeLayer {
    pub fn new(excluded: ExcludedPaths) -> Self {
        Self { excluded }
    }
}

impl<S> Layer<S> for EnvelopeLayer {
    type Service = EnvelopeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        EnvelopeService {
            inner,
            excluded: self.excluded.clone(),
        }
    }
}

/// Service produced by [`EnvelopeLayer`].
#[derive(Debug, Clone)]
pub struct EnvelopeService<S> {
    inner: S,
    excluded: ExcludedPaths,
}

impl<S> EnvelopeService<S> {
    fn mode_for<B>(&self, req: &Request<B>) -> Mode {
        if is_upgrade(req) || self.excluded.matches(req.uri().path()) {
            Mode::Passthrough
        } else {
            Mode::Intercept
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for EnvelopeService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: http_body::Body<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = EnvelopeFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let mode = self.mode_for(&req);
        EnvelopeFuture {
            inner: self.inner.call(req),
            mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Passthrough,
    Intercept,
}

/// Only plain request/response exchanges are normalized; upgraded
/// connections (WebSocket and friends) speak another protocol.
fn is_upgrade<B>(req: &Request<B>) -> bool {
    req.headers().contains_key(header::UPGRADE)
}

pin_project! {
    /// Future returned by [`EnvelopeService`].
    pub struct EnvelopeFuture<F> {
        #[pin]
        inner: F,
        mode: Mode,
    }
}

impl<F, ResBody, E> Future for EnvelopeFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
    ResBody: http_body::Body<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    type Output = Result<Response<Body>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let response = ready!(this.inner.poll(cx))?;
        let response = match this.mode {
            Mode::Passthrough => response.map(Body::new),
            Mode::Intercept => intercept(response),
        };
        Poll::Ready(Ok(response))
    }
}

/// Rewrite the response head and wrap the body for frame normalization.
fn intercept<B>(response: Response<B>) -> Response<Body>
where
    B: http_body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let (mut parts, body) = response.into_parts();
    if parts.status != StatusCode::OK {
        tracing::trace!(status = %parts.status, "Rewriting transport status to 200");
    }
    parts.status = StatusCode::OK;
    // The body may be re-serialized, so any declared length is stale.
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::new(EnvelopeBody::new(body)))
}

pin_project! {
    /// Body wrapper that normalizes each data frame of the inner body.
    ///
    /// Trailers and any other non-data frames are forwarded unchanged, as
    /// are errors from the inner body.
    pub struct EnvelopeBody<B> {
        #[pin]
        inner: B,
    }
}

impl<B> EnvelopeBody<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

impl<B> http_body::Body for EnvelopeBody<B>
where
    B: http_body::Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();
        let frame = match ready!(this.inner.poll_frame(cx)) {
            Some(Ok(frame)) => frame,
            other => return Poll::Ready(other),
        };
        let frame = match frame.into_data() {
            Ok(chunk) => Frame::data(normalize_chunk(chunk)),
            Err(frame) => frame,
        };
        Poll::Ready(Some(Ok(frame)))
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        // Re-serialization changes the length; nothing can be promised.
        SizeHint::default()
    }
}

/// Normalize one body chunk.
///
/// - empty chunks are returned as-is;
/// - chunks that are not valid JSON (including invalid UTF-8) are returned
///   byte-for-byte;
/// - JSON that already has the envelope shape is returned as-is;
/// - any other JSON value becomes the `data` of a success envelope.
pub fn normalize_chunk(chunk: Bytes) -> Bytes {
    if chunk.is_empty() {
        return chunk;
    }
    let Ok(value) = serde_json::from_slice::<Value>(&chunk) else {
        return chunk;
    };
    if is_envelope(&value) {
        return chunk;
    }
    match serde_json::to_vec(&Envelope::success(value)) {
        Ok(wrapped) => Bytes::from(wrapped),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to re-serialize envelope, forwarding original body");
            chunk
        }
    }
}
