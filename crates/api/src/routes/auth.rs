use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, profile};
use crate::state::AppState;

/// Token and profile routes, mounted directly under `/api/v1`.
///
/// ```text
/// POST   /token           -> login (form)
/// POST   /refresh_token   -> refresh_token
/// GET    /profile         -> my_profile
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/token", post(auth::login))
        .route("/refresh_token", post(auth::refresh_token))
        .route("/profile", get(profile::my_profile))
}
