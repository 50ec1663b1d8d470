pub mod auth;
pub mod content;
pub mod docs;
pub mod health;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /token                     login (public, form body)
/// /refresh_token             refresh (public)
/// /profile                   caller's own user
///
/// /user/                     list, create (create: superuser)
/// /user/{id}                 get, delete (delete: superuser)
/// /user/{id}/password        change password
///
/// /content/                  paginated list, create
/// /content/user/{user_id}    content owned by a user
/// /content/{id}              get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(user::router())
        .merge(content::router())
}
