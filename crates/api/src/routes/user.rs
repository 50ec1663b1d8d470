use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// User routes, merged into `/api/v1`.
///
/// The collection answers with and without the trailing slash.
///
/// ```text
/// GET    /user/                -> list_users
/// POST   /user/                -> create_user (superuser)
/// GET    /user/{id}            -> get_user (id or username)
/// DELETE /user/{id}            -> delete_user (superuser)
/// PATCH  /user/{id}/password   -> update_user_password (self or superuser)
/// ```
pub fn router() -> Router<AppState> {
    let collection = get(user::list_users).post(user::create_user);

    Router::new()
        .route("/user/", collection.clone())
        .route("/user", collection)
        .route("/user/{id}", get(user::get_user).delete(user::delete_user))
        .route("/user/{id}/password", patch(user::update_user_password))
}
