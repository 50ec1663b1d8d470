use axum::routing::get;
use axum::Router;

use crate::handlers::content;
use crate::state::AppState;

/// Content routes, merged into `/api/v1`.
///
/// ```text
/// GET    /content/                -> list_content (paginated)
/// POST   /content/                -> create_content
/// GET    /content/user/{user_id}  -> list_user_content
/// GET    /content/{id}            -> get_content (id or slug)
/// PATCH  /content/{id}            -> update_content (owner or superuser)
/// DELETE /content/{id}            -> delete_content (owner or superuser)
/// ```
pub fn router() -> Router<AppState> {
    let collection = get(content::list_content).post(content::create_content);

    Router::new()
        .route("/content/", collection.clone())
        .route("/content", collection)
        .route("/content/user/{user_id}", get(content::list_user_content))
        .route(
            "/content/{id}",
            get(content::get_content)
                .patch(content::update_content)
                .delete(content::delete_content),
        )
}
