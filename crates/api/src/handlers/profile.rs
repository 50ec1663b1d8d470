//! Handler for the caller's own profile.

use axum::extract::State;
use quill_db::repositories::ContentRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::schemas::content::ContentData;
use crate::schemas::security::{UserData, UserResponse};
use crate::state::AppState;

/// GET /api/v1/profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Envelope with the caller's user record", body = UserData)
    ),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn my_profile(auth: AuthUser, State(state): State<AppState>) -> AppResult<UserResponse> {
    let user = auth.account;
    let contents = ContentRepo::list_by_user(&state.pool, user.id)
        .await?
        .into_iter()
        .map(ContentData::from)
        .collect();

    Ok(UserResponse::from_user(user, contents))
}
