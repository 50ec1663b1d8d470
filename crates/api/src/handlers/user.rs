//! Handlers for the `/user` resource.
//!
//! Listing and lookup need any authenticated caller; creating and deleting
//! users is reserved for superusers.

use axum::extract::State;
use axum::Json;
use quill_core::error::CoreError;
use quill_db::models::user::{CreateUser, User};
use quill_db::repositories::{ContentRepo, UserRepo};
use quill_db::DbPool;
use serde_json::{json, Value};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiPath, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireSuperuser;
use crate::response::{Envelope, ResponseCode};
use crate::schemas::content::ContentData;
use crate::schemas::security::{UserCreate, UserData, UserPasswordPatch, UserResponse};
use crate::state::AppState;

/// GET /api/v1/user/
///
/// Returns a bare list; the envelope layer wraps it.
#[utoipa::path(
    get,
    path = "/api/v1/user/",
    responses((status = 200, description = "Envelope with every user", body = [UserData])),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn list_users(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserData>>> {
    let users = UserRepo::list(&state.pool).await?;

    let mut out = Vec::with_capacity(users.len());
    for user in users {
        let contents = load_contents(&state.pool, &user).await?;
        out.push(UserData::new(user, contents));
    }
    Ok(Json(out))
}

/// POST /api/v1/user/
#[utoipa::path(
    post,
    path = "/api/v1/user/",
    request_body = UserCreate,
    responses(
        (status = 200, description = "Envelope with code 201 and the new user; 409 when the username is taken", body = UserData)
    ),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn create_user(
    RequireSuperuser(admin): RequireSuperuser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UserCreate>,
) -> AppResult<Envelope<UserData>> {
    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username already registered".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::Internal(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            password_hash,
            superuser: input.superuser,
            disabled: input.disabled,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, created_by = admin.user_id, "User created");

    Ok(Envelope::new(
        ResponseCode::Created,
        "user created successfully",
        Some(UserData::from(user)),
    ))
}

/// GET /api/v1/user/{id}
#[utoipa::path(
    get,
    path = "/api/v1/user/{id}",
    params(("id" = String, Path, description = "Numeric id or username")),
    responses((status = 200, description = "Envelope with the user; code 404 if absent", body = UserData)),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn get_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
) -> AppResult<UserResponse> {
    let user = resolve_user(&state.pool, &key).await?;
    let contents = load_contents(&state.pool, &user).await?;
    Ok(UserResponse::from_user(user, contents))
}

/// PATCH /api/v1/user/{id}/password
///
/// Callers may change their own password; superusers may change anyone's.
#[utoipa::path(
    patch,
    path = "/api/v1/user/{id}/password",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserPasswordPatch,
    responses((status = 200, description = "Envelope with the updated user; code 403 for someone else's account", body = UserData)),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn update_user_password(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
    ValidatedJson(patch): ValidatedJson<UserPasswordPatch>,
) -> AppResult<UserResponse> {
    if auth.user_id != user_id && !auth.superuser {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can't update this user password".into(),
        )));
    }

    let password_hash = hash_password(&patch.password)
        .map_err(|e| AppError::Internal(format!("Password hashing error: {e}")))?;

    let user = UserRepo::update_password(&state.pool, user_id, &password_hash)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    tracing::info!(user_id, changed_by = auth.user_id, "Password updated");

    let contents = load_contents(&state.pool, &user).await?;
    Ok(UserResponse::from_user(user, contents))
}

/// DELETE /api/v1/user/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/user/{id}",
    params(("id" = String, Path, description = "Numeric id or username")),
    responses((status = 200, description = "Envelope with `{\"ok\": true}`; code 403 when deleting yourself")),
    security(("bearer" = [])),
    tag = "user"
)]
pub async fn delete_user(
    RequireSuperuser(admin): RequireSuperuser,
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
) -> AppResult<Json<Value>> {
    let user = resolve_user(&state.pool, &key).await?;
    if user.id == admin.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can't delete yourself".into(),
        )));
    }

    if !UserRepo::delete(&state.pool, user.id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.id,
        }));
    }

    tracing::info!(user_id = user.id, deleted_by = admin.user_id, "User deleted");
    Ok(Json(json!({ "ok": true })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look a user up by numeric id, falling back to username.
async fn resolve_user(pool: &DbPool, key: &str) -> AppResult<User> {
    let found = match key.parse::<i64>() {
        Ok(id) => UserRepo::find_by_id(pool, id).await?,
        Err(_) => UserRepo::find_by_username(pool, key).await?,
    };
    found.ok_or_else(|| AppError::not_found("User not found"))
}

async fn load_contents(pool: &DbPool, user: &User) -> AppResult<Vec<ContentData>> {
    Ok(ContentRepo::list_by_user(pool, user.id)
        .await?
        .into_iter()
        .map(ContentData::from)
        .collect())
}
