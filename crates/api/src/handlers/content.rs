//! Handlers for the `/content` resource.
//!
//! Reads are public. Writes need an authenticated caller, and only the
//! owner or a superuser may change or remove an entry.

use axum::extract::State;
use axum::Json;
use quill_core::error::CoreError;
use quill_core::types::DbId;
use quill_db::models::content::Content;
use quill_db::repositories::ContentRepo;
use quill_db::DbPool;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::extract::{ApiPath, ValidatedJson, ValidatedQuery};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{Envelope, PaginatedEnvelope, ResponseCode};
use crate::schemas::content::{ContentData, ContentIncoming, ContentResponse};
use crate::state::AppState;

/// GET /api/v1/content/
#[utoipa::path(
    get,
    path = "/api/v1/content/",
    params(PaginationParams),
    responses((status = 200, description = "Envelope with one page of content", body = [ContentData])),
    tag = "content"
)]
pub async fn list_content(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<PaginatedEnvelope<ContentData>> {
    let rows = ContentRepo::list(&state.pool, params.limit(), params.offset()).await?;
    let total = ContentRepo::count(&state.pool).await?;

    let items = rows.into_iter().map(ContentData::from).collect();
    Ok(Envelope::paginated(items, total, params.page, params.size))
}

/// GET /api/v1/content/{id}
#[utoipa::path(
    get,
    path = "/api/v1/content/{id}",
    params(("id" = String, Path, description = "Numeric id or slug")),
    responses((status = 200, description = "Envelope with the entry; code 404 if absent", body = ContentData)),
    tag = "content"
)]
pub async fn get_content(
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
) -> AppResult<ContentResponse> {
    let found = match key.parse::<DbId>() {
        Ok(id) => ContentRepo::find_by_id(&state.pool, id).await?,
        Err(_) => ContentRepo::find_by_slug(&state.pool, &key).await?,
    };
    let content = found.ok_or_else(|| AppError::not_found("Content not found"))?;
    Ok(ContentResponse::from_row(content))
}

/// GET /api/v1/content/user/{user_id}
///
/// Returns a bare list; the envelope layer wraps it.
#[utoipa::path(
    get,
    path = "/api/v1/content/user/{user_id}",
    params(("user_id" = i64, Path, description = "Owner id")),
    responses((status = 200, description = "Envelope with the user's content", body = [ContentData])),
    tag = "content"
)]
pub async fn list_user_content(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<DbId>,
) -> AppResult<Json<Vec<ContentData>>> {
    let rows = ContentRepo::list_by_user(&state.pool, user_id).await?;
    Ok(Json(rows.into_iter().map(ContentData::from).collect()))
}

/// POST /api/v1/content/
#[utoipa::path(
    post,
    path = "/api/v1/content/",
    request_body = ContentIncoming,
    responses((status = 200, description = "Envelope with code 201 and the new entry", body = ContentData)),
    security(("bearer" = [])),
    tag = "content"
)]
pub async fn create_content(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ContentIncoming>,
) -> AppResult<Envelope<ContentData>> {
    let create = input.into_create(auth.user_id)?;
    let content = ContentRepo::create(&state.pool, &create).await?;

    tracing::info!(content_id = content.id, user_id = auth.user_id, "Content created");

    Ok(Envelope::new(
        ResponseCode::Created,
        "content created successfully",
        Some(ContentData::from(content)),
    ))
}

/// PATCH /api/v1/content/{id}
///
/// Only the fields present in the body are changed.
#[utoipa::path(
    patch,
    path = "/api/v1/content/{id}",
    params(("id" = i64, Path, description = "Content id")),
    request_body = ContentIncoming,
    responses((status = 200, description = "Envelope with the updated entry; code 403 for someone else's content", body = ContentData)),
    security(("bearer" = [])),
    tag = "content"
)]
pub async fn update_content(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(content_id): ApiPath<DbId>,
    ValidatedJson(input): ValidatedJson<ContentIncoming>,
) -> AppResult<ContentResponse> {
    let existing = find_owned(&state.pool, content_id, &auth).await?;

    let content = ContentRepo::update(&state.pool, existing.id, &input.into_update())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Content",
            id: content_id,
        }))?;

    tracing::info!(content_id, user_id = auth.user_id, "Content updated");
    Ok(ContentResponse::from_row(content))
}

/// DELETE /api/v1/content/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/content/{id}",
    params(("id" = i64, Path, description = "Content id")),
    responses((status = 200, description = "Envelope with `{\"ok\": true}`")),
    security(("bearer" = [])),
    tag = "content"
)]
pub async fn delete_content(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(content_id): ApiPath<DbId>,
) -> AppResult<Json<Value>> {
    find_owned(&state.pool, content_id, &auth).await?;
    ContentRepo::delete(&state.pool, content_id).await?;

    tracing::info!(content_id, user_id = auth.user_id, "Content deleted");
    Ok(Json(json!({ "ok": true })))
}

/// Load an entry the caller may modify.
async fn find_owned(pool: &DbPool, content_id: DbId, auth: &AuthUser) -> AppResult<Content> {
    let content = ContentRepo::find_by_id(pool, content_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Content",
            id: content_id,
        }))?;

    if content.user_id != Some(auth.user_id) && !auth.superuser {
        return Err(AppError::Core(CoreError::Forbidden(
            "You don't own this content".into(),
        )));
    }
    Ok(content)
}
