//! Content entity model and DTOs.

use quill_core::types::DbId;
use sqlx::FromRow;

/// Full row from the `content` table.
///
/// `tags` is the stored comma-joined form; `created_time` is an ISO-8601 string.
#[derive(Debug, Clone, FromRow)]
pub struct Content {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub text: String,
    pub published: bool,
    pub created_time: String,
    pub tags: String,
    pub user_id: Option<DbId>,
}

/// DTO for inserting new content.
#[derive(Debug)]
pub struct CreateContent {
    pub title: String,
    pub slug: String,
    pub text: String,
    pub published: bool,
    pub tags: String,
    pub user_id: DbId,
}

/// DTO for patching content. Only `Some` fields are applied.
#[derive(Debug, Default)]
pub struct UpdateContent {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub text: Option<String>,
    pub published: Option<bool>,
    pub tags: Option<String>,
}
