//! Repository for the `content` table.

use quill_core::types::DbId;
use sqlx::PgPool;

use crate::models::content::{Content, CreateContent, UpdateContent};

const COLUMNS: &str = "id, title, slug, text, published, created_time, tags, user_id";

/// Provides CRUD operations for content entries.
pub struct ContentRepo;

impl ContentRepo {
    /// Insert new content, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateContent) -> Result<Content, sqlx::Error> {
        let query = format!(
            "INSERT INTO content (title, slug, text, published, tags, user_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.text)
            .bind(input.published)
            .bind(&input.tags)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Content>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content WHERE id = $1");
        sqlx::query_as::<_, Content>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the oldest entry carrying `slug`. Slugs are not unique.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Content>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content WHERE slug = $1 ORDER BY id LIMIT 1");
        sqlx::query_as::<_, Content>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List a page of content ordered by id.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Content>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Content>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of content rows, for pagination.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM content")
            .fetch_one(pool)
            .await
    }

    /// List every entry owned by a user.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Content>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, Content>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update content. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateContent,
    ) -> Result<Option<Content>, sqlx::Error> {
        let query = format!(
            "UPDATE content SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                text = COALESCE($4, text),
                published = COALESCE($5, published),
                tags = COALESCE($6, tags)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.text)
            .bind(input.published)
            .bind(&input.tags)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete content. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM content WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
