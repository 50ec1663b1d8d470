//! Content resource schemas.

use quill_core::content::{join_tags, slugify, split_tags, TAG_SEPARATOR};
use quill_core::types::DbId;
use quill_db::models::content::{Content, CreateContent, UpdateContent};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::trimmed_opt;
use crate::error::{AppError, FieldError};
use crate::response::Envelope;

pub const CONTENT_RETRIEVED: &str = "content retrieved successfully";

/// Content as returned to clients. Tags are exposed as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContentData {
    #[schema(value_type = i64)]
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub text: String,
    pub published: bool,
    pub created_time: String,
    pub tags: Vec<String>,
    #[schema(value_type = Option<i64>)]
    pub user_id: Option<DbId>,
}

impl From<Content> for ContentData {
    fn from(row: Content) -> Self {
        Self {
            tags: split_tags(&row.tags),
            id: row.id,
            title: row.title,
            slug: row.slug,
            text: row.text,
            published: row.published,
            created_time: row.created_time,
            user_id: row.user_id,
        }
    }
}

pub type ContentResponse = Envelope<ContentData>;

impl ContentResponse {
    pub fn from_row(row: Content) -> Self {
        Envelope::success_with_message(ContentData::from(row), CONTENT_RETRIEVED)
    }
}

/// Tags accepted either as a list or as an already-joined string.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Tags {
    List(Vec<String>),
    Joined(String),
}

impl Tags {
    /// Stored form, or `None` when there is nothing to store.
    ///
    /// Items are trimmed and blank items dropped, in either input form.
    pub fn stored(&self) -> Option<String> {
        let kept: Vec<&str> = match self {
            Tags::List(items) => items
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect(),
            Tags::Joined(raw) => raw
                .split(TAG_SEPARATOR)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect(),
        };
        (!kept.is_empty()).then(|| join_tags(&kept))
    }
}

/// Body of content create and update requests.
///
/// All fields are optional on the wire; `title` and `text` are required
/// when creating.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ContentIncoming {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub text: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub tags: Option<Tags>,
}

impl ContentIncoming {
    /// Slug derived from the title, if one was given.
    pub fn slug(&self) -> Option<String> {
        self.title.as_deref().map(slugify)
    }

    pub fn stored_tags(&self) -> Option<String> {
        self.tags.as_ref().and_then(Tags::stored)
    }

    /// Insert DTO owned by `user_id`. `published` defaults to `false`.
    pub fn into_create(self, user_id: DbId) -> Result<CreateContent, AppError> {
        let slug = self.slug();
        let tags = self.stored_tags().unwrap_or_default();

        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push(FieldError::new(["body", "title"], "field required"));
        }
        if self.text.is_none() {
            missing.push(FieldError::new(["body", "text"], "field required"));
        }
        let (Some(title), Some(text), Some(slug)) = (self.title, self.text, slug) else {
            return Err(AppError::Validation(missing));
        };

        Ok(CreateContent {
            title,
            slug,
            text,
            published: self.published.unwrap_or(false),
            tags,
            user_id,
        })
    }

    /// Patch DTO; only fields present in the request are applied.
    pub fn into_update(self) -> UpdateContent {
        UpdateContent {
            slug: self.slug(),
            tags: self.stored_tags(),
            title: self.title,
            text: self.text,
            published: self.published,
        }
    }
}
