//! Document entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use doclabel_core::types::{DbId, Timestamp};

/// A document row from the `documents` table.
///
/// `is_annotated` is derived from the live annotation set and is only
/// written by [`crate::writer::AnnotationWriter`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub project_id: DbId,
    pub title: Option<String>,
    pub text: String,
    pub is_annotated: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for uploading a document into a project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDocument {
    #[validate(length(max = 100))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub text: String,
}

/// Filters for listing the documents of a project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentFilter {
    pub is_annotated: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
