//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use doclabel_core::types::{DbId, Timestamp};

/// Project kinds accepted by the `ck_projects_project_type` constraint.
pub const PROJECT_TYPES: &[&str] = &["document_classification", "sequence_labeling", "seq2seq"];

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub project_type: String,
    pub randomize_document_order: bool,
    pub owner_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `sequence_labeling` if omitted.
    pub project_type: Option<String>,
    pub randomize_document_order: Option<bool>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub randomize_document_order: Option<bool>,
}
