//! Request handlers, one module per resource.

pub mod account;
pub mod admin;
pub mod annotation;
pub mod auth;
pub mod document;
pub mod label;
pub mod project;

use doclabel_core::error::CoreError;
use doclabel_core::types::DbId;
use doclabel_db::models::document::Document;
use doclabel_db::models::project::Project;
use doclabel_db::repositories::{DocumentRepo, ProjectRepo};
use doclabel_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Run `validator` rules on a request body, mapping failures to 400.
pub(crate) fn validate_input<T: Validate>(input: &T) -> AppResult<()> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))
}

/// Load a live project or fail with 404.
pub(crate) async fn ensure_project(pool: &DbPool, project_id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))
}

/// Load a live document of a live project or fail with 404.
pub(crate) async fn ensure_document(
    pool: &DbPool,
    project_id: DbId,
    document_id: DbId,
) -> AppResult<Document> {
    ensure_project(pool, project_id).await?;
    DocumentRepo::find_in_project(pool, project_id, document_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id: document_id,
        }))
}
