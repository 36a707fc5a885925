//! Repository for the `documents` table.
//!
//! Nothing here writes `is_annotated`. That flag belongs to the annotation
//! writer.

use sqlx::PgPool;
use doclabel_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use doclabel_core::types::DbId;

use crate::models::document::{CreateDocument, Document, DocumentFilter};

const COLUMNS: &str = "id, project_id, title, text, is_annotated, created_at, updated_at";

pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new, unannotated document into a project.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateDocument,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents (project_id, title, text)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.text)
            .fetch_one(pool)
            .await
    }

    /// Find a live document by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a live document, only if it belongs to `project_id`.
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE id = $1 AND project_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Page through a project's live documents in upload order, optionally
    /// keeping only annotated (or only unannotated) ones.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let limit = clamp_limit(filter.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let offset = clamp_offset(filter.offset);
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE project_id = $1
               AND deleted_at IS NULL
               AND ($2::BOOLEAN IS NULL OR is_annotated = $2)
             ORDER BY id ASC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(project_id)
            .bind(filter.is_annotated)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Returns `true` if a live row was marked deleted. Annotations are kept.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE documents SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
