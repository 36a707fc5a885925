//! Repository for the `labels` table.

use sqlx::PgPool;
use doclabel_core::types::DbId;

use crate::models::label::{CreateLabel, Label};

const COLUMNS: &str = "id, project_id, text, background_color, text_color, \
                        prefix_key, suffix_key, created_at, updated_at";

pub struct LabelRepo;

impl LabelRepo {
    /// Insert a label. A duplicate text within the project fails on
    /// `uq_labels_project_text`.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateLabel,
    ) -> Result<Label, sqlx::Error> {
        let query = format!(
            "INSERT INTO labels (project_id, text, background_color, text_color, prefix_key, suffix_key)
             VALUES ($1, $2, COALESCE($3, '#209cee'), COALESCE($4, '#ffffff'), $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Label>(&query)
            .bind(project_id)
            .bind(&input.text)
            .bind(&input.background_color)
            .bind(&input.text_color)
            .bind(&input.prefix_key)
            .bind(&input.suffix_key)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Label>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM labels WHERE id = $1");
        sqlx::query_as::<_, Label>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All labels of a project, in creation order.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Label>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM labels WHERE project_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Label>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
