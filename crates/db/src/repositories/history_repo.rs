//! Repository for the `document_history` table.

use sqlx::PgPool;
use doclabel_core::types::DbId;

use crate::models::history::HistoryEntry;

pub struct HistoryRepo;

impl HistoryRepo {
    /// Record that `user_id` worked on `document_id`, then trim the user's
    /// history to its newest `keep` entries.
    ///
    /// Revisiting a document replaces its operation and moves it to the
    /// front rather than adding a second row.
    pub async fn record(
        pool: &PgPool,
        user_id: DbId,
        document_id: DbId,
        operation: &str,
        keep: i64,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO document_history (user_id, document_id, operation)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, document_id) DO UPDATE SET
                 operation = EXCLUDED.operation",
        )
        .bind(user_id)
        .bind(document_id)
        .bind(operation)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM document_history
             WHERE user_id = $1
               AND id NOT IN (
                   SELECT id FROM document_history
                   WHERE user_id = $1
                   ORDER BY updated_at DESC, id DESC
                   LIMIT $2
               )",
        )
        .bind(user_id)
        .bind(keep)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    /// The user's history, most recent first. Entries whose document or
    /// project has since been deleted are skipped.
    pub async fn list_recent(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, HistoryEntry>(
            "SELECT h.document_id, d.project_id, p.name AS project_name, d.title,
                    h.operation, h.updated_at AS visited_at
             FROM document_history h
             JOIN documents d ON d.id = h.document_id AND d.deleted_at IS NULL
             JOIN projects p ON p.id = d.project_id AND p.deleted_at IS NULL
             WHERE h.user_id = $1
             ORDER BY h.updated_at DESC, h.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
