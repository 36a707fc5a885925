//! PostgreSQL implementation of the span store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use doclabel_core::span::ExistingSpan;
use doclabel_core::types::{DbId, Offset};

use super::{DocumentSnapshot, SpanStore, SpanTransaction, StoreError};
use crate::models::annotation::{Annotation, NewAnnotation};
use crate::repositories::annotation_repo::COLUMNS;

/// Opens SERIALIZABLE transactions on a connection pool.
///
/// Identical offsets collide on `uq_annotations_document_offsets`; overlaps
/// between different offsets are caught by serialization failure. Both map to
/// [`StoreError::Conflict`].
#[derive(Debug, Clone)]
pub struct PgSpanStore {
    pool: PgPool,
}

impl PgSpanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpanStore for PgSpanStore {
    type Tx = PgSpanTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;
        Ok(PgSpanTransaction { tx })
    }
}

pub struct PgSpanTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SpanTransaction for PgSpanTransaction {
    async fn document(
        &mut self,
        document_id: DbId,
    ) -> Result<Option<DocumentSnapshot>, StoreError> {
        let row = sqlx::query_as::<_, DocumentSnapshot>(
            "SELECT id, project_id, char_length(text)::BIGINT AS text_length, is_annotated
             FROM documents
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(document_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn label_project(&mut self, label_id: DbId) -> Result<Option<DbId>, StoreError> {
        let project_id = sqlx::query_scalar("SELECT project_id FROM labels WHERE id = $1")
            .bind(label_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(project_id)
    }

    async fn live_spans(&mut self, document_id: DbId) -> Result<Vec<ExistingSpan>, StoreError> {
        let rows: Vec<(DbId, Offset, Offset)> = sqlx::query_as(
            "SELECT id, start_offset, end_offset FROM annotations
             WHERE document_id = $1
             ORDER BY start_offset ASC",
        )
        .bind(document_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, start, end)| ExistingSpan { id, start, end })
            .collect())
    }

    async fn find_annotation(
        &mut self,
        annotation_id: DbId,
    ) -> Result<Option<Annotation>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM annotations WHERE id = $1");
        let row = sqlx::query_as::<_, Annotation>(&query)
            .bind(annotation_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn insert_annotation(&mut self, input: &NewAnnotation) -> Result<Annotation, StoreError> {
        let query = format!(
            "INSERT INTO annotations
                (document_id, label_id, annotator_id, start_offset, end_offset, manual, confidence)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Annotation>(&query)
            .bind(input.document_id)
            .bind(input.label_id)
            .bind(input.annotator_id)
            .bind(input.start_offset)
            .bind(input.end_offset)
            .bind(input.origin.is_manual())
            .bind(input.origin.confidence())
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn delete_annotation(&mut self, annotation_id: DbId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM annotations WHERE id = $1")
            .bind(annotation_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_live_annotations(&mut self, document_id: DbId) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM annotations WHERE document_id = $1")
            .bind(document_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count)
    }

    async fn set_annotated(&mut self, document_id: DbId, annotated: bool) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE documents SET is_annotated = $2
             WHERE id = $1 AND is_annotated IS DISTINCT FROM $2",
        )
        .bind(document_id)
        .bind(annotated)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
