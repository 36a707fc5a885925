//! Read-side queries for the `annotations` table.
//!
//! Mutations are owned by [`crate::writer::AnnotationWriter`] so that span
//! validation and the document's annotated flag cannot be bypassed.

use sqlx::PgPool;
use doclabel_core::types::{DbId, Offset};

use crate::models::annotation::{Annotation, AnnotationDetail};

pub(crate) const COLUMNS: &str = "id, document_id, label_id, annotator_id, start_offset, \
                                   end_offset, manual, confidence, created_at, updated_at";

const DETAIL_COLUMNS: &str = "a.id, a.document_id, a.label_id, l.text AS label_text, \
                               l.background_color, l.text_color, a.annotator_id, \
                               a.start_offset, a.end_offset, a.manual, a.confidence, a.created_at";

pub struct AnnotationRepo;

impl AnnotationRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Annotation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM annotations WHERE id = $1");
        sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Spans of a document ordered by position, joined with their labels.
    pub async fn list_by_document(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Vec<AnnotationDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM annotations a
             JOIN labels l ON l.id = a.label_id
             WHERE a.document_id = $1
             ORDER BY a.start_offset ASC, a.id ASC"
        );
        sqlx::query_as::<_, AnnotationDetail>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }

    /// `(document_id, start, end, label_text)` for every span of the given
    /// documents, ordered by document then position.
    pub async fn list_spans_for_documents(
        pool: &PgPool,
        document_ids: &[DbId],
    ) -> Result<Vec<(DbId, Offset, Offset, String)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT a.document_id, a.start_offset, a.end_offset, l.text
             FROM annotations a
             JOIN labels l ON l.id = a.label_id
             WHERE a.document_id = ANY($1)
             ORDER BY a.document_id ASC, a.start_offset ASC, a.id ASC",
        )
        .bind(document_ids)
        .fetch_all(pool)
        .await
    }
}
