//! Maintains `documents.is_annotated`.
//!
//! Called by the writer on the same transaction as the span mutation, so the
//! flag and the span set commit or roll back together.

use doclabel_core::types::DbId;

use crate::store::{SpanTransaction, StoreError};

pub(crate) struct DocumentStateTracker;

impl DocumentStateTracker {
    /// A span was just inserted: the document is annotated.
    pub(crate) async fn mark_annotated<T: SpanTransaction>(
        tx: &mut T,
        document_id: DbId,
    ) -> Result<(), StoreError> {
        tx.set_annotated(document_id, true).await
    }

    /// Recount live spans and persist `annotated = count > 0`.
    pub(crate) async fn recompute<T: SpanTransaction>(
        tx: &mut T,
        document_id: DbId,
    ) -> Result<bool, StoreError> {
        let annotated = tx.count_live_annotations(document_id).await? > 0;
        tx.set_annotated(document_id, annotated).await?;
        Ok(annotated)
    }
}
