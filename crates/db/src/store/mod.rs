//! Transactional unit of work for annotation writes.
//!
//! [`SpanStore`] opens a [`SpanTransaction`]; everything the writer reads and
//! writes for one attempt goes through that transaction and becomes visible
//! only on [`SpanTransaction::commit`]. The store owns the uniqueness of
//! `(document, start, end)`: a racing writer that claimed the same offsets
//! surfaces as [`StoreError::Conflict`], never as a second row.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use doclabel_core::span::ExistingSpan;
use doclabel_core::types::{DbId, Offset};

use crate::models::annotation::{Annotation, NewAnnotation};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::{PgSpanStore, PgSpanTransaction};

/// PostgreSQL unique violation.
const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL serialization failure under SERIALIZABLE isolation.
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// A concurrent transaction won the race. Safe to retry from scratch.
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// Any other persistence failure.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let contended = matches!(
                db_err.code().as_deref(),
                Some(SQLSTATE_UNIQUE_VIOLATION)
                    | Some(SQLSTATE_SERIALIZATION_FAILURE)
                    | Some(SQLSTATE_DEADLOCK_DETECTED)
            );
            if contended {
                return Self::Conflict(db_err.message().to_string());
            }
        }
        Self::Unavailable(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// What the writer needs to know about a live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct DocumentSnapshot {
    pub id: DbId,
    pub project_id: DbId,
    /// Text length in characters.
    pub text_length: Offset,
    pub is_annotated: bool,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Source of write transactions.
#[async_trait]
pub trait SpanStore: Send + Sync {
    type Tx: SpanTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// One attempt's view of the store. Dropping it without committing discards
/// every staged change.
#[async_trait]
pub trait SpanTransaction: Send + Sized {
    /// The document if it exists and is not soft-deleted.
    async fn document(&mut self, document_id: DbId)
        -> Result<Option<DocumentSnapshot>, StoreError>;

    /// Project owning the label, if the label exists.
    async fn label_project(&mut self, label_id: DbId) -> Result<Option<DbId>, StoreError>;

    /// Offsets of every live span of the document.
    async fn live_spans(&mut self, document_id: DbId) -> Result<Vec<ExistingSpan>, StoreError>;

    async fn find_annotation(&mut self, annotation_id: DbId)
        -> Result<Option<Annotation>, StoreError>;

    async fn insert_annotation(&mut self, input: &NewAnnotation)
        -> Result<Annotation, StoreError>;

    /// Returns `true` if a row was removed.
    async fn delete_annotation(&mut self, annotation_id: DbId) -> Result<bool, StoreError>;

    async fn count_live_annotations(&mut self, document_id: DbId) -> Result<i64, StoreError>;

    async fn set_annotated(&mut self, document_id: DbId, annotated: bool)
        -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}
