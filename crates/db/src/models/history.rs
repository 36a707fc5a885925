//! Per-user document history (recently worked documents).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use doclabel_core::types::{DbId, Timestamp};

/// Entries kept per user. Older ones are dropped on each new record.
pub const MAX_HISTORY_ENTRIES: i64 = 20;

/// A history row joined with its document and project for display.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HistoryEntry {
    pub document_id: DbId,
    pub project_id: DbId,
    pub project_name: String,
    pub title: Option<String>,
    pub operation: String,
    /// When the user last touched the document.
    pub visited_at: Timestamp,
}

/// Request body for `POST /me/history`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordHistory {
    #[validate(range(min = 1))]
    pub document_id: DbId,
    /// Free-form verb such as `"annotate"` or `"review"`.
    #[validate(length(min = 1, max = 32))]
    pub operation: String,
}
