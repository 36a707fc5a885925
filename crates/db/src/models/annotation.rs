//! Annotation (span) entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use doclabel_core::annotation::SpanOrigin;
use doclabel_core::types::{DbId, Offset, Timestamp};

/// An annotation row from the `annotations` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Annotation {
    pub id: DbId,
    pub document_id: DbId,
    pub label_id: DbId,
    pub annotator_id: Option<DbId>,
    pub start_offset: Offset,
    pub end_offset: Offset,
    pub manual: bool,
    pub confidence: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An annotation joined with its label, as listed for a document.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnnotationDetail {
    pub id: DbId,
    pub document_id: DbId,
    pub label_id: DbId,
    pub label_text: String,
    pub background_color: String,
    pub text_color: String,
    pub annotator_id: Option<DbId>,
    pub start_offset: Offset,
    pub end_offset: Offset,
    pub manual: bool,
    pub confidence: f64,
    pub created_at: Timestamp,
}

/// Validated values for a single insert. Only built by the writer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnnotation {
    pub document_id: DbId,
    pub label_id: DbId,
    pub annotator_id: Option<DbId>,
    pub start_offset: Offset,
    pub end_offset: Offset,
    pub origin: SpanOrigin,
}

/// Request body for `POST .../annotations`.
///
/// Offsets stay untyped here so that non-integer input is reported as
/// `INVALID_OFFSET_TYPE` rather than a generic deserialization failure.
/// An absent offset deserializes as `null` and is rejected the same way.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnnotationRequest {
    pub label_id: DbId,
    #[serde(default)]
    pub start_offset: serde_json::Value,
    #[serde(default)]
    pub end_offset: serde_json::Value,
}

/// A document with its spans flattened to `[start, end, label_text]`.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentWithSpans {
    pub id: DbId,
    pub text: String,
    pub labels: Vec<(Offset, Offset, String)>,
}
