//! Annotation write outcomes and error taxonomy.
//!
//! Every terminal failure of an annotation write carries a stable
//! machine-readable code so adapters can map it to a protocol response
//! without inspecting message text.

use serde::Serialize;

use crate::error::CoreError;
use crate::span::RejectReason;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Confidence recorded for human-created annotations.
pub const MANUAL_CONFIDENCE: f64 = 0.0;

/// Lowest accepted confidence probability.
pub const MIN_CONFIDENCE: f64 = 0.0;

/// Highest accepted confidence probability.
pub const MAX_CONFIDENCE: f64 = 1.0;

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// Who produced an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpanOrigin {
    /// Created by a person; confidence is [`MANUAL_CONFIDENCE`].
    Manual,
    /// Suggested by a model with the given confidence.
    Suggested { confidence: f64 },
}

impl SpanOrigin {
    pub fn is_manual(self) -> bool {
        matches!(self, Self::Manual)
    }

    pub fn confidence(self) -> f64 {
        match self {
            Self::Manual => MANUAL_CONFIDENCE,
            Self::Suggested { confidence } => confidence,
        }
    }
}

/// Validate that a confidence probability is finite and within `[0, 1]`.
pub fn validate_confidence(confidence: f64) -> Result<(), CoreError> {
    if !confidence.is_finite() {
        return Err(CoreError::Validation(
            "confidence must be a finite number".to_string(),
        ));
    }
    if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&confidence) {
        return Err(CoreError::Validation(format!(
            "confidence must be between {MIN_CONFIDENCE} and {MAX_CONFIDENCE}, got {confidence}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Terminal failure of an annotation create or delete.
///
/// Transient write conflicts never appear here; the writer retries them and
/// only reports [`AnnotationError::WriteConflictExhausted`] once its attempt
/// budget is spent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnnotationError {
    /// The candidate span failed validation. Never retried.
    #[error("Annotation rejected: {0}")]
    Rejected(RejectReason),

    /// A suggested annotation carried a confidence outside `[0, 1]`.
    #[error("Invalid confidence {0}: must be between 0 and 1")]
    InvalidConfidence(f64),

    /// The referenced document, label or annotation does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Concurrent writers kept winning the race for this document.
    #[error("Write conflict persisted after {attempts} attempts")]
    WriteConflictExhausted { attempts: u32 },

    /// Persistence failed for a reason unrelated to contention.
    #[error("Annotation store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AnnotationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Rejected(reason) => reason.code(),
            Self::InvalidConfidence(_) => "INVALID_CONFIDENCE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::WriteConflictExhausted { .. } => "WRITE_CONFLICT_EXHAUSTED",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Whether a client may reasonably resubmit the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::WriteConflictExhausted { .. })
    }
}

impl From<RejectReason> for AnnotationError {
    fn from(reason: RejectReason) -> Self {
        Self::Rejected(reason)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
