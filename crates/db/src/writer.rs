//! Validate-then-persist orchestration for annotation spans.
//!
//! [`AnnotationWriter`] runs each create or delete as a transaction against a
//! [`SpanStore`]: load the document and its live spans, validate, stage the
//! mutation together with the document's annotated flag, and commit. A commit
//! that loses a race to a concurrent writer is retried from a fresh
//! transaction until the [`RetryPolicy`] runs out.

use doclabel_core::annotation::{validate_confidence, AnnotationError, SpanOrigin};
use doclabel_core::retry::RetryPolicy;
use doclabel_core::span::{validate, CandidateSpan, Decision, OverlapPolicy};
use doclabel_core::types::DbId;

use crate::models::annotation::{Annotation, NewAnnotation};
use crate::state_tracker::DocumentStateTracker;
use crate::store::{SpanStore, SpanTransaction, StoreError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterConfig {
    pub retry: RetryPolicy,
    pub overlap: OverlapPolicy,
}

// ---------------------------------------------------------------------------
// Inputs and outcomes
// ---------------------------------------------------------------------------

/// A request to annotate `span` of a document with a label.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSpan {
    pub document_id: DbId,
    pub label_id: DbId,
    pub span: CandidateSpan,
    pub annotator_id: Option<DbId>,
    pub origin: SpanOrigin,
}

/// A committed create.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenAnnotation {
    pub annotation: Annotation,
    /// Set when the span relabelled an existing one at identical offsets.
    pub replaced_id: Option<DbId>,
    /// Attempt number that committed, starting at 1.
    pub attempts: u32,
}

/// A committed delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedAnnotation {
    pub annotation_id: DbId,
    pub document_id: DbId,
    /// The document's annotated flag after the delete.
    pub document_annotated: bool,
    pub attempts: u32,
}

/// Why a single attempt did not commit.
enum AttemptError {
    Conflict(String),
    Terminal(AnnotationError),
}

impl From<StoreError> for AttemptError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Unavailable(msg) => Self::Terminal(AnnotationError::StoreUnavailable(msg)),
        }
    }
}

impl From<AnnotationError> for AttemptError {
    fn from(err: AnnotationError) -> Self {
        Self::Terminal(err)
    }
}

// ---------------------------------------------------------------------------
// AnnotationWriter
// ---------------------------------------------------------------------------

/// The only component that mutates annotation rows or `documents.is_annotated`.
pub struct AnnotationWriter<S> {
    store: S,
    config: WriterConfig,
}

impl<S: SpanStore> AnnotationWriter<S> {
    pub fn new(store: S, config: WriterConfig) -> Self {
        Self { store, config }
    }

    /// Insert a span, or relabel the live span at identical offsets.
    ///
    /// Validation failures and missing entities are returned immediately.
    /// Write conflicts are retried; once the attempt budget is spent the
    /// caller gets [`AnnotationError::WriteConflictExhausted`].
    pub async fn create_or_replace(
        &self,
        request: &CreateSpan,
    ) -> Result<WrittenAnnotation, AnnotationError> {
        if let SpanOrigin::Suggested { confidence } = request.origin {
            validate_confidence(confidence)
                .map_err(|_| AnnotationError::InvalidConfidence(confidence))?;
        }

        for attempt in self.config.retry.attempts() {
            match self.try_create(request).await {
                Ok((annotation, replaced_id)) => {
                    tracing::debug!(
                        annotation_id = annotation.id,
                        document_id = request.document_id,
                        ?replaced_id,
                        attempt,
                        "Annotation committed"
                    );
                    return Ok(WrittenAnnotation {
                        annotation,
                        replaced_id,
                        attempts: attempt,
                    });
                }
                Err(AttemptError::Terminal(err)) => return Err(err),
                Err(AttemptError::Conflict(msg)) => {
                    self.note_conflict("create", request.document_id, attempt, &msg)
                }
            }
        }

        Err(self.exhausted("create", request.document_id))
    }

    /// Delete a span and recompute its document's annotated flag.
    pub async fn delete(&self, annotation_id: DbId) -> Result<DeletedAnnotation, AnnotationError> {
        for attempt in self.config.retry.attempts() {
            match self.try_delete(annotation_id).await {
                Ok((document_id, document_annotated)) => {
                    tracing::debug!(annotation_id, document_id, attempt, "Annotation deleted");
                    return Ok(DeletedAnnotation {
                        annotation_id,
                        document_id,
                        document_annotated,
                        attempts: attempt,
                    });
                }
                Err(AttemptError::Terminal(err)) => return Err(err),
                Err(AttemptError::Conflict(msg)) => {
                    self.note_conflict("delete", annotation_id, attempt, &msg)
                }
            }
        }

        Err(self.exhausted("delete", annotation_id))
    }

    fn note_conflict(&self, operation: &'static str, target_id: DbId, attempt: u32, msg: &str) {
        if self.config.retry.has_next(attempt) {
            tracing::warn!(
                operation,
                target_id,
                attempt,
                max_attempts = self.config.retry.max_attempts(),
                error = %msg,
                "Annotation write conflict, retrying"
            );
        }
    }

    fn exhausted(&self, operation: &'static str, target_id: DbId) -> AnnotationError {
        let attempts = self.config.retry.max_attempts();
        tracing::error!(
            operation,
            target_id,
            attempts,
            "Annotation write conflict persisted after all attempts"
        );
        AnnotationError::WriteConflictExhausted { attempts }
    }

    // -- single attempts ----------------------------------------------------

    async fn try_create(
        &self,
        request: &CreateSpan,
    ) -> Result<(Annotation, Option<DbId>), AttemptError> {
        let mut tx = self.store.begin().await?;
        match self.stage_create(&mut tx, request).await {
            Ok(staged) => {
                tx.commit().await?;
                Ok(staged)
            }
            Err(err) => {
                discard(tx).await;
                Err(err)
            }
        }
    }

    async fn stage_create(
        &self,
        tx: &mut S::Tx,
        request: &CreateSpan,
    ) -> Result<(Annotation, Option<DbId>), AttemptError> {
        let document = tx
            .document(request.document_id)
            .await?
            .ok_or(AnnotationError::NotFound {
                entity: "Document",
                id: request.document_id,
            })?;

        if tx.label_project(request.label_id).await? != Some(document.project_id) {
            return Err(AnnotationError::NotFound {
                entity: "Label",
                id: request.label_id,
            }
            .into());
        }

        let existing = tx.live_spans(document.id).await?;
        let replaced_id = match validate(
            document.text_length,
            request.span,
            &existing,
            self.config.overlap,
        ) {
            Decision::Reject(reason) => return Err(AnnotationError::Rejected(reason).into()),
            Decision::Accept => None,
            Decision::ExactMatchReplace(existing_id) => {
                if !tx.delete_annotation(existing_id).await? {
                    return Err(AttemptError::Conflict(format!(
                        "annotation {existing_id} was removed concurrently"
                    )));
                }
                Some(existing_id)
            }
        };

        let annotation = tx
            .insert_annotation(&NewAnnotation {
                document_id: document.id,
                label_id: request.label_id,
                annotator_id: request.annotator_id,
                start_offset: request.span.start,
                end_offset: request.span.end,
                origin: request.origin,
            })
            .await?;
        DocumentStateTracker::mark_annotated(tx, document.id).await?;

        Ok((annotation, replaced_id))
    }

    async fn try_delete(&self, annotation_id: DbId) -> Result<(DbId, bool), AttemptError> {
        let mut tx = self.store.begin().await?;
        match Self::stage_delete(&mut tx, annotation_id).await {
            Ok(staged) => {
                tx.commit().await?;
                Ok(staged)
            }
            Err(err) => {
                discard(tx).await;
                Err(err)
            }
        }
    }

    async fn stage_delete(
        tx: &mut S::Tx,
        annotation_id: DbId,
    ) -> Result<(DbId, bool), AttemptError> {
        let not_found = || AnnotationError::NotFound {
            entity: "Annotation",
            id: annotation_id,
        };
        let annotation = tx.find_annotation(annotation_id).await?.ok_or_else(not_found)?;
        if !tx.delete_annotation(annotation_id).await? {
            return Err(not_found().into());
        }
        let annotated = DocumentStateTracker::recompute(tx, annotation.document_id).await?;
        Ok((annotation.document_id, annotated))
    }
}

/// Roll back an attempt that will not commit.
async fn discard<T: SpanTransaction>(tx: T) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "Failed to roll back annotation transaction");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
