//! In-memory span store for engine tests.
//!
//! Each transaction stages its writes locally and validates at commit time:
//! if any document it read or wrote has been committed to by someone else
//! since, or an insert would duplicate live offsets, the commit fails with
//! [`StoreError::Conflict`]. Conflicts and begin failures can also be
//! injected.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use doclabel_core::span::{text_length, ExistingSpan};
use doclabel_core::types::{DbId, Offset};

use super::{DocumentSnapshot, SpanStore, SpanTransaction, StoreError};
use crate::models::annotation::{Annotation, NewAnnotation};

#[derive(Debug, Clone)]
struct StoredDocument {
    project_id: DbId,
    text_length: Offset,
    is_annotated: bool,
    deleted: bool,
}

#[derive(Debug, Default)]
struct State {
    next_id: DbId,
    documents: HashMap<DbId, StoredDocument>,
    labels: HashMap<DbId, DbId>,
    annotations: BTreeMap<DbId, Annotation>,
    /// Bumped on every commit that writes to the document.
    versions: HashMap<DbId, u64>,
    commits: u32,
}

impl State {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemorySpanStore {
    state: Arc<Mutex<State>>,
    injected_conflicts: Arc<AtomicU32>,
    fail_begin: AtomicBool,
}

impl MemorySpanStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_document(&self, project_id: DbId, text: &str) -> DbId {
        let mut state = self.state();
        let id = state.allocate_id();
        state.documents.insert(
            id,
            StoredDocument {
                project_id,
                text_length: text_length(text),
                is_annotated: false,
                deleted: false,
            },
        );
        id
    }

    pub fn add_label(&self, project_id: DbId) -> DbId {
        let mut state = self.state();
        let id = state.allocate_id();
        state.labels.insert(id, project_id);
        id
    }

    pub fn soft_delete_document(&self, document_id: DbId) {
        if let Some(doc) = self.state().documents.get_mut(&document_id) {
            doc.deleted = true;
        }
    }

    /// Make the next `count` commits fail with a conflict.
    pub fn inject_conflicts(&self, count: u32) {
        self.injected_conflicts.store(count, Ordering::SeqCst);
    }

    pub fn set_fail_begin(&self, fail: bool) {
        self.fail_begin.store(fail, Ordering::SeqCst);
    }

    /// Committed spans of a document, ordered by start offset.
    pub fn spans(&self, document_id: DbId) -> Vec<Annotation> {
        let mut spans: Vec<Annotation> = self
            .state()
            .annotations
            .values()
            .filter(|a| a.document_id == document_id)
            .cloned()
            .collect();
        spans.sort_by_key(|a| (a.start_offset, a.id));
        spans
    }

    pub fn is_annotated(&self, document_id: DbId) -> bool {
        self.state()
            .documents
            .get(&document_id)
            .map(|d| d.is_annotated)
            .unwrap_or(false)
    }

    pub fn commits(&self) -> u32 {
        self.state().commits
    }
}

#[async_trait]
impl SpanStore for MemorySpanStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        if self.fail_begin.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(MemoryTransaction {
            state: Arc::clone(&self.state),
            injected_conflicts: Arc::clone(&self.injected_conflicts),
            observed: HashMap::new(),
            inserted: Vec::new(),
            deleted: Vec::new(),
            flags: HashMap::new(),
        })
    }
}

pub struct MemoryTransaction {
    state: Arc<Mutex<State>>,
    injected_conflicts: Arc<AtomicU32>,
    /// Document versions as first seen by this transaction.
    observed: HashMap<DbId, u64>,
    inserted: Vec<Annotation>,
    deleted: Vec<DbId>,
    flags: HashMap<DbId, bool>,
}

impl MemoryTransaction {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn observe(&mut self, document_id: DbId) {
        let version = self
            .state()
            .versions
            .get(&document_id)
            .copied()
            .unwrap_or(0);
        self.observed.entry(document_id).or_insert(version);
    }

    /// Committed spans plus staged writes.
    fn visible_spans(&self, document_id: DbId) -> Vec<Annotation> {
        let committed: Vec<Annotation> = self
            .state()
            .annotations
            .values()
            .filter(|a| a.document_id == document_id)
            .cloned()
            .collect();
        committed
            .into_iter()
            .chain(self.inserted.iter().filter(|a| a.document_id == document_id).cloned())
            .filter(|a| !self.deleted.contains(&a.id))
            .collect()
    }
}

#[async_trait]
impl SpanTransaction for MemoryTransaction {
    async fn document(
        &mut self,
        document_id: DbId,
    ) -> Result<Option<DocumentSnapshot>, StoreError> {
        self.observe(document_id);
        let doc = self.state().documents.get(&document_id).cloned();
        Ok(doc.filter(|d| !d.deleted).map(|d| DocumentSnapshot {
            id: document_id,
            project_id: d.project_id,
            text_length: d.text_length,
            is_annotated: self.flags.get(&document_id).copied().unwrap_or(d.is_annotated),
        }))
    }

    async fn label_project(&mut self, label_id: DbId) -> Result<Option<DbId>, StoreError> {
        Ok(self.state().labels.get(&label_id).copied())
    }

    async fn live_spans(&mut self, document_id: DbId) -> Result<Vec<ExistingSpan>, StoreError> {
        self.observe(document_id);
        let spans = self
            .visible_spans(document_id)
            .iter()
            .map(|a| ExistingSpan {
                id: a.id,
                start: a.start_offset,
                end: a.end_offset,
            })
            .collect();
        // Let concurrent attempts read the same snapshot before anyone commits.
        tokio::task::yield_now().await;
        Ok(spans)
    }

    async fn find_annotation(
        &mut self,
        annotation_id: DbId,
    ) -> Result<Option<Annotation>, StoreError> {
        if self.deleted.contains(&annotation_id) {
            return Ok(None);
        }
        let committed = self.state().annotations.get(&annotation_id).cloned();
        let found = committed.or_else(|| {
            self.inserted
                .iter()
                .find(|a| a.id == annotation_id)
                .cloned()
        });
        if let Some(annotation) = &found {
            self.observe(annotation.document_id);
        }
        Ok(found)
    }

    async fn insert_annotation(&mut self, input: &NewAnnotation) -> Result<Annotation, StoreError> {
        self.observe(input.document_id);
        let now = Utc::now();
        let id = self.state().allocate_id();
        let annotation = Annotation {
            id,
            document_id: input.document_id,
            label_id: input.label_id,
            annotator_id: input.annotator_id,
            start_offset: input.start_offset,
            end_offset: input.end_offset,
            manual: input.origin.is_manual(),
            confidence: input.origin.confidence(),
            created_at: now,
            updated_at: now,
        };
        self.inserted.push(annotation.clone());
        Ok(annotation)
    }

    async fn delete_annotation(&mut self, annotation_id: DbId) -> Result<bool, StoreError> {
        let exists = self.find_annotation(annotation_id).await?.is_some();
        if exists {
            self.deleted.push(annotation_id);
        }
        Ok(exists)
    }

    async fn count_live_annotations(&mut self, document_id: DbId) -> Result<i64, StoreError> {
        self.observe(document_id);
        Ok(self.visible_spans(document_id).len() as i64)
    }

    async fn set_annotated(&mut self, document_id: DbId, annotated: bool) -> Result<(), StoreError> {
        self.flags.insert(document_id, annotated);
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        let consumed = self
            .injected_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumed {
            return Err(StoreError::Conflict("injected conflict".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        for (document_id, seen) in &self.observed {
            let current = state.versions.get(document_id).copied().unwrap_or(0);
            if current != *seen {
                return Err(StoreError::Conflict(format!(
                    "document {document_id} changed since it was read"
                )));
            }
        }
        for new in &self.inserted {
            let duplicate = state.annotations.values().any(|a| {
                a.document_id == new.document_id
                    && a.start_offset == new.start_offset
                    && a.end_offset == new.end_offset
                    && !self.deleted.contains(&a.id)
            });
            if duplicate {
                return Err(StoreError::Conflict(
                    "duplicate key value violates unique constraint \
                     \"uq_annotations_document_offsets\""
                        .to_string(),
                ));
            }
        }

        let mut touched: Vec<DbId> = Vec::new();
        for id in &self.deleted {
            if let Some(removed) = state.annotations.remove(id) {
                touched.push(removed.document_id);
            }
        }
        for annotation in self.inserted {
            touched.push(annotation.document_id);
            state.annotations.insert(annotation.id, annotation);
        }
        for (document_id, annotated) in self.flags {
            if let Some(doc) = state.documents.get_mut(&document_id) {
                doc.is_annotated = annotated;
            }
            touched.push(document_id);
        }
        touched.sort_unstable();
        touched.dedup();
        for document_id in touched {
            *state.versions.entry(document_id).or_insert(0) += 1;
        }
        state.commits += 1;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}
