use std::sync::Arc;

use doclabel_core::permissions::{PermissionGate, RolePermissionGate};
use doclabel_db::store::PgSpanStore;
use doclabel_db::writer::AnnotationWriter;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: doclabel_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Sole write path for annotations.
    pub writer: Arc<AnnotationWriter<PgSpanStore>>,
    pub gate: Arc<dyn PermissionGate>,
}

impl AppState {
    /// Wire the writer onto `pool` with the role-based permission gate.
    pub fn new(pool: doclabel_db::DbPool, config: ServerConfig) -> Self {
        let writer = AnnotationWriter::new(PgSpanStore::new(pool.clone()), config.annotation);
        Self {
            pool,
            config: Arc::new(config),
            writer: Arc::new(writer),
            gate: Arc::new(RolePermissionGate),
        }
    }
}
