//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Annotation writes do not go
//! through here; they go through [`crate::writer::AnnotationWriter`].

pub mod annotation_repo;
pub mod document_repo;
pub mod history_repo;
pub mod label_repo;
pub mod project_repo;
pub mod role_repo;
pub mod user_repo;

pub use annotation_repo::AnnotationRepo;
pub use document_repo::DocumentRepo;
pub use history_repo::HistoryRepo;
pub use label_repo::LabelRepo;
pub use project_repo::ProjectRepo;
pub use role_repo::RoleRepo;
pub use user_repo::UserRepo;
