//! Pure domain layer for the document labelling platform.
//!
//! Nothing in this crate performs I/O. The span validator, retry policy and
//! permission gate are plain functions and values so the persistence and
//! HTTP layers can share one definition of the rules.

pub mod annotation;
pub mod error;
pub mod pagination;
pub mod permissions;
pub mod retry;
pub mod roles;
pub mod span;
pub mod types;
