//! Request extractors for authentication.
//!
//! Authorization is not an extractor: handlers call
//! [`auth::AuthUser::authorize`] with the action they are about to perform.

pub mod auth;
