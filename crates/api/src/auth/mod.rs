//! Credentials and tokens.
//!
//! - [`password`] -- Argon2id hashing and the strength rule.
//! - [`jwt`] -- signing and verifying access tokens.

pub mod jwt;
pub mod password;
