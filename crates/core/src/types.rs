//! Scalar aliases shared by every layer.

/// Row identifier. Every table keys on a PostgreSQL `BIGSERIAL`.
pub type DbId = i64;

/// A position in a document's text, counted in Unicode scalar values.
///
/// Signed so that negative client input survives parsing and can be
/// rejected with its own reason code.
pub type Offset = i64;

/// UTC instant. Columns are `TIMESTAMPTZ`.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
