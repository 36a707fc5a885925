//! Character-offset span validation.
//!
//! [`validate`] decides whether a candidate span may be written to a document,
//! given the document's text length and the live spans already attached to it.
//! It is label-blind: only offsets take part in the comparison. A candidate
//! whose offsets exactly match a live span is not a collision but an
//! instruction to relabel that span, reported as [`Decision::ExactMatchReplace`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::{DbId, Offset};

// ---------------------------------------------------------------------------
// Rejection reasons
// ---------------------------------------------------------------------------

/// Why a candidate span was rejected. Rules are evaluated in declaration
/// order and the first failing rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// An offset is not an integer (string, fraction, bool, null, ...).
    InvalidOffsetType,
    /// An offset is below zero.
    NegativeOffset,
    /// `start_offset >= end_offset`.
    EmptyOrInvertedSpan,
    /// `end_offset` is past the end of the document text.
    OffsetExceedsText,
    /// The candidate shares a start or end value with a different live span.
    BoundaryCollision,
    /// The candidate starts strictly inside a live span.
    StartInsideExisting,
    /// The candidate ends strictly inside a live span.
    EndInsideExisting,
    /// The candidate strictly contains a live span.
    CandidateContainsExisting,
}

impl RejectReason {
    /// Stable machine-readable code used in API error bodies.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidOffsetType => "INVALID_OFFSET_TYPE",
            Self::NegativeOffset => "NEGATIVE_OFFSET",
            Self::EmptyOrInvertedSpan => "EMPTY_OR_INVERTED_SPAN",
            Self::OffsetExceedsText => "OFFSET_EXCEEDS_TEXT",
            Self::BoundaryCollision => "BOUNDARY_COLLISION",
            Self::StartInsideExisting => "START_INSIDE_EXISTING",
            Self::EndInsideExisting => "END_INSIDE_EXISTING",
            Self::CandidateContainsExisting => "CANDIDATE_CONTAINS_EXISTING",
        }
    }

    /// Human-readable description of the failed rule.
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidOffsetType => "start_offset and end_offset must be integers",
            Self::NegativeOffset => "start_offset and end_offset must not be negative",
            Self::EmptyOrInvertedSpan => "start_offset must be less than end_offset",
            Self::OffsetExceedsText => "end_offset must not exceed the document text length",
            Self::BoundaryCollision => {
                "start_offset or end_offset coincides with a boundary of an existing annotation"
            }
            Self::StartInsideExisting => "start_offset falls inside an existing annotation",
            Self::EndInsideExisting => "end_offset falls inside an existing annotation",
            Self::CandidateContainsExisting => "span contains an existing annotation",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ---------------------------------------------------------------------------
// Overlap policy
// ---------------------------------------------------------------------------

/// How strictly neighbouring spans are policed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Reject any shared boundary value, partial overlap or containment.
    #[default]
    Strict,
    /// Like `Strict`, but spans that merely touch (`(10,20)` and `(20,30)`)
    /// are legal.
    Adjacent,
    /// Only exact (start, end) uniqueness is enforced.
    Unique,
}

impl OverlapPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Adjacent => "adjacent",
            Self::Unique => "unique",
        }
    }
}

impl FromStr for OverlapPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "adjacent" => Ok(Self::Adjacent),
            "unique" => Ok(Self::Unique),
            other => Err(CoreError::Validation(format!(
                "Invalid overlap policy '{other}'. Must be one of: strict, adjacent, unique"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Spans
// ---------------------------------------------------------------------------

/// A typed span proposed by a writer, not yet persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSpan {
    pub start: Offset,
    pub end: Offset,
}

impl CandidateSpan {
    pub fn new(start: Offset, end: Offset) -> Self {
        Self { start, end }
    }

    /// Build a candidate from raw request values.
    ///
    /// Accepts JSON integers, integral floats (`12.0`) and decimal integer
    /// strings (`"12"`). Sign is not checked here.
    pub fn parse(start: &Value, end: &Value) -> Result<Self, RejectReason> {
        Ok(Self {
            start: parse_offset(start)?,
            end: parse_offset(end)?,
        })
    }
}

/// The offsets of a live span already stored for the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingSpan {
    pub id: DbId,
    pub start: Offset,
    pub end: Offset,
}

/// Outcome of validating a candidate span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No collision: insert the span.
    Accept,
    /// Same offsets as the given live span: replace it.
    ExactMatchReplace(DbId),
    Reject(RejectReason),
}

/// Parse a single offset value.
pub fn parse_offset(value: &Value) -> Result<Offset, RejectReason> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(RejectReason::InvalidOffsetType),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| RejectReason::InvalidOffsetType),
        _ => Err(RejectReason::InvalidOffsetType),
    }
}

/// Length of a document body in characters, the unit offsets are counted in.
pub fn text_length(text: &str) -> Offset {
    text.chars().count() as Offset
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate `candidate` against a document of `text_len` characters whose
/// live spans are `existing`.
pub fn validate(
    text_len: Offset,
    candidate: CandidateSpan,
    existing: &[ExistingSpan],
    policy: OverlapPolicy,
) -> Decision {
    if let Err(reason) = check_bounds(text_len, candidate) {
        return Decision::Reject(reason);
    }

    let exact = existing
        .iter()
        .find(|e| e.start == candidate.start && e.end == candidate.end)
        .map(|e| e.id);

    for span in existing.iter().filter(|e| Some(e.id) != exact) {
        if let Err(reason) = check_against(candidate, span, policy) {
            return Decision::Reject(reason);
        }
    }

    match exact {
        Some(id) => Decision::ExactMatchReplace(id),
        None => Decision::Accept,
    }
}

/// Rules 2 to 4: sign, ordering and text bounds.
fn check_bounds(text_len: Offset, candidate: CandidateSpan) -> Result<(), RejectReason> {
    if candidate.start < 0 || candidate.end < 0 {
        return Err(RejectReason::NegativeOffset);
    }
    if candidate.start >= candidate.end {
        return Err(RejectReason::EmptyOrInvertedSpan);
    }
    if candidate.end > text_len {
        return Err(RejectReason::OffsetExceedsText);
    }
    Ok(())
}

/// Rule 5 for a single live span.
fn check_against(
    candidate: CandidateSpan,
    span: &ExistingSpan,
    policy: OverlapPolicy,
) -> Result<(), RejectReason> {
    match policy {
        OverlapPolicy::Unique => return Ok(()),
        OverlapPolicy::Adjacent => {
            let overlaps = candidate.start < span.end && span.start < candidate.end;
            if !overlaps {
                return Ok(());
            }
        }
        OverlapPolicy::Strict => {}
    }

    let (s, e) = (candidate.start, candidate.end);
    if s == span.start || s == span.end || e == span.start || e == span.end {
        return Err(RejectReason::BoundaryCollision);
    }
    if span.start < s && s < span.end {
        return Err(RejectReason::StartInsideExisting);
    }
    if span.start < e && e < span.end {
        return Err(RejectReason::EndInsideExisting);
    }
    if s < span.start && e > span.end {
        return Err(RejectReason::CandidateContainsExisting);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
