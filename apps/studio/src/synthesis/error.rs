//! Error taxonomy for banner synthesis.
//!
//! Every variant is surfaced to the caller. Invariant violations in particular
//! are never corrected in place: each one means the document template put a
//! value in one place and not another.

use serde::Serialize;
use thiserror::Error;

use crate::synthesis::color::InvalidColorFormat;

/// Which compliance invariant a generated document broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    /// Ad-size metadata or root box disagrees with the requested dimensions.
    SizeMismatch,
    /// The click-tag slot is assigned zero times, more than once, or to the wrong value.
    MultipleOrMissingClickTag,
    /// An absolute URL or a non-package asset path survived outside the click-tag assignment.
    LeakedExternalReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {detail}")]
pub struct InvariantViolation {
    pub kind: ViolationKind,
    pub detail: String,
}

impl InvariantViolation {
    pub fn new(kind: ViolationKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthesisError {
    #[error(transparent)]
    InvalidColorFormat(#[from] InvalidColorFormat),

    #[error("No destination URL supplied for the click tag")]
    MissingDestination,

    #[error("Destination {0:?} is not an absolute http(s) URL")]
    InvalidDestination(String),

    #[error("Invalid banner size {width}x{height}: both dimensions must be positive")]
    InvalidSize { width: u32, height: u32 },

    #[error("Invariant violation: {0}")]
    InvariantViolation(#[from] InvariantViolation),

    #[error("Batch synthesis failed for {key}: {source}")]
    BatchSynthesisFailure {
        key: String,
        #[source]
        source: Box<SynthesisError>,
    },
}

impl SynthesisError {
    /// The innermost failure, looking through batch wrappers.
    pub fn root_cause(&self) -> &SynthesisError {
        match self {
            SynthesisError::BatchSynthesisFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True when the failure comes from caller input rather than template construction.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.root_cause(),
            SynthesisError::InvalidColorFormat(_)
                | SynthesisError::MissingDestination
                | SynthesisError::InvalidDestination(_)
                | SynthesisError::InvalidSize { .. }
        )
    }
}
