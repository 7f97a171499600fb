//! Error handling for Mapscribe
//!
//! Geometry addressing errors are fatal-class: they indicate that a caller
//! handed the core a nesting path that violates the addressing invariant
//! (wrong feature slot, impossible depth, index past the append slot).
//! Malformed but expected interaction sequences are not errors; tools treat
//! them as no-ops.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::geometry::GeometryKind;

/// Geometry addressing error type
///
/// Raised when a nesting path cannot be resolved against a feature's
/// coordinate tree. These conditions mean the path was computed against a
/// different feature generation and must not be silently swallowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Nesting head addresses a different feature slot
    #[error("Nesting head {found} does not address feature slot {expected}")]
    FeatureMismatch {
        /// The slot of the feature being addressed.
        expected: usize,
        /// The feature slot found at the head of the nesting path.
        found: usize,
    },

    /// Index past the append slot of a coordinate level
    #[error("Index {index} out of range at depth {depth} (level holds {len})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The depth within the nesting path at which resolution failed.
        depth: usize,
        /// The number of elements at that level.
        len: usize,
    },

    /// Nesting path deeper than the geometry kind supports
    #[error("Nesting depth {depth} exceeds what {kind} supports")]
    NestingTooDeep {
        /// The geometry kind being addressed.
        kind: GeometryKind,
        /// The offending path depth (indices past the feature slot).
        depth: usize,
    },

    /// Nesting path too short to address a shape of this geometry kind
    #[error("Nesting depth {depth} does not reach a shape of {kind}")]
    NestingTooShallow {
        /// The geometry kind being addressed.
        kind: GeometryKind,
        /// The offending path depth (indices past the feature slot).
        depth: usize,
    },
}

/// Result type using GeometryError
pub type Result<T> = std::result::Result<T, GeometryError>;
