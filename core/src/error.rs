//! Errors the run-time codec can report.
//!
//! The compile-time codec (`crate::static_codec`) never fails: every shape
//! it handles has a size fixed at compile time, so a short buffer is a
//! caller bug, not a recoverable condition, and is signalled by a panic via
//! an `assert!` instead (spec §7 names exactly one recoverable decode
//! error, reproduced below).

use thiserror::Error;

/// Failure decoding a run-time-sized shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A `FixedArray`'s length header did not match the array's declared
    /// arity. The run-time codec still writes/reads a length prefix for
    /// `FixedArray` (see `crate::runtime`'s module doc for why), and this
    /// is the one place that prefix can disagree with what the type
    /// already knows.
    #[error("length header mismatch: expected {expected} elements, found {found}")]
    CapacityMismatch { expected: usize, found: usize },

    /// The buffer ran out before a length header or payload could be read.
    #[error("buffer too short: needed at least {needed} more bytes, {available} available")]
    UnexpectedEof { needed: usize, available: usize },
}
