//! errors.rs - Custom error types for the argscrub-core library.
//!
//! `ArgumentsBlocked` is the only variant that carries an allow/block verdict.
//! Every other variant describes an internal failure that callers are expected
//! to report and then ignore for the purposes of the decision.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// All error types produced by `argscrub-core`.
///
/// Marked `#[non_exhaustive]` so new failure kinds can be added without
/// breaking downstream matches.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ArgscrubError {
    /// The sanitizer altered the arguments beyond variable expansion while
    /// enforcement is active.
    #[error("{message}")]
    ArgumentsBlocked { message: String },

    #[error("Argument sanitizer failed: {0}")]
    SanitizerFailure(String),

    #[error("Failed to serialize telemetry: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ArgscrubError {
    /// Returns `true` for the block verdict, `false` for internal failures.
    pub fn is_blocked(&self) -> bool {
        matches!(self, ArgscrubError::ArgumentsBlocked { .. })
    }
}
