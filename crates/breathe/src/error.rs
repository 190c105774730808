//! Pattern configuration errors

use thiserror::Error;

/// A breathing pattern that cannot drive an exercise
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Pattern '{0}' has no inhale: inhale must be at least 1 second")]
    NoInhale(String),

    #[error("Pattern '{0}' has no exhale: exhale must be at least 1 second")]
    NoExhale(String),

    #[error("Pattern id must not be empty")]
    EmptyId,

    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),

    #[error("Unknown tick policy: {0} (expected 'exact' or 'linger')")]
    UnknownTickPolicy(String),
}
