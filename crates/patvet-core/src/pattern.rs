//! Capability traits for compiling and evaluating checker patterns.
//!
//! The engine never interprets pattern text itself. A [`PatternCompiler`]
//! turns the source of a `[[checkers]]` entry into an opaque handle, and a
//! [`PatternMatcher`] evaluates that handle against a source unit.

use crate::types::Position;

/// Bound match groups returned by a matcher.
///
/// Every group is one match; every position in a group is one bound node.
pub type Bindings = Vec<Vec<Position>>;

/// A pattern could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PatternError {
    message: String,
}

impl PatternError {
    /// Creates a new pattern error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Evaluating a compiled pattern against a unit failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MatchError {
    message: String,
}

impl MatchError {
    /// Creates a new match error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Compiles pattern source text into an executable handle.
pub trait PatternCompiler {
    /// Compiled pattern handle stored on each checker.
    type Pattern;

    /// Compiles `source`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the source is not a valid pattern.
    fn compile(&self, source: &str) -> Result<Self::Pattern, PatternError>;
}

/// Evaluates compiled patterns against source units of type `U`.
pub trait PatternMatcher<U>: PatternCompiler {
    /// Finds every match of `pattern` inside `unit`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError`] if the evaluation itself fails. The executor turns
    /// that into a position-less diagnostic and carries on.
    fn find(&self, unit: &U, pattern: &Self::Pattern) -> Result<Bindings, MatchError>;
}
