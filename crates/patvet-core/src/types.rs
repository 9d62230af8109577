//! Core types for findings and the error budget.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Default number of diagnostics collected before a run chokes.
pub const DEFAULT_CHOKE: usize = 30;

/// Source code position of a matched node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Absolute path of the file.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Renders `file:line:column` with `root` stripped from the front of the file path.
    ///
    /// The result is prefixed with `.`, so a file at `<root>/src/lib.rs` renders as
    /// `./src/lib.rs:3:1`. Files outside `root` keep their full path.
    #[must_use]
    pub fn relative_to(&self, root: &Path) -> String {
        match self.file.strip_prefix(root) {
            Ok(rest) if !root.as_os_str().is_empty() => {
                format!("./{}:{}:{}", rest.display(), self.line, self.column)
            }
            _ => self.to_string(),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// One reported finding.
///
/// The position is absent only when the finding came from a matcher failure
/// rather than from a matched node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Where the finding was matched.
    pub position: Option<Position>,
    /// Checker message, or the matcher failure description.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic for a matched node.
    #[must_use]
    pub fn at(position: Position, message: impl Into<String>) -> Self {
        Self {
            position: Some(position),
            message: message.into(),
        }
    }

    /// Creates a position-less diagnostic.
    #[must_use]
    pub fn unpositioned(message: impl Into<String>) -> Self {
        Self {
            position: None,
            message: message.into(),
        }
    }
}

/// Maximum number of diagnostics a run may collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorBudget(NonZeroUsize);

impl ErrorBudget {
    /// Creates a budget, returning `None` for zero.
    #[must_use]
    pub fn new(limit: usize) -> Option<Self> {
        NonZeroUsize::new(limit).map(Self)
    }

    /// Returns the limit.
    #[must_use]
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for ErrorBudget {
    fn default() -> Self {
        Self(NonZeroUsize::MIN.saturating_add(DEFAULT_CHOKE - 1))
    }
}

impl std::fmt::Display for ErrorBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
