//! Source-tree provider capability.

use std::path::{Path, PathBuf};

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl DirEntry {
    /// Creates a file entry.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    /// Creates a directory entry.
    #[must_use]
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }

    /// Returns the final path component, or an empty string.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// A source file that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// File that failed.
    pub path: PathBuf,
    /// Line of the error (1-indexed, 0 if unknown).
    pub line: usize,
    /// Column of the error (1-indexed, 0 if unknown).
    pub column: usize,
    /// Parser message.
    pub message: String,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.path.display(),
            self.line,
            self.column,
            self.message
        )
    }
}

/// The project could not be loaded. Fatal, raised before scheduling.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum LoadError {
    /// IO error while reading the tree.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(patvet::load::io))]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Directory walk failed.
    #[error("failed to walk {path}: {message}")]
    #[diagnostic(code(patvet::load::walk))]
    Walk {
        /// Path being walked.
        path: PathBuf,
        /// Walk error message.
        message: String,
    },

    /// One or more source files are invalid.
    #[error("{} source file(s) failed to parse:\n{}", .failures.len(), format_failures(.failures))]
    #[diagnostic(
        code(patvet::load::parse),
        help("fix the sources or add their paths to `ignored`")
    )]
    Parse {
        /// Every failing file, in walk order.
        failures: Vec<ParseFailure>,
    },
}

fn format_failures(failures: &[ParseFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  - {f}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Provides directory listings and source units for the scheduler.
///
/// Units are handed out by value but are expected to be cheap views over
/// data the provider owns; the engine never mutates them.
pub trait SourceProvider {
    /// A file-level or directory-level unit of syntax.
    type Unit<'a>
    where
        Self: 'a;

    /// Lists the entries of `dir` in a deterministic order.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the directory cannot be read.
    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, LoadError>;

    /// Returns `true` for files that hold checkable, non-test source.
    fn is_source_file(&self, path: &Path) -> bool;

    /// Returns the unit for a single file, if the provider loaded it.
    fn file_unit(&self, path: &Path) -> Option<Self::Unit<'_>>;

    /// Returns one unit grouping `files`, all of which live in `dir`.
    fn package_unit(&self, dir: &Path, files: &[PathBuf]) -> Option<Self::Unit<'_>>;
}
