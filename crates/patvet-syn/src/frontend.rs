//! Loads and parses a project tree with `syn`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use patvet_core::{DirEntry, LoadError, ParseFailure, SourceProvider};
use tracing::{debug, info};
use walkdir::WalkDir;

/// File suffixes treated as test sources and never checked.
pub const TEST_SUFFIXES: &[&str] = &["_test.rs", "_tests.rs"];

/// A successfully parsed source file.
#[derive(Debug)]
pub struct ParsedFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Parsed syntax tree.
    pub ast: syn::File,
}

/// A file or the non-overridden files of one directory.
#[derive(Debug, Clone)]
pub struct SynUnit<'a> {
    dir: &'a Path,
    files: Vec<&'a ParsedFile>,
}

impl<'a> SynUnit<'a> {
    /// Directory the unit belongs to.
    #[must_use]
    pub fn dir(&self) -> &'a Path {
        self.dir
    }

    /// Files of the unit in listing order.
    #[must_use]
    pub fn files(&self) -> &[&'a ParsedFile] {
        &self.files
    }
}

/// Every Rust source of a project, parsed once up front.
#[derive(Debug)]
pub struct SynFrontend {
    root: PathBuf,
    files: BTreeMap<PathBuf, ParsedFile>,
}

impl SynFrontend {
    /// Walks `root` and parses every checkable `.rs` file.
    ///
    /// Hidden entries, `vendor` directories and anything in `ignored` are
    /// never read. Test files are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] listing every file that failed to parse,
    /// or an IO/walk error if the tree cannot be read.
    pub fn load(root: &Path, ignored: &BTreeSet<PathBuf>) -> Result<Self, LoadError> {
        let mut files = BTreeMap::new();
        let mut failures = Vec::new();

        if ignored.contains(root) {
            debug!(root = %root.display(), "root is ignored, nothing to load");
            return Ok(Self {
                root: root.to_path_buf(),
                files,
            });
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped(e, ignored));

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(root, &e))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_rust_source(path) {
                continue;
            }

            let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            match syn::parse_file(&content) {
                Ok(ast) => {
                    files.insert(
                        path.to_path_buf(),
                        ParsedFile {
                            path: path.to_path_buf(),
                            ast,
                        },
                    );
                }
                Err(err) => {
                    let start = err.span().start();
                    debug!(file = %path.display(), error = %err, "parse failed");
                    failures.push(ParseFailure {
                        path: path.to_path_buf(),
                        line: start.line,
                        column: start.column + 1,
                        message: err.to_string(),
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(LoadError::Parse { failures });
        }

        info!(root = %root.display(), files = files.len(), "loaded sources");
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Project root the sources were loaded from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of parsed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no file was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns the parsed file at `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&ParsedFile> {
        self.files.get(path)
    }
}

impl SourceProvider for SynFrontend {
    type Unit<'a> = SynUnit<'a>;

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, LoadError> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| {
                let entry = entry.map_err(|e| walk_error(dir, &e))?;
                Ok(if entry.file_type().is_dir() {
                    DirEntry::dir(entry.into_path())
                } else {
                    DirEntry::file(entry.into_path())
                })
            })
            .collect()
    }

    fn is_source_file(&self, path: &Path) -> bool {
        is_rust_source(path)
    }

    fn file_unit(&self, path: &Path) -> Option<SynUnit<'_>> {
        let (key, file) = self.files.get_key_value(path)?;
        Some(SynUnit {
            dir: key.parent().unwrap_or(&self.root),
            files: vec![file],
        })
    }

    fn package_unit(&self, dir: &Path, files: &[PathBuf]) -> Option<SynUnit<'_>> {
        let files: Vec<&ParsedFile> = files.iter().filter_map(|f| self.files.get(f)).collect();
        let first = *files.first()?;
        debug_assert!(first.path.parent() == Some(dir));
        Some(SynUnit {
            dir: first.path.parent().unwrap_or(&self.root),
            files,
        })
    }
}

/// Returns `true` for `.rs` files that are not test sources.
#[must_use]
pub fn is_rust_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.extension().is_some_and(|ext| ext == "rs")
        && !TEST_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn is_skipped(entry: &walkdir::DirEntry, ignored: &BTreeSet<PathBuf>) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
        || (entry.file_type().is_dir() && name == "vendor")
        || ignored.contains(entry.path())
}

fn walk_error(root: &Path, err: &walkdir::Error) -> LoadError {
    LoadError::Walk {
        path: err.path().unwrap_or(root).to_path_buf(),
        message: err.to_string(),
    }
}
