//! In-memory collaborators for exercising the engine without a real parser.
//!
//! Source files use the `.src` extension. A pattern is a line prefix: every
//! line whose trimmed text starts with it is one match. The pattern `!fail`
//! makes evaluation fail.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use patvet_core::{
    Bindings, DirEntry, LoadError, MatchError, PatternCompiler, PatternError, PatternMatcher,
    Position, SourceProvider,
};
use tempfile::TempDir;

/// Lists the real file system; units are plain file lists.
pub struct LineProvider;

impl SourceProvider for LineProvider {
    type Unit<'a> = Vec<PathBuf>;

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, LoadError> {
        let io = |source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(io)? {
            let entry = entry.map_err(io)?;
            let is_dir = entry.file_type().map_err(io)?.is_dir();
            entries.push(DirEntry {
                path: entry.path(),
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn is_source_file(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        name.ends_with(".src") && !name.ends_with("_test.src")
    }

    fn file_unit(&self, path: &Path) -> Option<Vec<PathBuf>> {
        Some(vec![path.to_path_buf()])
    }

    fn package_unit(&self, _dir: &Path, files: &[PathBuf]) -> Option<Vec<PathBuf>> {
        Some(files.to_vec())
    }
}

/// Matches line prefixes and records every evaluation.
#[derive(Default)]
pub struct LineMatcher {
    evaluated: RefCell<Vec<(Vec<PathBuf>, String)>>,
}

impl LineMatcher {
    /// Every `(unit, pattern)` pair evaluated so far, in order.
    pub fn evaluated(&self) -> Vec<(Vec<PathBuf>, String)> {
        self.evaluated.borrow().clone()
    }
}

impl PatternCompiler for LineMatcher {
    type Pattern = String;

    fn compile(&self, source: &str) -> Result<String, PatternError> {
        if source.is_empty() {
            return Err(PatternError::new("empty pattern"));
        }
        Ok(source.to_string())
    }
}

impl PatternMatcher<Vec<PathBuf>> for LineMatcher {
    fn find(&self, unit: &Vec<PathBuf>, pattern: &String) -> Result<Bindings, MatchError> {
        self.evaluated
            .borrow_mut()
            .push((unit.clone(), pattern.clone()));
        if pattern == "!fail" {
            return Err(MatchError::new("evaluation failed"));
        }

        let mut bindings = Vec::new();
        for file in unit {
            let content = fs::read_to_string(file).map_err(|e| MatchError::new(e.to_string()))?;
            for (i, line) in content.lines().enumerate() {
                let trimmed = line.trim_start();
                if trimmed.starts_with(pattern.as_str()) {
                    let column = line.len() - trimmed.len() + 1;
                    bindings.push(vec![Position::new(file, i + 1, column)]);
                }
            }
        }
        Ok(bindings)
    }
}

/// Temporary project tree.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `content` at the project-relative `path`, creating parents.
    pub fn file(&self, path: &str, content: &str) -> &Self {
        let full = self.root().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
        self
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }
}

/// `count` lines each starting with `prefix`.
pub fn lines(prefix: &str, count: usize) -> String {
    (0..count).map(|i| format!("{prefix} item{i}\n")).collect()
}
