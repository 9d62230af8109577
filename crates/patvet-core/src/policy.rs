//! Policy resolution: raw configuration to a read-only [`PolicyTable`].
//!
//! ```text
//! RawConfig
//!   ↓ resolve_checkers()   compile patterns, reject duplicate names
//!   ↓ resolve_ignored()    project-relative paths → absolute set
//!   ↓ resolve_enabled()    global enabled/disabled → CheckerSet
//!   ↓ resolve_overrides()  per-path enabled/disabled → CheckerSet
//! PolicyTable
//! ```
//!
//! Every failure here is fatal and happens before any scheduling.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::checker::{Checker, CheckerSet};
use crate::config::{RawChecker, RawConfig, RawOverride};
use crate::pattern::{PatternCompiler, PatternError};
use crate::types::{ErrorBudget, DEFAULT_CHOKE};

/// Scope label used for the top-level `enabled`/`disabled` lists.
pub const GLOBAL_SCOPE: &str = "global";

/// Policy resolution errors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum PolicyError {
    /// A checker pattern failed to compile.
    #[error("checker `{checker}`: invalid pattern: {source}")]
    #[diagnostic(code(patvet::policy::pattern))]
    Pattern {
        /// Checker whose pattern failed.
        checker: String,
        /// Compiler error.
        source: PatternError,
    },

    /// Two checkers share a name.
    #[error("duplicate checker `{name}`")]
    #[diagnostic(
        code(patvet::policy::duplicate_checker),
        help("checker names must be unique across [[checkers]]")
    )]
    DuplicateChecker {
        /// The repeated name.
        name: String,
    },

    /// Both `enabled` and `disabled` are set in one scope.
    #[error("{scope}: only one of `enabled` and `disabled` may be set")]
    #[diagnostic(code(patvet::policy::exclusivity))]
    Exclusivity {
        /// Scope with the conflict (`global` or `override[i]`).
        scope: String,
    },

    /// An `enabled` list names a checker that does not exist.
    #[error("{scope}: checker `{name}` does not exist")]
    #[diagnostic(code(patvet::policy::unknown_checker))]
    UnknownChecker {
        /// Scope that referenced the checker.
        scope: String,
        /// The unknown name.
        name: String,
    },

    /// An override sets both or neither of `package` and `file`.
    #[error("{scope}: {detail}")]
    #[diagnostic(
        code(patvet::policy::target),
        help("each [[override]] targets exactly one `package` or one `file`")
    )]
    Target {
        /// Offending override.
        scope: String,
        /// What is wrong with the target.
        detail: &'static str,
    },

    /// An ignore or override path is malformed or missing.
    #[error("{field}: `{path}` {reason}")]
    #[diagnostic(code(patvet::policy::path))]
    ConfigPath {
        /// Config field holding the path (e.g. `ignored[2]`).
        field: String,
        /// The path as written.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// `choke` is zero.
    #[error("choke must be a positive integer")]
    #[diagnostic(code(patvet::policy::choke))]
    InvalidChoke,
}

/// Fully resolved, read-only policy.
#[derive(Debug)]
pub struct PolicyTable<P> {
    root: PathBuf,
    budget: ErrorBudget,
    registry: CheckerSet<P>,
    ignored: BTreeSet<PathBuf>,
    global: CheckerSet<P>,
    overrides: BTreeMap<PathBuf, CheckerSet<P>>,
}

impl<P> PolicyTable<P> {
    /// Resolves `raw` against the project at `root`.
    ///
    /// `root` should be absolute; every ignore and override target is joined
    /// onto it and checked for existence.
    ///
    /// # Errors
    ///
    /// Returns the first [`PolicyError`] encountered.
    pub fn resolve<C>(raw: &RawConfig, root: &Path, compiler: &C) -> Result<Self, PolicyError>
    where
        C: PatternCompiler<Pattern = P>,
    {
        let budget = ErrorBudget::new(raw.choke.unwrap_or(DEFAULT_CHOKE))
            .ok_or(PolicyError::InvalidChoke)?;
        let registry = resolve_checkers(&raw.checkers, compiler)?;
        let ignored = resolve_ignored(&raw.ignored, root)?;
        let global = resolve_enabled(
            GLOBAL_SCOPE,
            raw.enabled.as_deref(),
            raw.disabled.as_deref(),
            &registry,
        )?;
        let overrides = resolve_overrides(&raw.overrides, &registry, root)?;

        debug!(
            checkers = registry.len(),
            enabled = global.len(),
            ignored = ignored.len(),
            overrides = overrides.len(),
            "Resolved policy"
        );

        Ok(Self {
            root: root.to_path_buf(),
            budget,
            registry,
            ignored,
            global,
            overrides,
        })
    }

    /// Project root every path is resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Error budget for the run.
    #[must_use]
    pub fn budget(&self) -> ErrorBudget {
        self.budget
    }

    /// All registered checkers.
    #[must_use]
    pub fn registry(&self) -> &CheckerSet<P> {
        &self.registry
    }

    /// Absolute paths excluded from scheduling.
    #[must_use]
    pub fn ignored(&self) -> &BTreeSet<PathBuf> {
        &self.ignored
    }

    /// Returns `true` if `path` is in the ignore set.
    #[must_use]
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.ignored.contains(path)
    }

    /// Checkers enabled where no override applies.
    #[must_use]
    pub fn global(&self) -> &CheckerSet<P> {
        &self.global
    }

    /// Override set for exactly `path`, if one was configured.
    #[must_use]
    pub fn override_for(&self, path: &Path) -> Option<&CheckerSet<P>> {
        self.overrides.get(path)
    }

    /// Checkers for a directory: its override if present, otherwise global.
    #[must_use]
    pub fn checkers_for(&self, dir: &Path) -> &CheckerSet<P> {
        self.override_for(dir).unwrap_or(&self.global)
    }
}

/// Compiles every checker and builds the registry.
///
/// # Errors
///
/// Returns [`PolicyError::DuplicateChecker`] on a repeated name and
/// [`PolicyError::Pattern`] if a pattern fails to compile.
pub fn resolve_checkers<C: PatternCompiler>(
    raw: &[RawChecker],
    compiler: &C,
) -> Result<CheckerSet<C::Pattern>, PolicyError> {
    let mut registry = CheckerSet::new();
    for entry in raw {
        if registry.contains(&entry.name) {
            return Err(PolicyError::DuplicateChecker {
                name: entry.name.clone(),
            });
        }
        let pattern = compiler
            .compile(&entry.pattern)
            .map_err(|source| PolicyError::Pattern {
                checker: entry.name.clone(),
                source,
            })?;
        registry.insert(Arc::new(Checker::new(
            entry.name.clone(),
            pattern,
            entry.message.clone(),
        )));
    }
    Ok(registry)
}

/// Resolves project-relative ignore paths to absolute paths under `root`.
///
/// # Errors
///
/// Returns [`PolicyError::ConfigPath`] for absolute, escaping or missing paths.
pub fn resolve_ignored(raw: &[String], root: &Path) -> Result<BTreeSet<PathBuf>, PolicyError> {
    raw.iter()
        .enumerate()
        .map(|(i, path)| resolve_project_path(path, root, &format!("ignored[{i}]")))
        .collect()
}

/// Resolves one enabled/disabled pair against `registry`.
///
/// With an allow-list only the named checkers are kept; with a deny-list
/// every other checker is kept; with neither the whole registry applies.
///
/// # Errors
///
/// Returns [`PolicyError::Exclusivity`] if both lists are set and
/// [`PolicyError::UnknownChecker`] if the allow-list names a missing checker.
pub fn resolve_enabled<P>(
    scope: &str,
    enabled: Option<&[String]>,
    disabled: Option<&[String]>,
    registry: &CheckerSet<P>,
) -> Result<CheckerSet<P>, PolicyError> {
    match (enabled, disabled) {
        (Some(_), Some(_)) => Err(PolicyError::Exclusivity {
            scope: scope.to_string(),
        }),
        (Some(names), None) => {
            let mut set = CheckerSet::new();
            for name in names {
                let checker = registry
                    .get(name)
                    .ok_or_else(|| PolicyError::UnknownChecker {
                        scope: scope.to_string(),
                        name: name.clone(),
                    })?;
                set.insert(Arc::clone(checker));
            }
            Ok(set)
        }
        (None, Some(names)) => {
            for name in names.iter().filter(|n| !registry.contains(n)) {
                warn!("{scope}: disabled checker `{name}` does not exist");
            }
            Ok(registry.filtered(|name| !names.iter().any(|n| n == name)))
        }
        (None, None) => Ok(registry.clone()),
    }
}

/// Resolves `[[override]]` entries into a path-keyed table.
///
/// When two entries target the same path the later one wins.
///
/// # Errors
///
/// Returns [`PolicyError::Target`], [`PolicyError::Exclusivity`],
/// [`PolicyError::ConfigPath`] or [`PolicyError::UnknownChecker`].
pub fn resolve_overrides<P>(
    raw: &[RawOverride],
    registry: &CheckerSet<P>,
    root: &Path,
) -> Result<BTreeMap<PathBuf, CheckerSet<P>>, PolicyError> {
    let mut table = BTreeMap::new();
    for (i, entry) in raw.iter().enumerate() {
        let scope = format!("override[{i}]");

        let (field, target, want_dir) = match (&entry.package, &entry.file) {
            (Some(package), None) => ("package", package, true),
            (None, Some(file)) => ("file", file, false),
            (Some(_), Some(_)) => {
                return Err(PolicyError::Target {
                    scope,
                    detail: "only one of `package` and `file` may be set",
                })
            }
            (None, None) => {
                return Err(PolicyError::Target {
                    scope,
                    detail: "one of `package` or `file` is required",
                })
            }
        };

        if entry.enabled.is_some() && entry.disabled.is_some() {
            return Err(PolicyError::Exclusivity { scope });
        }

        let field_label = format!("{scope}.{field}");
        let path = resolve_project_path(target, root, &field_label)?;
        if want_dir && !path.is_dir() {
            return Err(PolicyError::ConfigPath {
                field: field_label,
                path: target.clone(),
                reason: "is not a directory",
            });
        }
        if !want_dir && !path.is_file() {
            return Err(PolicyError::ConfigPath {
                field: field_label,
                path: target.clone(),
                reason: "is not a file",
            });
        }

        let set = resolve_enabled(
            &scope,
            entry.enabled.as_deref(),
            entry.disabled.as_deref(),
            registry,
        )?;
        if table.insert(path.clone(), set).is_some() {
            warn!(
                "{scope}: `{}` is already overridden, the later entry wins",
                path.display()
            );
        }
    }
    Ok(table)
}

/// Joins a project-relative path onto `root`, normalizing `.` segments.
fn resolve_project_path(raw: &str, root: &Path, field: &str) -> Result<PathBuf, PolicyError> {
    let bad = |reason| PolicyError::ConfigPath {
        field: field.to_string(),
        path: raw.to_string(),
        reason,
    };

    if raw.trim().is_empty() {
        return Err(bad("must not be empty"));
    }
    let relative = Path::new(raw);
    if relative.is_absolute() {
        return Err(bad("must be relative to the project root"));
    }

    let mut path = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(bad("must stay inside the project root"));
            }
        }
    }

    if !path.exists() {
        return Err(bad("does not exist"));
    }
    Ok(path)
}
