//! Tree walk that turns a [`PolicyTable`] into an ordered [`Schedule`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::checker::{Checker, CheckerSet};
use crate::policy::PolicyTable;
use crate::source::{DirEntry, LoadError, SourceProvider};

/// One (unit, checker) pairing.
#[derive(Debug)]
pub struct CheckUnit<P> {
    unit: usize,
    checker: Arc<Checker<P>>,
}

impl<P> CheckUnit<P> {
    /// Index of the unit inside its [`Schedule`].
    #[must_use]
    pub fn unit_index(&self) -> usize {
        self.unit
    }

    /// The checker to evaluate.
    #[must_use]
    pub fn checker(&self) -> &Checker<P> {
        &self.checker
    }

    /// Message reported for each match.
    #[must_use]
    pub fn message(&self) -> &str {
        self.checker.message()
    }
}

/// Ordered check units plus the source units they refer to.
///
/// A package unit is stored once and shared by every check that targets it.
#[derive(Debug)]
pub struct Schedule<U, P> {
    units: Vec<U>,
    checks: Vec<CheckUnit<P>>,
}

impl<U, P> Default for Schedule<U, P> {
    fn default() -> Self {
        Self {
            units: Vec::new(),
            checks: Vec::new(),
        }
    }
}

impl<U, P> Schedule<U, P> {
    /// Creates an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `unit` with one check per checker in `checkers`, in set order.
    ///
    /// A unit with no applicable checkers is dropped.
    pub fn push(&mut self, unit: U, checkers: &CheckerSet<P>) {
        if checkers.is_empty() {
            return;
        }
        let index = self.units.len();
        self.units.push(unit);
        self.checks.extend(checkers.iter().map(|checker| CheckUnit {
            unit: index,
            checker: Arc::clone(checker),
        }));
    }

    /// Appends every unit and check of `other`, keeping its order.
    pub fn append(&mut self, other: Self) {
        let offset = self.units.len();
        self.units.extend(other.units);
        self.checks
            .extend(other.checks.into_iter().map(|check| CheckUnit {
                unit: check.unit + offset,
                checker: check.checker,
            }));
    }

    /// Check units in execution order.
    #[must_use]
    pub fn checks(&self) -> &[CheckUnit<P>] {
        &self.checks
    }

    /// Source units in the order they were scheduled.
    #[must_use]
    pub fn units(&self) -> &[U] {
        &self.units
    }

    /// The source unit a check refers to.
    #[must_use]
    pub fn unit(&self, check: &CheckUnit<P>) -> &U {
        &self.units[check.unit]
    }

    /// Iterates `(unit, check)` pairs in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (&U, &CheckUnit<P>)> {
        self.checks.iter().map(|check| (&self.units[check.unit], check))
    }

    /// Number of check units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns `true` if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// Walks the project tree and builds the schedule.
///
/// Within a directory, entries are visited in listing order: subdirectories
/// are scheduled where they appear and each overridden file gets its own unit
/// immediately. The remaining source files form one package unit appended
/// after the listing, checked with the directory's override or the global set.
pub struct Scheduler<'a, S, P> {
    provider: &'a S,
    policy: &'a PolicyTable<P>,
}

impl<'a, S, P> Scheduler<'a, S, P>
where
    S: SourceProvider + 'a,
{
    /// Creates a scheduler over `provider` driven by `policy`.
    #[must_use]
    pub fn new(provider: &'a S, policy: &'a PolicyTable<P>) -> Self {
        Self { provider, policy }
    }

    /// Builds the schedule for the whole project, starting at the policy root.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if a directory listing fails.
    pub fn schedule(&self) -> Result<Schedule<S::Unit<'a>, P>, LoadError> {
        let root = self.policy.root();
        if self.policy.is_ignored(root) {
            debug!("Project root is ignored, nothing to schedule");
            return Ok(Schedule::new());
        }
        let schedule = self.traverse(root)?;
        debug!(
            "Scheduled {} check(s) over {} unit(s)",
            schedule.len(),
            schedule.units().len()
        );
        Ok(schedule)
    }

    /// Schedules `dir` and everything below it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if a directory listing fails.
    pub fn traverse(&self, dir: &Path) -> Result<Schedule<S::Unit<'a>, P>, LoadError> {
        let mut schedule = Schedule::new();
        let mut plain: Vec<PathBuf> = Vec::new();

        for entry in self.provider.read_dir(dir)? {
            if let Some(reason) = self.skip_reason(&entry) {
                debug!("Skipping {} ({reason})", entry.path.display());
                continue;
            }

            if entry.is_dir {
                schedule.append(self.traverse(&entry.path)?);
                continue;
            }

            let Some(checkers) = self.policy.override_for(&entry.path) else {
                plain.push(entry.path);
                continue;
            };

            debug!("Override applies to {}", entry.path.display());
            match self.provider.file_unit(&entry.path) {
                Some(unit) => schedule.push(unit, checkers),
                None => warn!(
                    "No source unit for overridden file {}",
                    entry.path.display()
                ),
            }
        }

        if plain.is_empty() {
            return Ok(schedule);
        }

        match self.provider.package_unit(dir, &plain) {
            Some(unit) => {
                let checkers = self.policy.checkers_for(dir);
                debug!(
                    "Package {} with {} file(s), {} checker(s)",
                    dir.display(),
                    plain.len(),
                    checkers.len()
                );
                schedule.push(unit, checkers);
            }
            None => warn!("No source unit for package {}", dir.display()),
        }

        Ok(schedule)
    }

    fn skip_reason(&self, entry: &DirEntry) -> Option<&'static str> {
        if self.policy.is_ignored(&entry.path) {
            Some("ignored")
        } else if entry.name().starts_with('.') {
            Some("hidden")
        } else if entry.is_dir && entry.name() == "vendor" {
            Some("vendor")
        } else if !entry.is_dir && !self.provider.is_source_file(&entry.path) {
            Some("not a source file")
        } else {
            None
        }
    }
}
