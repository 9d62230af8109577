//! # patvet-core
//!
//! Policy resolution and check scheduling for pattern-driven linting.
//!
//! The crate decides, for every unit of source in a project tree, which
//! checkers apply, runs them, and stops once the error budget is spent:
//!
//! - [`PolicyTable`] resolves the raw configuration (global enabled/disabled
//!   lists, per-path overrides, ignore set) into read-only policy
//! - [`Scheduler`] walks the tree and emits an ordered [`Schedule`]
//! - [`Executor`] evaluates the schedule and returns a [`RunOutcome`]
//! - [`Reporter`] renders diagnostics relative to the project root
//!
//! Parsing and pattern matching are supplied by the caller through
//! [`SourceProvider`], [`PatternCompiler`] and [`PatternMatcher`].
//!
//! ## Example
//!
//! ```ignore
//! use patvet_core::{check_project, PolicyTable, RawConfig, Reporter};
//!
//! let raw = RawConfig::from_file("patvet.toml".as_ref())?;
//! let policy = PolicyTable::resolve(&raw, &root, &engine)?;
//! let outcome = check_project(&policy, &frontend, &engine)?;
//! Reporter::new(&root).flush(outcome.diagnostics(), std::io::stdout())?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod checker;
mod config;
mod executor;
mod pattern;
mod policy;
mod report;
mod scheduler;
mod source;
mod types;

pub use checker::{Checker, CheckerSet};
pub use config::{ConfigError, RawChecker, RawConfig, RawOverride};
pub use executor::{BudgetExhausted, Diagnostics, Executor, RunOutcome};
pub use pattern::{Bindings, MatchError, PatternCompiler, PatternError, PatternMatcher};
pub use policy::{
    resolve_checkers, resolve_enabled, resolve_ignored, resolve_overrides, PolicyError,
    PolicyTable, GLOBAL_SCOPE,
};
pub use report::{ReportFormat, Reporter};
pub use scheduler::{CheckUnit, Schedule, Scheduler};
pub use source::{DirEntry, LoadError, ParseFailure, SourceProvider};
pub use types::{Diagnostic, ErrorBudget, Position, DEFAULT_CHOKE};

/// Schedules the project under `policy` and runs it to completion or choke.
///
/// # Errors
///
/// Returns [`LoadError`] if the tree cannot be listed.
pub fn check_project<'a, S, M>(
    policy: &'a PolicyTable<M::Pattern>,
    provider: &'a S,
    matcher: &M,
) -> Result<RunOutcome, LoadError>
where
    S: SourceProvider,
    M: PatternMatcher<S::Unit<'a>>,
{
    let schedule = Scheduler::new(provider, policy).schedule()?;
    Ok(Executor::new(matcher, policy.budget()).run(&schedule))
}
