//! # patvet-syn
//!
//! Rust source frontend and structural pattern matcher for `patvet-core`.
//!
//! [`SynFrontend`] parses a project tree once and serves file and directory
//! units to the scheduler. [`SynEngine`] compiles checker patterns such as
//! `method-call(unwrap) | macro(panic)` and evaluates them over those units.
//!
//! ```ignore
//! use patvet_core::{check_project, PolicyTable};
//! use patvet_syn::{SynEngine, SynFrontend};
//!
//! let policy = PolicyTable::resolve(&raw, &root, &SynEngine)?;
//! let frontend = SynFrontend::load(&root, policy.ignored())?;
//! let outcome = check_project(&policy, &frontend, &SynEngine)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod frontend;
mod matcher;
mod paths;
mod pattern;

pub use frontend::{is_rust_source, ParsedFile, SynFrontend, SynUnit, TEST_SUFFIXES};
pub use matcher::SynEngine;
pub use paths::{path_to_string, PathPattern};
pub use pattern::{NodeKind, NodePattern, Term};
