//! Check command implementation.

use anyhow::{Context, Result};
use patvet_core::{check_project, PolicyTable, ReportFormat, Reporter, RunOutcome};
use patvet_syn::{SynEngine, SynFrontend};
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;

use crate::config_resolver;
use crate::OutputFormat;

/// Exit status for configuration and load failures.
const FAILURE: u8 = 1;

/// Runs the check command.
pub fn run(
    root: &Path,
    choke: Option<usize>,
    format: OutputFormat,
    config: Option<&Path>,
) -> Result<ExitCode> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve project root: {}", root.display()))?;

    let source = config_resolver::resolve(&root, config);
    tracing::info!("Using config: {source}");
    let mut raw = source
        .load()
        .with_context(|| format!("Failed to load config: {source}"))?;
    if choke.is_some() {
        raw.choke = choke;
    }

    let engine = SynEngine::new();
    let policy = match PolicyTable::resolve(&raw, &root, &engine) {
        Ok(policy) => policy,
        Err(err) => return Ok(fail(err)),
    };
    let frontend = match SynFrontend::load(&root, policy.ignored()) {
        Ok(frontend) => frontend,
        Err(err) => return Ok(fail(err)),
    };

    tracing::info!(
        "Checking {} with {} checkers over {} files",
        root.display(),
        policy.registry().len(),
        frontend.len()
    );
    let outcome = match check_project(&policy, &frontend, &engine) {
        Ok(outcome) => outcome,
        Err(err) => return Ok(fail(err)),
    };

    match &outcome {
        RunOutcome::Clean => tracing::info!("No findings"),
        RunOutcome::Findings(d) => tracing::info!("{} findings", d.len()),
        RunOutcome::Choked(d) => {
            tracing::warn!("Stopped after {} diagnostics (choke limit reached)", d.len());
        }
    }

    let stdout = std::io::stdout();
    let color = matches!(format, OutputFormat::Text) && stdout.is_terminal();
    Reporter::new(&root)
        .format(report_format(format))
        .color(color)
        .flush(outcome.diagnostics(), stdout.lock())
        .context("Failed to write diagnostics")?;

    Ok(ExitCode::from(outcome.exit_code()))
}

fn report_format(format: OutputFormat) -> ReportFormat {
    match format {
        OutputFormat::Text => ReportFormat::Text,
        OutputFormat::Json => ReportFormat::Json,
    }
}

/// Renders a fatal diagnostic on stderr.
fn fail<E>(err: E) -> ExitCode
where
    E: miette::Diagnostic + Send + Sync + 'static,
{
    eprintln!("{:?}", miette::Report::new(err));
    ExitCode::from(FAILURE)
}
