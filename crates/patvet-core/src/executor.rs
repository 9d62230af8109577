//! Runs a [`Schedule`] through a pattern matcher under an error budget.

use tracing::{debug, info};

use crate::pattern::PatternMatcher;
use crate::scheduler::Schedule;
use crate::types::{Diagnostic, ErrorBudget};

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Schedule drained with no findings.
    Clean,
    /// Schedule drained with at least one finding.
    Findings(Vec<Diagnostic>),
    /// Budget reached before the schedule drained. Holds exactly budget-many
    /// diagnostics.
    Choked(Vec<Diagnostic>),
}

impl RunOutcome {
    /// Collected diagnostics, in schedule order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Clean => &[],
            Self::Findings(d) | Self::Choked(d) => d,
        }
    }

    /// Returns `true` for a run with no findings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }

    /// Process exit status for this outcome: 0 when clean, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.is_clean())
    }
}

/// Returned by [`Diagnostics::push`] when the budget is already spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetExhausted;

/// Diagnostic collection that never grows past its budget.
#[derive(Debug)]
pub struct Diagnostics {
    budget: ErrorBudget,
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collection for `budget`.
    #[must_use]
    pub fn new(budget: ErrorBudget) -> Self {
        Self {
            budget,
            items: Vec::with_capacity(budget.get()),
        }
    }

    /// Appends `diagnostic` unless the collection is already full.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetExhausted`] without recording anything when the
    /// collection already holds budget-many diagnostics.
    pub fn push(&mut self, diagnostic: Diagnostic) -> Result<(), BudgetExhausted> {
        if self.items.len() >= self.budget.get() {
            return Err(BudgetExhausted);
        }
        self.items.push(diagnostic);
        Ok(())
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the collection.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

/// Evaluates check units in order and stops as soon as the budget overflows.
pub struct Executor<'m, M> {
    matcher: &'m M,
    budget: ErrorBudget,
}

impl<'m, M> Executor<'m, M> {
    /// Creates an executor using `matcher`.
    #[must_use]
    pub fn new(matcher: &'m M, budget: ErrorBudget) -> Self {
        Self { matcher, budget }
    }

    /// Runs every check unit of `schedule` in order.
    ///
    /// A matcher failure becomes one position-less diagnostic and the run
    /// continues. The first finding that would exceed the budget ends the run
    /// with [`RunOutcome::Choked`]; that finding is not recorded and no later
    /// unit is evaluated.
    pub fn run<U, P>(&self, schedule: &Schedule<U, P>) -> RunOutcome
    where
        M: PatternMatcher<U, Pattern = P>,
    {
        info!(
            "Running {} check(s), choke at {}",
            schedule.len(),
            self.budget
        );

        let mut diagnostics = Diagnostics::new(self.budget);
        for (unit, check) in schedule.iter() {
            let checker = check.checker();
            debug!("Evaluating checker `{}`", checker.name());

            let found: Vec<Diagnostic> = match self.matcher.find(unit, checker.pattern()) {
                Ok(bindings) => bindings
                    .into_iter()
                    .flatten()
                    .map(|position| Diagnostic::at(position, checker.message()))
                    .collect(),
                Err(e) => {
                    debug!("Checker `{}` failed: {e}", checker.name());
                    vec![Diagnostic::unpositioned(e.to_string())]
                }
            };

            for diagnostic in found {
                if diagnostics.push(diagnostic).is_err() {
                    info!("Choked after {} diagnostic(s)", diagnostics.len());
                    return RunOutcome::Choked(diagnostics.into_vec());
                }
            }
        }

        if diagnostics.is_empty() {
            info!("No findings");
            RunOutcome::Clean
        } else {
            info!("Found {} diagnostic(s)", diagnostics.len());
            RunOutcome::Findings(diagnostics.into_vec())
        }
    }
}
