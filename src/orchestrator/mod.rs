//! Requirement orchestration.
//!
//! Requirements run strictly in declared order, since later ones may invoke tools
//! that earlier ones put on the PATH. The orchestrator converts every
//! outcome into a report entry and never returns an error itself: callers
//! read the [`OrchestrationReport`] and decide policy.

use crate::requirement::status::{OrchestrationReport, RequirementResult};
use crate::requirement::{EnsureContext, Requirement};

/// Per-run execution policy.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop at the first failure and record the rest as skipped.
    pub fail_fast: bool,
    /// Requirement names excluded from this run (recorded as skipped).
    pub skip: Vec<String>,
    /// Requirement names re-acquired even if already satisfied ("all"
    /// forces everything).
    pub force: Vec<String>,
}

/// Run every requirement in declared order and aggregate the results.
///
/// With `fail_fast`, requirements after a failure are recorded as
/// `Skipped` (distinct from `Failed`) and their `ensure()` never runs.
pub fn run(
    requirements: &[Requirement],
    ctx: &EnsureContext<'_>,
    options: &RunOptions,
) -> OrchestrationReport {
    let mut results = Vec::with_capacity(requirements.len());
    let mut halted = false;

    for requirement in requirements {
        if options.skip.iter().any(|s| s == &requirement.name) {
            tracing::info!("{}: skipped by flag", requirement.name);
            results.push(RequirementResult::skipped(&requirement.name));
            continue;
        }

        if halted {
            results.push(RequirementResult::skipped(&requirement.name));
            continue;
        }

        let force = ctx.force
            || options
                .force
                .iter()
                .any(|f| f == &requirement.name || f == "all");
        let result = requirement.ensure(&ctx.with_force(force));
        if !result.is_satisfied() && options.fail_fast {
            tracing::warn!("{}: failed; skipping remaining requirements", requirement.name);
            halted = true;
        }
        results.push(result);
    }

    OrchestrationReport::new(results)
}
