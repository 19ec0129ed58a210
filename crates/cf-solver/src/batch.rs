//! Parallel solving of independent problems.

use rayon::prelude::*;

use crate::config::SolverConfig;
use crate::error::SolverResult;
use crate::problem::SteadyProblem;
use crate::result::SolveResult;
use crate::solve::solve;

/// Solve many problems in parallel with one shared configuration.
///
/// Problems do not share state, so each result is identical to a sequential
/// [`solve`] of the same problem. Results keep the input order.
pub fn solve_batch(
    problems: &[SteadyProblem<'_>],
    config: &SolverConfig,
) -> Vec<SolverResult<SolveResult>> {
    problems
        .par_iter()
        .map(|problem| solve(problem, config))
        .collect()
}
