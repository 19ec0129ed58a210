//! High-level solver interface.

use std::time::Instant;

use cf_core::units::{m, m3ps};
use cf_network::Network;
use nalgebra::DVector;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::SolverConfig;
use crate::divergence::DivergenceMonitor;
use crate::error::SolverResult;
use crate::problem::SteadyProblem;
use crate::result::{SolveResult, SolveStatus};
use crate::step::{CompiledNetwork, StepOutcome, gate_flows, node_imbalances, relax_step};

/// Progress notifications emitted while a solve runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveProgressEvent {
    Started {
        free_nodes: usize,
        gates: usize,
    },
    Iteration {
        iteration: usize,
        max_delta: f64,
    },
    Finished {
        status: SolveStatus,
        iterations: usize,
    },
}

/// Optional hooks for a solve: cancellation, a wall-clock deadline, progress reporting.
#[derive(Default)]
pub struct SolveControl<'c> {
    pub cancel: Option<CancelToken>,
    pub deadline: Option<Instant>,
    pub progress: Option<&'c mut dyn FnMut(SolveProgressEvent)>,
}

impl<'c> SolveControl<'c> {
    fn stop_requested(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn emit(&mut self, event: SolveProgressEvent) {
        if let Some(callback) = self.progress.as_deref_mut() {
            callback(event);
        }
    }
}

/// Solve a steady-state problem.
///
/// Configuration and problem errors are returned as `Err` before any iteration
/// runs. Every other outcome, including divergence, is an `Ok` result whose
/// [`SolveResult::status`] says how the iteration ended.
pub fn solve(problem: &SteadyProblem<'_>, config: &SolverConfig) -> SolverResult<SolveResult> {
    solve_with_control(problem, config, SolveControl::default())
}

/// Solve a network at its own stored levels and openings.
pub fn solve_network(network: &Network, config: &SolverConfig) -> SolverResult<SolveResult> {
    solve(&SteadyProblem::new(network), config)
}

/// Solve while reporting progress to `callback`.
pub fn solve_with_progress(
    problem: &SteadyProblem<'_>,
    config: &SolverConfig,
    callback: &mut dyn FnMut(SolveProgressEvent),
) -> SolverResult<SolveResult> {
    solve_with_control(
        problem,
        config,
        SolveControl {
            progress: Some(callback),
            ..SolveControl::default()
        },
    )
}

/// Solve with full control over cancellation and progress.
pub fn solve_with_control(
    problem: &SteadyProblem<'_>,
    config: &SolverConfig,
    mut control: SolveControl<'_>,
) -> SolverResult<SolveResult> {
    config.validate()?;
    let compiled = CompiledNetwork::compile(problem)?;
    let network = problem.network;

    let mut levels = DVector::from_iterator(
        problem.levels.len(),
        problem.levels.iter().map(|l| l.value),
    );

    control.emit(SolveProgressEvent::Started {
        free_nodes: compiled.free_nodes().len(),
        gates: network.gates().len(),
    });

    if compiled.free_nodes().is_empty() {
        // Nothing to relax: flows follow directly from the imposed levels.
        let flows = gate_flows(&compiled, &levels, config.gravity)?;
        let imbalances = node_imbalances(&compiled, &flows);
        info!(gates = network.gates().len(), "No free nodes; solution is immediate");
        control.emit(SolveProgressEvent::Finished {
            status: SolveStatus::Converged,
            iterations: 0,
        });
        return Ok(assemble(
            &levels,
            &flows,
            &imbalances,
            0,
            SolveStatus::Converged,
            0.0,
            Vec::new(),
        ));
    }

    debug!(
        free_nodes = compiled.free_nodes().len(),
        gates = network.gates().len(),
        tolerance = config.tolerance.value,
        dt_relax = config.dt_relax.value,
        max_iterations = config.max_iterations,
        "Starting relaxation"
    );

    let mut monitor = DivergenceMonitor::new(config.divergence);
    let mut history = Vec::new();
    let mut last: Option<StepOutcome> = None;
    let mut iterations = 0;

    let status = loop {
        if control.stop_requested() {
            break SolveStatus::Cancelled;
        }

        let outcome = match relax_step(&compiled, &levels, config.dt_relax, config.gravity) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(iteration = iterations + 1, error = %err, "Relaxation step failed");
                break SolveStatus::Diverged;
            }
        };
        iterations += 1;

        let delta = outcome.max_delta;
        history.push(delta);
        control.emit(SolveProgressEvent::Iteration {
            iteration: iterations,
            max_delta: delta,
        });
        debug!(iteration = iterations, max_delta = delta, "Relaxation iteration");

        if !delta.is_finite() || outcome.levels.iter().any(|h| !h.is_finite()) {
            break SolveStatus::Diverged;
        }

        levels.copy_from(&outcome.levels);
        let diverging = monitor.observe(delta);
        last = Some(outcome);

        if delta < config.tolerance.value {
            break SolveStatus::Converged;
        }
        if diverging {
            break SolveStatus::Diverged;
        }
        if iterations >= config.max_iterations {
            break SolveStatus::MaxIterationsExceeded;
        }
    };

    // Report flows on the last snapshot the solver committed from. When no
    // iteration committed, evaluate them on the current levels instead.
    let (flows, imbalances, max_delta) = match last {
        Some(outcome) => (outcome.flows, outcome.imbalances, outcome.max_delta),
        None => match gate_flows(&compiled, &levels, config.gravity) {
            Ok(flows) => {
                let imbalances = node_imbalances(&compiled, &flows);
                (flows, imbalances, 0.0)
            }
            Err(_) => (
                DVector::zeros(network.gates().len()),
                DVector::zeros(network.nodes().len()),
                0.0,
            ),
        },
    };

    match status {
        SolveStatus::Converged => info!(iterations, max_delta, "Relaxation converged"),
        _ => warn!(iterations, max_delta, status = %status, "Relaxation did not converge"),
    }
    control.emit(SolveProgressEvent::Finished { status, iterations });

    Ok(assemble(
        &levels,
        &flows,
        &imbalances,
        iterations,
        status,
        max_delta,
        history,
    ))
}

fn assemble(
    levels: &DVector<f64>,
    flows: &DVector<f64>,
    imbalances: &DVector<f64>,
    iterations: usize,
    status: SolveStatus,
    max_delta: f64,
    delta_history: Vec<f64>,
) -> SolveResult {
    SolveResult {
        levels: levels.iter().map(|&h| m(h)).collect(),
        flows: flows.iter().map(|&q| m3ps(q)).collect(),
        imbalances: imbalances.iter().map(|&i| m3ps(i)).collect(),
        iterations,
        converged: status.is_converged(),
        status,
        max_delta: m(max_delta),
        delta_history: delta_history.into_iter().map(m).collect(),
    }
}
