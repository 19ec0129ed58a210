//! Solve execution service.

use std::path::Path;
use std::time::Instant;

use cf_core::units::{m, s};
use cf_project::schema::Project;
use cf_solver::{CancelToken, SolveControl, SolveProgressEvent, SolverConfig, SteadyProblem};
use tracing::info;

use crate::compile;
use crate::error::{AppError, AppResult};
use crate::progress::{IterationProgress, RunProgressEvent, RunStage};
use crate::project_service;
use crate::report::{SolveReport, SolveTiming};

/// Per-run changes on top of the project's stored settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveOverrides {
    pub max_iterations: Option<usize>,
    pub dt_relax_s: Option<f64>,
    pub tolerance_m: Option<f64>,
    /// Gate id and opening for this run only
    pub openings: Vec<(String, f64)>,
}

impl SolveOverrides {
    pub fn apply(&self, mut config: SolverConfig) -> SolverConfig {
        if let Some(n) = self.max_iterations {
            config = config.with_max_iterations(n);
        }
        if let Some(dt) = self.dt_relax_s {
            config = config.with_dt_relax(s(dt));
        }
        if let Some(tol) = self.tolerance_m {
            config = config.with_tolerance(m(tol));
        }
        config
    }
}

/// Parse a `GATE=VALUE` opening override.
pub fn parse_opening(arg: &str) -> AppResult<(String, f64)> {
    let (gate, value) = arg
        .split_once('=')
        .ok_or_else(|| AppError::InvalidInput(format!("Expected GATE=VALUE, got '{}'", arg)))?;
    let gate = gate.trim();
    if gate.is_empty() {
        return Err(AppError::InvalidInput(format!("Missing gate id in '{}'", arg)));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid opening in '{}'", arg)))?;
    Ok((gate.to_string(), value))
}

/// Request to solve one network of a project file.
pub struct SolveRequest<'a> {
    pub project_path: &'a Path,
    pub network_id: &'a str,
    pub overrides: SolveOverrides,
    pub cancel: Option<CancelToken>,
}

/// Load the project, solve the network and build a report.
pub fn run_solve(request: &SolveRequest<'_>) -> AppResult<SolveReport> {
    run_solve_with_progress(request, None)
}

pub fn run_solve_with_progress(
    request: &SolveRequest<'_>,
    mut progress: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<SolveReport> {
    let start = Instant::now();
    emit(&mut progress, RunStage::LoadingProject, start, None);
    let project = project_service::load_project(request.project_path)?;
    solve_project_network_inner(
        &project,
        request.network_id,
        &request.overrides,
        request.cancel.clone(),
        &mut progress,
        start,
    )
}

/// Solve one network of an already loaded project.
pub fn solve_project_network(
    project: &Project,
    network_id: &str,
    overrides: &SolveOverrides,
) -> AppResult<SolveReport> {
    solve_project_network_inner(project, network_id, overrides, None, &mut None, Instant::now())
}

fn solve_project_network_inner(
    project: &Project,
    network_id: &str,
    overrides: &SolveOverrides,
    cancel: Option<CancelToken>,
    progress: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    start: Instant,
) -> AppResult<SolveReport> {
    let def = project_service::get_network(project, network_id)?;

    emit(progress, RunStage::CompilingNetwork, start, Some(def.name.clone()));
    let compile_start = Instant::now();
    let network = compile::compile_network(def)?;
    let config = overrides.apply(compile::solver_config(&cf_project::effective_solver(
        project, def,
    )));
    let compile_time_s = compile_start.elapsed().as_secs_f64();

    let mut problem = SteadyProblem::new(&network);
    for (gate, opening) in &overrides.openings {
        problem
            .set_opening_by_key(gate, *opening)
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    }

    emit(progress, RunStage::Solving, start, None);
    let solve_start = Instant::now();
    let max_iterations = config.max_iterations;
    let mut on_iteration = |event: SolveProgressEvent| {
        if let (Some(cb), SolveProgressEvent::Iteration { iteration, max_delta }) =
            (progress.as_deref_mut(), event)
        {
            cb(RunProgressEvent {
                stage: RunStage::Solving,
                elapsed_wall_s: start.elapsed().as_secs_f64(),
                message: None,
                iteration: Some(IterationProgress {
                    iteration,
                    max_iterations,
                    max_delta_m: max_delta,
                }),
            });
        }
    };
    let control = SolveControl {
        cancel,
        deadline: None,
        progress: Some(&mut on_iteration),
    };
    let result = cf_solver::solve_with_control(&problem, &config, control)?;
    let solve_time_s = solve_start.elapsed().as_secs_f64();

    let timing = SolveTiming {
        compile_time_s,
        solve_time_s,
        total_time_s: start.elapsed().as_secs_f64(),
    };
    info!(
        network = network_id,
        status = %result.status,
        iterations = result.iterations,
        solve_time_s,
        "Solve finished"
    );

    let report = SolveReport::build(
        &project.name,
        network_id,
        &network,
        &problem.openings,
        &config,
        &result,
        timing,
    );
    emit(
        progress,
        RunStage::Completed,
        start,
        Some(result.status.to_string()),
    );
    Ok(report)
}

fn emit(
    progress: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    start: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            start.elapsed().as_secs_f64(),
            message,
        ));
    }
}
