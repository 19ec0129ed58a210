//! Shared application service layer for canalflow.
//!
//! This crate gives frontends one interface for loading project files,
//! compiling networks, running solves and building reports.

pub mod compile;
pub mod error;
pub mod progress;
pub mod project_service;
pub mod report;
pub mod solve_service;

pub use compile::{compile_network, solver_config};
pub use error::{AppError, AppResult};
pub use progress::{IterationProgress, RunProgressEvent, RunStage};
pub use project_service::{
    NetworkSummary, get_network, list_networks, load_project, save_project, validate_project,
};
pub use report::{GateReport, NodeReport, SettingsReport, SolveReport, SolveTiming};
pub use solve_service::{
    SolveOverrides, SolveRequest, parse_opening, run_solve, run_solve_with_progress,
    solve_project_network,
};
