//! Steady-state level solver for canal networks.
//!
//! This crate finds the equilibrium water level of every free node and the flow
//! through every gate for a fixed gate configuration. Gate flows depend on levels
//! and levels depend on net flow, so the solver relaxes all free nodes together
//! from one level snapshot per iteration until the largest level change falls
//! below tolerance.

pub mod batch;
pub mod cancel;
pub mod config;
pub mod divergence;
pub mod error;
pub mod problem;
pub mod result;
pub mod solve;
pub mod step;

pub use batch::solve_batch;
pub use cancel::CancelToken;
pub use config::{DivergencePolicy, SolverConfig};
pub use divergence::DivergenceMonitor;
pub use error::{SolverError, SolverResult};
pub use problem::SteadyProblem;
pub use result::{SolveResult, SolveStatus};
pub use solve::{
    SolveControl, SolveProgressEvent, solve, solve_network, solve_with_control,
    solve_with_progress,
};
