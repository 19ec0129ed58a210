//! Error types for solver operations.

use cf_hydraulics::HydraulicsError;
use cf_network::NetworkError;
use thiserror::Error;

/// Fatal errors raised before iteration starts.
///
/// Non-convergence and divergence are not errors; they are reported through
/// [`crate::SolveResult::status`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Invalid solver setting {parameter} = {value} (expected {expected})")]
    InvalidSetting {
        parameter: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Gate '{gate}': {source}")]
    Gate {
        gate: String,
        source: HydraulicsError,
    },

    #[error("Node '{node}': {source}")]
    Node {
        node: String,
        source: HydraulicsError,
    },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Hydraulics error: {0}")]
    Hydraulics(#[from] HydraulicsError),
}

pub type SolverResult<T> = Result<T, SolverError>;
