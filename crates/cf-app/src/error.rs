//! Error types for the cf-app service layer.

/// Application error type that wraps errors from the backend crates
/// and gives frontends one error to report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Network not found: {0}")]
    NetworkNotFound(String),

    #[error("Network compilation failed: {0}")]
    Compile(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<cf_project::ProjectError> for AppError {
    fn from(err: cf_project::ProjectError) -> Self {
        match err {
            cf_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<cf_network::NetworkError> for AppError {
    fn from(err: cf_network::NetworkError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<cf_solver::SolverError> for AppError {
    fn from(err: cf_solver::SolverError) -> Self {
        AppError::Solver(err.to_string())
    }
}
