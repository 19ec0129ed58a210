//! Progress reporting shared by frontends.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingProject,
    CompilingNetwork,
    Solving,
    Completed,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::LoadingProject => "loading",
            RunStage::CompilingNetwork => "compiling",
            RunStage::Solving => "solving",
            RunStage::Completed => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IterationProgress {
    pub iteration: usize,
    pub max_iterations: usize,
    pub max_delta_m: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub iteration: Option<IterationProgress>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            iteration: None,
        }
    }
}
