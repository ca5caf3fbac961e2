use std::time::Duration;
use thiserror::Error;

/// Fatal error classes, one per step of the verification sequence.
///
/// None of these are recovered locally; the run aborts with the first error
/// raised and reports it through the process exit status. Cleanup of an
/// already-launched browser still happens, but never masks the original
/// error.
#[derive(Debug, Clone, Error)]
pub enum VerifyError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("browsing context unavailable: {0}")]
    Context(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("screenshot capture failed: {0}")]
    Capture(String),
}

impl VerifyError {
    /// Name of the pipeline step this error aborted, for log output.
    pub fn step(&self) -> &'static str {
        match self {
            VerifyError::Launch(_) => "launch",
            VerifyError::Context(_) => "context",
            VerifyError::Navigation(_) => "navigate",
            VerifyError::Timeout(_) => "wait",
            VerifyError::Capture(_) => "capture",
        }
    }
}

impl From<std::io::Error> for VerifyError {
    fn from(err: std::io::Error) -> Self {
        VerifyError::Capture(err.to_string())
    }
}
