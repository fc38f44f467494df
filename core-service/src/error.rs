use core_audio::{AudioError, ErrorKind, ErrorReport};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// The worker running a job panicked or was aborted.
    #[error("Job {job_id} did not complete: {message}")]
    JobFailed { job_id: String, message: String },
}

impl CoreError {
    /// Taxonomy kind for audio errors; `None` for runtime and job failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CoreError::Audio(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Stable error code for host bridges.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InitializationFailed(_) => "INITIALIZATION_FAILED",
            CoreError::Runtime(_) => "RUNTIME_ERROR",
            CoreError::Audio(err) => err.kind().code(),
            CoreError::JobFailed { .. } => "JOB_FAILED",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Audio(AudioError::Cancelled))
    }

    pub(crate) fn invalid_arguments(message: impl Into<String>) -> Self {
        CoreError::Audio(AudioError::InvalidArguments(message.into()))
    }

    /// Failure detail in the shape embedded in results. Errors outside the
    /// audio taxonomy are reported as write failures.
    pub fn report(&self) -> ErrorReport {
        match self {
            CoreError::Audio(err) => ErrorReport::from(err),
            other => ErrorReport {
                kind: ErrorKind::IoWriteFailure,
                code: other.code().to_string(),
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
