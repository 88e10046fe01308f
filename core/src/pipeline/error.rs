use std::any::Any;
use std::path::PathBuf;

use thiserror::Error;

/// Error raised by an analysis engine or a live source on a worker thread.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("log file not found: {0:?}")]
    LogFileMissing(PathBuf),

    #[error("failed to parse combat log: {0}")]
    Parse(String),

    #[error("live log unavailable: {0}")]
    LiveLogUnavailable(String),

    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl EngineError {
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::LogFileMissing(_) => FailureReason::LogFileMissing,
            Self::Parse(_) => FailureReason::ParseFailed,
            Self::LiveLogUnavailable(_) => FailureReason::LiveLogUnavailable,
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                FailureReason::LogFileMissing
            }
            Self::Io { .. } => FailureReason::ParseFailed,
        }
    }
}

/// Short machine-usable cause of a background failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    LogFileMissing,
    ParseFailed,
    LiveLogUnavailable,
    WorkerPanicked,
    /// Display side went away before the result could be delivered
    Disconnected,
}

/// A failure surfaced to the display thread.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason:?}: {detail}")]
pub struct BackgroundFailure {
    pub reason: FailureReason,
    pub detail: String,
}

impl BackgroundFailure {
    pub fn new(reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }

    /// Failure for a worker that panicked, with the panic message if any.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "worker panicked".to_string());
        Self::new(FailureReason::WorkerPanicked, detail)
    }
}

impl From<&EngineError> for BackgroundFailure {
    fn from(err: &EngineError) -> Self {
        Self::new(err.reason(), err.to_string())
    }
}

impl From<EngineError> for BackgroundFailure {
    fn from(err: EngineError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons() {
        let err = EngineError::LogFileMissing(PathBuf::from("/tmp/none.log"));
        let failure = BackgroundFailure::from(&err);
        assert_eq!(failure.reason, FailureReason::LogFileMissing);
        assert!(failure.detail.contains("none.log"));

        let io = EngineError::Io {
            path: PathBuf::from("x"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(io.reason(), FailureReason::LogFileMissing);
        assert_eq!(
            EngineError::Parse("bad".into()).reason(),
            FailureReason::ParseFailed
        );
    }

    #[test]
    fn test_from_panic_payload() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let failure = BackgroundFailure::from_panic(payload.as_ref());
        assert_eq!(failure.reason, FailureReason::WorkerPanicked);
        assert_eq!(failure.detail, "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(BackgroundFailure::from_panic(payload.as_ref()).detail, "owned");

        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(
            BackgroundFailure::from_panic(payload.as_ref()).detail,
            "worker panicked"
        );
    }
}
