//! # Audio Error Types
//!
//! Errors raised by the processing engine, plus the stable [`ErrorKind`]
//! taxonomy and the serializable [`ErrorReport`] handed to hosts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while decoding, encoding or analysing audio.
#[derive(Error, Debug)]
pub enum AudioError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// Source file does not exist or cannot be opened for reading.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Container or codec is not one of the supported formats.
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Container was recognized but its contents cannot be decoded.
    #[error("Corrupt audio stream: {0}")]
    CorruptStream(String),

    /// Source decoded to zero frames.
    #[error("Audio source is empty: {0}")]
    EmptySource(String),

    // ========================================================================
    // Output Errors
    // ========================================================================
    /// Target format has no encoder in this build.
    #[error("Encoding not supported: {0}")]
    EncodeUnsupported(String),

    /// Writing, syncing or renaming the output failed.
    #[error("Failed to write output: {0}")]
    IoWriteFailure(String),

    // ========================================================================
    // Request Errors
    // ========================================================================
    /// Seek target lies past the end of the stream.
    #[error("Seek position {requested} out of range (stream has {total} frames)")]
    SeekOutOfRange { requested: u64, total: u64 },

    /// Trim range is negative, empty or inverted.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Waveform bucket count must be positive and within the configured
    /// maximum.
    #[error("Invalid bucket count: {0} (must be greater than 0 and within the configured maximum)")]
    InvalidBucketCount(i64),

    /// Missing or malformed request argument.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Operation stopped through its cancellation token.
    #[error("Operation cancelled")]
    Cancelled,
}

impl AudioError {
    /// Stable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AudioError::FileNotFound(_) => ErrorKind::FileNotFound,
            AudioError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            AudioError::CorruptStream(_) => ErrorKind::CorruptStream,
            AudioError::EmptySource(_) => ErrorKind::EmptySource,
            AudioError::EncodeUnsupported(_) => ErrorKind::EncodeUnsupported,
            AudioError::IoWriteFailure(_) => ErrorKind::IoWriteFailure,
            AudioError::SeekOutOfRange { .. } => ErrorKind::SeekOutOfRange,
            AudioError::InvalidRange(_) => ErrorKind::InvalidRange,
            AudioError::InvalidBucketCount(_) => ErrorKind::InvalidBucketCount,
            AudioError::InvalidArguments(_) => ErrorKind::InvalidArguments,
            AudioError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Returns `true` if the request itself was malformed (no I/O happened).
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AudioError::InvalidRange(_)
                | AudioError::InvalidBucketCount(_)
                | AudioError::InvalidArguments(_)
                | AudioError::EncodeUnsupported(_)
        )
    }

    /// Returns `true` if the source file is missing, unknown or unreadable.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            AudioError::FileNotFound(_)
                | AudioError::UnsupportedFormat(_)
                | AudioError::CorruptStream(_)
                | AudioError::EmptySource(_)
        )
    }

    pub(crate) fn io_write(path: &Path, err: impl fmt::Display) -> Self {
        AudioError::IoWriteFailure(format!(
            "{}: {}",
            core_runtime::logging::strip_path(&path.to_string_lossy()),
            err
        ))
    }
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        AudioError::IoWriteFailure(format!("WAV writer: {}", err))
    }
}

/// Result type for audio operations.
pub type Result<T> = std::result::Result<T, AudioError>;

/// Error taxonomy shared with hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    FileNotFound,
    UnsupportedFormat,
    EncodeUnsupported,
    CorruptStream,
    SeekOutOfRange,
    InvalidRange,
    InvalidBucketCount,
    EmptySource,
    IoWriteFailure,
    InvalidArguments,
    Cancelled,
}

impl ErrorKind {
    /// Stable error code, e.g. `"FILE_NOT_FOUND"`.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::FileNotFound => "FILE_NOT_FOUND",
            ErrorKind::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            ErrorKind::EncodeUnsupported => "ENCODE_UNSUPPORTED",
            ErrorKind::CorruptStream => "CORRUPT_STREAM",
            ErrorKind::SeekOutOfRange => "SEEK_OUT_OF_RANGE",
            ErrorKind::InvalidRange => "INVALID_RANGE",
            ErrorKind::InvalidBucketCount => "INVALID_BUCKET_COUNT",
            ErrorKind::EmptySource => "EMPTY_SOURCE",
            ErrorKind::IoWriteFailure => "IO_WRITE_FAILURE",
            ErrorKind::InvalidArguments => "INVALID_ARGUMENTS",
            ErrorKind::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Serializable failure detail embedded in results and job events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
}

impl From<&AudioError> for ErrorReport {
    fn from(err: &AudioError) -> Self {
        let kind = err.kind();
        Self {
            kind,
            code: kind.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_code() {
        let err = AudioError::InvalidBucketCount(0);
        assert_eq!(err.kind(), ErrorKind::InvalidBucketCount);
        assert_eq!(err.kind().code(), "INVALID_BUCKET_COUNT");
        assert!(err.is_validation_error());
        assert!(!err.is_source_error());

        let err = AudioError::SeekOutOfRange {
            requested: 10,
            total: 5,
        };
        assert_eq!(err.kind().code(), "SEEK_OUT_OF_RANGE");
        assert!(err.to_string().contains("5 frames"));
    }

    #[test]
    fn test_report_serialization() {
        let report = ErrorReport::from(&AudioError::FileNotFound("take.wav".to_string()));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "FILE_NOT_FOUND");
        assert_eq!(json["code"], "FILE_NOT_FOUND");
        assert_eq!(json["message"], "File not found: take.wav");
    }

    #[test]
    fn test_io_write_strips_directories() {
        let err = AudioError::io_write(Path::new("/home/ana/out/mix.wav"), "disk full");
        assert_eq!(err.to_string(), "Failed to write output: mix.wav: disk full");
        assert_eq!(err.kind(), ErrorKind::IoWriteFailure);
    }
}
