//! Host-facing request and response records.
//!
//! Field names follow the host bridge's camelCase convention. Format names
//! arrive as strings and are resolved against the format registry here, so an
//! unknown name surfaces as `UnsupportedFormat` rather than a decode error.
//! `trimAudio` also accepts the pseudo-format `copy` for a lossless cut.

use crate::error::{CoreError, Result};
use core_audio::{validate_bucket_count, AudioFormat, ConversionRequest, TrimRangeMs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `convertAudio` arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertAudioRequest {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub target_format: String,
    /// Bits per second; the processing default applies when absent.
    #[serde(default)]
    pub bitrate: Option<u32>,
    /// Output sample rate in Hz; the source rate is kept when absent.
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

impl ConvertAudioRequest {
    pub fn new(
        source_path: impl Into<PathBuf>,
        target_path: impl Into<PathBuf>,
        target_format: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_path: target_path.into(),
            target_format: target_format.into(),
            bitrate: None,
            sample_rate: None,
        }
    }

    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub(crate) fn to_engine(&self) -> Result<ConversionRequest> {
        let format = resolve_format(&self.target_format)?;
        let mut request = ConversionRequest::new(&self.source_path, &self.target_path, format);
        request.bitrate = self.bitrate;
        request.sample_rate = self.sample_rate;
        request.validate()?;
        Ok(request)
    }
}

/// `trimAudio` arguments. Milliseconds are signed so negative input reaches
/// validation instead of failing deserialization.
///
/// A `targetFormat` of `copy` cuts a WAV source without re-encoding; bitrate
/// and sample rate are then ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimAudioRequest {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub target_format: String,
    pub start_ms: i64,
    pub end_ms: i64,
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

impl TrimAudioRequest {
    pub fn new(
        source_path: impl Into<PathBuf>,
        target_path: impl Into<PathBuf>,
        target_format: impl Into<String>,
        start_ms: i64,
        end_ms: i64,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_path: target_path.into(),
            target_format: target_format.into(),
            start_ms,
            end_ms,
            bitrate: None,
            sample_rate: None,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn range(&self) -> TrimRangeMs {
        TrimRangeMs::new(self.start_ms, self.end_ms)
    }

    /// Whether the lossless copy path was requested.
    pub fn is_copy(&self) -> bool {
        self.target_format.trim().eq_ignore_ascii_case(COPY_FORMAT)
    }

    /// Checks a copy request without touching the filesystem.
    pub(crate) fn validate_copy(&self) -> Result<()> {
        require_path(&self.source_path, "sourcePath")?;
        require_path(&self.target_path, "targetPath")?;
        self.range().validate()?;
        Ok(())
    }

    pub(crate) fn to_engine(&self) -> Result<ConversionRequest> {
        let format = resolve_format(&self.target_format)?;
        let mut request = ConversionRequest::new(&self.source_path, &self.target_path, format)
            .with_trim(self.range());
        request.bitrate = self.bitrate;
        request.sample_rate = self.sample_rate;
        request.validate()?;
        Ok(request)
    }
}

/// `extractWaveformData` arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveformRequest {
    pub source_path: PathBuf,
    pub bucket_count: i64,
    #[serde(default)]
    pub normalize: bool,
}

impl WaveformRequest {
    pub fn new(source_path: impl Into<PathBuf>, bucket_count: i64) -> Self {
        Self {
            source_path: source_path.into(),
            bucket_count,
            normalize: false,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize = true;
        self
    }

    /// The bucket count is checked first, so a bad count is reported as
    /// such whatever the path.
    pub(crate) fn validate(&self, max_buckets: usize) -> Result<()> {
        validate_bucket_count(self.bucket_count, max_buckets)?;
        require_path(&self.source_path, "sourcePath")?;
        Ok(())
    }
}

/// `isAudioFormatSupported` answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatSupport {
    pub supported: bool,
    /// The name exactly as the caller passed it.
    pub format: String,
}

/// `trimAudio` target format selecting the lossless copy path.
pub const COPY_FORMAT: &str = "copy";

fn resolve_format(name: &str) -> Result<AudioFormat> {
    if name.trim().is_empty() {
        return Err(CoreError::invalid_arguments("targetFormat is required"));
    }
    Ok(name.parse::<AudioFormat>()?)
}

pub(crate) fn require_path(path: &Path, field: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(CoreError::invalid_arguments(format!("{} is required", field)));
    }
    Ok(())
}
