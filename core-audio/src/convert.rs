//! # Conversion Orchestrator
//!
//! Decode, optionally trim, and re-encode a file.
//!
//! ## Flow
//!
//! 1. Validate the request against the format registry and the trim range
//!    shape. Nothing touches the filesystem until this passes.
//! 2. Open the source and, if requested, cut it down to the trim range and
//!    re-time it to the requested sample rate.
//! 3. Stream blocks into the encoder. Cancellation is checked before every
//!    block and once more before the output is moved into place.
//! 4. Finish the encoder, which syncs and renames the temporary output.
//!
//! A cancelled conversion is not an error: it returns a result with status
//! [`ConversionStatus::Cancelled`] and leaves no output behind.

use crate::config::ProcessingConfig;
use crate::decoder::{display_name, SymphoniaDecoder};
use crate::encoder::{create_encoder, EncoderOptions};
use crate::error::{AudioError, ErrorKind, ErrorReport, Result};
use crate::format::{ensure_encodable, AudioFormat};
use crate::progress::{ProgressReporter, ProgressSink};
use crate::resample::{validate_output_rate, ResampledStream};
use crate::traits::{FrameSource, StreamDescriptor};
use crate::trim::{TrimRangeMs, TrimmedStream};
use core_async::cancel::CancellationToken;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};

/// A conversion job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub target: PathBuf,
    pub format: AudioFormat,
    /// Bits per second for lossy targets; ignored for WAV.
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub trim: Option<TrimRangeMs>,
    /// Output sample rate; the source rate is kept when absent.
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

impl ConversionRequest {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>, format: AudioFormat) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            format,
            bitrate: None,
            trim: None,
            sample_rate: None,
        }
    }

    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn with_trim(mut self, range: TrimRangeMs) -> Self {
        self.trim = Some(range);
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Checks everything that can be checked without I/O.
    pub fn validate(&self) -> Result<()> {
        if self.source.as_os_str().is_empty() {
            return Err(AudioError::InvalidArguments("source path is empty".to_string()));
        }
        if self.target.as_os_str().is_empty() {
            return Err(AudioError::InvalidArguments("target path is empty".to_string()));
        }
        if self.bitrate == Some(0) {
            return Err(AudioError::InvalidArguments(
                "bitrate must be greater than 0".to_string(),
            ));
        }
        if let Some(rate) = self.sample_rate {
            validate_output_rate(rate)?;
        }
        ensure_encodable(self.format)?;
        if let Some(range) = &self.trim {
            range.validate()?;
        }
        Ok(())
    }
}

/// How a conversion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversionStatus {
    Completed,
    Cancelled,
    Failed,
}

/// Outcome of a conversion or trim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub status: ConversionStatus,
    pub success: bool,
    pub output_path: Option<String>,
    pub format: AudioFormat,
    pub duration_ms: u64,
    pub frames_written: u64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bitrate: u64,
    pub error: Option<ErrorReport>,
}

impl ConversionResult {
    /// Result record for a conversion that failed with `err`.
    pub fn failed(format: AudioFormat, err: &AudioError) -> Self {
        Self::from_report(format, ErrorReport::from(err))
    }

    /// Result record for a failure that is already in host form. A
    /// `Cancelled` report yields [`ConversionStatus::Cancelled`].
    pub fn from_report(format: AudioFormat, report: ErrorReport) -> Self {
        let status = match report.kind {
            ErrorKind::Cancelled => ConversionStatus::Cancelled,
            _ => ConversionStatus::Failed,
        };
        Self {
            status,
            success: false,
            output_path: None,
            format,
            duration_ms: 0,
            frames_written: 0,
            sample_rate: 0,
            channels: 0,
            bitrate: 0,
            error: Some(report),
        }
    }

    pub(crate) fn cancelled(format: AudioFormat, descriptor: &StreamDescriptor) -> Self {
        Self {
            sample_rate: descriptor.sample_rate,
            channels: descriptor.channels,
            ..Self::failed(format, &AudioError::Cancelled)
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ConversionStatus::Completed
    }
}

/// Runs conversions with a fixed processing configuration.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ProcessingConfig,
}

impl Converter {
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Convert `request.source` into `request.target`.
    ///
    /// # Errors
    ///
    /// Validation errors (`EncodeUnsupported`, `InvalidRange`,
    /// `InvalidArguments`) are returned before any file is opened. Source
    /// errors (`FileNotFound`, `UnsupportedFormat`, `CorruptStream`) and
    /// `IoWriteFailure` abort the conversion and remove partial output.
    /// Cancellation is reported through [`ConversionStatus::Cancelled`].
    #[instrument(
        skip(self, request, cancel, progress),
        fields(source = %display_name(&request.source), format = %request.format)
    )]
    pub fn convert(
        &self,
        request: &ConversionRequest,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<ConversionResult> {
        request.validate()?;
        debug!(
            "Converting to {} (bitrate {:?}, trim {:?}, rate {:?})",
            request.format, request.bitrate, request.trim, request.sample_rate
        );

        let decoder = match SymphoniaDecoder::open_with_cancel(&request.source, &self.config, cancel) {
            Ok(decoder) => decoder,
            Err(AudioError::Cancelled) => {
                warn!("Conversion cancelled while opening the source");
                return Ok(ConversionResult::failed(request.format, &AudioError::Cancelled));
            }
            Err(e) => return Err(e),
        };
        let source_rate = decoder.descriptor().sample_rate;

        let mut source: Box<dyn FrameSource> = match request.trim {
            Some(range) => Box::new(TrimmedStream::new(decoder, range)?),
            None => Box::new(decoder),
        };
        if let Some(rate) = request.sample_rate.filter(|&rate| rate != source_rate) {
            source = Box::new(ResampledStream::new(source, rate)?);
        }

        let result = self.transcode(request, source.as_mut(), cancel, progress);
        if let Err(e) = &result {
            error!("Conversion of {} failed: {}", display_name(&request.source), e);
        }
        result
    }

    fn transcode(
        &self,
        request: &ConversionRequest,
        source: &mut dyn FrameSource,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<ConversionResult> {
        let descriptor = source.descriptor().clone();
        let options = EncoderOptions::from_config(&self.config, request.bitrate);
        let mut encoder = create_encoder(&request.target, request.format, &descriptor, &options)?;

        let mut reporter = ProgressReporter::from_config(progress, &self.config);
        let total = descriptor.total_frames;
        let block_frames = self.config.block_frames.max(1);

        loop {
            if cancel.is_cancelled() {
                warn!(
                    "Conversion cancelled after {} of {} frames",
                    encoder.frames_written(),
                    total
                );
                drop(encoder);
                return Ok(ConversionResult::cancelled(request.format, &descriptor));
            }

            let Some(block) = source.read_next(block_frames)? else {
                break;
            };
            encoder.write_block(&block)?;
            reporter.update_frames(block.end_frame(), total);
        }

        if cancel.is_cancelled() {
            warn!("Conversion cancelled before output was finalized");
            drop(encoder);
            return Ok(ConversionResult::cancelled(request.format, &descriptor));
        }

        let summary = encoder.finish()?;
        reporter.complete();

        let bitrate = match request.format {
            AudioFormat::Wav => {
                descriptor.sample_rate as u64
                    * descriptor.channels as u64
                    * options.wav_sample_format.bits_per_sample() as u64
            }
            _ => options.bitrate as u64,
        };

        let result = ConversionResult {
            status: ConversionStatus::Completed,
            success: true,
            output_path: Some(summary.path.to_string_lossy().into_owned()),
            format: request.format,
            duration_ms: descriptor.ms_for_frames(summary.frames_written),
            frames_written: summary.frames_written,
            sample_rate: descriptor.sample_rate,
            channels: descriptor.channels,
            bitrate,
            error: None,
        };

        info!(
            "Converted {} to {} ({} frames, {}ms)",
            display_name(&request.source),
            display_name(&request.target),
            result.frames_written,
            result.duration_ms
        );
        Ok(result)
    }
}
