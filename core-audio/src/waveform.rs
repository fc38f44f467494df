//! # Waveform Extractor
//!
//! Reduces a stream to a fixed number of amplitude buckets for display.
//!
//! The stream is split into `bucket_count` windows of
//! `ceil(total_frames / bucket_count)` frames. For each window:
//!
//! - **peak** is the largest absolute sample across all channels
//! - **rms** is the root mean square over every sample of every channel
//!
//! Windows past the end of a short stream stay at zero. Frames decoded past
//! the declared length fall into the last window. Extraction is a single
//! sequential pass holding only per-bucket accumulators.

use crate::config::ProcessingConfig;
use crate::decoder::{display_name, SymphoniaDecoder};
use crate::error::{AudioError, Result};
use crate::progress::{ProgressReporter, ProgressSink};
use crate::traits::FrameSource;
use core_async::cancel::CancellationToken;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Amplitude envelope of a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveformResult {
    pub peaks: Vec<f32>,
    pub rms: Vec<f32>,
    pub bucket_count: usize,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_ms: u64,
    pub total_frames: u64,
    pub normalized: bool,
}

/// Extract a waveform from the file at `path`.
///
/// `bucket_count` is checked before the file is opened, so an invalid count
/// is reported as `InvalidBucketCount` even for a missing or corrupt file.
/// Counts above `config.max_waveform_buckets` are invalid too.
#[instrument(skip(path, config, cancel, progress), fields(file = %display_name(path)))]
pub fn extract(
    path: &Path,
    bucket_count: i64,
    normalize: bool,
    config: &ProcessingConfig,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> Result<WaveformResult> {
    let buckets = validate_bucket_count(bucket_count, config.max_waveform_buckets)?;
    let mut decoder = SymphoniaDecoder::open_with_cancel(path, config, cancel)?;
    let result = extract_from(&mut decoder, buckets, normalize, config, cancel, progress);

    if let Ok(waveform) = &result {
        info!(
            "Extracted {} buckets from {} ({}ms)",
            waveform.bucket_count,
            display_name(path),
            waveform.duration_ms
        );
    }
    result
}

/// Check a requested bucket count against `max` before anything is
/// allocated for it.
pub fn validate_bucket_count(bucket_count: i64, max: usize) -> Result<usize> {
    match usize::try_from(bucket_count) {
        Ok(buckets) if buckets > 0 && buckets <= max => Ok(buckets),
        _ => Err(AudioError::InvalidBucketCount(bucket_count)),
    }
}

/// Extract a waveform from an already-open source.
pub fn extract_from<S: FrameSource + ?Sized>(
    source: &mut S,
    bucket_count: usize,
    normalize: bool,
    config: &ProcessingConfig,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> Result<WaveformResult> {
    if bucket_count == 0 || bucket_count > config.max_waveform_buckets {
        return Err(AudioError::InvalidBucketCount(
            i64::try_from(bucket_count).unwrap_or(i64::MAX),
        ));
    }

    let descriptor = source.descriptor().clone();
    let total = descriptor.total_frames;
    if total == 0 {
        return Err(AudioError::EmptySource(
            "stream contains no audio frames".to_string(),
        ));
    }

    let window = total.div_ceil(bucket_count as u64);
    let channels = descriptor.channels.max(1) as usize;
    debug!(
        "Waveform: {} buckets of {} frames over {} frames",
        bucket_count, window, total
    );

    let mut peaks = vec![0f32; bucket_count];
    let mut sum_squares = vec![0f64; bucket_count];
    let mut sample_counts = vec![0u64; bucket_count];

    let mut reporter = ProgressReporter::from_config(progress, config);
    let block_frames = config.block_frames.max(1);
    let mut processed = 0u64;

    while let Some(block) = source.read_next(block_frames)? {
        if cancel.is_cancelled() {
            debug!("Waveform extraction cancelled at frame {}", processed);
            return Err(AudioError::Cancelled);
        }

        for (offset, frame) in block.samples.chunks_exact(channels).enumerate() {
            let index = block.start_frame + offset as u64;
            let bucket = ((index / window) as usize).min(bucket_count - 1);

            for &sample in frame {
                let magnitude = sample.abs();
                if magnitude > peaks[bucket] {
                    peaks[bucket] = magnitude;
                }
                sum_squares[bucket] += sample as f64 * sample as f64;
            }
            sample_counts[bucket] += frame.len() as u64;
        }

        processed = block.end_frame();
        reporter.update_frames(processed, total);
    }

    if processed == 0 {
        return Err(AudioError::EmptySource(
            "stream decoded to no audio frames".to_string(),
        ));
    }

    let mut rms: Vec<f32> = sum_squares
        .iter()
        .zip(&sample_counts)
        .map(|(&sum, &count)| {
            if count == 0 {
                0.0
            } else {
                (sum / count as f64).sqrt() as f32
            }
        })
        .collect();

    if normalize {
        let max_peak = peaks.iter().copied().fold(0f32, f32::max);
        if max_peak > 0.0 {
            let scale = 1.0 / max_peak;
            peaks.iter_mut().for_each(|p| *p *= scale);
            rms.iter_mut().for_each(|r| *r *= scale);
        }
    }

    reporter.complete();

    Ok(WaveformResult {
        peaks,
        rms,
        bucket_count,
        sample_rate: descriptor.sample_rate,
        channels: descriptor.channels,
        duration_ms: descriptor.duration_ms(),
        total_frames: total,
        normalized: normalize,
    })
}
