//! # Lossless Copy Trim
//!
//! Cuts a PCM WAV file by copying its stored samples. Nothing is decoded to
//! float or re-quantized, so the output keeps the source's sample format,
//! rate and channel layout bit for bit.
//!
//! Compressed sources cannot be cut this way without a packet-level remuxer
//! and are rejected with `EncodeUnsupported`.

use crate::config::ProcessingConfig;
use crate::convert::{ConversionResult, ConversionStatus};
use crate::decoder::{display_name, FormatDetector};
use crate::encoder::{persist_output, temp_output};
use crate::error::{AudioError, Result};
use crate::format::{AudioFormat, CodecKind};
use crate::progress::{ProgressReporter, ProgressSink};
use crate::traits::{LengthSource, StreamDescriptor};
use crate::trim::{FrameRange, TrimRangeMs};
use core_async::cancel::CancellationToken;
use hound::{SampleFormat, WavReader, WavWriter};
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

fn read_error(name: &str, err: hound::Error) -> AudioError {
    match err {
        hound::Error::Unsupported => {
            AudioError::UnsupportedFormat(format!("{}: WAV sample encoding cannot be copied", name))
        }
        other => AudioError::CorruptStream(format!("{}: {}", name, other)),
    }
}

/// Copy `[range.start_ms, range.end_ms)` of the WAV file `source` to
/// `target` without re-encoding.
///
/// The end is clamped to the source length as in a decoding trim.
/// Cancellation is checked before every block and leaves no output.
///
/// # Errors
///
/// - `InvalidRange` / `InvalidArguments` for a malformed request
/// - `FileNotFound` if the source cannot be read
/// - `EncodeUnsupported` if the source is not a WAV file
/// - `UnsupportedFormat` / `CorruptStream` if the WAV data cannot be read
/// - `IoWriteFailure` if the output cannot be written
#[instrument(skip_all, fields(source = %display_name(source)))]
pub fn copy_trim(
    source: &Path,
    target: &Path,
    range: TrimRangeMs,
    config: &ProcessingConfig,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> Result<ConversionResult> {
    range.validate()?;
    if source.as_os_str().is_empty() || target.as_os_str().is_empty() {
        return Err(AudioError::InvalidArguments(
            "source and target paths are required".to_string(),
        ));
    }

    let name = display_name(source);
    let format = FormatDetector::sniff_file(source)?;
    if format != AudioFormat::Wav {
        return Err(AudioError::EncodeUnsupported(format!(
            "lossless copy needs a WAV source, {} is {}",
            name, format
        )));
    }

    let mut reader = WavReader::open(source).map_err(|e| read_error(&name, e))?;
    let spec = reader.spec();
    let descriptor = StreamDescriptor {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        total_frames: reader.duration() as u64,
        bits_per_sample: Some(spec.bits_per_sample as u32),
        codec: CodecKind::Pcm,
        format: AudioFormat::Wav,
        length_source: LengthSource::Header,
    };

    let frames = range.resolve(&descriptor)?;
    let start = u32::try_from(frames.start_frame)
        .map_err(|_| AudioError::InvalidRange(format!("start frame {} out of range", frames.start_frame)))?;
    reader
        .seek(start)
        .map_err(|e| AudioError::CorruptStream(format!("{}: {}", name, e)))?;

    debug!(
        "Copying frames {}..{} ({} bit {:?})",
        frames.start_frame, frames.end_frame, spec.bits_per_sample, spec.sample_format
    );

    // The writer is declared after the temp path, so on an early return it
    // closes the file before the temp path removes it.
    let (file, temp_path) = temp_output(target)?.into_parts();
    let mut writer =
        WavWriter::new(BufWriter::new(file), spec).map_err(|e| AudioError::io_write(target, e))?;

    let mut reporter = ProgressReporter::from_config(progress, config);
    let copy = BlockCopy {
        frames,
        channels: spec.channels as u64,
        block_frames: config.block_frames.max(1) as u64,
        name: &name,
        target,
    };
    let copied = match spec.sample_format {
        SampleFormat::Int => copy.run::<i32, _, _>(&mut reader, &mut writer, cancel, &mut reporter)?,
        SampleFormat::Float => copy.run::<f32, _, _>(&mut reader, &mut writer, cancel, &mut reporter)?,
    };

    let Some(copied) = copied.filter(|_| !cancel.is_cancelled()) else {
        warn!("Copy trim of {} cancelled", name);
        return Ok(ConversionResult::cancelled(AudioFormat::Wav, &descriptor));
    };

    writer
        .finalize()
        .map_err(|e| AudioError::io_write(target, e))?;
    let bytes = persist_output(temp_path, target)?;
    reporter.complete();

    info!(
        "Copied {} frames ({} bytes) of {} to {}",
        copied,
        bytes,
        name,
        display_name(target)
    );

    Ok(ConversionResult {
        status: ConversionStatus::Completed,
        success: true,
        output_path: Some(target.to_string_lossy().into_owned()),
        format: AudioFormat::Wav,
        duration_ms: descriptor.ms_for_frames(copied),
        frames_written: copied,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bitrate: spec.sample_rate as u64 * spec.channels as u64 * spec.bits_per_sample as u64,
        error: None,
    })
}

struct BlockCopy<'a> {
    frames: FrameRange,
    channels: u64,
    block_frames: u64,
    name: &'a str,
    target: &'a Path,
}

impl BlockCopy<'_> {
    /// Returns the number of frames copied, or `None` if cancelled.
    fn run<S, R, W>(
        &self,
        reader: &mut WavReader<R>,
        writer: &mut WavWriter<W>,
        cancel: &CancellationToken,
        reporter: &mut ProgressReporter<'_>,
    ) -> Result<Option<u64>>
    where
        S: hound::Sample,
        R: Read,
        W: Write + Seek,
    {
        let total = self.frames.len();
        let mut samples = reader.samples::<S>();
        let mut copied = 0u64;

        while copied < total {
            if cancel.is_cancelled() {
                return Ok(None);
            }

            let block = self.block_frames.min(total - copied);
            for _ in 0..block * self.channels {
                let sample = samples
                    .next()
                    .ok_or_else(|| {
                        AudioError::CorruptStream(format!("{}: data chunk ended early", self.name))
                    })?
                    .map_err(|e| read_error(self.name, e))?;
                writer
                    .write_sample(sample)
                    .map_err(|e| AudioError::io_write(self.target, e))?;
            }

            copied += block;
            reporter.update_frames(copied, total);
        }

        Ok(Some(copied))
    }
}
