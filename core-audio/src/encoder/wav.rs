//! WAV output through `hound`.

use super::{persist_output, temp_output, EncodeSummary, WavSampleFormat};
use crate::error::{AudioError, Result};
use crate::traits::{AudioEncoder, FrameBlock, StreamDescriptor};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info};

// Full-scale factors matching the decoder's int-to-float conversion, so PCM
// survives a decode/encode cycle unchanged.
const I16_SCALE: f32 = 32_768.0;
const I24_SCALE: f32 = 8_388_608.0;

fn quantize(sample: f32, scale: f32) -> i32 {
    (sample * scale).round().clamp(-scale, scale - 1.0) as i32
}

/// PCM WAV encoder.
pub struct WavEncoder {
    // Declared before `temp_path`: the writer must close the file before an
    // unfinished temp file is removed.
    writer: Option<WavWriter<BufWriter<File>>>,
    temp_path: Option<TempPath>,
    target: PathBuf,
    sample_format: WavSampleFormat,
    channels: u16,
    frames_written: u64,
}

impl WavEncoder {
    pub fn create(
        target: &Path,
        descriptor: &StreamDescriptor,
        sample_format: WavSampleFormat,
    ) -> Result<Self> {
        let spec = WavSpec {
            channels: descriptor.channels,
            sample_rate: descriptor.sample_rate,
            bits_per_sample: sample_format.bits_per_sample(),
            sample_format: match sample_format {
                WavSampleFormat::Float32 => SampleFormat::Float,
                _ => SampleFormat::Int,
            },
        };

        let (file, temp_path) = temp_output(target)?.into_parts();
        let writer = WavWriter::new(BufWriter::new(file), spec)
            .map_err(|e| AudioError::io_write(target, e))?;

        debug!(
            "WAV encoder ready: {} Hz, {} ch, {:?}",
            spec.sample_rate, spec.channels, sample_format
        );

        Ok(Self {
            writer: Some(writer),
            temp_path: Some(temp_path),
            target: target.to_path_buf(),
            sample_format,
            channels: descriptor.channels,
            frames_written: 0,
        })
    }
}

impl AudioEncoder for WavEncoder {
    fn write_block(&mut self, block: &FrameBlock) -> Result<()> {
        if block.channels != self.channels {
            return Err(AudioError::InvalidArguments(format!(
                "block has {} channels, encoder expects {}",
                block.channels, self.channels
            )));
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| AudioError::IoWriteFailure("encoder already finished".to_string()))?;

        for &sample in &block.samples {
            let sample = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
            match self.sample_format {
                WavSampleFormat::Int16 => writer.write_sample(quantize(sample, I16_SCALE) as i16)?,
                WavSampleFormat::Int24 => writer.write_sample(quantize(sample, I24_SCALE))?,
                WavSampleFormat::Float32 => writer.write_sample(sample)?,
            }
        }

        self.frames_written += block.frames() as u64;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn finish(mut self: Box<Self>) -> Result<EncodeSummary> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| AudioError::IoWriteFailure("encoder already finished".to_string()))?;
        writer
            .finalize()
            .map_err(|e| AudioError::io_write(&self.target, e))?;

        let temp_path = self
            .temp_path
            .take()
            .ok_or_else(|| AudioError::IoWriteFailure("encoder already finished".to_string()))?;
        let bytes_written = persist_output(temp_path, &self.target)?;

        info!(
            "Wrote {} frames ({} bytes) to {}",
            self.frames_written,
            bytes_written,
            core_runtime::logging::strip_path(&self.target.to_string_lossy())
        );

        Ok(EncodeSummary {
            path: self.target.clone(),
            frames_written: self.frames_written,
            bytes_written,
        })
    }
}
