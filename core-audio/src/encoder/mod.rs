//! # Audio Encoder Module
//!
//! Writes decoded PCM to an encoded file.
//!
//! | Backend | Formats | Availability |
//! |---------|---------|--------------|
//! | [`WavEncoder`] (hound) | wav | always |
//! | `FfmpegEncoder` (ffmpeg CLI) | mp3, ogg, aac, m4a | `ffmpeg-encoder` feature |
//!
//! Every backend writes to a temporary file next to the target and only
//! renames it into place in [`AudioEncoder::finish`]. An encoder dropped
//! early (error, cancellation) removes its temporary file.

#[cfg(feature = "ffmpeg-encoder")]
mod ffmpeg;
mod wav;

#[cfg(feature = "ffmpeg-encoder")]
pub use ffmpeg::FfmpegEncoder;
pub use wav::WavEncoder;

use crate::config::ProcessingConfig;
use crate::error::{AudioError, Result};
use crate::format::{ensure_encodable, AudioFormat};
use crate::traits::{AudioEncoder, StreamDescriptor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Sample encoding for WAV output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WavSampleFormat {
    Int16,
    Int24,
    Float32,
}

impl WavSampleFormat {
    /// Maps a configured bit depth (16, 24 or 32) to a sample format.
    pub fn from_bit_depth(bits: u16) -> Option<Self> {
        match bits {
            16 => Some(WavSampleFormat::Int16),
            24 => Some(WavSampleFormat::Int24),
            32 => Some(WavSampleFormat::Float32),
            _ => None,
        }
    }

    pub fn bits_per_sample(&self) -> u16 {
        match self {
            WavSampleFormat::Int16 => 16,
            WavSampleFormat::Int24 => 24,
            WavSampleFormat::Float32 => 32,
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderOptions {
    /// Target bitrate for lossy formats, in bits per second.
    pub bitrate: u32,
    pub wav_sample_format: WavSampleFormat,
    pub ffmpeg_path: String,
}

impl EncoderOptions {
    pub fn from_config(config: &ProcessingConfig, bitrate: Option<u32>) -> Self {
        Self {
            bitrate: bitrate.unwrap_or(config.default_bitrate),
            wav_sample_format: WavSampleFormat::from_bit_depth(config.wav_bit_depth)
                .unwrap_or(WavSampleFormat::Int16),
            ffmpeg_path: config.ffmpeg_path.clone(),
        }
    }
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self::from_config(&ProcessingConfig::default(), None)
    }
}

/// What a finished encoder produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSummary {
    pub path: PathBuf,
    pub frames_written: u64,
    pub bytes_written: u64,
}

/// Create an encoder writing `format` to `target`.
///
/// Fails with `EncodeUnsupported` before touching the filesystem if this
/// build has no encoder for `format`.
pub fn create_encoder(
    target: &Path,
    format: AudioFormat,
    descriptor: &StreamDescriptor,
    options: &EncoderOptions,
) -> Result<Box<dyn AudioEncoder>> {
    ensure_encodable(format)?;

    match format {
        AudioFormat::Wav => Ok(Box::new(WavEncoder::create(
            target,
            descriptor,
            options.wav_sample_format,
        )?)),
        #[cfg(feature = "ffmpeg-encoder")]
        _ => Ok(Box::new(FfmpegEncoder::create(target, format, descriptor, options)?)),
        #[cfg(not(feature = "ffmpeg-encoder"))]
        _ => Err(AudioError::EncodeUnsupported(format!(
            "no encoder for {}",
            format
        ))),
    }
}

/// Create the temporary output file for `target`, in the same directory so
/// the final rename stays on one filesystem.
pub(crate) fn temp_output(target: &Path) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = tempfile::Builder::new()
        .prefix(".audio-toolkit-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| AudioError::io_write(target, e))?;

    debug!("Writing to temporary file {}", temp.path().display());
    Ok(temp)
}

/// Sync a finished temporary file and move it onto `target`.
pub(crate) fn persist_output(temp_path: tempfile::TempPath, target: &Path) -> Result<u64> {
    std::fs::OpenOptions::new()
        .write(true)
        .open(&temp_path)
        .and_then(|file| file.sync_all())
        .map_err(|e| AudioError::io_write(target, e))?;

    temp_path
        .persist(target)
        .map_err(|e| AudioError::io_write(target, e.error))?;

    let bytes = std::fs::metadata(target)
        .map(|m| m.len())
        .map_err(|e| AudioError::io_write(target, e))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::CodecKind;
    use crate::traits::{FrameBlock, LengthSource};

    fn descriptor() -> StreamDescriptor {
        StreamDescriptor {
            sample_rate: 8_000,
            channels: 1,
            total_frames: 4,
            bits_per_sample: Some(16),
            codec: CodecKind::Pcm,
            format: AudioFormat::Wav,
            length_source: LengthSource::Header,
        }
    }

    #[test]
    fn test_wav_sample_format_from_bit_depth() {
        assert_eq!(WavSampleFormat::from_bit_depth(24), Some(WavSampleFormat::Int24));
        assert_eq!(WavSampleFormat::from_bit_depth(8), None);
        assert_eq!(WavSampleFormat::Float32.bits_per_sample(), 32);
    }

    #[test]
    fn test_options_from_config() {
        let options = EncoderOptions::from_config(&ProcessingConfig::high_fidelity(), None);
        assert_eq!(options.bitrate, 256_000);
        assert_eq!(options.wav_sample_format, WavSampleFormat::Int24);

        let options = EncoderOptions::from_config(&ProcessingConfig::default(), Some(96_000));
        assert_eq!(options.bitrate, 96_000);
    }

    #[test]
    fn test_create_and_finish_wav() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.wav");

        let mut encoder =
            create_encoder(&target, AudioFormat::Wav, &descriptor(), &EncoderOptions::default())
                .unwrap();
        encoder
            .write_block(&FrameBlock::new(vec![0.0, 0.5, -0.5, 1.0], 0, 1))
            .unwrap();
        let summary = encoder.finish().unwrap();

        assert_eq!(summary.frames_written, 4);
        assert_eq!(summary.path, target);
        assert!(summary.bytes_written > 44);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(not(feature = "ffmpeg-encoder"))]
    #[test]
    fn test_lossy_target_rejected_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.mp3");

        let err = create_encoder(&target, AudioFormat::Mp3, &descriptor(), &EncoderOptions::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), crate::ErrorKind::EncodeUnsupported);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
