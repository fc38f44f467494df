//! # Processing Configuration
//!
//! Tunables shared by the decode, encode, waveform and conversion paths.

use crate::error::{AudioError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Processing engine configuration.
///
/// Controls block sizes, progress throttling, encoder defaults and decoder
/// error tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Number of frames pulled from the decoder per block.
    ///
    /// Cancellation is observed between blocks, so this also bounds how much
    /// work happens after a cancel request.
    ///
    /// Default: 4096 frames (~93ms at 44.1kHz).
    #[serde(default = "default_block_frames")]
    pub block_frames: usize,

    /// Minimum progress increase (fraction, 0.0-1.0) between two reports.
    ///
    /// Default: 0.01 (1%).
    #[serde(default = "default_progress_min_step")]
    pub progress_min_step: f64,

    /// Minimum wall-clock time between two progress reports.
    ///
    /// Default: 100ms.
    #[serde(default = "default_progress_min_interval")]
    pub progress_min_interval: Duration,

    /// Bitrate used for lossy targets when the request does not name one.
    ///
    /// Default: 128 kbps.
    #[serde(default = "default_bitrate")]
    pub default_bitrate: u32,

    /// WAV output sample format: 16 or 24 for integer PCM, 32 for float.
    ///
    /// Default: 16.
    #[serde(default = "default_wav_bit_depth")]
    pub wav_bit_depth: u16,

    /// Consecutive undecodable packets tolerated before the stream is
    /// declared corrupt.
    ///
    /// Default: 10.
    #[serde(default = "default_max_consecutive_decode_errors")]
    pub max_consecutive_decode_errors: usize,

    /// Executable used by the ffmpeg encoder backend.
    ///
    /// Default: `ffmpeg` (resolved through `PATH`).
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Largest waveform bucket count accepted. Peak and RMS buffers are
    /// allocated up front, so this bounds a request's memory.
    ///
    /// Default: 1,000,000.
    #[serde(default = "default_max_waveform_buckets")]
    pub max_waveform_buckets: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            block_frames: default_block_frames(),
            progress_min_step: default_progress_min_step(),
            progress_min_interval: default_progress_min_interval(),
            default_bitrate: default_bitrate(),
            wav_bit_depth: default_wav_bit_depth(),
            max_consecutive_decode_errors: default_max_consecutive_decode_errors(),
            ffmpeg_path: default_ffmpeg_path(),
            max_waveform_buckets: default_max_waveform_buckets(),
        }
    }
}

impl ProcessingConfig {
    /// Configuration for quick previews and waveform thumbnails.
    ///
    /// - Larger blocks
    /// - Coarser progress updates
    pub fn fast_preview() -> Self {
        Self {
            block_frames: 16384,
            progress_min_step: 0.05,
            progress_min_interval: Duration::from_millis(250),
            ..Default::default()
        }
    }

    /// Configuration for archival output.
    ///
    /// - 24-bit WAV output
    /// - 256 kbps lossy default
    /// - Fine-grained progress
    pub fn high_fidelity() -> Self {
        Self {
            block_frames: 2048,
            progress_min_step: 0.005,
            default_bitrate: 256_000,
            wav_bit_depth: 24,
            ..Default::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.block_frames == 0 {
            return Err(invalid("block_frames must be > 0"));
        }

        if !(0.0..=1.0).contains(&self.progress_min_step) {
            return Err(invalid("progress_min_step must be between 0.0 and 1.0"));
        }

        if self.default_bitrate == 0 {
            return Err(invalid("default_bitrate must be > 0"));
        }

        if !matches!(self.wav_bit_depth, 16 | 24 | 32) {
            return Err(invalid("wav_bit_depth must be 16, 24 or 32"));
        }

        if self.max_consecutive_decode_errors == 0 {
            return Err(invalid("max_consecutive_decode_errors must be > 0"));
        }

        if self.ffmpeg_path.trim().is_empty() {
            return Err(invalid("ffmpeg_path must not be empty"));
        }

        if self.max_waveform_buckets == 0 {
            return Err(invalid("max_waveform_buckets must be > 0"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> AudioError {
    AudioError::InvalidArguments(message.to_string())
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_block_frames() -> usize {
    4096 // ~93ms at 44.1kHz
}

fn default_progress_min_step() -> f64 {
    0.01
}

fn default_progress_min_interval() -> Duration {
    Duration::from_millis(100)
}

fn default_bitrate() -> u32 {
    128_000
}

fn default_wav_bit_depth() -> u16 {
    16
}

fn default_max_consecutive_decode_errors() -> usize {
    10
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_max_waveform_buckets() -> usize {
    1_000_000
}
