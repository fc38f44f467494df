//! # Audio Processing Engine
//!
//! Format conversion, trimming, waveform extraction and file inspection for
//! local audio files.
//!
//! ## Overview
//!
//! This crate handles:
//! - Format registry and content-based container detection
//! - Sample-accurate decoding using symphonia (per-format features)
//! - WAV encoding using hound, lossy encoding through ffmpeg (optional)
//! - Trimming (decoding, or a lossless copy for WAV), sample rate conversion,
//!   waveform envelopes and file metadata
//!
//! Everything here is synchronous. Long operations take a
//! [`CancellationToken`](core_async::cancel::CancellationToken) and a
//! [`ProgressSink`]; `core-service` runs them on the blocking pool.
//!
//! ## Example
//!
//! ```rust,no_run
//! use core_audio::{AudioFormat, ConversionRequest, Converter, NoProgress, ProcessingConfig};
//! use core_async::cancel::CancellationToken;
//!
//! # fn example() -> core_audio::Result<()> {
//! let converter = Converter::new(ProcessingConfig::default());
//! let request = ConversionRequest::new("take.mp3", "take.wav", AudioFormat::Wav);
//! let result = converter.convert(&request, &CancellationToken::new(), &NoProgress)?;
//! println!("{:?}: {}ms", result.status, result.duration_ms);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod convert;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod inspector;
pub mod passthrough;
pub mod progress;
pub mod resample;
pub mod traits;
pub mod trim;
pub mod waveform;

pub use config::ProcessingConfig;
pub use convert::{ConversionRequest, ConversionResult, ConversionStatus, Converter};
pub use decoder::{FormatDetector, SymphoniaDecoder};
pub use encoder::{create_encoder, EncodeSummary, EncoderOptions, WavSampleFormat};
pub use error::{AudioError, ErrorKind, ErrorReport, Result};
pub use format::{
    capabilities_of, is_supported, AudioFormat, CodecKind, ContainerKind, FormatCapabilities,
};
pub use inspector::{inspect, AudioFileInfo};
pub use passthrough::copy_trim;
pub use progress::{NoProgress, ProgressReporter, ProgressSink};
pub use resample::ResampledStream;
pub use traits::{
    AudioDecoder, AudioEncoder, FrameBlock, FrameSource, LengthSource, StreamDescriptor,
};
pub use trim::{trim, FrameRange, TrimRangeMs, TrimmedStream};
pub use waveform::{extract as extract_waveform, validate_bucket_count, WaveformResult};
