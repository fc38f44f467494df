//! # Audio Decoder Module
//!
//! Decoding of local files through the Symphonia library.
//!
//! ## Supported Formats
//!
//! | Format | Container | Codec | Feature Flag |
//! |--------|-----------|-------|--------------|
//! | MP3 | MPEG audio | MPEG-1/2 Layer III | `decoder-mp3` |
//! | WAV | RIFF | PCM (int/float) | `decoder-wav` |
//! | OGG | Ogg | Vorbis | `decoder-vorbis` |
//! | AAC | ADTS | AAC-LC | `decoder-aac` |
//! | M4A | MPEG-4 | AAC-LC | `decoder-m4a` |
//!
//! ## Architecture
//!
//! ```text
//! File → FormatDetector (magic bytes) → FormatReader → Decoder → SampleConverter → FrameBlock
//! ```
//!
//! The container is identified from the file's leading bytes, not its
//! extension. The detected format then drives the demuxer hint.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use core_audio::{AudioDecoder, FrameSource, ProcessingConfig, SymphoniaDecoder};
//! use std::path::Path;
//!
//! # fn example() -> core_audio::Result<()> {
//! let config = ProcessingConfig::default();
//! let mut decoder = SymphoniaDecoder::open(Path::new("/path/to/take.wav"), &config)?;
//! println!("{} frames", decoder.descriptor().total_frames);
//!
//! decoder.seek(44_100)?;
//! while let Some(block) = decoder.read_next(config.block_frames)? {
//!     // Interleaved f32 samples in [-1.0, 1.0]
//!     println!("frames {}..{}", block.start_frame, block.end_frame());
//! }
//! # Ok(())
//! # }
//! ```

mod format_detector;
mod sample_converter;
mod symphonia;

pub use self::symphonia::SymphoniaDecoder;
pub(crate) use format_detector::display_name;
pub use format_detector::{FormatDetector, SNIFF_LEN};
pub use sample_converter::SampleConverter;
