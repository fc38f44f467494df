//! # Stream Abstractions
//!
//! Descriptors, frame blocks and the traits that connect decoders, the trim
//! engine, the waveform extractor and encoders.

use crate::encoder::EncodeSummary;
use crate::error::Result;
use crate::format::{AudioFormat, CodecKind};
use serde::{Deserialize, Serialize};

// ============================================================================
// Stream Descriptor
// ============================================================================

/// Where a stream's frame count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LengthSource {
    /// Declared by the container.
    Header,
    /// Counted by a pass over the stream's packets.
    Scanned,
}

/// Shape of a decoded stream. Fixed once the stream is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDescriptor {
    pub sample_rate: u32,
    pub channels: u16,
    /// Length in frames. One frame holds one sample per channel.
    pub total_frames: u64,
    pub bits_per_sample: Option<u32>,
    pub codec: CodecKind,
    pub format: AudioFormat,
    pub length_source: LengthSource,
}

impl StreamDescriptor {
    pub fn duration_ms(&self) -> u64 {
        self.ms_for_frames(self.total_frames)
    }

    /// Converts milliseconds to a frame index, rounding to nearest.
    pub fn frames_for_ms(&self, ms: u64) -> u64 {
        let rate = self.sample_rate as u128;
        ((ms as u128 * rate + 500) / 1000) as u64
    }

    /// Converts a frame count to milliseconds, rounding to nearest.
    pub fn ms_for_frames(&self, frames: u64) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        let rate = self.sample_rate as u128;
        ((frames as u128 * 1000 + rate / 2) / rate) as u64
    }
}

// ============================================================================
// Frame Block
// ============================================================================

/// A run of decoded PCM.
///
/// Samples are interleaved f32 in `[-1.0, 1.0]`; `start_frame` is the index
/// of the first frame within the stream that produced the block.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBlock {
    pub samples: Vec<f32>,
    pub start_frame: u64,
    pub channels: u16,
}

impl FrameBlock {
    pub fn new(samples: Vec<f32>, start_frame: u64, channels: u16) -> Self {
        Self {
            samples,
            start_frame,
            channels,
        }
    }

    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Index one past the last frame in the block.
    pub fn end_frame(&self) -> u64 {
        self.start_frame + self.frames() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ============================================================================
// Traits
// ============================================================================

/// A forward-only source of decoded frames.
///
/// Blocks are non-overlapping and gap-free: each block starts where the
/// previous one ended.
pub trait FrameSource: Send {
    fn descriptor(&self) -> &StreamDescriptor;

    /// Returns up to `max_frames` frames, or `None` at end of stream.
    ///
    /// `max_frames` must be greater than zero.
    fn read_next(&mut self, max_frames: usize) -> Result<Option<FrameBlock>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn descriptor(&self) -> &StreamDescriptor {
        (**self).descriptor()
    }

    fn read_next(&mut self, max_frames: usize) -> Result<Option<FrameBlock>> {
        (**self).read_next(max_frames)
    }
}

/// A seekable decoded stream over a source file.
pub trait AudioDecoder: FrameSource {
    /// Repositions so the next block starts exactly at `frame`.
    ///
    /// Fails with `SeekOutOfRange` if `frame > total_frames`. Seeking to
    /// `total_frames` leaves the stream at end.
    fn seek(&mut self, frame: u64) -> Result<()>;

    /// Index of the next frame `read_next` will return.
    fn position(&self) -> u64;
}

/// Accepts decoded PCM and writes an encoded file.
///
/// Output goes to a temporary file until [`AudioEncoder::finish`] moves it
/// onto the target. Dropping an unfinished encoder discards the output.
pub trait AudioEncoder: Send {
    fn write_block(&mut self, block: &FrameBlock) -> Result<()>;

    fn frames_written(&self) -> u64;

    /// Finalizes headers, syncs to disk and renames onto the target path.
    fn finish(self: Box<Self>) -> Result<EncodeSummary>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(sample_rate: u32, total_frames: u64) -> StreamDescriptor {
        StreamDescriptor {
            sample_rate,
            channels: 2,
            total_frames,
            bits_per_sample: Some(16),
            codec: CodecKind::Pcm,
            format: AudioFormat::Wav,
            length_source: LengthSource::Header,
        }
    }

    #[test]
    fn test_frame_ms_conversions_round() {
        let desc = descriptor(44_100, 44_100);
        assert_eq!(desc.duration_ms(), 1000);
        assert_eq!(desc.frames_for_ms(500), 22_050);
        // 1ms at 44.1kHz is 44.1 frames
        assert_eq!(desc.frames_for_ms(1), 44);

        let desc = descriptor(22_050, 0);
        // 0.5 frame rounds up
        assert_eq!(desc.frames_for_ms(1), 22);
        assert_eq!(desc.frames_for_ms(3), 66);
        assert_eq!(desc.duration_ms(), 0);
    }

    #[test]
    fn test_frame_block_bounds() {
        let block = FrameBlock::new(vec![0.0; 8], 100, 2);
        assert_eq!(block.frames(), 4);
        assert_eq!(block.end_frame(), 104);
        assert!(!block.is_empty());
    }

    #[test]
    fn test_descriptor_serialization() {
        let json = serde_json::to_value(descriptor(48_000, 10)).unwrap();
        assert_eq!(json["sampleRate"], 48_000);
        assert_eq!(json["lengthSource"], "header");
        assert_eq!(json["format"], "wav");
    }
}
