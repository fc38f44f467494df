//! # Trim Engine
//!
//! Cuts a decoded stream down to a millisecond range.
//!
//! Millisecond bounds map to frames with `round(ms * sample_rate / 1000)`.
//! The end bound is clamped to the stream length, so asking for "to the end"
//! with any large value works. The resulting stream starts at frame 0.

use crate::config::ProcessingConfig;
use crate::decoder::SymphoniaDecoder;
use crate::error::{AudioError, Result};
use crate::traits::{AudioDecoder, FrameBlock, FrameSource, StreamDescriptor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Requested time range in milliseconds, `[start_ms, end_ms)`.
///
/// Signed so that negative input from a host is representable and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimRangeMs {
    pub start_ms: i64,
    pub end_ms: i64,
}

/// A trim range resolved against a concrete stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start_frame: u64,
    pub end_frame: u64,
}

impl FrameRange {
    pub fn len(&self) -> u64 {
        self.end_frame - self.start_frame
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TrimRangeMs {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Checks the shape of the range without looking at any file.
    pub fn validate(&self) -> Result<()> {
        if self.start_ms < 0 {
            return Err(AudioError::InvalidRange(format!(
                "start {}ms is negative",
                self.start_ms
            )));
        }
        if self.start_ms >= self.end_ms {
            return Err(AudioError::InvalidRange(format!(
                "start {}ms must be before end {}ms",
                self.start_ms, self.end_ms
            )));
        }
        Ok(())
    }

    /// Resolves the range to frames of `descriptor`, clamping the end to the
    /// stream length.
    pub fn resolve(&self, descriptor: &StreamDescriptor) -> Result<FrameRange> {
        self.validate()?;

        let total = descriptor.total_frames;
        let start_frame = descriptor.frames_for_ms(self.start_ms as u64);
        let end_frame = descriptor.frames_for_ms(self.end_ms as u64).min(total);

        if start_frame >= end_frame {
            return Err(AudioError::InvalidRange(format!(
                "range {}..{}ms is empty for a {}ms stream",
                self.start_ms,
                self.end_ms,
                descriptor.duration_ms()
            )));
        }

        Ok(FrameRange {
            start_frame,
            end_frame,
        })
    }
}

/// A sub-range of a decoder, re-based so its first frame is frame 0.
pub struct TrimmedStream<D: AudioDecoder> {
    inner: D,
    range: FrameRange,
    descriptor: StreamDescriptor,
    emitted: u64,
}

impl<D: AudioDecoder> TrimmedStream<D> {
    /// Seeks `inner` to the start of `range`.
    pub fn new(mut inner: D, range: TrimRangeMs) -> Result<Self> {
        let frames = range.resolve(inner.descriptor())?;
        inner.seek(frames.start_frame)?;

        let mut descriptor = inner.descriptor().clone();
        descriptor.total_frames = frames.len();

        debug!(
            "Trimming to frames {}..{} ({} frames)",
            frames.start_frame,
            frames.end_frame,
            frames.len()
        );

        Ok(Self {
            inner,
            range: frames,
            descriptor,
            emitted: 0,
        })
    }

    pub fn frame_range(&self) -> FrameRange {
        self.range
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: AudioDecoder> FrameSource for TrimmedStream<D> {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn read_next(&mut self, max_frames: usize) -> Result<Option<FrameBlock>> {
        if max_frames == 0 {
            return Err(AudioError::InvalidArguments(
                "max_frames must be greater than 0".to_string(),
            ));
        }

        let remaining = self.range.len() - self.emitted;
        if remaining == 0 {
            return Ok(None);
        }

        let wanted = (max_frames as u64).min(remaining) as usize;
        let Some(mut block) = self.inner.read_next(wanted)? else {
            return Ok(None);
        };

        block.start_frame = self.emitted;
        self.emitted += block.frames() as u64;
        Ok(Some(block))
    }
}

/// Open `path` and trim it to `range`.
#[instrument(skip(path, config), fields(file = %crate::decoder::display_name(path)))]
pub fn trim(
    path: &Path,
    range: TrimRangeMs,
    config: &ProcessingConfig,
) -> Result<TrimmedStream<SymphoniaDecoder>> {
    range.validate()?;
    let decoder = SymphoniaDecoder::open(path, config)?;
    TrimmedStream::new(decoder, range)
}
