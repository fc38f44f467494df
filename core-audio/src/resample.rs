//! # Sample Rate Conversion
//!
//! Streaming linear-interpolation resampler that sits between a decoded
//! source and an encoder.
//!
//! Output frame `k` lies at source position `k * from / to`. The position is
//! kept as an exact integer ratio, so long streams do not drift, and the
//! output has `ceil(total * to / from)` frames.

use crate::error::{AudioError, Result};
use crate::traits::{FrameBlock, FrameSource, StreamDescriptor};
use tracing::debug;

/// Lowest output rate accepted for conversion.
pub const MIN_OUTPUT_RATE: u32 = 8_000;

/// Highest output rate accepted for conversion.
pub const MAX_OUTPUT_RATE: u32 = 192_000;

/// Check a requested output rate.
pub fn validate_output_rate(rate: u32) -> Result<()> {
    if !(MIN_OUTPUT_RATE..=MAX_OUTPUT_RATE).contains(&rate) {
        return Err(AudioError::InvalidArguments(format!(
            "sample rate {} Hz is outside {}-{} Hz",
            rate, MIN_OUTPUT_RATE, MAX_OUTPUT_RATE
        )));
    }
    Ok(())
}

/// A [`FrameSource`] that re-times another source to a new sample rate.
pub struct ResampledStream<S> {
    inner: S,
    descriptor: StreamDescriptor,
    from_rate: u64,
    to_rate: u64,
    channels: usize,
    /// Interleaved source frames, the first of which is `buffered_from`.
    buffer: Vec<f32>,
    buffered_from: u64,
    source_done: bool,
    next_frame: u64,
}

impl<S: FrameSource> ResampledStream<S> {
    pub fn new(inner: S, to_rate: u32) -> Result<Self> {
        validate_output_rate(to_rate)?;

        let source = inner.descriptor().clone();
        if source.sample_rate == 0 {
            return Err(AudioError::CorruptStream(
                "source has no sample rate".to_string(),
            ));
        }

        let from_rate = source.sample_rate as u64;
        let to_rate = to_rate as u64;
        let total_frames = (source.total_frames as u128 * to_rate as u128).div_ceil(from_rate as u128) as u64;

        debug!(
            "Resampling {} Hz -> {} Hz ({} -> {} frames)",
            from_rate, to_rate, source.total_frames, total_frames
        );

        let channels = source.channels.max(1) as usize;
        let descriptor = StreamDescriptor {
            sample_rate: to_rate as u32,
            total_frames,
            ..source
        };

        Ok(Self {
            inner,
            descriptor,
            from_rate,
            to_rate,
            channels,
            buffer: Vec::new(),
            buffered_from: 0,
            source_done: false,
            next_frame: 0,
        })
    }

    /// Source frame at or before output `frame`, and the distance past it in
    /// units of `1 / to_rate`.
    fn source_position(&self, frame: u64) -> (u64, u64) {
        let scaled = frame as u128 * self.from_rate as u128;
        let to = self.to_rate as u128;
        ((scaled / to) as u64, (scaled % to) as u64)
    }

    fn buffered_end(&self) -> u64 {
        self.buffered_from + (self.buffer.len() / self.channels) as u64
    }

    /// Pull source blocks until `frame` is buffered. Returns `false` if the
    /// source ends first.
    fn fill_to(&mut self, frame: u64, block_frames: usize) -> Result<bool> {
        while frame >= self.buffered_end() {
            if self.source_done {
                return Ok(false);
            }
            match self.inner.read_next(block_frames)? {
                Some(block) => self.buffer.extend_from_slice(&block.samples),
                None => self.source_done = true,
            }
        }
        Ok(true)
    }

    fn sample(&self, frame: u64, channel: usize) -> f32 {
        let offset = (frame - self.buffered_from) as usize * self.channels + channel;
        self.buffer[offset]
    }

    /// Drop source frames no later output frame can reach.
    fn compact(&mut self) {
        let (needed, _) = self.source_position(self.next_frame);
        let droppable = needed.min(self.buffered_end()).saturating_sub(self.buffered_from);
        if droppable > 0 {
            self.buffer.drain(..droppable as usize * self.channels);
            self.buffered_from += droppable;
        }
    }
}

impl<S: FrameSource> FrameSource for ResampledStream<S> {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn read_next(&mut self, max_frames: usize) -> Result<Option<FrameBlock>> {
        if max_frames == 0 {
            return Err(AudioError::InvalidArguments(
                "max_frames must be greater than 0".to_string(),
            ));
        }

        let start_frame = self.next_frame;
        let mut samples = Vec::with_capacity(max_frames * self.channels);

        for _ in 0..max_frames {
            let (index, remainder) = self.source_position(self.next_frame);
            if !self.fill_to(index, max_frames)? {
                break;
            }
            let has_next = self.fill_to(index + 1, max_frames)?;
            let frac = remainder as f32 / self.to_rate as f32;

            for channel in 0..self.channels {
                let current = self.sample(index, channel);
                let next = if has_next {
                    self.sample(index + 1, channel)
                } else {
                    current
                };
                samples.push(current + (next - current) * frac);
            }
            self.next_frame += 1;
        }

        self.compact();

        if samples.is_empty() {
            return Ok(None);
        }
        Ok(Some(FrameBlock::new(
            samples,
            start_frame,
            self.descriptor.channels,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{AudioFormat, CodecKind};
    use crate::traits::LengthSource;

    /// Serves fixed samples in blocks of at most `chunk` frames.
    struct Fixed {
        descriptor: StreamDescriptor,
        samples: Vec<f32>,
        position: usize,
        chunk: usize,
    }

    impl Fixed {
        fn mono(sample_rate: u32, samples: Vec<f32>, chunk: usize) -> Self {
            Self {
                descriptor: StreamDescriptor {
                    sample_rate,
                    channels: 1,
                    total_frames: samples.len() as u64,
                    bits_per_sample: Some(16),
                    codec: CodecKind::Pcm,
                    format: AudioFormat::Wav,
                    length_source: LengthSource::Header,
                },
                samples,
                position: 0,
                chunk,
            }
        }
    }

    impl FrameSource for Fixed {
        fn descriptor(&self) -> &StreamDescriptor {
            &self.descriptor
        }

        fn read_next(&mut self, max_frames: usize) -> Result<Option<FrameBlock>> {
            let end = (self.position + max_frames.min(self.chunk)).min(self.samples.len());
            if end == self.position {
                return Ok(None);
            }
            let block = FrameBlock::new(
                self.samples[self.position..end].to_vec(),
                self.position as u64,
                1,
            );
            self.position = end;
            Ok(Some(block))
        }
    }

    fn drain<S: FrameSource>(stream: &mut S, block: usize) -> Vec<f32> {
        let mut out = Vec::new();
        let mut expected_start = 0;
        while let Some(b) = stream.read_next(block).unwrap() {
            assert_eq!(b.start_frame, expected_start);
            expected_start = b.end_frame();
            out.extend(b.samples);
        }
        out
    }

    #[test]
    fn test_upsampling_interpolates_between_frames() {
        let source = Fixed::mono(8_000, vec![0.0, 1.0, 0.0, -1.0], 3);
        let mut stream = ResampledStream::new(source, 16_000).unwrap();
        assert_eq!(stream.descriptor().sample_rate, 16_000);
        assert_eq!(stream.descriptor().total_frames, 8);

        let out = drain(&mut stream, 3);
        assert_eq!(out, vec![0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -1.0]);
    }

    #[test]
    fn test_downsampling_keeps_duration() {
        let samples: Vec<f32> = (0..44_100).map(|i| (i % 100) as f32 / 100.0).collect();
        let source = Fixed::mono(44_100, samples, 1_000);
        let mut stream = ResampledStream::new(source, 22_050).unwrap();
        assert_eq!(stream.descriptor().duration_ms(), 1_000);

        let out = drain(&mut stream, 4_096);
        assert_eq!(out.len(), 22_050);
        // Every other source frame lands exactly on an output frame.
        assert_eq!(out[1], 0.02);
    }

    #[test]
    fn test_non_integer_ratio_frame_count() {
        let source = Fixed::mono(44_100, vec![0.25; 44_101], 512);
        let mut stream = ResampledStream::new(source, 48_000).unwrap();
        let expected = stream.descriptor().total_frames;
        // ceil(44_101 * 48_000 / 44_100)
        assert_eq!(expected, 48_002);

        let out = drain(&mut stream, 777);
        assert_eq!(out.len() as u64, expected);
        assert!(out.iter().all(|s| (*s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_rate_bounds() {
        for rate in [0, 7_999, 192_001] {
            let source = Fixed::mono(8_000, vec![0.0; 10], 10);
            let err = ResampledStream::new(source, rate).err().unwrap();
            assert_eq!(err.kind(), crate::ErrorKind::InvalidArguments);
        }
        assert!(validate_output_rate(MIN_OUTPUT_RATE).is_ok());
        assert!(validate_output_rate(MAX_OUTPUT_RATE).is_ok());
    }
}
