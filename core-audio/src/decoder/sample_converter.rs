//! # Sample Format Converter
//!
//! Normalizes decoded buffers to interleaved f32.

use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use tracing::warn;

/// Sample converter that normalizes audio to f32 interleaved format.
///
/// Symphonia outputs planar buffers in whatever sample type the codec
/// produces (u8, i16, i24, i32, f32, f64). Everything downstream works on
/// interleaved f32 in `[-1.0, 1.0]` (LRLRLR... for stereo).
pub struct SampleConverter;

impl SampleConverter {
    /// Convert a decoded buffer to interleaved f32 samples.
    ///
    /// The returned vector holds `frames * channels` samples.
    pub fn to_interleaved_f32(buffer: AudioBufferRef<'_>) -> Vec<f32> {
        let spec = *buffer.spec();
        let frames = buffer.frames();
        if frames == 0 {
            return Vec::new();
        }

        let mut sample_buf = SampleBuffer::<f32>::new(buffer.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(buffer);
        sample_buf.samples().to_vec()
    }

    /// Count samples outside `[-1.0, 1.0]`, warning if any are found.
    pub fn validate_samples(samples: &[f32]) -> usize {
        let clipped = samples.iter().filter(|&&s| !(-1.0..=1.0).contains(&s)).count();

        if clipped > 0 {
            warn!(
                "Detected {} clipped samples ({:.2}% of total)",
                clipped,
                (clipped as f64 / samples.len() as f64) * 100.0
            );
        }

        clipped
    }

    /// Clamp samples to `[-1.0, 1.0]`. NaN becomes silence.
    pub fn clamp_samples(samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = if sample.is_nan() {
                0.0
            } else {
                sample.clamp(-1.0, 1.0)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symphonia::core::audio::{AsAudioBufferRef, AudioBuffer, Channels, Signal, SignalSpec};

    #[test]
    fn test_planar_i16_to_interleaved_f32() {
        let spec = SignalSpec::new(8_000, Channels::FRONT_LEFT | Channels::FRONT_RIGHT);
        let mut buf = AudioBuffer::<i16>::new(4, spec);
        buf.render_reserved(Some(2));
        buf.chan_mut(0).copy_from_slice(&[i16::MAX, 0]);
        buf.chan_mut(1).copy_from_slice(&[0, i16::MIN]);

        let samples = SampleConverter::to_interleaved_f32(buf.as_audio_buffer_ref());

        assert_eq!(samples.len(), 4);
        assert!((samples[0] - 1.0).abs() < 1e-4);
        assert_eq!(samples[1], 0.0);
        assert_eq!(samples[2], 0.0);
        assert_eq!(samples[3], -1.0);
    }

    #[test]
    fn test_validate_samples_all_valid() {
        let samples = vec![0.0, 0.5, -0.5, 1.0, -1.0];
        assert_eq!(SampleConverter::validate_samples(&samples), 0);
    }

    #[test]
    fn test_validate_samples_with_clipping() {
        let samples = vec![0.0, 1.5, -1.5, 0.5];
        assert_eq!(SampleConverter::validate_samples(&samples), 2);
    }

    #[test]
    fn test_clamp_samples() {
        let mut samples = vec![0.0, 1.5, -1.5, 0.5, f32::NAN];
        SampleConverter::clamp_samples(&mut samples);

        assert_eq!(samples, vec![0.0, 1.0, -1.0, 0.5, 0.0]);
    }
}
