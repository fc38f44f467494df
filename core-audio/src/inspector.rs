//! File information without a full decode.

use crate::config::ProcessingConfig;
use crate::decoder::{display_name, SymphoniaDecoder};
use crate::error::{AudioError, Result};
use crate::format::{AudioFormat, CodecKind};
use crate::traits::{FrameSource, LengthSource, StreamDescriptor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

/// Description of an audio file. Every field is populated on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFileInfo {
    pub format: AudioFormat,
    pub codec: CodecKind,
    pub mime_type: String,
    pub duration_ms: u64,
    pub sample_rate: u32,
    pub channels: u16,
    /// Bits per second. Exact for PCM, averaged over the file otherwise.
    pub bitrate: u64,
    pub bits_per_sample: Option<u32>,
    pub total_frames: u64,
    pub file_size: u64,
    pub length_source: LengthSource,
    pub supported_for_conversion: bool,
    pub supported_for_trimming: bool,
    pub supported_for_waveform: bool,
    /// Trimming can copy samples without a lossy re-encode.
    pub supported_for_lossless_trimming: bool,
    pub diagnostics: String,
}

/// Inspect the file at `path`.
///
/// Reads container headers; only streams that do not declare their length
/// are decoded in full.
#[instrument(skip(path, config), fields(file = %display_name(path)))]
pub fn inspect(path: &Path, config: &ProcessingConfig) -> Result<AudioFileInfo> {
    let name = display_name(path);
    let file_size = std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|_| AudioError::FileNotFound(name.clone()))?;

    let decoder = SymphoniaDecoder::open(path, config)?;
    let info = describe(decoder.descriptor(), file_size);

    info!("Inspected {}: {}", name, info.diagnostics);
    Ok(info)
}

/// Build file info from an open stream's descriptor.
pub fn describe(descriptor: &StreamDescriptor, file_size: u64) -> AudioFileInfo {
    let capabilities = descriptor.format.capabilities();
    let duration_ms = descriptor.duration_ms();
    let bitrate = estimate_bitrate(descriptor, file_size);
    let has_audio = descriptor.total_frames > 0;

    AudioFileInfo {
        format: descriptor.format,
        codec: descriptor.codec,
        mime_type: descriptor.format.mime_type().to_string(),
        duration_ms,
        sample_rate: descriptor.sample_rate,
        channels: descriptor.channels,
        bitrate,
        bits_per_sample: descriptor.bits_per_sample,
        total_frames: descriptor.total_frames,
        file_size,
        length_source: descriptor.length_source,
        supported_for_conversion: capabilities.can_decode && has_audio,
        supported_for_trimming: capabilities.can_decode && has_audio,
        supported_for_waveform: capabilities.can_decode && has_audio,
        supported_for_lossless_trimming: capabilities.lossless && has_audio,
        diagnostics: diagnostics(descriptor, bitrate),
    }
}

fn estimate_bitrate(descriptor: &StreamDescriptor, file_size: u64) -> u64 {
    if descriptor.codec == CodecKind::Pcm {
        if let Some(bits) = descriptor.bits_per_sample {
            return descriptor.sample_rate as u64 * descriptor.channels as u64 * bits as u64;
        }
    }

    let duration_ms = descriptor.duration_ms();
    if duration_ms == 0 {
        return 0;
    }
    file_size * 8 * 1000 / duration_ms
}

fn diagnostics(descriptor: &StreamDescriptor, bitrate: u64) -> String {
    let length = match descriptor.length_source {
        LengthSource::Header => "length from header",
        LengthSource::Scanned => "length from full scan",
    };
    let depth = descriptor
        .bits_per_sample
        .map(|bits| format!(" {}-bit", bits))
        .unwrap_or_default();

    format!(
        "{} container, {}{} codec, {} Hz, {} ch, {} kbps, {}",
        descriptor.format.extension().to_uppercase(),
        descriptor.codec.name(),
        depth,
        descriptor.sample_rate,
        descriptor.channels,
        bitrate / 1000,
        length
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(codec: CodecKind, format: AudioFormat, bits: Option<u32>) -> StreamDescriptor {
        StreamDescriptor {
            sample_rate: 44_100,
            channels: 2,
            total_frames: 441_000,
            bits_per_sample: bits,
            codec,
            format,
            length_source: LengthSource::Header,
        }
    }

    #[test]
    fn test_pcm_bitrate_is_exact() {
        let info = describe(&descriptor(CodecKind::Pcm, AudioFormat::Wav, Some(16)), 123);
        assert_eq!(info.bitrate, 1_411_200);
        assert_eq!(info.duration_ms, 10_000);
        assert!(info.supported_for_lossless_trimming);
        assert!(info.diagnostics.contains("WAV container"));
    }

    #[test]
    fn test_compressed_bitrate_from_file_size() {
        // 160 KB over 10 s is 128 kbps
        let info = describe(&descriptor(CodecKind::Mp3, AudioFormat::Mp3, None), 160_000);
        assert_eq!(info.bitrate, 128_000);
        assert!(!info.supported_for_lossless_trimming);
        assert_eq!(info.mime_type, "audio/mpeg");
    }

    #[test]
    fn test_empty_stream_not_processable() {
        let mut desc = descriptor(CodecKind::Pcm, AudioFormat::Wav, Some(16));
        desc.total_frames = 0;
        let info = describe(&desc, 44);
        assert_eq!(info.duration_ms, 0);
        assert!(!info.supported_for_waveform);
        assert!(!info.supported_for_trimming);
    }

    #[test]
    fn test_serialized_field_names() {
        let info = describe(&descriptor(CodecKind::Aac, AudioFormat::M4a, None), 1_000);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["format"], "m4a");
        assert_eq!(json["codec"], "aac");
        assert_eq!(json["supportedForConversion"], cfg!(feature = "decoder-m4a"));
        assert!(json.get("durationMs").is_some());
    }
}
