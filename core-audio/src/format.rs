//! # Format Registry
//!
//! Static knowledge about the supported containers and what this build can do
//! with each of them.
//!
//! | Format | Container | Codec  | Decode feature   | Encode                 |
//! |--------|-----------|--------|------------------|------------------------|
//! | mp3    | MPEG      | MP3    | `decoder-mp3`    | `ffmpeg-encoder`       |
//! | wav    | RIFF      | PCM    | `decoder-wav`    | always (hound)         |
//! | ogg    | Ogg       | Vorbis | `decoder-vorbis` | `ffmpeg-encoder`       |
//! | aac    | ADTS      | AAC    | `decoder-aac`    | `ffmpeg-encoder`       |
//! | m4a    | MPEG-4    | AAC    | `decoder-m4a`    | `ffmpeg-encoder`       |
//!
//! `aac` and `m4a` are distinct containers that share the AAC codec.

use crate::error::AudioError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported audio formats, identified by container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
    Ogg,
    Aac,
    M4a,
}

/// Container family of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerKind {
    /// Raw MPEG audio frames, optionally behind an ID3 tag
    Mpeg,
    Riff,
    Ogg,
    /// Raw AAC frames with ADTS headers
    Adts,
    Mp4,
}

/// Codec family carried by a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CodecKind {
    Mp3,
    Pcm,
    Vorbis,
    Aac,
}

impl CodecKind {
    pub fn is_lossless(&self) -> bool {
        matches!(self, CodecKind::Pcm)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CodecKind::Mp3 => "MP3",
            CodecKind::Pcm => "PCM",
            CodecKind::Vorbis => "Vorbis",
            CodecKind::Aac => "AAC",
        }
    }
}

/// What this build can do with a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCapabilities {
    pub can_decode: bool,
    pub can_encode: bool,
    /// Container supports index-based seeking; other formats seek by
    /// decoding forward.
    pub seekable: bool,
    pub lossless: bool,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 5] = [
        AudioFormat::Mp3,
        AudioFormat::Wav,
        AudioFormat::Ogg,
        AudioFormat::Aac,
        AudioFormat::M4a,
    ];

    /// Parses a format identifier case-insensitively. A leading `.` is
    /// tolerated so file extensions can be passed directly.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = name.strip_prefix('.').unwrap_or(name);
        match name.to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "ogg" => Some(AudioFormat::Ogg),
            "aac" => Some(AudioFormat::Aac),
            "m4a" => Some(AudioFormat::M4a),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Aac => "aac",
            AudioFormat::M4a => "m4a",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Aac => "audio/aac",
            AudioFormat::M4a => "audio/mp4",
        }
    }

    pub fn container(&self) -> ContainerKind {
        match self {
            AudioFormat::Mp3 => ContainerKind::Mpeg,
            AudioFormat::Wav => ContainerKind::Riff,
            AudioFormat::Ogg => ContainerKind::Ogg,
            AudioFormat::Aac => ContainerKind::Adts,
            AudioFormat::M4a => ContainerKind::Mp4,
        }
    }

    pub fn codec(&self) -> CodecKind {
        match self {
            AudioFormat::Mp3 => CodecKind::Mp3,
            AudioFormat::Wav => CodecKind::Pcm,
            AudioFormat::Ogg => CodecKind::Vorbis,
            AudioFormat::Aac | AudioFormat::M4a => CodecKind::Aac,
        }
    }

    pub fn capabilities(&self) -> FormatCapabilities {
        FormatCapabilities {
            can_decode: self.can_decode(),
            can_encode: self.can_encode(),
            seekable: !matches!(self, AudioFormat::Aac),
            lossless: self.codec().is_lossless(),
        }
    }

    fn can_decode(&self) -> bool {
        match self {
            AudioFormat::Mp3 => cfg!(feature = "decoder-mp3"),
            AudioFormat::Wav => cfg!(feature = "decoder-wav"),
            AudioFormat::Ogg => cfg!(feature = "decoder-vorbis"),
            AudioFormat::Aac => cfg!(feature = "decoder-aac"),
            AudioFormat::M4a => cfg!(feature = "decoder-m4a"),
        }
    }

    fn can_encode(&self) -> bool {
        match self {
            AudioFormat::Wav => true,
            _ => cfg!(feature = "ffmpeg-encoder"),
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AudioFormat::parse(s).ok_or_else(|| {
            AudioError::UnsupportedFormat(format!(
                "'{}' is not one of mp3, wav, ogg, aac, m4a",
                s
            ))
        })
    }
}

/// Returns `true` if `format_name` names a supported format. Unknown names
/// are simply unsupported, never an error.
pub fn is_supported(format_name: &str) -> bool {
    AudioFormat::parse(format_name).is_some()
}

pub fn capabilities_of(format: AudioFormat) -> FormatCapabilities {
    format.capabilities()
}

/// Fails with `EncodeUnsupported` if this build cannot write `format`.
pub fn ensure_encodable(format: AudioFormat) -> crate::Result<()> {
    if format.capabilities().can_encode {
        Ok(())
    } else {
        Err(AudioError::EncodeUnsupported(format!(
            "{} output requires the ffmpeg-encoder feature",
            format
        )))
    }
}
