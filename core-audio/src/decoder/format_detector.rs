//! # Format Detection Module
//!
//! Identifies a file's container from its leading bytes and builds demuxer
//! hints for Symphonia.

use crate::error::{AudioError, Result};
use crate::format::{AudioFormat, CodecKind};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use symphonia::core::codecs::CodecType;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Number of leading bytes needed to identify every supported container.
pub const SNIFF_LEN: usize = 16;

/// Format detector for audio files.
///
/// Detection is by content, not by extension: a `.mp3` file that is really a
/// RIFF/WAVE file is reported as WAV.
pub struct FormatDetector;

impl FormatDetector {
    /// Identify the container from the leading bytes of a file.
    ///
    /// Returns `None` when the bytes match none of the supported containers.
    pub fn sniff(header: &[u8]) -> Option<AudioFormat> {
        if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WAVE" {
            return Some(AudioFormat::Wav);
        }

        if header.len() >= 4 && &header[0..4] == b"OggS" {
            return Some(AudioFormat::Ogg);
        }

        if header.len() >= 8 && &header[4..8] == b"ftyp" {
            return Some(AudioFormat::M4a);
        }

        if header.len() >= 3 && &header[0..3] == b"ID3" {
            return Some(AudioFormat::Mp3);
        }

        if header.len() >= 2 && header[0] == 0xFF {
            let b1 = header[1];
            // ADTS: 12-bit sync, layer bits always 00
            if b1 & 0xF6 == 0xF0 {
                return Some(AudioFormat::Aac);
            }
            // MPEG audio: 11-bit sync, layer bits non-zero
            if b1 & 0xE0 == 0xE0 && b1 & 0x06 != 0 {
                return Some(AudioFormat::Mp3);
            }
        }

        None
    }

    /// Read the leading bytes of `path` and identify its container.
    ///
    /// Fails with `FileNotFound` if the file cannot be read and with
    /// `UnsupportedFormat` if the content is not a supported container.
    pub fn sniff_file(path: &Path) -> Result<AudioFormat> {
        let name = display_name(path);
        let mut file = File::open(path).map_err(|e| {
            warn!("Failed to open {}: {}", name, e);
            AudioError::FileNotFound(name.clone())
        })?;

        let mut header = [0u8; SNIFF_LEN];
        let mut filled = 0;
        while filled < SNIFF_LEN {
            match file.read(&mut header[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Failed to read header of {}: {}", name, e);
                    return Err(AudioError::FileNotFound(name));
                }
            }
        }

        Self::sniff(&header[..filled]).ok_or_else(|| {
            debug!("No known container signature in {} ({} bytes read)", name, filled);
            AudioError::UnsupportedFormat(format!("{}: unrecognized container", name))
        })
    }

    /// Create a demuxer hint for a detected format.
    pub fn hint_for(format: AudioFormat) -> Hint {
        let mut hint = Hint::new();
        hint.with_extension(format.extension());
        hint.mime_type(format.mime_type());
        hint
    }

    /// Map a Symphonia codec type to a supported codec family.
    pub fn detect_codec(codec_type: CodecType) -> Option<CodecKind> {
        use symphonia::core::codecs::*;

        if codec_type == CODEC_TYPE_MP3 {
            Some(CodecKind::Mp3)
        } else if codec_type == CODEC_TYPE_AAC {
            Some(CodecKind::Aac)
        } else if codec_type == CODEC_TYPE_VORBIS {
            Some(CodecKind::Vorbis)
        } else if codec_type == CODEC_TYPE_PCM_S16LE
            || codec_type == CODEC_TYPE_PCM_S16BE
            || codec_type == CODEC_TYPE_PCM_S24LE
            || codec_type == CODEC_TYPE_PCM_S24BE
            || codec_type == CODEC_TYPE_PCM_S32LE
            || codec_type == CODEC_TYPE_PCM_S32BE
            || codec_type == CODEC_TYPE_PCM_U8
            || codec_type == CODEC_TYPE_PCM_S8
            || codec_type == CODEC_TYPE_PCM_F32LE
            || codec_type == CODEC_TYPE_PCM_F32BE
            || codec_type == CODEC_TYPE_PCM_F64LE
            || codec_type == CODEC_TYPE_PCM_F64BE
        {
            Some(CodecKind::Pcm)
        } else {
            warn!("Unknown codec type: {:?}", codec_type);
            None
        }
    }
}

/// File name without directories, for errors and logs.
pub(crate) fn display_name(path: &Path) -> String {
    core_runtime::logging::strip_path(&path.to_string_lossy()).to_string()
}
