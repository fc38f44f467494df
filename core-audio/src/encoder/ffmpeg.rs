//! Lossy output through the `ffmpeg` command-line tool.
//!
//! Decoded PCM is piped to ffmpeg as raw little-endian f32 on stdin; ffmpeg
//! encodes it into the temporary output file.

use super::{persist_output, temp_output, EncodeSummary, EncoderOptions};
use crate::error::{AudioError, Result};
use crate::format::AudioFormat;
use crate::traits::{AudioEncoder, FrameBlock, StreamDescriptor};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;
use tempfile::TempPath;
use tracing::{debug, error, info, warn};

/// ffmpeg codec and muxer for a target format.
fn codec_and_muxer(format: AudioFormat) -> Option<(&'static str, &'static str)> {
    match format {
        AudioFormat::Mp3 => Some(("libmp3lame", "mp3")),
        AudioFormat::Ogg => Some(("libvorbis", "ogg")),
        AudioFormat::Aac => Some(("aac", "adts")),
        AudioFormat::M4a => Some(("aac", "ipod")),
        AudioFormat::Wav => None,
    }
}

/// Encoder backed by an `ffmpeg` child process.
pub struct FfmpegEncoder {
    child: Option<Child>,
    stdin: Option<BufWriter<ChildStdin>>,
    stderr: Option<JoinHandle<String>>,
    temp_path: Option<TempPath>,
    target: PathBuf,
    channels: u16,
    frames_written: u64,
}

impl FfmpegEncoder {
    pub fn create(
        target: &Path,
        format: AudioFormat,
        descriptor: &StreamDescriptor,
        options: &EncoderOptions,
    ) -> Result<Self> {
        let (codec, muxer) = codec_and_muxer(format).ok_or_else(|| {
            AudioError::EncodeUnsupported(format!("ffmpeg backend does not write {}", format))
        })?;

        // ffmpeg reopens the path itself; only the reserved name is kept.
        let temp_path = temp_output(target)?.into_temp_path();

        let mut cmd = Command::new(&options.ffmpeg_path);
        cmd.arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-f")
            .arg("f32le")
            .arg("-ar")
            .arg(descriptor.sample_rate.to_string())
            .arg("-ac")
            .arg(descriptor.channels.to_string())
            .arg("-i")
            .arg("pipe:0")
            .arg("-c:a")
            .arg(codec)
            .arg("-b:a")
            .arg(options.bitrate.to_string())
            .arg("-y")
            .arg("-f")
            .arg(muxer)
            .arg(temp_path.as_os_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        debug!("Spawning {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| {
            error!("Failed to run {}: {}", options.ffmpeg_path, e);
            AudioError::EncodeUnsupported(format!(
                "{} output requires {}: {}",
                format, options.ffmpeg_path, e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .map(BufWriter::new)
            .ok_or_else(|| AudioError::io_write(target, "ffmpeg stdin unavailable"))?;

        // Drained on a thread so a chatty ffmpeg never blocks on a full pipe.
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut output = String::new();
                let _ = pipe.read_to_string(&mut output);
                output
            })
        });

        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            stderr,
            temp_path: Some(temp_path),
            target: target.to_path_buf(),
            channels: descriptor.channels,
            frames_written: 0,
        })
    }

    fn finished() -> AudioError {
        AudioError::IoWriteFailure("encoder already finished".to_string())
    }
}

impl AudioEncoder for FfmpegEncoder {
    fn write_block(&mut self, block: &FrameBlock) -> Result<()> {
        if block.channels != self.channels {
            return Err(AudioError::InvalidArguments(format!(
                "block has {} channels, encoder expects {}",
                block.channels, self.channels
            )));
        }

        let stdin = self.stdin.as_mut().ok_or_else(Self::finished)?;
        for sample in &block.samples {
            stdin
                .write_all(&sample.to_le_bytes())
                .map_err(|e| AudioError::io_write(&self.target, e))?;
        }

        self.frames_written += block.frames() as u64;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn finish(mut self: Box<Self>) -> Result<EncodeSummary> {
        let mut stdin = self.stdin.take().ok_or_else(Self::finished)?;
        stdin
            .flush()
            .map_err(|e| AudioError::io_write(&self.target, e))?;
        drop(stdin);

        let mut child = self.child.take().ok_or_else(Self::finished)?;
        let status = child
            .wait()
            .map_err(|e| AudioError::io_write(&self.target, e))?;
        let stderr = self
            .stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            error!("ffmpeg exited with {}: {}", status, stderr.trim());
            return Err(AudioError::io_write(
                &self.target,
                format!("ffmpeg exited with {}: {}", status, stderr.trim()),
            ));
        }

        let temp_path = self.temp_path.take().ok_or_else(Self::finished)?;
        let bytes_written = persist_output(temp_path, &self.target)?;

        info!(
            "Encoded {} frames ({} bytes) to {}",
            self.frames_written,
            bytes_written,
            core_runtime::logging::strip_path(&self.target.to_string_lossy())
        );

        Ok(EncodeSummary {
            path: self.target.clone(),
            frames_written: self.frames_written,
            bytes_written,
        })
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        self.stdin.take();
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!("Failed to stop abandoned ffmpeg process: {}", e);
            }
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::CodecKind;
    use crate::traits::LengthSource;

    #[test]
    fn test_codec_and_muxer() {
        assert_eq!(codec_and_muxer(AudioFormat::Mp3), Some(("libmp3lame", "mp3")));
        assert_eq!(codec_and_muxer(AudioFormat::Aac), Some(("aac", "adts")));
        assert_eq!(codec_and_muxer(AudioFormat::M4a), Some(("aac", "ipod")));
        assert_eq!(codec_and_muxer(AudioFormat::Wav), None);
    }

    #[test]
    fn test_missing_binary_is_encode_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = StreamDescriptor {
            sample_rate: 44_100,
            channels: 2,
            total_frames: 0,
            bits_per_sample: None,
            codec: CodecKind::Pcm,
            format: AudioFormat::Wav,
            length_source: LengthSource::Header,
        };
        let options = EncoderOptions {
            ffmpeg_path: "/nonexistent/ffmpeg-for-tests".to_string(),
            ..Default::default()
        };

        let err = FfmpegEncoder::create(&dir.path().join("out.mp3"), AudioFormat::Mp3, &descriptor, &options)
            .err()
            .unwrap();
        assert_eq!(err.kind(), crate::ErrorKind::EncodeUnsupported);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
