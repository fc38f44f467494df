//! # Symphonia Decoder Implementation
//!
//! Sample-accurate, seekable decoding of local files through Symphonia.

use crate::config::ProcessingConfig;
use crate::decoder::format_detector::{display_name, FormatDetector};
use crate::decoder::sample_converter::SampleConverter;
use crate::error::{AudioError, Result};
use crate::format::AudioFormat;
use crate::traits::{AudioDecoder, FrameBlock, FrameSource, LengthSource, StreamDescriptor};
use core_async::cancel::CancellationToken;
use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet as FormatPacket, SeekMode, SeekTo};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::units::TimeBase;
use tracing::{debug, error, info, instrument, warn};

/// Demuxer and codec state for one open pass over a file.
struct Pipeline {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    time_base: Option<TimeBase>,
    sample_rate: Option<u32>,
    channels: Option<u16>,
    n_frames: Option<u64>,
    bits_per_sample: Option<u32>,
    codec: crate::format::CodecKind,
}

/// Outcome of pulling one packet through the codec.
enum Packet {
    Samples { samples: Vec<f32>, channels: u16, sample_rate: u32 },
    End,
}

impl Pipeline {
    fn open(path: &Path, format: AudioFormat) -> Result<Self> {
        let name = display_name(path);
        let file = File::open(path).map_err(|e| {
            error!("Failed to open {}: {}", name, e);
            AudioError::FileNotFound(name.clone())
        })?;

        let media_source = Box::new(file) as Box<dyn MediaSource>;
        let mss = MediaSourceStream::new(media_source, Default::default());
        let format_options = FormatOptions {
            enable_gapless: true,
            ..Default::default()
        };

        let detected = symphonia::default::get_probe()
            .format(
                &FormatDetector::hint_for(format),
                mss,
                &format_options,
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                error!("Format detection failed for {}: {}", name, e);
                match e {
                    SymphoniaError::Unsupported(_) if !format.capabilities().can_decode => {
                        AudioError::UnsupportedFormat(format!(
                            "{}: {} decoding is not enabled in this build",
                            name, format
                        ))
                    }
                    _ => AudioError::CorruptStream(format!("{}: {}", name, e)),
                }
            })?;

        let reader = detected.format;

        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| {
                error!("No audio track in {}", name);
                AudioError::CorruptStream(format!("{}: no audio track", name))
            })?;

        let params = &track.codec_params;
        let codec = FormatDetector::detect_codec(params.codec).ok_or_else(|| {
            AudioError::UnsupportedFormat(format!("{}: unsupported codec in {} container", name, format))
        })?;

        let decoder = symphonia::default::get_codecs()
            .make(params, &DecoderOptions::default())
            .map_err(|e| {
                error!("Failed to create decoder for {}: {}", name, e);
                AudioError::UnsupportedFormat(format!("{}: {}", name, e))
            })?;

        let track_id = track.id;
        let time_base = params.time_base;
        let sample_rate = params.sample_rate;
        let channels = params.channels.map(|ch| ch.count() as u16);
        let n_frames = params.n_frames;
        let bits_per_sample = params.bits_per_sample;

        Ok(Self {
            reader,
            decoder,
            track_id,
            time_base,
            sample_rate,
            channels,
            n_frames,
            bits_per_sample,
            codec,
        })
    }

    /// Read the next packet of the selected track without decoding it.
    ///
    /// Returns `None` at the end of the stream. Read failures are retried
    /// until `max_errors` occur in a row.
    fn next_track_packet(&mut self, max_errors: usize) -> Result<Option<FormatPacket>> {
        let mut consecutive_errors = 0;

        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    error!("Track list changed mid-stream");
                    return Err(AudioError::CorruptStream(
                        "track list changed mid-stream".to_string(),
                    ));
                }
                Err(SymphoniaError::IoError(e)) => {
                    consecutive_errors += 1;
                    warn!(
                        "I/O error reading packet (attempt {}/{}): {}",
                        consecutive_errors, max_errors, e
                    );
                    if consecutive_errors >= max_errors {
                        return Err(AudioError::CorruptStream(format!(
                            "stream I/O failure after {} attempts: {}",
                            max_errors, e
                        )));
                    }
                    continue;
                }
                Err(e) => {
                    error!("Fatal format reader error: {}", e);
                    return Err(AudioError::CorruptStream(format!(
                        "failed to read packet: {}",
                        e
                    )));
                }
            };

            while !self.reader.metadata().is_latest() {
                self.reader.metadata().pop();
            }

            if packet.track_id() == self.track_id {
                return Ok(Some(packet));
            }
        }
    }

    /// Read and decode the next packet of the selected track.
    ///
    /// Undecodable packets are skipped until `max_errors` fail in a row.
    fn next(&mut self, max_errors: usize) -> Result<Packet> {
        let mut consecutive_errors = 0;

        loop {
            let Some(packet) = self.next_track_packet(max_errors)? else {
                return Ok(Packet::End);
            };

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let channels = spec.channels.count() as u16;
                    let samples = SampleConverter::to_interleaved_f32(decoded);
                    return Ok(Packet::Samples {
                        samples,
                        channels,
                        sample_rate: spec.rate,
                    });
                }
                Err(SymphoniaError::IoError(e)) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping corrupted packet (I/O error, attempt {}/{}): {}",
                        consecutive_errors, max_errors, e
                    );
                    if consecutive_errors >= max_errors {
                        return Err(AudioError::CorruptStream(format!(
                            "stream corruption after {} failed packets",
                            max_errors
                        )));
                    }
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping packet with decode error (attempt {}/{}): {}",
                        consecutive_errors, max_errors, e
                    );
                    if consecutive_errors >= max_errors {
                        return Err(AudioError::CorruptStream(format!(
                            "decoder failure after {} failed packets: {}",
                            max_errors, e
                        )));
                    }
                }
                Err(e) => {
                    error!("Fatal decode error: {}", e);
                    return Err(AudioError::CorruptStream(format!(
                        "failed to decode packet: {}",
                        e
                    )));
                }
            }
        }
    }

    /// Number of frames the next packet decodes to, or `None` at the end of
    /// the stream.
    ///
    /// Uses the duration the demuxer attaches to the packet, minus gapless
    /// trimming. Only packets without a duration are decoded.
    fn scan_next(&mut self, max_errors: usize) -> Result<Option<u64>> {
        let Some(packet) = self.next_track_packet(max_errors)? else {
            return Ok(None);
        };

        if packet.dur() > 0 {
            let trimmed = packet.trim_start() as u64 + packet.trim_end() as u64;
            return Ok(Some(packet.dur().saturating_sub(trimmed)));
        }

        match self.decoder.decode(&packet) {
            Ok(decoded) => Ok(Some(decoded.frames() as u64)),
            Err(SymphoniaError::IoError(e)) => {
                warn!("Scan skipped unreadable packet: {}", e);
                Ok(Some(0))
            }
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Scan skipped undecodable packet: {}", e);
                Ok(Some(0))
            }
            Err(e) => Err(AudioError::CorruptStream(format!(
                "failed to decode packet: {}",
                e
            ))),
        }
    }

    /// Convert a frame index into a track timestamp.
    fn frame_to_ts(&self, frame: u64, sample_rate: u32) -> u64 {
        match self.time_base {
            Some(tb) if tb.numer > 0 && sample_rate > 0 => {
                let ts = frame as u128 * tb.denom as u128 / (tb.numer as u128 * sample_rate as u128);
                ts as u64
            }
            _ => frame,
        }
    }

    /// Convert a track timestamp into a frame index.
    fn ts_to_frame(&self, ts: u64, sample_rate: u32) -> u64 {
        match self.time_base {
            Some(tb) if tb.denom > 0 => {
                let frame = ts as u128 * tb.numer as u128 * sample_rate as u128 / tb.denom as u128;
                frame as u64
            }
            _ => ts,
        }
    }
}

/// Decoder over a local file.
///
/// The descriptor is complete as soon as [`SymphoniaDecoder::open`] returns.
/// When the container does not declare a frame count, or only estimates one
/// (MP3, ADTS), the count comes from a demux pass over the packets. When it
/// does not declare a channel layout, the first packet is decoded up front and
/// kept for the first read.
///
/// Decoded packets rarely align with the block size callers ask for. Frames
/// left over from a packet are kept in `pending` and returned by the next
/// read.
pub struct SymphoniaDecoder {
    path: PathBuf,
    name: String,
    pipeline: Pipeline,
    descriptor: StreamDescriptor,
    pending: Vec<f32>,
    pending_offset: usize,
    position: u64,
    eof: bool,
    max_errors: usize,
}

impl SymphoniaDecoder {
    /// Open `path` and prepare it for decoding.
    ///
    /// # Errors
    ///
    /// - `FileNotFound` if the file cannot be opened
    /// - `UnsupportedFormat` if the content is not a supported container or
    ///   codec
    /// - `CorruptStream` if the container is recognized but unreadable
    pub fn open(path: &Path, config: &ProcessingConfig) -> Result<Self> {
        Self::open_with_cancel(path, config, &core_async::cancel::never())
    }

    /// Like [`SymphoniaDecoder::open`], but the length scan stops with
    /// `Cancelled` once `cancel` fires.
    #[instrument(skip(path, config, cancel), fields(file = %display_name(path)))]
    pub fn open_with_cancel(
        path: &Path,
        config: &ProcessingConfig,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let name = display_name(path);

        let metadata = std::fs::metadata(path).map_err(|_| AudioError::FileNotFound(name.clone()))?;
        if !metadata.is_file() {
            return Err(AudioError::FileNotFound(name));
        }

        let format = FormatDetector::sniff_file(path)?;
        debug!("Detected {} container", format);

        let max_errors = config.max_consecutive_decode_errors.max(1);
        let mut pipeline = Pipeline::open(path, format)?;

        let mut pending = Vec::new();
        let mut sample_rate = pipeline.sample_rate;
        let mut channels = pipeline.channels;
        let mut eof = false;

        if sample_rate.is_none() || channels.is_none() {
            debug!("Stream parameters not declared, decoding first packet");
            match pipeline.next(max_errors)? {
                Packet::Samples {
                    samples,
                    channels: ch,
                    sample_rate: rate,
                } => {
                    pending = samples;
                    channels = Some(ch);
                    sample_rate = Some(rate);
                }
                Packet::End => eof = true,
            }
        }

        let sample_rate = sample_rate.filter(|&r| r > 0).ok_or_else(|| {
            AudioError::CorruptStream(format!("{}: missing sample rate", name))
        })?;
        let channels = channels.filter(|&c| c > 0);
        let channels = match (channels, eof) {
            (Some(c), _) => c,
            // No packets and no declared layout: nothing to decode
            (None, true) => {
                return Err(AudioError::EmptySource(name));
            }
            (None, false) => {
                return Err(AudioError::CorruptStream(format!("{}: missing channel layout", name)));
            }
        };

        let (total_frames, length_source) = match pipeline.n_frames {
            Some(frames) if !Self::header_length_is_estimate(format) => {
                (frames, LengthSource::Header)
            }
            declared => {
                debug!(
                    "Frame count of {} is {:?} in the header, scanning",
                    name, declared
                );
                let frames = Self::count_frames(path, format, max_errors, cancel)?;
                (frames, LengthSource::Scanned)
            }
        };

        let descriptor = StreamDescriptor {
            sample_rate,
            channels,
            total_frames,
            bits_per_sample: pipeline.bits_per_sample,
            codec: pipeline.codec,
            format,
            length_source,
        };

        info!(
            "Opened {}: {} Hz, {} ch, {} frames ({:?})",
            name, sample_rate, channels, total_frames, length_source
        );

        Ok(Self {
            path: path.to_path_buf(),
            name,
            pipeline,
            descriptor,
            pending,
            pending_offset: 0,
            position: 0,
            eof,
            max_errors,
        })
    }

    /// MPEG audio without a Xing/Info frame and ADTS streams only carry a
    /// frame count extrapolated from the first few frames and the file size.
    fn header_length_is_estimate(format: AudioFormat) -> bool {
        matches!(format, AudioFormat::Mp3 | AudioFormat::Aac)
    }

    /// Count the frames of a stream with a demux pass.
    fn count_frames(
        path: &Path,
        format: AudioFormat,
        max_errors: usize,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        const CANCEL_CHECK_PACKETS: u64 = 64;

        let mut pipeline = Pipeline::open(path, format)?;
        let mut frames = 0u64;
        let mut packets = 0u64;

        while let Some(packet_frames) = pipeline.scan_next(max_errors)? {
            frames += packet_frames;
            packets += 1;
            if packets % CANCEL_CHECK_PACKETS == 0 && cancel.is_cancelled() {
                debug!("Scan cancelled after {} packets", packets);
                return Err(AudioError::Cancelled);
            }
        }

        if cancel.is_cancelled() {
            return Err(AudioError::Cancelled);
        }

        debug!("Scan pass counted {} frames in {} packets", frames, packets);
        Ok(frames)
    }

    fn pending_frames(&self) -> usize {
        (self.pending.len() - self.pending_offset) / self.descriptor.channels as usize
    }

    fn clear_pending(&mut self) {
        self.pending.clear();
        self.pending_offset = 0;
    }

    /// Decode packets until `pending` holds data or the stream ends.
    fn refill(&mut self) -> Result<bool> {
        while self.pending_frames() == 0 {
            if self.eof {
                return Ok(false);
            }

            match self.pipeline.next(self.max_errors)? {
                Packet::Samples { samples, channels, .. } => {
                    if channels != self.descriptor.channels {
                        error!(
                            "Channel count changed from {} to {} in {}",
                            self.descriptor.channels, channels, self.name
                        );
                        return Err(AudioError::CorruptStream(format!(
                            "{}: channel count changed mid-stream",
                            self.name
                        )));
                    }
                    self.pending = samples;
                    self.pending_offset = 0;
                }
                Packet::End => {
                    debug!("Reached end of stream at frame {}", self.position);
                    self.eof = true;
                }
            }
        }
        Ok(true)
    }

    /// Drop up to `frames` frames without returning them.
    fn discard(&mut self, mut frames: u64) -> Result<()> {
        let channels = self.descriptor.channels as usize;
        while frames > 0 {
            if !self.refill()? {
                break;
            }
            let take = (self.pending_frames() as u64).min(frames) as usize;
            self.pending_offset += take * channels;
            self.position += take as u64;
            frames -= take as u64;
        }
        Ok(())
    }

    /// Restart decoding from the first frame.
    fn rewind(&mut self) -> Result<()> {
        debug!("Reopening {} to rewind", self.name);
        self.pipeline = Pipeline::open(&self.path, self.descriptor.format)?;
        self.clear_pending();
        self.position = 0;
        self.eof = false;
        Ok(())
    }

    /// Container-level seek to at or before `frame`. Returns the frame the
    /// decoder now sits at, or `None` if the container refused.
    fn container_seek(&mut self, frame: u64) -> Option<u64> {
        if !self.descriptor.format.capabilities().seekable {
            return None;
        }

        let rate = self.descriptor.sample_rate;
        let ts = self.pipeline.frame_to_ts(frame, rate);
        let track_id = self.pipeline.track_id;

        match self
            .pipeline
            .reader
            .seek(SeekMode::Accurate, SeekTo::TimeStamp { ts, track_id })
        {
            Ok(seeked) => {
                self.pipeline.decoder.reset();
                Some(self.pipeline.ts_to_frame(seeked.actual_ts, rate))
            }
            Err(e) => {
                warn!("Container seek in {} failed, decoding forward: {}", self.name, e);
                None
            }
        }
    }
}

impl FrameSource for SymphoniaDecoder {
    fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    fn read_next(&mut self, max_frames: usize) -> Result<Option<FrameBlock>> {
        if max_frames == 0 {
            return Err(AudioError::InvalidArguments(
                "max_frames must be greater than 0".to_string(),
            ));
        }

        // Decoding runs to the real end of the stream; the declared length
        // only sizes progress and bounds seeks.
        let wanted = max_frames;
        let channels = self.descriptor.channels as usize;
        let start_frame = self.position;
        let mut samples = Vec::with_capacity(wanted * channels);

        while samples.len() < wanted * channels {
            if !self.refill()? {
                break;
            }
            let need = wanted - samples.len() / channels;
            let take = self.pending_frames().min(need);
            let end = self.pending_offset + take * channels;
            samples.extend_from_slice(&self.pending[self.pending_offset..end]);
            self.pending_offset = end;
            self.position += take as u64;
        }

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

impl AudioDecoder for SymphoniaDecoder {
    #[instrument(skip(self), fields(file = %self.name))]
    fn seek(&mut self, frame: u64) -> Result<()> {
        let total = self.descriptor.total_frames;
        if frame > total {
            return Err(AudioError::SeekOutOfRange {
                requested: frame,
                total,
            });
        }

        if frame == self.position {
            return Ok(());
        }

        if frame == total {
            self.clear_pending();
            self.position = total;
            self.eof = true;
            return Ok(());
        }

        match self.container_seek(frame) {
            Some(landed) if landed <= frame => {
                self.clear_pending();
                self.position = landed;
                self.eof = false;
            }
            landed => {
                if landed.is_some() || frame < self.position {
                    self.rewind()?;
                }
            }
        }

        // Decode and drop frames between the landing point and the target.
        self.discard(frame - self.position)?;

        debug!("Seek completed to frame {}", self.position);
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_ramp(path: &Path, sample_rate: u32, channels: u16, frames: u32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            for ch in 0..channels {
                let value = ((i % 1000) as i32 * 30 + ch as i32) as i16;
                writer.write_sample(value).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    /// MPEG-1 Layer III, 44.1kHz mono, no Xing/Info frame. Zeroed side info
    /// and main data decode to 1152 frames of silence per MPEG frame.
    ///
    /// The leading high-bitrate frames make the header estimate, which is
    /// extrapolated from the first frames, far shorter than the stream.
    #[cfg(feature = "decoder-mp3")]
    fn write_vbr_mp3(path: &Path, high_frames: usize, low_frames: usize) {
        fn frame(bitrate_bits: u8, len: usize) -> Vec<u8> {
            let mut frame = vec![0u8; len];
            frame[..4].copy_from_slice(&[0xFF, 0xFB, bitrate_bits, 0xC0]);
            frame
        }

        let mut bytes = Vec::new();
        for _ in 0..high_frames {
            bytes.extend(frame(0xE0, 1044)); // 320 kbps
        }
        for _ in 0..low_frames {
            bytes.extend(frame(0x10, 104)); // 32 kbps
        }
        std::fs::write(path, bytes).unwrap();
    }

    #[cfg(feature = "decoder-mp3")]
    #[test]
    fn test_mp3_length_is_scanned_not_estimated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vbr.mp3");
        write_vbr_mp3(&path, 20, 400);

        let mut decoder = SymphoniaDecoder::open(&path, &ProcessingConfig::default()).unwrap();
        let desc = decoder.descriptor().clone();
        assert_eq!(desc.format, AudioFormat::Mp3);
        assert_eq!(desc.length_source, LengthSource::Scanned);
        // The first 16 frames alone would extrapolate to about 60 MPEG frames.
        assert!(desc.total_frames > 419 * 1152);
        assert!(desc.total_frames <= 420 * 1152);

        let mut decoded = 0u64;
        while let Some(block) = decoder.read_next(4096).unwrap() {
            assert_eq!(block.start_frame, decoded);
            decoded = block.end_frame();
        }
        assert_eq!(decoded, desc.total_frames);
    }

    #[cfg(feature = "decoder-mp3")]
    #[test]
    fn test_mp3_seek_lands_on_requested_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vbr.mp3");
        write_vbr_mp3(&path, 20, 400);

        let mut decoder = SymphoniaDecoder::open(&path, &ProcessingConfig::default()).unwrap();
        let total = decoder.descriptor().total_frames;
        for target in [300_000u64, 1_153, 450_000, 10] {
            decoder.seek(target).unwrap();
            assert_eq!(decoder.position(), target);
            let block = decoder.read_next(512).unwrap().unwrap();
            assert_eq!(block.start_frame, target);
            assert_eq!(block.frames(), 512);
        }

        decoder.seek(400_000).unwrap();
        let mut end = 400_000;
        while let Some(block) = decoder.read_next(4096).unwrap() {
            end = block.end_frame();
        }
        assert_eq!(end, total);
    }

    #[cfg(feature = "decoder-mp3")]
    #[test]
    fn test_length_scan_observes_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vbr.mp3");
        write_vbr_mp3(&path, 20, 400);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = SymphoniaDecoder::open_with_cancel(&path, &ProcessingConfig::default(), &cancel)
            .err()
            .unwrap();
        assert_eq!(err.kind(), crate::ErrorKind::Cancelled);
    }

    #[test]
    fn test_declared_length_skips_scan_even_when_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.wav");
        write_ramp(&path, 8_000, 1, 800);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let decoder =
            SymphoniaDecoder::open_with_cancel(&path, &ProcessingConfig::default(), &cancel).unwrap();
        assert_eq!(decoder.descriptor().length_source, LengthSource::Header);
        assert_eq!(decoder.descriptor().total_frames, 800);
    }

    #[test]
    fn test_open_reports_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.wav");
        write_ramp(&path, 8_000, 2, 8_000);

        let decoder = SymphoniaDecoder::open(&path, &ProcessingConfig::default()).unwrap();
        let desc = decoder.descriptor();
        assert_eq!(desc.sample_rate, 8_000);
        assert_eq!(desc.channels, 2);
        assert_eq!(desc.total_frames, 8_000);
        assert_eq!(desc.format, AudioFormat::Wav);
        assert_eq!(desc.length_source, LengthSource::Header);
        assert_eq!(desc.duration_ms(), 1000);
    }

    #[test]
    fn test_blocks_are_contiguous_and_complete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.wav");
        write_ramp(&path, 8_000, 1, 5_000);

        let mut decoder = SymphoniaDecoder::open(&path, &ProcessingConfig::default()).unwrap();
        let mut expected_start = 0;
        while let Some(block) = decoder.read_next(700).unwrap() {
            assert_eq!(block.start_frame, expected_start);
            assert!(block.frames() <= 700);
            expected_start = block.end_frame();
        }
        assert_eq!(expected_start, 5_000);
        assert!(decoder.read_next(700).unwrap().is_none());
    }

    #[test]
    fn test_seek_is_sample_accurate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.wav");
        write_ramp(&path, 8_000, 1, 4_000);

        let mut reference = SymphoniaDecoder::open(&path, &ProcessingConfig::default()).unwrap();
        let mut all = Vec::new();
        while let Some(block) = reference.read_next(1024).unwrap() {
            all.extend(block.samples);
        }

        let mut decoder = SymphoniaDecoder::open(&path, &ProcessingConfig::default()).unwrap();
        for target in [1_234u64, 17, 3_999, 0] {
            decoder.seek(target).unwrap();
            assert_eq!(decoder.position(), target);
            let block = decoder.read_next(8).unwrap().unwrap();
            assert_eq!(block.start_frame, target);
            assert_eq!(block.samples[0], all[target as usize]);
        }
    }

    #[test]
    fn test_seek_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.wav");
        write_ramp(&path, 8_000, 1, 100);

        let mut decoder = SymphoniaDecoder::open(&path, &ProcessingConfig::default()).unwrap();
        decoder.seek(100).unwrap();
        assert!(decoder.read_next(10).unwrap().is_none());

        let err = decoder.seek(101).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::SeekOutOfRange);
    }

    #[test]
    fn test_zero_max_frames_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.wav");
        write_ramp(&path, 8_000, 1, 10);

        let mut decoder = SymphoniaDecoder::open(&path, &ProcessingConfig::default()).unwrap();
        let err = decoder.read_next(0).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArguments);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SymphoniaDecoder::open(&dir.path().join("nope.wav"), &ProcessingConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), crate::ErrorKind::FileNotFound);
    }
}
