//! Host-level tests for the toolkit façade
//!
//! Runs each operation end to end against WAV fixtures and checks the job
//! lifecycle seen through handles and the event bus.

use async_trait::async_trait;
use core_audio::{ConversionStatus, ErrorKind, ProcessingConfig};
use core_runtime::config::CoreConfig;
use core_service::{
    AudioToolkit, ConvertAudioRequest, CoreEvent, JobEvent, Operation, SessionOptions,
    SessionStatus, TrimAudioRequest, WaveformRequest,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

struct AckSession;

#[async_trait]
impl bridge_traits::AudioSession for AckSession {
    async fn configure(&self, _options: SessionOptions) -> SessionStatus {
        SessionStatus::ok("ack")
    }

    fn platform_version(&self) -> String {
        "Test 1.0".to_string()
    }
}

fn toolkit() -> AudioToolkit {
    let config = CoreConfig::builder()
        .session(Arc::new(AckSession))
        .max_concurrent_jobs(2)
        .build()
        .unwrap();
    let processing = ProcessingConfig {
        block_frames: 512,
        progress_min_step: 0.0,
        progress_min_interval: std::time::Duration::ZERO,
        ..Default::default()
    };
    AudioToolkit::with_processing_config(config, processing).unwrap()
}

fn write_ramp(dir: &TempDir, name: &str, sample_rate: u32, frames: u32) -> PathBuf {
    let path = dir.path().join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..frames {
        let value = ((i % 200) as i32 - 100) * 300;
        writer.write_sample(value as i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_convert_job_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_ramp(&dir, "source.wav", 8_000, 8_000);
    let target = dir.path().join("copy.wav");

    let toolkit = toolkit();
    let mut events = toolkit.subscribe_events();

    let job = toolkit
        .convert_audio(ConvertAudioRequest::new(&source, &target, "wav"))
        .unwrap();
    assert_eq!(job.operation(), Operation::Convert);
    let job_id = job.id().to_string();

    let result = job.wait().await.unwrap();
    assert_eq!(result.status, ConversionStatus::Completed);
    assert_eq!(result.duration_ms, 1_000);
    assert_eq!(result.sample_rate, 8_000);
    assert!(target.exists());

    let mut kinds = Vec::new();
    while let Some(Ok(CoreEvent::Job(event))) = events.try_recv() {
        assert_eq!(event.job_id(), job_id);
        kinds.push(event);
    }
    assert!(matches!(kinds.first(), Some(JobEvent::Started { source, .. }) if source == "source.wav"));
    assert!(matches!(kinds.last(), Some(JobEvent::Completed { .. })));

    let fractions: Vec<f64> = kinds
        .iter()
        .filter_map(|e| match e {
            JobEvent::Progress { fraction, .. } => Some(*fraction),
            _ => None,
        })
        .collect();
    assert!(!fractions.is_empty());
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(fractions.last().copied(), Some(1.0));
    assert_eq!(toolkit.active_jobs(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_trim_job_clamps_end() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_ramp(&dir, "source.wav", 8_000, 16_000);
    let target = dir.path().join("tail.wav");

    let result = toolkit()
        .trim_audio(TrimAudioRequest::new(&source, &target, "wav", 1_500, 60_000))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.duration_ms, 500);
    let reader = hound::WavReader::open(&target).unwrap();
    assert_eq!(reader.duration(), 4_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_copy_trim_job_keeps_samples() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_ramp(&dir, "source.wav", 8_000, 16_000);
    let target = dir.path().join("cut.wav");

    let job = toolkit()
        .trim_audio(TrimAudioRequest::new(&source, &target, "COPY", 250, 750))
        .unwrap();
    assert_eq!(job.operation(), Operation::Trim);
    let result = job.into_report().await;

    assert_eq!(result.status, ConversionStatus::Completed);
    assert_eq!(result.frames_written, 4_000);
    assert_eq!(result.sample_rate, 8_000);

    let original: Vec<i16> = hound::WavReader::open(&source)
        .unwrap()
        .samples::<i16>()
        .map(|s| s.unwrap())
        .collect();
    let cut: Vec<i16> = hound::WavReader::open(&target)
        .unwrap()
        .samples::<i16>()
        .map(|s| s.unwrap())
        .collect();
    assert_eq!(cut.as_slice(), &original[2_000..6_000]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_copy_trim_of_missing_source_fails_through_handle() {
    let dir = tempfile::tempdir().unwrap();
    let report = toolkit()
        .trim_audio(TrimAudioRequest::new(
            dir.path().join("nope.wav"),
            dir.path().join("cut.wav"),
            "copy",
            0,
            500,
        ))
        .unwrap()
        .into_report()
        .await;
    assert_eq!(report.status, ConversionStatus::Failed);
    assert_eq!(report.format, core_audio::AudioFormat::Wav);
    assert_eq!(report.error.unwrap().kind, ErrorKind::FileNotFound);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_convert_job_resamples() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_ramp(&dir, "source.wav", 8_000, 8_000);
    let target = dir.path().join("resampled.wav");

    let result = toolkit()
        .convert_audio(ConvertAudioRequest::new(&source, &target, "wav").with_sample_rate(22_050))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(result.sample_rate, 22_050);
    assert_eq!(result.duration_ms, 1_000);
    let reader = hound::WavReader::open(&target).unwrap();
    assert_eq!(reader.spec().sample_rate, 22_050);
    assert_eq!(reader.duration(), 22_050);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_waveform_job() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_ramp(&dir, "source.wav", 8_000, 8_000);

    let toolkit = toolkit();
    let first = toolkit
        .extract_waveform_data(WaveformRequest::new(&source, 50).normalized())
        .unwrap()
        .wait()
        .await
        .unwrap();
    let second = toolkit
        .extract_waveform_data(WaveformRequest::new(&source, 50).normalized())
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(first.peaks.len(), 50);
    assert_eq!(first.rms.len(), 50);
    assert_eq!(first, second);
    assert!(first.peaks.iter().all(|p| *p <= 1.0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_source_fails_through_handle() {
    let dir = tempfile::tempdir().unwrap();
    let toolkit = toolkit();
    let mut events = toolkit.subscribe_events();

    let job = toolkit
        .convert_audio(ConvertAudioRequest::new(
            dir.path().join("nope.wav"),
            dir.path().join("out.wav"),
            "wav",
        ))
        .unwrap();
    let report = job.into_report().await;
    assert_eq!(report.status, ConversionStatus::Failed);
    assert_eq!(report.error.unwrap().kind, ErrorKind::FileNotFound);

    let terminal = loop {
        match events.recv().await.unwrap() {
            CoreEvent::Job(event) if event.is_terminal() => break event,
            _ => continue,
        }
    };
    assert!(matches!(terminal, JobEvent::Failed { ref code, .. } if code == "FILE_NOT_FOUND"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_job_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_ramp(&dir, "source.wav", 44_100, 441_000);
    let target = dir.path().join("cancelled.wav");

    let toolkit = toolkit();
    let job = toolkit
        .convert_audio(ConvertAudioRequest::new(&source, &target, "wav"))
        .unwrap();
    job.cancel();

    let result = job.wait().await.unwrap();
    assert_eq!(result.status, ConversionStatus::Cancelled);
    assert!(!target.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_file_info_and_session() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_ramp(&dir, "source.wav", 8_000, 4_000);

    let toolkit = toolkit();
    let info = toolkit.get_audio_file_info(&source).await.unwrap();
    assert_eq!(info.duration_ms, 500);
    assert_eq!(info.sample_rate, 8_000);
    assert_eq!(info.channels, 1);
    assert_eq!(info.bitrate, 128_000);

    let status = toolkit.configure_audio_session(SessionOptions::default()).await;
    assert!(status.success);
    assert_eq!(status.message, "ack");
}
