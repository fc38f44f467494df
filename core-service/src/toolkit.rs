use crate::error::{CoreError, Result};
use crate::job::{JobContext, JobHandle, JobRegistry};
use crate::requests::{
    require_path, ConvertAudioRequest, FormatSupport, TrimAudioRequest, WaveformRequest,
};
use bridge_traits::{AudioSession, SessionOptions, SessionStatus};
use core_async::sync::Semaphore;
use core_async::task;
use core_audio::{
    copy_trim, extract_waveform, inspect, AudioFileInfo, AudioFormat, ConversionRequest,
    ConversionResult, Converter, ProcessingConfig, WaveformResult,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream, JobKind};
use core_runtime::logging::strip_path;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Entry point for hosts.
///
/// Cheap to clone; clones share the job limit, event bus and session.
#[derive(Clone)]
pub struct AudioToolkit {
    session: Arc<dyn AudioSession>,
    processing: Arc<ProcessingConfig>,
    jobs: JobContext,
}

impl AudioToolkit {
    /// Build a toolkit with the default processing settings.
    pub fn new(config: CoreConfig) -> Result<Self> {
        Self::with_processing_config(config, ProcessingConfig::default())
    }

    /// Build a toolkit with explicit processing settings.
    pub fn with_processing_config(config: CoreConfig, processing: ProcessingConfig) -> Result<Self> {
        config.validate()?;
        processing.validate()?;

        info!(
            "Audio toolkit ready: {} concurrent jobs, block size {} frames, platform {}",
            config.max_concurrent_jobs,
            processing.block_frames,
            config.session.platform_version()
        );

        Ok(Self {
            session: config.session,
            processing: Arc::new(processing),
            jobs: JobContext {
                limiter: Arc::new(Semaphore::new(config.max_concurrent_jobs)),
                events: EventBus::new(config.event_buffer_size),
                registry: Arc::new(JobRegistry::default()),
            },
        })
    }

    /// Toolkit backed by the desktop session shim.
    #[cfg(feature = "desktop-shims")]
    pub fn desktop() -> Result<Self> {
        let config = CoreConfig::builder()
            .session(Arc::new(bridge_desktop::DesktopAudioSession::new()))
            .build()?;
        Self::new(config)
    }

    pub fn processing_config(&self) -> &ProcessingConfig {
        &self.processing
    }

    /// Subscribe to job lifecycle events. Past events are not replayed.
    pub fn subscribe_events(&self) -> EventStream {
        self.jobs.events.subscribe()
    }

    /// Number of jobs queued or running.
    pub fn active_jobs(&self) -> usize {
        self.jobs.registry.len()
    }

    /// Cancel every queued or running job. Returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        let cancelled = self.jobs.registry.cancel_all();
        if cancelled > 0 {
            info!("Cancelled {} active jobs", cancelled);
        }
        cancelled
    }

    /// Start converting `request.source_path` into `request.target_path`.
    ///
    /// Request errors (`InvalidArguments`, `UnsupportedFormat` for an unknown
    /// target name, `EncodeUnsupported`) are returned here; everything else
    /// arrives through the handle. Must be called from within a runtime.
    pub fn convert_audio(&self, request: ConvertAudioRequest) -> Result<JobHandle<ConversionResult>> {
        let engine = request.to_engine()?;
        debug!("convertAudio accepted: {:?}", engine);
        Ok(self.spawn_conversion(JobKind::Convert, engine))
    }

    /// Start cutting `[start_ms, end_ms)` out of a file and encoding it.
    ///
    /// An inverted or negative range fails here with `InvalidRange`. An end
    /// past the source duration is clamped once the source is open. A
    /// `copy` target format cuts a WAV source without re-encoding.
    pub fn trim_audio(&self, request: TrimAudioRequest) -> Result<JobHandle<ConversionResult>> {
        if request.is_copy() {
            return self.spawn_copy_trim(request);
        }

        let engine = request.to_engine()?;
        debug!("trimAudio accepted: {:?}", engine);
        Ok(self.spawn_conversion(JobKind::Trim, engine))
    }

    fn spawn_conversion(&self, kind: JobKind, request: ConversionRequest) -> JobHandle<ConversionResult> {
        let converter = Converter::new((*self.processing).clone());
        let source = display(&request.source);
        let format = request.format;
        self.jobs.spawn(kind, source, Some(format), move |cancel, progress| {
            converter.convert(&request, cancel, progress)
        })
    }

    fn spawn_copy_trim(&self, request: TrimAudioRequest) -> Result<JobHandle<ConversionResult>> {
        request.validate_copy()?;
        if request.bitrate.is_some() || request.sample_rate.is_some() {
            debug!("Lossless trim ignores bitrate and sample rate");
        }
        debug!("trimAudio accepted as lossless copy: {:?}", request.range());

        let processing = Arc::clone(&self.processing);
        let source = display(&request.source_path);
        Ok(self.jobs.spawn(
            JobKind::Trim,
            source,
            Some(AudioFormat::Wav),
            move |cancel, progress| {
                copy_trim(
                    &request.source_path,
                    &request.target_path,
                    request.range(),
                    &processing,
                    cancel,
                    progress,
                )
            },
        ))
    }

    /// Start computing a peak/RMS envelope.
    pub fn extract_waveform_data(&self, request: WaveformRequest) -> Result<JobHandle<WaveformResult>> {
        request.validate(self.processing.max_waveform_buckets)?;

        let processing = Arc::clone(&self.processing);
        let source = display(&request.source_path);
        Ok(self.jobs.spawn(JobKind::Waveform, source, None, move |cancel, progress| {
            extract_waveform(
                &request.source_path,
                request.bucket_count,
                request.normalize,
                &processing,
                cancel,
                progress,
            )
        }))
    }

    /// Whether `format_name` names a registry format. Matching ignores case
    /// and a leading dot.
    pub fn is_audio_format_supported(&self, format_name: Option<&str>) -> Result<FormatSupport> {
        let name = format_name.ok_or_else(|| CoreError::invalid_arguments("formatName is required"))?;
        if name.trim().is_empty() {
            return Err(CoreError::invalid_arguments("formatName must not be blank"));
        }

        Ok(FormatSupport {
            supported: core_audio::is_supported(name),
            format: name.to_string(),
        })
    }

    /// Read duration, stream layout and capability flags of a file.
    #[instrument(skip(self, source_path))]
    pub async fn get_audio_file_info(&self, source_path: impl AsRef<Path>) -> Result<AudioFileInfo> {
        let path: PathBuf = source_path.as_ref().to_path_buf();
        require_path(&path, "sourcePath")?;

        let processing = Arc::clone(&self.processing);
        let name = display(&path);
        let info = task::spawn_blocking(move || inspect(&path, &processing))
            .await
            .map_err(|e| CoreError::JobFailed {
                job_id: format!("inspect:{}", name),
                message: e.to_string(),
            })??;
        Ok(info)
    }

    /// Hand session options to the platform. Never fails; platforms that
    /// cannot apply the options say so in the status.
    pub async fn configure_audio_session(&self, options: SessionOptions) -> SessionStatus {
        debug!("Configuring audio session: {:?}", options);
        let status = self.session.configure(options).await;
        info!(
            "Audio session configured: success={}, {}",
            status.success, status.message
        );
        status
    }

    pub fn platform_version(&self) -> String {
        self.session.platform_version()
    }
}

impl std::fmt::Debug for AudioToolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioToolkit")
            .field("processing", &self.processing)
            .field("active_jobs", &self.active_jobs())
            .field("events", &self.jobs.events)
            .finish()
    }
}

fn display(path: &Path) -> String {
    strip_path(&path.to_string_lossy()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::SessionCategory;
    use core_audio::ErrorKind;
    use mockall::predicate::function;

    mockall::mock! {
        Session {}

        #[async_trait]
        impl AudioSession for Session {
            async fn configure(&self, options: SessionOptions) -> SessionStatus;
            fn platform_version(&self) -> String;
        }
    }

    fn toolkit_with(session: MockSession) -> AudioToolkit {
        let config = CoreConfig::builder()
            .session(Arc::new(session))
            .max_concurrent_jobs(2)
            .build()
            .unwrap();
        AudioToolkit::new(config).unwrap()
    }

    fn quiet_session() -> MockSession {
        let mut session = MockSession::new();
        session
            .expect_platform_version()
            .return_const("Test OS 1.0".to_string());
        session
    }

    #[test]
    fn test_format_support_echoes_input() {
        let toolkit = toolkit_with(quiet_session());

        let support = toolkit.is_audio_format_supported(Some(".MP3")).unwrap();
        assert!(support.supported);
        assert_eq!(support.format, ".MP3");

        let support = toolkit.is_audio_format_supported(Some("flac")).unwrap();
        assert!(!support.supported);
        assert_eq!(support.format, "flac");
    }

    #[test]
    fn test_format_support_requires_a_name() {
        let toolkit = toolkit_with(quiet_session());

        for name in [None, Some(""), Some("   ")] {
            let err = toolkit.is_audio_format_supported(name).unwrap_err();
            assert_eq!(err.kind(), Some(ErrorKind::InvalidArguments));
        }
    }

    #[tokio::test]
    async fn test_configure_session_delegates_to_bridge() {
        let mut session = quiet_session();
        session
            .expect_configure()
            .with(function(|options: &SessionOptions| {
                options.category == Some(SessionCategory::PlayAndRecord)
            }))
            .times(1)
            .returning(|_| SessionStatus::ok("configured"));

        let toolkit = toolkit_with(session);
        let status = toolkit
            .configure_audio_session(SessionOptions::default().with_category(SessionCategory::PlayAndRecord))
            .await;
        assert!(status.success);
        assert_eq!(status.message, "configured");
        assert_eq!(toolkit.platform_version(), "Test OS 1.0");
    }

    #[tokio::test]
    async fn test_session_failure_is_a_status() {
        let mut session = quiet_session();
        session
            .expect_configure()
            .returning(|_| SessionStatus::failed("audio focus denied"));

        let status = toolkit_with(session)
            .configure_audio_session(SessionOptions::default())
            .await;
        assert!(!status.success);
    }

    #[tokio::test]
    async fn test_request_errors_surface_before_spawning() {
        let toolkit = toolkit_with(quiet_session());

        let err = toolkit
            .trim_audio(TrimAudioRequest::new("a.wav", "b.wav", "wav", 500, 500))
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidRange));

        let err = toolkit
            .extract_waveform_data(WaveformRequest::new("a.wav", -3))
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidBucketCount));

        let err = toolkit
            .extract_waveform_data(WaveformRequest::new("a.wav", i64::MAX))
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidBucketCount));

        let err = toolkit
            .trim_audio(TrimAudioRequest::new("a.wav", "", "copy", 0, 500))
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidArguments));

        let err = toolkit
            .convert_audio(ConvertAudioRequest::new("", "b.wav", "wav"))
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidArguments));

        assert_eq!(toolkit.active_jobs(), 0);
    }

    #[tokio::test]
    async fn test_file_info_for_missing_file() {
        let toolkit = toolkit_with(quiet_session());
        let err = toolkit
            .get_audio_file_info("/definitely/not/here.wav")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::FileNotFound));

        let err = toolkit.get_audio_file_info("").await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidArguments));
    }

    #[test]
    fn test_invalid_processing_config_rejected() {
        let config = CoreConfig::builder()
            .session(Arc::new(quiet_session()))
            .build()
            .unwrap();
        let processing = ProcessingConfig {
            block_frames: 0,
            ..ProcessingConfig::default()
        };
        let err = AudioToolkit::with_processing_config(config, processing).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidArguments));
    }
}
