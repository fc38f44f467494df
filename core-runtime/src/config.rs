//! # Core Configuration Module
//!
//! Builder-based configuration for the audio toolkit runtime.
//!
//! The builder holds the injected host capabilities and the job limits used by
//! the service layer. It fails fast when a required bridge is missing.
//!
//! ## Required Dependencies
//!
//! - `AudioSession` - OS audio session setup (desktop default: acknowledgement only)
//!
//! ## Optional Dependencies
//!
//! - `LoggerSink` - Mirrors core logs into the host logging pipeline
//!
//! When the `desktop-shims` feature is enabled, `DesktopAudioSession` is
//! injected automatically if no session is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .session(Arc::new(MyIosSession::new()))
//!     .max_concurrent_jobs(2)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AudioSession, LoggerSink};
use std::sync::Arc;

/// Default number of jobs allowed to run at the same time.
pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 4;

/// Upper bound accepted for `max_concurrent_jobs`.
pub const MAX_CONCURRENT_JOBS_LIMIT: usize = 64;

/// Default capacity of the event bus.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Core configuration for the audio toolkit.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Audio session bridge (required)
    pub session: Arc<dyn AudioSession>,

    /// Host log forwarding (optional)
    pub logger_sink: Option<Arc<dyn LoggerSink>>,

    /// Number of long-running jobs (convert, trim, waveform) allowed in parallel
    pub max_concurrent_jobs: usize,

    /// Capacity of the broadcast channel backing the event bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("session", &"AudioSession { ... }")
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .field("max_concurrent_jobs", &self.max_concurrent_jobs)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the job limits.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_jobs == 0 {
            return Err(Error::Config(
                "max_concurrent_jobs must be at least 1".to_string(),
            ));
        }

        if self.max_concurrent_jobs > MAX_CONCURRENT_JOBS_LIMIT {
            return Err(Error::Config(format!(
                "max_concurrent_jobs exceeds maximum of {}",
                MAX_CONCURRENT_JOBS_LIMIT
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "event_buffer_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_session() -> Result<Arc<dyn AudioSession>> {
    use bridge_desktop::DesktopAudioSession;

    let session: Arc<dyn AudioSession> = Arc::new(DesktopAudioSession::new());
    Ok(session)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_session() -> Result<Arc<dyn AudioSession>> {
    Err(Error::capability_missing(
        "AudioSession",
        "AudioSession implementation is required. \
         Desktop: enable the 'desktop-shims' feature to use DesktopAudioSession. \
         Mobile: inject the platform session adapter (AVAudioSession/AudioManager).",
    ))
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    session: Option<Arc<dyn AudioSession>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
    max_concurrent_jobs: Option<usize>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the audio session bridge.
    pub fn session(mut self, session: Arc<dyn AudioSession>) -> Self {
        self.session = Some(session);
        self
    }

    /// Sets the host logger sink.
    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    /// Sets how many jobs may run concurrently (1..=64).
    pub fn max_concurrent_jobs(mut self, jobs: usize) -> Self {
        self.max_concurrent_jobs = Some(jobs);
        self
    }

    /// Sets the event bus capacity.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] if no session was provided and no
    ///   platform default is compiled in
    /// - [`Error::Config`] if a limit is out of range
    pub fn build(self) -> Result<CoreConfig> {
        let session = match self.session {
            Some(session) => session,
            None => provide_default_session()?,
        };

        let config = CoreConfig {
            session,
            logger_sink: self.logger_sink,
            max_concurrent_jobs: self
                .max_concurrent_jobs
                .unwrap_or(DEFAULT_MAX_CONCURRENT_JOBS),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{ConsoleLogger, SessionOptions, SessionStatus};

    struct StubSession;

    #[async_trait]
    impl AudioSession for StubSession {
        async fn configure(&self, _options: SessionOptions) -> SessionStatus {
            SessionStatus::ok("stub")
        }

        fn platform_version(&self) -> String {
            "Stub 1.0".to_string()
        }
    }

    fn builder_with_session() -> CoreConfigBuilder {
        CoreConfig::builder().session(Arc::new(StubSession))
    }

    #[test]
    fn test_builder_defaults() {
        let config = builder_with_session().build().unwrap();
        assert_eq!(config.max_concurrent_jobs, DEFAULT_MAX_CONCURRENT_JOBS);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert!(config.logger_sink.is_none());
        assert_eq!(config.session.platform_version(), "Stub 1.0");
    }

    #[test]
    fn test_builder_with_logger_sink() {
        let config = builder_with_session()
            .logger_sink(Arc::new(ConsoleLogger::default()))
            .build()
            .unwrap();
        assert!(config.logger_sink.is_some());
    }

    #[test]
    fn test_rejects_zero_jobs() {
        let result = builder_with_session().max_concurrent_jobs(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_excessive_jobs() {
        let result = builder_with_session()
            .max_concurrent_jobs(MAX_CONCURRENT_JOBS_LIMIT + 1)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));

        let config = builder_with_session()
            .max_concurrent_jobs(MAX_CONCURRENT_JOBS_LIMIT)
            .build()
            .unwrap();
        assert_eq!(config.max_concurrent_jobs, MAX_CONCURRENT_JOBS_LIMIT);
    }

    #[test]
    fn test_rejects_zero_event_buffer() {
        let result = builder_with_session().event_buffer_size(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_session() {
        let result = CoreConfig::builder().build();
        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "AudioSession")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[cfg(feature = "desktop-shims")]
    #[tokio::test]
    async fn test_build_with_desktop_defaults() {
        let config = CoreConfig::builder().build().unwrap();
        let status = config.session.configure(SessionOptions::default()).await;
        assert!(status.success);
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = builder_with_session().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("AudioSession { ... }"));
        assert!(debug.contains("max_concurrent_jobs: 4"));
    }
}
