//! Core service façade.
//!
//! [`AudioToolkit`] exposes the host operations on top of `core-audio`:
//!
//! | Host call | Method | Runs as |
//! |-----------|--------|---------|
//! | `convertAudio` | [`AudioToolkit::convert_audio`] | job |
//! | `trimAudio` | [`AudioToolkit::trim_audio`] | job |
//! | `extractWaveformData` | [`AudioToolkit::extract_waveform_data`] | job |
//! | `isAudioFormatSupported` | [`AudioToolkit::is_audio_format_supported`] | inline |
//! | `getAudioFileInfo` | [`AudioToolkit::get_audio_file_info`] | blocking pool |
//! | `configureAudioSession` | [`AudioToolkit::configure_audio_session`] | session bridge |
//!
//! Jobs return a [`JobHandle`] right away. Request errors are reported before
//! a job is spawned; decode and write errors come back from
//! [`JobHandle::wait`]. Desktop apps typically enable the `desktop-shims`
//! feature so a [`CoreConfig`](core_runtime::config::CoreConfig) can be built
//! without injecting a session.
//!
//! ```rust,no_run
//! # async fn example() -> core_service::Result<()> {
//! use core_service::{AudioToolkit, ConvertAudioRequest};
//! use core_runtime::config::CoreConfig;
//!
//! let toolkit = AudioToolkit::new(CoreConfig::builder().build()?)?;
//! let job = toolkit.convert_audio(ConvertAudioRequest::new("in.mp3", "out.wav", "wav"))?;
//! let result = job.wait().await?;
//! println!("wrote {:?} ({}ms)", result.output_path, result.duration_ms);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod job;
mod requests;
mod toolkit;

pub use error::{CoreError, Result};
pub use job::{JobHandle, Operation};
pub use requests::{ConvertAudioRequest, FormatSupport, TrimAudioRequest, WaveformRequest};
pub use toolkit::AudioToolkit;

pub use bridge_traits::{SessionCategory, SessionOptions, SessionStatus};
pub use core_runtime::events::{CoreEvent, EventStream, JobEvent};
