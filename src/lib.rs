//! Workspace umbrella crate.
//!
//! Host applications depend on `audio-toolkit` and enable the documented
//! features (`desktop-shims`, `decoder-all`, `ffmpeg-encoder`) without wiring
//! each workspace crate individually. The public surface is the
//! [`AudioToolkit`] façade from `core-service`.

pub use core_audio::{
    AudioFileInfo, AudioFormat, ConversionResult, ConversionStatus, ErrorKind, ErrorReport,
    WaveformResult,
};
pub use core_service::{
    AudioToolkit, ConvertAudioRequest, CoreError, FormatSupport, JobHandle, Operation, Result,
    TrimAudioRequest, WaveformRequest,
};
