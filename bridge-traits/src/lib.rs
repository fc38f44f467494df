//! # Host Bridge Traits
//!
//! Capability traits that each host platform implements for the audio core.
//!
//! ## Traits
//!
//! - [`AudioSession`](session::AudioSession) - OS audio session setup and platform description
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | iOS      | TBD                 | 📋 Planned |
//! | Android  | TBD                 | 📋 Planned |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with a descriptive error when a required capability is
//! missing:
//!
//! ```ignore
//! let session = config.session
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "AudioSession".to_string(),
//!         message: "No audio session provided. \
//!                  Desktop: enable the desktop-shims feature. \
//!                  Mobile: inject the platform adapter.".to_string(),
//!     })?;
//! ```
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across async tasks and blocking workers.

pub mod error;
pub mod log;
pub mod session;

pub use error::BridgeError;

pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use session::{AudioSession, SessionCategory, SessionOptions, SessionStatus};
