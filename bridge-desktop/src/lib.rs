//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! - `AudioSession` as an acknowledgement-only session (desktop audio stacks
//!   have no per-application session to configure)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::DesktopAudioSession;
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .session(Arc::new(DesktopAudioSession::new()))
//!     .build()?;
//! ```

mod session;

pub use session::DesktopAudioSession;
