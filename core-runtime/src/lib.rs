//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the audio toolkit crates:
//! - Logging and tracing setup
//! - Configuration and bridge injection
//! - Job event bus

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
