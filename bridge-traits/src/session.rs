//! Audio Session Abstraction
//!
//! Hosts with an OS-level audio session (AVAudioSession, Android audio focus)
//! configure it here before the core reads or writes audio. Desktop hosts have
//! no such concept and simply acknowledge the request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Requested session category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionCategory {
    #[default]
    Playback,
    PlayAndRecord,
    Record,
    Ambient,
}

/// Options passed to [`AudioSession::configure`]. Every field is optional so
/// an empty request is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionOptions {
    pub category: Option<SessionCategory>,
    /// Platform-specific mode name, e.g. `"default"` or `"measurement"`.
    pub mode: Option<String>,
    pub allow_bluetooth: bool,
    pub default_to_speaker: bool,
    /// Anything else the host wants to pass through untouched.
    pub extra: HashMap<String, String>,
}

impl SessionOptions {
    pub fn with_category(mut self, category: SessionCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Outcome of a session configuration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub success: bool,
    pub message: String,
}

impl SessionStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Audio session trait
///
/// Configuration never returns an error: platforms that cannot apply the
/// options report `success = false` with a message instead.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::session::{AudioSession, SessionOptions, SessionStatus};
/// use async_trait::async_trait;
///
/// struct IosSession;
///
/// #[async_trait]
/// impl AudioSession for IosSession {
///     async fn configure(&self, options: SessionOptions) -> SessionStatus {
///         // call into AVAudioSession through FFI
///         SessionStatus::ok("Audio session configured")
///     }
///
///     fn platform_version(&self) -> String {
///         "iOS 17.4".to_string()
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioSession: Send + Sync {
    /// Apply the requested session options.
    async fn configure(&self, options: SessionOptions) -> SessionStatus;

    /// Human-readable host platform description, e.g. `"Linux x86_64"`.
    fn platform_version(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_deserialize() {
        let options: SessionOptions = serde_json::from_str("{}").unwrap();
        assert!(options.is_empty());
    }

    #[test]
    fn test_options_camel_case() {
        let options: SessionOptions =
            serde_json::from_str(r#"{"category":"playAndRecord","allowBluetooth":true}"#).unwrap();
        assert_eq!(options.category, Some(SessionCategory::PlayAndRecord));
        assert!(options.allow_bluetooth);
        assert!(!options.is_empty());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(SessionStatus::ok("done")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "done");
    }

    #[tokio::test]
    async fn test_mock_session() {
        let mut session = MockAudioSession::new();
        session
            .expect_configure()
            .returning(|_| SessionStatus::failed("no session"));
        session
            .expect_platform_version()
            .return_const("Test 1.0".to_string());

        let status = session.configure(SessionOptions::default()).await;
        assert!(!status.success);
        assert_eq!(session.platform_version(), "Test 1.0");
    }
}
