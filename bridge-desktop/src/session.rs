//! Desktop Audio Session Implementation

use async_trait::async_trait;
use bridge_traits::session::{AudioSession, SessionOptions, SessionStatus};
use tracing::debug;

/// Audio session for desktop hosts.
///
/// Always succeeds; the options are logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct DesktopAudioSession {
    os: &'static str,
    arch: &'static str,
}

impl DesktopAudioSession {
    pub fn new() -> Self {
        Self {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }

    fn os_display_name(&self) -> &'static str {
        match self.os {
            "linux" => "Linux",
            "windows" => "Windows",
            "macos" => "macOS",
            "freebsd" => "FreeBSD",
            other => other,
        }
    }
}

impl Default for DesktopAudioSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSession for DesktopAudioSession {
    async fn configure(&self, options: SessionOptions) -> SessionStatus {
        debug!(
            os = self.os,
            empty = options.is_empty(),
            "Ignoring audio session options on desktop"
        );
        SessionStatus::ok(format!(
            "Audio session configuration not required on {}",
            self.os_display_name()
        ))
    }

    fn platform_version(&self) -> String {
        format!("{} {}", self.os_display_name(), self.arch)
    }
}
