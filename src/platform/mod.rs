//! Platform resolution and download-URL construction.
//!
//! The running OS and architecture are resolved exactly once per process and
//! treated as read-only afterwards. Architecture aliasing ("AMD64" vs
//! "x86_64", "arm64" vs "aarch64") is normalized here so URL templates stay
//! platform-name-agnostic.

use crate::error::{KindlingError, Result};
use std::fmt;
use std::sync::OnceLock;

/// Operating-system families Kindling can provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
}

impl OsFamily {
    /// Map an OS name (as reported by `std::env::consts::OS`) to a family.
    pub fn from_os_name(name: &str) -> Result<Self> {
        match name {
            "windows" => Ok(OsFamily::Windows),
            "macos" => Ok(OsFamily::MacOs),
            "linux" => Ok(OsFamily::Linux),
            other => Err(KindlingError::UnsupportedPlatform { os: other.into() }),
        }
    }

    /// Token used in release-artifact URLs ("windows", "macos", "linux").
    pub fn download_token(&self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::MacOs => "macos",
            OsFamily::Linux => "linux",
        }
    }

    /// Conventional archive extension for release artifacts on this OS.
    pub fn archive_ext(&self) -> &'static str {
        match self {
            OsFamily::Windows => "zip",
            OsFamily::MacOs | OsFamily::Linux => "tar.gz",
        }
    }

    /// Executable file name for a tool on this OS.
    pub fn exe_name(&self, tool: &str) -> String {
        match self {
            OsFamily::Windows => format!("{}.exe", tool),
            OsFamily::MacOs | OsFamily::Linux => tool.to_string(),
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.download_token())
    }
}

/// The resolved platform: OS family plus normalized architecture.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlatformInfo {
    pub os: OsFamily,
    pub arch: String,
}

static CURRENT: OnceLock<PlatformInfo> = OnceLock::new();

impl PlatformInfo {
    /// Resolve the current platform, once per process.
    ///
    /// Subsequent calls return the same instance. An unrecognized OS is a
    /// fatal configuration error: no requirement can build a download URL
    /// without a platform.
    pub fn resolve() -> Result<&'static PlatformInfo> {
        if let Some(info) = CURRENT.get() {
            return Ok(info);
        }
        let os = OsFamily::from_os_name(std::env::consts::OS)?;
        let info = PlatformInfo {
            os,
            arch: normalize_arch(std::env::consts::ARCH),
        };
        Ok(CURRENT.get_or_init(|| info))
    }

    /// Build a platform with explicit values (tests, cross-platform URL checks).
    pub fn with_values(os: OsFamily, arch: &str) -> Self {
        Self {
            os,
            arch: normalize_arch(arch),
        }
    }
}

/// Collapse vendor-specific architecture aliases to the canonical spelling.
pub fn normalize_arch(arch: &str) -> String {
    match arch.to_ascii_lowercase().as_str() {
        "amd64" | "x64" | "x86_64" => "x86_64".to_string(),
        "arm64" | "aarch64" => "aarch64".to_string(),
        "i386" | "i686" | "x86" => "i386".to_string(),
        other => other.to_string(),
    }
}

/// A download-URL template with `{version}`, `{os}`, `{arch}`, and `{ext}`
/// placeholders.
#[derive(Debug, Clone)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Expand the template for a platform and version.
    pub fn build(&self, platform: &PlatformInfo, version: &str) -> String {
        self.template
            .replace("{version}", version)
            .replace("{os}", platform.os.download_token())
            .replace("{arch}", &platform.arch)
            .replace("{ext}", platform.os.archive_ext())
    }
}
