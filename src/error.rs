//! Error types for Kindling operations.
//!
//! This module defines [`KindlingError`], the primary error type used
//! throughout the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `KindlingError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `KindlingError::Other`) for unexpected errors
//! - The orchestrator never propagates errors upward: every requirement
//!   outcome is converted into a report entry, and callers decide policy

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Kindling operations.
#[derive(Debug, Error)]
pub enum KindlingError {
    /// Connection, DNS, or read failure while downloading.
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// The server declared a content length that did not match the bytes received.
    #[error("Incomplete transfer: expected {expected} bytes, received {received}")]
    IncompleteTransfer { expected: u64, received: u64 },

    /// A download was aborted through its cancellation flag.
    #[error("Download canceled: {url}")]
    Canceled { url: String },

    /// The downloaded payload's digest did not match the pinned one.
    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    /// Filesystem read/write failure with the path that caused it.
    #[error("Filesystem error at {path}: {message}")]
    FileSystem { path: PathBuf, message: String },

    /// Archive extension is not one of the supported formats.
    #[error("Unsupported archive format: {name}")]
    UnsupportedFormat { name: String },

    /// Archive exists but could not be parsed.
    #[error("Corrupt archive {path}: {message}")]
    CorruptArchive { path: PathBuf, message: String },

    /// The running OS is not one Kindling knows how to provision.
    #[error("Unsupported platform: {os}")]
    UnsupportedPlatform { os: String },

    /// An installer or build command exited non-zero.
    #[error("Command failed with exit code {code:?}: {command}")]
    ExternalCommand { command: String, code: Option<i32> },

    /// An external command exceeded its allotted time and was terminated.
    #[error("Command timed out after {seconds}s: {command}")]
    Timeout { command: String, seconds: u64 },

    /// A version string could not be parsed into numeric components.
    #[error("Cannot parse version from '{input}'")]
    VersionParse { input: String },

    /// A requirement is still unsatisfied after its acquisition path ran.
    #[error("Requirement '{requirement}' not satisfied: {message}")]
    RequirementMissing {
        requirement: String,
        message: String,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Kindling operations.
pub type Result<T> = std::result::Result<T, KindlingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_displays_url_and_message() {
        let err = KindlingError::Network {
            url: "https://example.com/tool.zip".into(),
            message: "connection refused".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/tool.zip"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn incomplete_transfer_displays_byte_counts() {
        let err = KindlingError::IncompleteTransfer {
            expected: 1000,
            received: 500,
        };
        let msg = err.to_string();
        assert!(msg.contains("1000"));
        assert!(msg.contains("500"));
    }

    #[test]
    fn filesystem_error_displays_path() {
        let err = KindlingError::FileSystem {
            path: PathBuf::from("/vendor/cmake"),
            message: "permission denied".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/vendor/cmake"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn unsupported_format_displays_name() {
        let err = KindlingError::UnsupportedFormat {
            name: "tool.rar".into(),
        };
        assert!(err.to_string().contains("tool.rar"));
    }

    #[test]
    fn corrupt_archive_displays_path_and_message() {
        let err = KindlingError::CorruptArchive {
            path: PathBuf::from("/vendor/cmake/cmake.tar.gz"),
            message: "invalid gzip header".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cmake.tar.gz"));
        assert!(msg.contains("invalid gzip header"));
    }

    #[test]
    fn unsupported_platform_displays_os() {
        let err = KindlingError::UnsupportedPlatform {
            os: "freebsd".into(),
        };
        assert!(err.to_string().contains("freebsd"));
    }

    #[test]
    fn external_command_displays_command_and_code() {
        let err = KindlingError::ExternalCommand {
            command: "cmake --build .".into(),
            code: Some(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("cmake --build ."));
        assert!(msg.contains("2"));
    }

    #[test]
    fn timeout_displays_command_and_seconds() {
        let err = KindlingError::Timeout {
            command: "installer.exe".into(),
            seconds: 300,
        };
        let msg = err.to_string();
        assert!(msg.contains("installer.exe"));
        assert!(msg.contains("300"));
    }

    #[test]
    fn version_parse_displays_input() {
        let err = KindlingError::VersionParse {
            input: "not-a-version".into(),
        };
        assert!(err.to_string().contains("not-a-version"));
    }

    #[test]
    fn requirement_missing_displays_requirement_and_message() {
        let err = KindlingError::RequirementMissing {
            requirement: "build-tool".into(),
            message: "no candidate met the minimum version".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("build-tool"));
        assert!(msg.contains("minimum version"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: KindlingError = io_err.into();
        assert!(matches!(err, KindlingError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(KindlingError::UnsupportedPlatform { os: "plan9".into() })
        }
        assert!(returns_error().is_err());
    }
}
