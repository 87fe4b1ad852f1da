//! Tool location.
//!
//! A requirement names an ordered list of glob patterns (recursive `**`
//! supported) describing where its executable might live: system install
//! directories first, then the vendor cache this tool populates. The locator
//! expands each pattern, keeps regular executable files, probes each
//! survivor's version, and gates on the minimum version when one is set.
//!
//! An empty result is a normal outcome: absence is what triggers
//! acquisition, not an error.

use crate::error::Result;
use crate::version::SemVer;
use std::path::{Path, PathBuf};

/// A located executable and the version it reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCandidate {
    pub path: PathBuf,
    pub detected_version: Option<SemVer>,
}

/// Version probe: run a candidate and parse what it reports.
pub type VersionProbe<'a> = &'a dyn Fn(&Path) -> Result<SemVer>;

/// Expand `patterns` in order and return qualifying candidates,
/// highest-priority first.
///
/// A candidate qualifies when it is a regular executable file and, if
/// `min_version` is set, its probed version is at least that (numeric,
/// component-wise). A probe failure disqualifies only that candidate;
/// the scan continues.
pub fn locate(
    patterns: &[String],
    min_version: Option<SemVer>,
    probe: VersionProbe<'_>,
) -> Vec<ToolCandidate> {
    let mut candidates = Vec::new();

    for pattern in patterns {
        let paths = match glob::glob(pattern) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::debug!("Skipping malformed pattern '{}': {}", pattern, e);
                continue;
            }
        };

        for entry in paths.flatten() {
            if !entry.is_file() || !is_executable(&entry) {
                continue;
            }
            if candidates.iter().any(|c: &ToolCandidate| c.path == entry) {
                continue;
            }

            let detected_version = match probe(&entry) {
                Ok(version) => Some(version),
                Err(e) => {
                    tracing::debug!("Version probe failed for {}: {}", entry.display(), e);
                    None
                }
            };

            if let Some(min) = min_version {
                match detected_version {
                    Some(found) if found >= min => {}
                    _ => continue,
                }
            }

            candidates.push(ToolCandidate {
                path: entry,
                detected_version,
            });
        }
    }

    candidates
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable. Does NOT use
/// the `which` command: `which` behavior varies across systems and
/// is sometimes a shell builtin with inconsistent error handling.
pub fn resolve_on_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    for dir in path_entries {
        let candidate = dir.join(tool);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Default version probe: run the candidate with `--version` and parse the
/// first version-looking token from its output.
pub fn probe_version_flag(path: &Path) -> Result<SemVer> {
    let output = crate::process::run_capture(path, &["--version"])?;
    crate::version::extract_version(&output).ok_or_else(|| {
        crate::error::KindlingError::VersionParse {
            input: output.lines().next().unwrap_or_default().to_string(),
        }
    })
}
