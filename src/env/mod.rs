//! Process-environment mutation.
//!
//! Two global side effects live behind the [`EnvironmentMutator`] trait:
//! prepending a directory to the process-wide PATH (so later requirements
//! can invoke tools earlier ones acquired) and appending setup lines to the
//! user's shell profile (the graphics SDK needs its environment sourced in
//! future shells). Both are irreversible and order-sensitive, so the core
//! never touches them directly: it goes through an injected implementation,
//! and tests substitute [`RecordingEnv`].
//!
//! PATH lifecycle: appended to by a successful requirement, read by all
//! subsequent requirements, never rolled back.

use crate::error::{KindlingError, Result};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Collaborator for environment side effects.
pub trait EnvironmentMutator {
    /// Prepend a directory to the process PATH.
    fn prepend_path(&self, dir: &Path);

    /// Append a line to the user's login-shell profile.
    fn append_profile_line(&self, line: &str) -> Result<()>;
}

/// Production implementation mutating the real process environment.
pub struct ProcessEnv;

impl EnvironmentMutator for ProcessEnv {
    fn prepend_path(&self, dir: &Path) {
        let mut entries = vec![dir.to_path_buf()];
        entries.extend(crate::locate::parse_system_path());
        if let Ok(joined) = std::env::join_paths(entries) {
            // SAFETY: single-threaded during requirement execution
            unsafe { std::env::set_var("PATH", joined) };
            tracing::info!("Added {} to PATH for this process", dir.display());
        }
    }

    fn append_profile_line(&self, line: &str) -> Result<()> {
        let Some(profile) = shell_profile_path() else {
            tracing::warn!("No shell profile found; add this line manually: {}", line);
            return Ok(());
        };

        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&profile)
            .map_err(|e| KindlingError::FileSystem {
                path: profile.clone(),
                message: e.to_string(),
            })?;
        writeln!(file, "\n{}", line).map_err(|e| KindlingError::FileSystem {
            path: profile.clone(),
            message: e.to_string(),
        })?;

        tracing::info!("Appended setup line to {}", profile.display());
        Ok(())
    }
}

/// Pick the login-shell profile to append to.
///
/// Preference order matches what interactive macOS/Linux shells actually
/// read: `.zshrc` if present, then `.zprofile`, then `.bash_profile`.
fn shell_profile_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    for name in [".zshrc", ".zprofile", ".bash_profile"] {
        let candidate = home.join(name);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Test double that records mutations instead of performing them.
#[derive(Default)]
pub struct RecordingEnv {
    pub prepended: RefCell<Vec<PathBuf>>,
    pub profile_lines: RefCell<Vec<String>>,
}

impl EnvironmentMutator for RecordingEnv {
    fn prepend_path(&self, dir: &Path) {
        self.prepended.borrow_mut().push(dir.to_path_buf());
    }

    fn append_profile_line(&self, line: &str) -> Result<()> {
        self.profile_lines.borrow_mut().push(line.to_string());
        Ok(())
    }
}

/// Check if running in a CI environment.
///
/// Used to force non-interactive mode (no download confirmation prompts)
/// and to suppress progress bars. Checks common CI environment variables:
/// `CI`, `GITHUB_ACTIONS`, `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}
