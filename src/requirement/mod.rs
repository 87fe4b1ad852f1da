//! Check-and-acquire requirement units.
//!
//! A [`Requirement`] is a named, immutable description of one external tool
//! or SDK: where it might already be, how to decide an existing install is
//! good enough, and how to acquire it when it isn't. [`Requirement::ensure`]
//! runs the whole cycle (probe, acquire, re-probe) and always returns a
//! result, never an error.
//!
//! `ensure()` is idempotent: on an already-satisfied system it performs no
//! network or filesystem mutation beyond re-probing, so re-running setup is
//! always safe.
//!
//! # Modules
//!
//! - [`registry`] - Built-in requirement definitions for the engine workspace
//! - [`status`] - Outcome types and the orchestration report

pub mod registry;
pub mod status;

use crate::archive::ArchiveFormat;
use crate::env::EnvironmentMutator;
use crate::error::{KindlingError, Result};
use crate::locate::{locate, parse_system_path, resolve_on_path, ToolCandidate};
use crate::platform::{PlatformInfo, UrlTemplate};
use crate::process::ExternalCommand;
use crate::version::SemVer;
use status::RequirementResult;
use std::path::{Path, PathBuf};

/// What to do with a downloaded artifact (or checkout) to make the tool
/// available.
#[derive(Debug, Clone)]
pub enum PostDownloadAction {
    /// The artifact is directly usable (or nothing was downloaded).
    None,
    /// Unpack the archive into the requirement's vendor directory.
    Extract,
    /// Run the downloaded file as an installer with the given arguments.
    RunInstaller { args: Vec<String> },
    /// Run build commands against an existing checkout.
    RunBuildCommands { commands: Vec<ExternalCommand> },
}

/// How to obtain the tool when probing finds nothing.
#[derive(Debug, Clone)]
pub struct Acquisition {
    /// Download URL template; `None` for build-from-checkout requirements.
    pub url: Option<UrlTemplate>,
    /// Pinned version substituted into the template.
    pub version: String,
    /// Hex SHA-256 of the artifact, when the vendor publishes one.
    pub sha256: Option<String>,
    pub action: PostDownloadAction,
    /// Shell-profile line to append once the install succeeds (SDK
    /// environment setup for future shells).
    pub profile_line: Option<String>,
}

/// Detection through an environment variable naming the install location.
///
/// The variable's value is the resolved path; an optional substring gates
/// on the version embedded in it (SDK install paths carry their version).
#[derive(Debug, Clone)]
pub struct EnvVarProbe {
    pub var: String,
    pub version_substring: Option<String>,
}

/// Detection through a set of files that a built SDK leaves behind.
///
/// `dir_pattern` is a glob for candidate directories; the first one
/// containing every listed file (relative paths) is the resolved location.
#[derive(Debug, Clone)]
pub struct FileSetProbe {
    pub dir_pattern: String,
    pub files: Vec<String>,
}

/// A named, idempotent check-and-acquire unit for one external tool/SDK.
///
/// Immutable after construction. Probes run in a fixed order: environment
/// variable, PATH lookup, search patterns, file set. First hit wins.
#[derive(Debug, Clone)]
pub struct Requirement {
    pub name: String,
    pub min_version: Option<SemVer>,
    /// Binary name looked up on the process PATH (version-gated like any
    /// other candidate).
    pub path_lookup: Option<String>,
    /// Ordered glob patterns, highest priority first.
    pub search_patterns: Vec<String>,
    pub env_probe: Option<EnvVarProbe>,
    pub file_set_probe: Option<FileSetProbe>,
    pub acquisition: Option<Acquisition>,
}

/// Collaborators and policy injected into `ensure()`.
///
/// Production wiring lives in `main`; tests substitute closures to stub the
/// network, extraction, and process boundaries.
pub struct EnsureContext<'a> {
    pub platform: &'a PlatformInfo,
    /// Root of the vendor cache tree; each requirement gets a subdirectory.
    pub vendor_dir: PathBuf,
    pub env: &'a dyn EnvironmentMutator,
    /// Fetch (url, dest, expected_sha256) and return bytes written.
    pub fetch: &'a dyn Fn(&str, &Path, Option<&str>) -> Result<u64>,
    pub extract: &'a dyn Fn(&Path, ArchiveFormat, &Path) -> Result<()>,
    pub run: &'a dyn Fn(&ExternalCommand) -> Result<()>,
    /// Version probe applied to located candidates.
    pub probe: &'a dyn Fn(&Path) -> Result<SemVer>,
    /// Download confirmation; `false` declines the acquisition.
    pub confirm: &'a dyn Fn(&str) -> bool,
    /// Re-acquire even when probing already finds a satisfying install.
    pub force: bool,
}

impl<'a> EnsureContext<'a> {
    /// Copy of this context with a different force policy (the orchestrator
    /// forces individual requirements by name).
    pub fn with_force(&self, force: bool) -> EnsureContext<'a> {
        EnsureContext {
            platform: self.platform,
            vendor_dir: self.vendor_dir.clone(),
            env: self.env,
            fetch: self.fetch,
            extract: self.extract,
            run: self.run,
            probe: self.probe,
            confirm: self.confirm,
            force,
        }
    }
}

impl Requirement {
    /// Ensure this requirement is satisfied, acquiring the tool if needed.
    ///
    /// Never returns an error: every failure mode ends up inside the
    /// returned [`RequirementResult`], carrying the most specific error the
    /// acquisition path hit.
    pub fn ensure(&self, ctx: &EnsureContext<'_>) -> RequirementResult {
        if ctx.force {
            tracing::info!("{}: forcing re-acquisition", self.name);
        } else if let Some(found) = self.probe_existing(ctx) {
            tracing::info!("{}: found at {}", self.name, found.display());
            self.register_found(ctx, &found);
            return RequirementResult::satisfied(&self.name, found);
        }

        let Some(acquisition) = &self.acquisition else {
            return RequirementResult::failed(
                &self.name,
                &KindlingError::RequirementMissing {
                    requirement: self.name.clone(),
                    message: "not found and no acquisition strategy is defined".into(),
                },
            );
        };

        let artifact = match self.acquire(ctx, acquisition) {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::error!("{}: acquisition failed: {}", self.name, e);
                return RequirementResult::failed(&self.name, &e);
            }
        };

        // Acquisition ran; only a successful re-probe counts as satisfied
        match self.probe_existing(ctx) {
            Some(found) => {
                if let Some(artifact) = artifact {
                    // The transient archive has served its purpose
                    let _ = std::fs::remove_file(artifact);
                }
                if let Some(line) = &acquisition.profile_line {
                    if let Err(e) = ctx.env.append_profile_line(line) {
                        tracing::warn!("{}: could not update shell profile: {}", self.name, e);
                    }
                }
                self.register_found(ctx, &found);
                tracing::info!("{}: acquired at {}", self.name, found.display());
                RequirementResult::satisfied(&self.name, found)
            }
            None => RequirementResult::failed(
                &self.name,
                &KindlingError::RequirementMissing {
                    requirement: self.name.clone(),
                    message: "still not found after install".into(),
                },
            ),
        }
    }

    /// Read-only probe for an existing satisfying install.
    fn probe_existing(&self, ctx: &EnsureContext<'_>) -> Option<PathBuf> {
        if let Some(env_probe) = &self.env_probe {
            if let Some(path) = check_env_var(env_probe) {
                return Some(path);
            }
        }

        if let Some(tool) = &self.path_lookup {
            let exe = ctx.platform.os.exe_name(tool);
            if let Some(path) = resolve_on_path(&exe, &parse_system_path()) {
                if self.version_acceptable(ctx, &path) {
                    return Some(path);
                }
            }
        }

        if !self.search_patterns.is_empty() {
            let candidates = locate(&self.search_patterns, self.min_version, ctx.probe);
            if let Some(ToolCandidate { path, .. }) = candidates.into_iter().next() {
                return Some(path);
            }
        }

        if let Some(file_set) = &self.file_set_probe {
            if let Some(dir) = check_file_set(file_set) {
                return Some(dir);
            }
        }

        None
    }

    fn version_acceptable(&self, ctx: &EnsureContext<'_>, path: &Path) -> bool {
        let Some(min) = self.min_version else {
            return true;
        };
        match (ctx.probe)(path) {
            Ok(found) => found >= min,
            Err(e) => {
                tracing::debug!("Version probe failed for {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Run the acquisition path, returning the downloaded artifact (if any)
    /// so the caller can delete it after a successful re-probe.
    fn acquire(&self, ctx: &EnsureContext<'_>, acquisition: &Acquisition) -> Result<Option<PathBuf>> {
        let dest_dir = ctx.vendor_dir.join(&self.name);

        let artifact = match &acquisition.url {
            Some(template) => {
                let url = template.build(ctx.platform, &acquisition.version);
                if !(ctx.confirm)(&format!("Download {} from {}?", self.name, url)) {
                    return Err(KindlingError::RequirementMissing {
                        requirement: self.name.clone(),
                        message: format!("download declined; fetch it manually from {}", url),
                    });
                }

                let file_name = url.rsplit('/').next().unwrap_or("artifact");
                let dest = dest_dir.join(file_name);
                (ctx.fetch)(&url, &dest, acquisition.sha256.as_deref())?;
                Some(dest)
            }
            None => None,
        };

        match &acquisition.action {
            PostDownloadAction::None => {}
            PostDownloadAction::Extract => {
                let archive = artifact.as_deref().ok_or_else(|| {
                    KindlingError::RequirementMissing {
                        requirement: self.name.clone(),
                        message: "extract action without a downloaded archive".into(),
                    }
                })?;
                let format = ArchiveFormat::from_path(archive)?;
                (ctx.extract)(archive, format, &dest_dir)?;
            }
            PostDownloadAction::RunInstaller { args } => {
                let installer = artifact.as_deref().ok_or_else(|| {
                    KindlingError::RequirementMissing {
                        requirement: self.name.clone(),
                        message: "installer action without a downloaded installer".into(),
                    }
                })?;
                mark_executable(installer)?;
                (ctx.run)(&ExternalCommand::new(installer).args(args.clone()))?;
            }
            PostDownloadAction::RunBuildCommands { commands } => {
                for command in commands {
                    (ctx.run)(command)?;
                }
            }
        }

        Ok(artifact)
    }

    /// Make the tool reachable for subsequent requirements.
    fn register_found(&self, ctx: &EnsureContext<'_>, found: &Path) {
        if found.is_file() {
            if let Some(parent) = found.parent() {
                ctx.env.prepend_path(parent);
            }
        }
    }
}

fn check_env_var(probe: &EnvVarProbe) -> Option<PathBuf> {
    let value = std::env::var(&probe.var).ok()?;
    if let Some(substring) = &probe.version_substring {
        if !value.contains(substring.as_str()) {
            tracing::warn!(
                "{} is set but does not contain expected version '{}': {}",
                probe.var,
                substring,
                value
            );
            return None;
        }
    }
    Some(PathBuf::from(value))
}

fn check_file_set(probe: &FileSetProbe) -> Option<PathBuf> {
    let dirs = glob::glob(&probe.dir_pattern).ok()?;
    for dir in dirs.flatten() {
        if !dir.is_dir() {
            continue;
        }
        if probe.files.iter().all(|f| dir.join(f).is_file()) {
            return Some(dir);
        }
    }
    None
}

/// Downloaded installers lose their executable bit in transit.
#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|e| {
        KindlingError::FileSystem {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<()> {
    Ok(())
}
