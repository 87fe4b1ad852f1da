//! Project-file generation dispatch.
//!
//! Once every requirement is satisfied, the workspace's own build-file
//! generation step runs as an opaque external command. Kindling knows
//! nothing about what it does beyond the command, its working directory,
//! and the exit code.

use crate::error::Result;
use crate::platform::{OsFamily, PlatformInfo};
use crate::process::ExternalCommand;
use std::path::Path;

/// The platform-appropriate generation command for a workspace.
#[derive(Debug, Clone)]
pub struct ProjectGenerator {
    pub command: ExternalCommand,
}

impl ProjectGenerator {
    /// Select the generation script the workspace ships for this platform.
    pub fn for_platform(platform: &PlatformInfo, root: &Path) -> Self {
        let command = match platform.os {
            OsFamily::Windows => {
                ExternalCommand::new(root.join("scripts/gen-projects.bat")).current_dir(root)
            }
            OsFamily::MacOs | OsFamily::Linux => ExternalCommand::new("sh")
                .arg(root.join("scripts/gen-projects.sh").display().to_string())
                .current_dir(root),
        };
        Self { command }
    }

    /// Run the generation command through the process boundary.
    pub fn generate(&self) -> Result<()> {
        self.generate_with(&crate::process::run)
    }

    /// Run through an injected runner (tests stub the process boundary).
    pub fn generate_with(&self, run: &dyn Fn(&ExternalCommand) -> Result<()>) -> Result<()> {
        tracing::info!("Generating project files");
        run(&self.command)
    }
}
