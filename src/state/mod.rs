//! Run status persistence.
//!
//! Each successful run records the resolved path of every satisfied
//! requirement in a small `key=value` text file (`setup.meta`) at the
//! workspace root. The file is overwritten, not appended, so it always
//! reflects the latest run only, and downstream build scripts read it to
//! find the chosen tools without re-probing.

use crate::error::{KindlingError, Result};
use std::path::{Path, PathBuf};

/// Default status file name, relative to the workspace root.
pub const STATUS_FILE_NAME: &str = "setup.meta";

/// The `key=value` status file.
pub struct StatusFile {
    path: PathBuf,
}

impl StatusFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional location inside a workspace.
    pub fn in_workspace(root: &Path) -> Self {
        Self::new(root.join(STATUS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the file with one `name=path` line per entry.
    pub fn write(&self, entries: &[(String, PathBuf)]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| KindlingError::FileSystem {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let mut contents = String::new();
        for (name, path) in entries {
            contents.push_str(name);
            contents.push('=');
            contents.push_str(&path.to_string_lossy());
            contents.push('\n');
        }

        std::fs::write(&self.path, contents).map_err(|e| KindlingError::FileSystem {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!("Wrote status file {}", self.path.display());
        Ok(())
    }

    /// Read entries back, skipping malformed lines.
    pub fn read(&self) -> Result<Vec<(String, String)>> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| KindlingError::FileSystem {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        Ok(contents
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once('=')?;
                Some((key.to_string(), value.to_string()))
            })
            .collect())
    }
}
