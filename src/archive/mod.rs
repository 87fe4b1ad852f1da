//! Archive extraction.
//!
//! Formats are explicit: callers may infer one from a file name with
//! [`ArchiveFormat::from_path`], but nothing here sniffs content. The source
//! archive is never deleted: callers decide when a retry is no longer
//! possible and the archive can go.

use crate::error::{KindlingError, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::Path;
use xz2::read::XzDecoder;
use zip::ZipArchive;

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    TarXz,
}

impl ArchiveFormat {
    /// Infer the format from a recognized file-name suffix.
    ///
    /// Anything else, including formats that exist but aren't supported,
    /// is `UnsupportedFormat`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if name.ends_with(".zip") {
            Ok(ArchiveFormat::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Ok(ArchiveFormat::TarGz)
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Ok(ArchiveFormat::TarXz)
        } else {
            Err(KindlingError::UnsupportedFormat { name })
        }
    }
}

/// Extract `archive` into `dest_dir`, creating it if needed.
///
/// Fails with `CorruptArchive` when the payload cannot be parsed and
/// `FileSystem` on extraction I/O failure.
pub fn extract(archive: &Path, format: ArchiveFormat, dest_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dest_dir).map_err(|e| KindlingError::FileSystem {
        path: dest_dir.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!("Extracting {} into {}", archive.display(), dest_dir.display());

    match format {
        ArchiveFormat::Zip => extract_zip(archive, dest_dir),
        ArchiveFormat::TarGz => {
            let file = open_archive(archive)?;
            extract_tar(archive, GzDecoder::new(file), dest_dir)
        }
        ArchiveFormat::TarXz => {
            let file = open_archive(archive)?;
            extract_tar(archive, XzDecoder::new(file), dest_dir)
        }
    }
}

fn open_archive(archive: &Path) -> Result<File> {
    File::open(archive).map_err(|e| KindlingError::FileSystem {
        path: archive.to_path_buf(),
        message: e.to_string(),
    })
}

fn extract_tar<R: std::io::Read>(archive: &Path, decoder: R, dest_dir: &Path) -> Result<()> {
    let mut tar = tar::Archive::new(decoder);
    tar.unpack(dest_dir)
        .map_err(|e| KindlingError::CorruptArchive {
            path: archive.to_path_buf(),
            message: e.to_string(),
        })
}

fn extract_zip(archive: &Path, dest_dir: &Path) -> Result<()> {
    let file = open_archive(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|e| KindlingError::CorruptArchive {
        path: archive.to_path_buf(),
        message: e.to_string(),
    })?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| KindlingError::CorruptArchive {
            path: archive.to_path_buf(),
            message: e.to_string(),
        })?;

        // Entries with paths escaping the destination are skipped
        let out_path = match entry.enclosed_name() {
            Some(p) => dest_dir.join(p),
            None => continue,
        };

        if entry.name().ends_with('/') {
            fs_op(&out_path, std::fs::create_dir_all(&out_path))?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs_op(parent, std::fs::create_dir_all(parent))?;
            }
            let mut out = File::create(&out_path).map_err(|e| KindlingError::FileSystem {
                path: out_path.clone(),
                message: e.to_string(),
            })?;
            std::io::copy(&mut entry, &mut out).map_err(|e| KindlingError::FileSystem {
                path: out_path.clone(),
                message: e.to_string(),
            })?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs_op(
                    &out_path,
                    std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode)),
                )?;
            }
        }
    }

    Ok(())
}

fn fs_op(path: &Path, result: std::io::Result<()>) -> Result<()> {
    result.map_err(|e| KindlingError::FileSystem {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
