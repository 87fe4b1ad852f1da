//! Artifact downloading.
//!
//! Downloads stream to a `.part` sibling of the destination and are renamed
//! into place only after the transfer (and optional integrity check)
//! completes. Every other exit path (network failure, short read,
//! cancellation, checksum mismatch) removes the partial file, so a failed
//! run never leaves a corrupt artifact for the next one to trust.

use crate::error::{KindlingError, Result};
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const CHUNK_SIZE: usize = 64 * 1024;

/// Progress callback: (bytes downloaded so far, declared total if known).
pub type ProgressFn<'a> = &'a dyn Fn(u64, Option<u64>);

/// Per-fetch options.
#[derive(Default)]
pub struct FetchOptions<'a> {
    /// Invoked after each chunk with monotonically increasing counts.
    pub progress: Option<ProgressFn<'a>>,
    /// Checked between chunk reads; setting it aborts the transfer.
    pub cancel: Option<&'a AtomicBool>,
    /// Hex-encoded SHA-256 the completed file must hash to.
    pub expected_sha256: Option<&'a str>,
}

/// Downloads artifacts over HTTP/HTTPS.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    /// Create a downloader with a 30-second connect timeout.
    ///
    /// No overall request timeout is set: SDK artifacts run to hundreds of
    /// megabytes and transfer time is unbounded by design.
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("kindling/", env!("CARGO_PKG_VERSION")))
                .connect_timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Fetch `url` to `dest`, returning the number of bytes written.
    ///
    /// Parent directories are created as needed. The declared content length
    /// is advisory: when present, a short transfer is `IncompleteTransfer`;
    /// when absent, success is the connection completing without error.
    pub fn fetch(&self, url: &str, dest: &Path, opts: &FetchOptions<'_>) -> Result<u64> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(KindlingError::Network {
                url: url.into(),
                message: "not an http(s) URL".into(),
            });
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| KindlingError::FileSystem {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| KindlingError::Network {
                url: url.into(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(KindlingError::Network {
                url: url.into(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let total = response.content_length();
        if total.is_none() {
            tracing::debug!("Server omitted Content-Length for {}", url);
        }

        let part_path = part_path(dest);
        let guard = PartGuard::new(&part_path);
        let written = self.stream_body(url, response, &part_path, total, opts)?;

        if let Some(expected) = total {
            if written != expected {
                return Err(KindlingError::IncompleteTransfer {
                    expected,
                    received: written,
                });
            }
        }

        if let Some(expected) = opts.expected_sha256 {
            verify_sha256(url, &part_path, expected)?;
        }

        std::fs::rename(&part_path, dest).map_err(|e| KindlingError::FileSystem {
            path: dest.to_path_buf(),
            message: e.to_string(),
        })?;
        guard.disarm();

        tracing::info!("Downloaded {} ({} bytes)", dest.display(), written);
        Ok(written)
    }

    fn stream_body(
        &self,
        url: &str,
        mut response: reqwest::blocking::Response,
        part_path: &Path,
        total: Option<u64>,
        opts: &FetchOptions<'_>,
    ) -> Result<u64> {
        let mut out = File::create(part_path).map_err(|e| KindlingError::FileSystem {
            path: part_path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut buf = [0u8; CHUNK_SIZE];
        let mut written: u64 = 0;

        loop {
            if let Some(cancel) = opts.cancel {
                if cancel.load(Ordering::Relaxed) {
                    return Err(KindlingError::Canceled { url: url.into() });
                }
            }

            let n = match response.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                // A read error mid-body on a sized transfer is a short
                // transfer, not a generic network fault
                Err(e) => {
                    return Err(match total {
                        Some(expected) if written < expected => {
                            KindlingError::IncompleteTransfer {
                                expected,
                                received: written,
                            }
                        }
                        _ => KindlingError::Network {
                            url: url.into(),
                            message: e.to_string(),
                        },
                    });
                }
            };

            out.write_all(&buf[..n]).map_err(|e| KindlingError::FileSystem {
                path: part_path.to_path_buf(),
                message: e.to_string(),
            })?;
            written += n as u64;

            if let Some(progress) = opts.progress {
                progress(written, total);
            }
        }

        out.flush().map_err(|e| KindlingError::FileSystem {
            path: part_path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(written)
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

fn verify_sha256(url: &str, path: &Path, expected: &str) -> Result<()> {
    let mut file = File::open(path).map_err(|e| KindlingError::FileSystem {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| KindlingError::FileSystem {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let actual = hex::encode(hasher.finalize());

    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(KindlingError::ChecksumMismatch {
            url: url.into(),
            expected: expected.to_ascii_lowercase(),
            actual,
        })
    }
}

/// Removes the partial file on drop unless disarmed.
struct PartGuard<'a> {
    path: &'a Path,
    armed: std::cell::Cell<bool>,
}

impl<'a> PartGuard<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            armed: std::cell::Cell::new(true),
        }
    }

    fn disarm(&self) {
        self.armed.set(false);
    }
}

impl Drop for PartGuard<'_> {
    fn drop(&mut self) {
        if self.armed.get() {
            let _ = std::fs::remove_file(self.path);
        }
    }
}
