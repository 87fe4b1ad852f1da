//! Library API integration tests.
//!
//! Exercises the public check-and-acquire surface end to end: a requirement
//! with nothing on disk, a local HTTP server standing in for the release
//! host, and the real downloader and extractor doing the work.

use httpmock::prelude::*;
use kindling::archive::ArchiveFormat;
use kindling::env::RecordingEnv;
use kindling::error::Result;
use kindling::net::{Downloader, FetchOptions};
use kindling::orchestrator::{self, RunOptions};
use kindling::platform::{OsFamily, PlatformInfo, UrlTemplate};
use kindling::process::ExternalCommand;
use kindling::requirement::status::Outcome;
use kindling::requirement::{Acquisition, EnsureContext, PostDownloadAction, Requirement};
use kindling::version::SemVer;
use std::path::Path;
use tempfile::TempDir;

/// Build a tar.gz archive containing one executable at `tool-2.0.0/bin/tool`.
fn tool_archive() -> Vec<u8> {
    let encoder =
        flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let payload = b"#!/bin/sh\necho tool version 2.0.0\n";
    let mut header = tar::Header::new_gnu();
    header.set_size(payload.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder
        .append_data(&mut header, "tool-2.0.0/bin/tool", &payload[..])
        .unwrap();

    builder.into_inner().unwrap().finish().unwrap()
}

fn tool_requirement(vendor: &Path, url: &str) -> Requirement {
    Requirement {
        name: "build-tool".into(),
        min_version: Some(SemVer::new(1, 0, 0)),
        path_lookup: None,
        search_patterns: vec![format!("{}/build-tool/**/bin/tool", vendor.display())],
        env_probe: None,
        file_set_probe: None,
        acquisition: Some(Acquisition {
            url: Some(UrlTemplate::new(url)),
            version: "2.0.0".into(),
            sha256: None,
            action: PostDownloadAction::Extract,
            profile_line: None,
        }),
    }
}

/// Stitch together a context backed by the real downloader and extractor.
struct Stack {
    platform: PlatformInfo,
    env: RecordingEnv,
    downloader: Downloader,
    vendor: std::path::PathBuf,
}

impl Stack {
    fn new(vendor: &Path) -> Self {
        Self {
            platform: PlatformInfo::with_values(OsFamily::Linux, "x86_64"),
            env: RecordingEnv::default(),
            downloader: Downloader::new(),
            vendor: vendor.to_path_buf(),
        }
    }

    fn ensure(&self, requirement: &Requirement) -> kindling::requirement::status::RequirementResult {
        let fetch = |url: &str, dest: &Path, sha: Option<&str>| -> Result<u64> {
            self.downloader.fetch(
                url,
                dest,
                &FetchOptions {
                    expected_sha256: sha,
                    ..Default::default()
                },
            )
        };
        let extract = |archive: &Path, format: ArchiveFormat, dest: &Path| -> Result<()> {
            kindling::archive::extract(archive, format, dest)
        };
        let run = |_: &ExternalCommand| -> Result<()> {
            panic!("no external command should run in this scenario")
        };
        let probe = |_: &Path| -> Result<SemVer> { Ok(SemVer::new(2, 0, 0)) };
        let confirm = |_: &str| true;

        let ctx = EnsureContext {
            platform: &self.platform,
            vendor_dir: self.vendor.clone(),
            env: &self.env,
            fetch: &fetch,
            extract: &extract,
            run: &run,
            probe: &probe,
            confirm: &confirm,
            force: false,
        };
        requirement.ensure(&ctx)
    }
}

#[cfg(unix)]
#[test]
fn missing_tool_is_downloaded_extracted_and_located() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/artifact.tar.gz");
        then.status(200).body(tool_archive());
    });

    let temp = TempDir::new().unwrap();
    let stack = Stack::new(temp.path());
    let requirement = tool_requirement(temp.path(), &server.url("/artifact.tar.gz"));

    let result = stack.ensure(&requirement);

    assert!(result.is_satisfied(), "error: {:?}", result.error);
    let resolved = result.resolved_path.unwrap();
    assert!(resolved.ends_with("bin/tool"));
    assert!(resolved.is_file());

    // The transient archive is gone; the extracted install remains
    assert!(!temp.path().join("build-tool/artifact.tar.gz").exists());

    // The tool's directory was put on the search path for later requirements
    let prepended = stack.env.prepended.borrow();
    assert_eq!(prepended.as_slice(), [resolved.parent().unwrap().to_path_buf()]);

    mock.assert_hits(1);
}

#[cfg(unix)]
#[test]
fn second_ensure_performs_no_network_traffic() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/artifact.tar.gz");
        then.status(200).body(tool_archive());
    });

    let temp = TempDir::new().unwrap();
    let stack = Stack::new(temp.path());
    let requirement = tool_requirement(temp.path(), &server.url("/artifact.tar.gz"));

    let first = stack.ensure(&requirement);
    let second = stack.ensure(&requirement);

    assert!(first.is_satisfied());
    assert!(second.is_satisfied());
    assert_eq!(first.resolved_path, second.resolved_path);

    // Idempotence: exactly one download across both calls
    mock.assert_hits(1);
}

#[cfg(unix)]
#[test]
fn server_failure_surfaces_in_result_not_as_panic() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/artifact.tar.gz");
        then.status(500);
    });

    let temp = TempDir::new().unwrap();
    let stack = Stack::new(temp.path());
    let requirement = tool_requirement(temp.path(), &server.url("/artifact.tar.gz"));

    let result = stack.ensure(&requirement);

    assert_eq!(result.outcome, Outcome::Failed);
    assert!(result.error.as_deref().unwrap().contains("500"));
    // Failed acquisition leaves no partial artifacts behind
    assert!(!temp.path().join("build-tool/artifact.tar.gz").exists());
}

#[test]
fn orchestrated_failure_skips_the_rest_under_fail_fast() {
    let temp = TempDir::new().unwrap();

    let unsatisfiable = Requirement {
        name: "graphics-sdk".into(),
        min_version: None,
        path_lookup: None,
        search_patterns: vec!["./nonexistent/**/sdk".into()],
        env_probe: None,
        file_set_probe: None,
        acquisition: None,
    };
    let never_reached = Requirement {
        name: "physics-sdk".into(),
        min_version: None,
        path_lookup: None,
        search_patterns: vec!["./nonexistent/**/lib".into()],
        env_probe: None,
        file_set_probe: None,
        acquisition: None,
    };

    let stack = Stack::new(temp.path());
    let fetch = |_: &str, _: &Path, _: Option<&str>| -> Result<u64> {
        panic!("nothing should download")
    };
    let extract = |_: &Path, _: ArchiveFormat, _: &Path| -> Result<()> { Ok(()) };
    let run = |_: &ExternalCommand| -> Result<()> { Ok(()) };
    let probe = |_: &Path| -> Result<SemVer> { Ok(SemVer::new(1, 0, 0)) };
    let confirm = |_: &str| true;

    let ctx = EnsureContext {
        platform: &stack.platform,
        vendor_dir: stack.vendor.clone(),
        env: &stack.env,
        fetch: &fetch,
        extract: &extract,
        run: &run,
        probe: &probe,
        confirm: &confirm,
        force: false,
    };

    let report = orchestrator::run(
        &[unsatisfiable, never_reached],
        &ctx,
        &RunOptions {
            fail_fast: true,
            ..Default::default()
        },
    );

    assert_eq!(report.results[0].outcome, Outcome::Failed);
    assert_eq!(report.results[1].outcome, Outcome::Skipped);
    assert_eq!(report.exit_code(), 1);

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"failed\""));
    assert!(json.contains("\"skipped\""));
}
