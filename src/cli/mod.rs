//! Command-line interface and dispatch.
//!
//! # Modules
//!
//! - [`args`] - Argument definitions (clap derive)
//!
//! [`dispatch`] wires the production collaborators (real downloader,
//! extractor, process runner, environment mutator) into the orchestrator
//! and turns the final report into an exit code.

pub mod args;

pub use args::{Cli, Commands, CompletionsArgs};

use crate::env::ProcessEnv;
use crate::error::Result;
use crate::net::{Downloader, FetchOptions};
use crate::orchestrator::RunOptions;
use crate::platform::PlatformInfo;
use crate::project::ProjectGenerator;
use crate::requirement::{registry, EnsureContext};
use crate::state::StatusFile;
use crate::ui;
use clap::CommandFactory;
use std::cell::RefCell;
use std::path::Path;

/// Execute the parsed CLI, returning the process exit code.
///
/// An unsupported platform is the only hard error: everything downstream is
/// reported through the orchestration report.
pub fn dispatch(cli: &Cli) -> Result<u8> {
    if let Some(Commands::Completions(completions)) = &cli.command {
        clap_complete::generate(
            completions.shell,
            &mut Cli::command(),
            "kindling",
            &mut std::io::stdout(),
        );
        return Ok(0);
    }

    // No requirement can proceed without a platform; fail before touching
    // anything
    let platform = PlatformInfo::resolve()?;

    let root = cli
        .project
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let vendor_dir = cli
        .vendor_dir
        .clone()
        .unwrap_or_else(|| root.join("vendor"));

    tracing::info!(
        "Setting up workspace {} ({} {})",
        root.display(),
        platform.os,
        platform.arch
    );

    let requirements = registry::builtin(platform, &root, &vendor_dir);

    for name in cli.skip.iter().chain(cli.force.iter()) {
        let known = registry::known_names().contains(&name.as_str());
        if !known && name != args::PROJECT_GEN && name != "all" {
            tracing::warn!("Unknown requirement '{}' in --skip/--force", name);
        }
    }

    let show_progress = !cli.quiet && !crate::env::is_ci();
    let downloader = Downloader::new();
    let fetch = |url: &str, dest: &Path, sha256: Option<&str>| -> Result<u64> {
        let bar: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
        let progress = |done: u64, total: Option<u64>| {
            let mut slot = bar.borrow_mut();
            slot.get_or_insert_with(|| ui::download_bar(total))
                .set_position(done);
        };

        let options = FetchOptions {
            progress: if show_progress { Some(&progress) } else { None },
            cancel: None,
            expected_sha256: sha256,
        };
        let written = downloader.fetch(url, dest, &options);
        if let Some(bar) = bar.borrow_mut().take() {
            bar.finish_and_clear();
        }
        written
    };
    let extract = |archive: &Path, format: crate::archive::ArchiveFormat, dest: &Path| {
        crate::archive::extract(archive, format, dest)
    };
    let run_command = |cmd: &crate::process::ExternalCommand| crate::process::run(cmd);
    let probe = |path: &Path| crate::locate::probe_version_flag(path);
    let confirm = |prompt: &str| ui::confirm_download(prompt, cli.yes);
    let env = ProcessEnv;

    let ctx = EnsureContext {
        platform,
        vendor_dir,
        env: &env,
        fetch: &fetch,
        extract: &extract,
        run: &run_command,
        probe: &probe,
        confirm: &confirm,
        force: false,
    };

    let options = RunOptions {
        fail_fast: cli.fail_fast,
        skip: cli.skip.clone(),
        force: cli.force.clone(),
    };

    let report = crate::orchestrator::run(&requirements, &ctx, &options);

    let mut exit_code = report.exit_code();

    if !report.has_failures() {
        let status = StatusFile::in_workspace(&root);
        if let Err(e) = status.write(&report.satisfied_entries()) {
            tracing::warn!("Could not write {}: {}", status.path().display(), e);
        }

        let skip_generation = cli.skip.iter().any(|s| s == args::PROJECT_GEN);
        if !skip_generation {
            if let Err(e) = ProjectGenerator::for_platform(platform, &root).generate() {
                eprintln!("Project generation failed: {}", e);
                exit_code = 1;
            }
        }
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".into())
        );
    } else if !cli.quiet {
        ui::print_report(&report);
    }

    Ok(exit_code)
}
