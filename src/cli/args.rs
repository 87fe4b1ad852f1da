//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct. Running with no subcommand
//! performs the full setup: ensure every requirement, then generate
//! project files.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Kindling - Game-engine workspace bootstrap.
#[derive(Debug, Parser)]
#[command(name = "kindling")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the workspace root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Download/extract cache directory (overrides <project>/vendor)
    #[arg(long, global = true)]
    pub vendor_dir: Option<PathBuf>,

    /// Skip specific requirements (comma-separated; `project-gen` skips
    /// the generation step)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Force re-acquisition of specific requirements, ignoring cached
    /// detection (comma-separated, or `all`)
    #[arg(short, long, value_delimiter = ',')]
    pub force: Vec<String>,

    /// Answer yes to download confirmations
    #[arg(short, long)]
    pub yes: bool,

    /// Stop at the first failed requirement instead of attempting the rest
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Show verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Pseudo-requirement name that controls the generation step.
pub const PROJECT_GEN: &str = "project-gen";
