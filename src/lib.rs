//! Kindling - Game-engine workspace bootstrap.
//!
//! Kindling replaces the pile of ad-hoc setup scripts a game-engine
//! workspace accumulates with one idempotent command: check that every
//! external tool and SDK the build needs is present, acquire whatever is
//! missing, and hand off to the workspace's own project generation.
//!
//! # Modules
//!
//! - [`archive`] - Zip/TarGz/TarXz extraction
//! - [`cli`] - Command-line interface and dispatch
//! - [`env`] - Process-environment mutation (PATH, shell profile)
//! - [`error`] - Error types and result aliases
//! - [`locate`] - Glob-based executable search with version gating
//! - [`net`] - Streaming artifact downloads
//! - [`orchestrator`] - Ordered requirement execution and reporting
//! - [`platform`] - OS/arch resolution and URL templates
//! - [`process`] - External command invocation
//! - [`project`] - Project-file generation dispatch
//! - [`requirement`] - Check-and-acquire requirement units
//! - [`state`] - Run status persistence (`setup.meta`)
//! - [`ui`] - Progress bars, prompts, and report rendering
//! - [`version`] - Numeric version parsing and comparison
//!
//! # Example
//!
//! ```
//! use kindling::version::SemVer;
//!
//! // Versions compare numerically, component by component
//! let installed: SemVer = "3.10.0".parse().unwrap();
//! let required: SemVer = "3.9.0".parse().unwrap();
//! assert!(installed >= required);
//! ```

pub mod archive;
pub mod cli;
pub mod env;
pub mod error;
pub mod locate;
pub mod net;
pub mod orchestrator;
pub mod platform;
pub mod process;
pub mod project;
pub mod requirement;
pub mod state;
pub mod ui;
pub mod version;

pub use error::{KindlingError, Result};
