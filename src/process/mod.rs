//! External process invocation.
//!
//! Installers, SDK build commands, and project generation are all opaque
//! external commands: Kindling only needs the program, its arguments, a
//! working directory, and the exit code. Invocations are fire-and-wait with
//! no timeout by default; when a timeout is set, the child is terminated on
//! expiry and the call fails with `Timeout`.

use crate::error::{KindlingError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// An external command to run.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Render the command line for error messages.
    fn display_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Run a command to completion, inheriting the parent's stdio.
///
/// Returns `Ok(())` on exit code 0, `ExternalCommand` with the captured
/// code otherwise, and `Timeout` when the deadline passes (the child is
/// killed first).
pub fn run(cmd: &ExternalCommand) -> Result<()> {
    tracing::debug!("Running: {}", cmd.display_line());

    let mut command = Command::new(&cmd.program);
    command.args(&cmd.args);
    if let Some(cwd) = &cmd.cwd {
        command.current_dir(cwd);
    }

    let mut child = command.spawn().map_err(|_| KindlingError::ExternalCommand {
        command: cmd.display_line(),
        code: None,
    })?;

    let status = match cmd.timeout {
        None => child.wait().map_err(|_| KindlingError::ExternalCommand {
            command: cmd.display_line(),
            code: None,
        })?,
        Some(timeout) => {
            let start = Instant::now();
            loop {
                match child.try_wait() {
                    Ok(Some(status)) => break status,
                    Ok(None) => {
                        if start.elapsed() >= timeout {
                            let _ = child.kill();
                            let _ = child.wait();
                            return Err(KindlingError::Timeout {
                                command: cmd.display_line(),
                                seconds: timeout.as_secs(),
                            });
                        }
                        std::thread::sleep(POLL_INTERVAL);
                    }
                    Err(_) => {
                        return Err(KindlingError::ExternalCommand {
                            command: cmd.display_line(),
                            code: None,
                        });
                    }
                }
            }
        }
    };

    if status.success() {
        Ok(())
    } else {
        Err(KindlingError::ExternalCommand {
            command: cmd.display_line(),
            code: status.code(),
        })
    }
}

/// Run a program quietly and return its combined stdout/stderr.
///
/// Used by version probes; some tools print their version to stderr.
pub fn run_capture(program: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|_| KindlingError::ExternalCommand {
            command: program.display().to_string(),
            code: None,
        })?;

    if !output.status.success() {
        return Err(KindlingError::ExternalCommand {
            command: program.display().to_string(),
            code: output.status.code(),
        });
    }

    let mut text = String::from_utf8_lossy(&output.stdout).to_string();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn successful_command_returns_ok() {
        let cmd = ExternalCommand::new("true");
        assert!(run(&cmd).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_carries_exit_code() {
        let cmd = ExternalCommand::new("sh").args(["-c", "exit 3"]);
        let err = run(&cmd).unwrap_err();
        assert!(matches!(
            err,
            KindlingError::ExternalCommand { code: Some(3), .. }
        ));
    }

    #[test]
    fn missing_program_is_external_command_error() {
        let cmd = ExternalCommand::new("this-program-does-not-exist-12345");
        let err = run(&cmd).unwrap_err();
        assert!(matches!(
            err,
            KindlingError::ExternalCommand { code: None, .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_child_and_reports() {
        let cmd = ExternalCommand::new("sleep")
            .arg("30")
            .timeout(Duration::from_millis(200));

        let start = Instant::now();
        let err = run(&cmd).unwrap_err();

        assert!(matches!(err, KindlingError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn command_within_timeout_succeeds() {
        let cmd = ExternalCommand::new("true").timeout(Duration::from_secs(10));
        assert!(run(&cmd).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn run_respects_working_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let marker = "made-here";
        let cmd = ExternalCommand::new("touch")
            .arg(marker)
            .current_dir(temp.path());

        run(&cmd).unwrap();
        assert!(temp.path().join(marker).is_file());
    }

    #[cfg(unix)]
    #[test]
    fn run_capture_collects_stdout() {
        let output = run_capture(Path::new("echo"), &["hello"]).unwrap();
        assert!(output.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn run_capture_fails_on_nonzero_exit() {
        let err = run_capture(Path::new("false"), &[]).unwrap_err();
        assert!(matches!(err, KindlingError::ExternalCommand { .. }));
    }

    #[test]
    fn display_line_joins_program_and_args() {
        let cmd = ExternalCommand::new("cmake").args(["--build", "."]);
        assert_eq!(cmd.display_line(), "cmake --build .");
    }
}
