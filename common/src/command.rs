//! Command execution utilities
//!
//! Provides consistent command execution with proper error handling and logging.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Result of a command execution.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Stdout and stderr joined, skipping whichever is empty.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
            (false, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (true, true) => String::new(),
        }
    }
}

/// Run a command and return its output.
///
/// This is a low-level function that returns both stdout and stderr.
/// Use `run_checked` if you want to treat non-zero exit as an error.
/// Arguments are not logged since they routinely carry passwords.
pub async fn run<S: AsRef<OsStr>>(cmd: &str, args: &[S]) -> Result<CommandOutput> {
    run_in(cmd, args, None).await
}

/// Run a command, optionally from a working directory.
#[instrument(skip_all, fields(cmd = %cmd))]
pub async fn run_in<S: AsRef<OsStr>>(
    cmd: &str,
    args: &[S],
    cwd: Option<&Path>,
) -> Result<CommandOutput> {
    debug!(argc = args.len(), cwd = ?cwd, "Running command");

    let mut command = Command::new(cmd);
    command.args(args).stdin(Stdio::null());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command
        .output()
        .await
        .context(format!("Failed to execute {}", cmd))?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        success: output.status.success(),
        code: output.status.code(),
    })
}

/// Pass a successful command output through, turn a failure into an error.
///
/// The error message carries stderr, or stdout when stderr is empty, since
/// the mongo shell reports script failures on stdout.
pub fn check(cmd: &str, output: CommandOutput) -> Result<CommandOutput> {
    if output.success {
        return Ok(output);
    }

    let code = output
        .code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string());
    let detail = if output.stderr.is_empty() {
        &output.stdout
    } else {
        &output.stderr
    };
    Err(anyhow!("{} failed (exit {}): {}", cmd, code, detail))
}

/// Run a command and return its output if successful, error otherwise.
///
/// # Example
/// ```ignore
/// let out = run_checked("mongodump", &["--version"]).await?;
/// ```
pub async fn run_checked<S: AsRef<OsStr>>(cmd: &str, args: &[S]) -> Result<CommandOutput> {
    check(cmd, run(cmd, args).await?)
}

/// Check whether a command can be executed.
///
/// Names containing a `/` are treated as paths; anything else is looked up
/// on `PATH`.
pub fn command_exists(cmd: &str) -> bool {
    if cmd.contains('/') {
        return is_executable(Path::new(cmd));
    }

    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| is_executable(&dir.join(cmd))))
        .unwrap_or(false)
}

/// Return the first command in `cmds` that cannot be found, if any.
pub fn find_missing<'a>(cmds: &[&'a str]) -> Option<&'a str> {
    cmds.iter().copied().find(|cmd| !command_exists(cmd))
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_run_captures_output() {
        let out = run("sh", &["-c", "echo out; echo err >&2"]).await.unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "out");
        assert_eq!(out.stderr, "err");
        assert_eq!(out.combined(), "out\nerr");
    }

    #[tokio::test]
    async fn test_run_checked_reports_stdout_when_stderr_empty() {
        let err = run_checked("sh", &["-c", "echo assert failed; exit 3"])
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("exit 3"), "{}", msg);
        assert!(msg.contains("assert failed"), "{}", msg);
    }

    #[tokio::test]
    async fn test_run_in_uses_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("marker"), "").unwrap();
        let out = run_in("ls", &["marker"], Some(dir.path())).await.unwrap();
        assert!(out.success);
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        assert!(run("/nonexistent/bongo-test-binary", &[] as &[&str]).await.is_err());
    }

    #[test]
    fn test_command_exists() {
        assert!(command_exists("sh"));
        assert!(!command_exists("bongo-definitely-not-installed"));
        assert!(!command_exists("/nonexistent/sh"));
    }

    #[test]
    fn test_find_missing_reports_first_missing() {
        assert_eq!(find_missing(&["sh"]), None);
        assert_eq!(
            find_missing(&["sh", "bongo-missing-a", "bongo-missing-b"]),
            Some("bongo-missing-a")
        );
    }
}
