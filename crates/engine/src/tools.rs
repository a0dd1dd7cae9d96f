// crates/engine/src/tools.rs
//! External program discovery and execution.
//!
//! Every probe that shells out goes through [`run_capture`] so the captured
//! result has one shape regardless of which tool produced it.

use crate::error::{EngineError, Result};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured result of a finished child process.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    /// First non-empty line of stdout, falling back to stderr.
    ///
    /// Some tools (older Python releases) print `--version` to stderr.
    #[must_use]
    pub fn first_line(&self) -> Option<&str> {
        self.stdout
            .lines()
            .chain(self.stderr.lines())
            .map(str::trim)
            .find(|l| !l.is_empty())
    }
}

/// Locate an executable the way a shell would.
///
/// A name containing a path separator is checked as-is; otherwise each `PATH`
/// entry is searched in order.
#[must_use]
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| executable_names(name).map(move |n| dir.join(n)))
        .find(|p| is_executable(p))
}

#[cfg(windows)]
fn executable_names(name: &str) -> impl Iterator<Item = String> + '_ {
    ["", ".exe", ".cmd", ".bat"]
        .into_iter()
        .map(move |ext| format!("{name}{ext}"))
}

#[cfg(not(windows))]
fn executable_names(name: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(name.to_string())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Run a program to completion and capture both streams.
///
/// # Errors
/// Returns [`EngineError::Spawn`] when the process cannot be started. A
/// non-zero exit is not an error; it is reported through the outcome.
pub fn run_capture<I, S>(program: impl AsRef<OsStr>, args: I) -> Result<CommandOutcome>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| EngineError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;

    let outcome = CommandOutcome {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    tracing::debug!(
        program = %program.to_string_lossy(),
        code = ?outcome.code,
        "command finished"
    );
    Ok(outcome)
}

/// Run a command line through the platform shell.
///
/// # Errors
/// See [`run_capture`].
pub fn run_shell(command_line: &str) -> Result<CommandOutcome> {
    #[cfg(windows)]
    {
        run_capture("cmd", ["/C", command_line])
    }
    #[cfg(not(windows))]
    {
        run_capture("sh", ["-c", command_line])
    }
}

/// Resolve an executable or fail with [`EngineError::ExecutableNotFound`].
///
/// # Errors
/// Returns an error when `name` is not found.
pub fn require_executable(name: &str) -> Result<PathBuf> {
    find_executable(name).ok_or_else(|| EngineError::ExecutableNotFound(name.to_string()))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn finds_sh_on_path() {
        let sh = find_executable("sh").expect("sh should be on PATH");
        assert!(sh.is_absolute());
    }

    #[test]
    fn absolute_path_is_checked_directly() {
        let sh = find_executable("sh").unwrap();
        assert_eq!(find_executable(&sh.to_string_lossy()), Some(sh));
    }

    #[test]
    fn unknown_program_is_not_found() {
        assert!(find_executable("ytdiag-no-such-tool-7f3a").is_none());
        assert!(matches!(
            require_executable("ytdiag-no-such-tool-7f3a"),
            Err(EngineError::ExecutableNotFound(_))
        ));
    }

    #[test]
    fn shell_output_is_captured() {
        let out = run_shell("echo hello; echo oops >&2; exit 3").unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn first_line_falls_back_to_stderr() {
        let out = run_shell("echo 'Python 2.7.18' >&2").unwrap();
        assert_eq!(out.first_line(), Some("Python 2.7.18"));
    }

    #[test]
    fn spawn_failure_is_an_error() {
        let err = run_capture("/nonexistent/bin/tool", ["--version"]).unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }
}
