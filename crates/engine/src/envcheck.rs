// crates/engine/src/envcheck.rs
//! Composite environment check: host, interpreter, ffmpeg, interpreter
//! packages, and write access to the working directory.

use crate::options::CheckStatus;
use crate::system::SystemInfo;
use crate::tools::{self, CommandOutcome};
use crate::write_check::{self, WriteCheck};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PACKAGES: &[&str] = &[
    "yaml",
    "markdown",
    "frontmatter",
    "edge_tts",
    "moviepy",
    "PIL",
    "imageio_ffmpeg",
    "googleapiclient",
    "flask",
    "pytest",
];

const PERMISSION_PROBE_FILE: &str = "test_permission.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvCheckConfig {
    pub python: String,
    pub ffmpeg: String,
    pub packages: Vec<String>,
    /// Directory the write probe runs in; the current directory when unset.
    pub work_dir: Option<PathBuf>,
}

impl Default for EnvCheckConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            packages: DEFAULT_PACKAGES.iter().map(|s| (*s).to_string()).collect(),
            work_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckGroup {
    Interpreter,
    Ffmpeg,
    Packages,
    Permissions,
}

impl CheckGroup {
    pub const ALL: [Self; 4] = [Self::Interpreter, Self::Ffmpeg, Self::Packages, Self::Permissions];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Interpreter => "Python Interpreter",
            Self::Ffmpeg => "FFmpeg",
            Self::Packages => "Python Packages",
            Self::Permissions => "File Permissions",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub group: CheckGroup,
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

impl CheckOutcome {
    fn new(group: CheckGroup, name: impl Into<String>, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            group,
            name: name.into(),
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvReport {
    pub generated_at: DateTime<Local>,
    pub system: SystemInfo,
    pub checks: Vec<CheckOutcome>,
}

impl EnvReport {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    pub fn group(&self, group: CheckGroup) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(move |c| c.group == group)
    }

    /// Aggregate status of a group: failed if any check failed, skipped if
    /// every check was skipped (or none ran), passed otherwise.
    #[must_use]
    pub fn group_status(&self, group: CheckGroup) -> CheckStatus {
        let mut any_pass = false;
        for check in self.group(group) {
            match check.status {
                CheckStatus::Fail => return CheckStatus::Fail,
                CheckStatus::Pass => any_pass = true,
                CheckStatus::Skip => {}
            }
        }
        if any_pass { CheckStatus::Pass } else { CheckStatus::Skip }
    }
}

/// Run every probe and collect the outcomes. Never fails as a whole: each
/// probe turns its own error into a failed outcome.
#[must_use]
pub fn run(config: &EnvCheckConfig) -> EnvReport {
    let mut checks = Vec::new();

    let python = check_tool(CheckGroup::Interpreter, &config.python, "--version", &mut checks);
    check_tool(CheckGroup::Ffmpeg, &config.ffmpeg, "-version", &mut checks);

    match python {
        Some(python) => {
            for pkg in &config.packages {
                checks.push(check_package(&python, pkg));
            }
        }
        None => checks.extend(config.packages.iter().map(|pkg| {
            CheckOutcome::new(CheckGroup::Packages, pkg, CheckStatus::Skip, "no interpreter")
        })),
    }

    let work_dir = config
        .work_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    checks.push(check_write_access(&work_dir));

    let report = EnvReport {
        generated_at: Local::now(),
        system: SystemInfo::collect(),
        checks,
    };
    tracing::info!(failed = report.has_failures(), "environment check finished");
    report
}

/// Locate `program` and record the first line of its version output.
/// Returns the resolved path when the tool was found.
fn check_tool(
    group: CheckGroup,
    program: &str,
    version_flag: &str,
    checks: &mut Vec<CheckOutcome>,
) -> Option<PathBuf> {
    let Some(path) = tools::find_executable(program) else {
        checks.push(CheckOutcome::new(group, program, CheckStatus::Fail, "not found in PATH"));
        return None;
    };

    checks.push(CheckOutcome::new(
        group,
        program,
        CheckStatus::Pass,
        format!("found at: {}", path.display()),
    ));

    let version = match tools::run_capture(&path, [version_flag]) {
        Ok(out) if out.success => CheckOutcome::new(
            group,
            format!("{program} version"),
            CheckStatus::Pass,
            out.first_line().unwrap_or_default(),
        ),
        Ok(out) => CheckOutcome::new(
            group,
            format!("{program} version"),
            CheckStatus::Fail,
            failure_detail(&out),
        ),
        Err(e) => CheckOutcome::new(group, format!("{program} version"), CheckStatus::Fail, e.to_string()),
    };
    checks.push(version);
    Some(path)
}

fn check_package(python: &Path, package: &str) -> CheckOutcome {
    let statement = format!("import {package}");
    match tools::run_capture(python, ["-c", statement.as_str()]) {
        Ok(out) if out.success => {
            CheckOutcome::new(CheckGroup::Packages, package, CheckStatus::Pass, "Installed")
        }
        Ok(_) => CheckOutcome::new(CheckGroup::Packages, package, CheckStatus::Fail, "Not installed"),
        Err(e) => CheckOutcome::new(CheckGroup::Packages, package, CheckStatus::Fail, e.to_string()),
    }
}

fn check_write_access(dir: &Path) -> CheckOutcome {
    let probe = WriteCheck {
        path: dir.join(PERMISSION_PROBE_FILE),
        content: "test".to_string(),
        keep: false,
    };
    match write_check::run(&probe) {
        Ok(report) if report.matched => CheckOutcome::new(
            CheckGroup::Permissions,
            "write access",
            CheckStatus::Pass,
            format!("Can write to {}", dir.display()),
        ),
        Ok(_) => CheckOutcome::new(
            CheckGroup::Permissions,
            "write access",
            CheckStatus::Fail,
            "content read back differs from content written",
        ),
        Err(e) => CheckOutcome::new(
            CheckGroup::Permissions,
            "write access",
            CheckStatus::Fail,
            format!("Cannot write to {}: {e}", dir.display()),
        ),
    }
}

fn failure_detail(out: &CommandOutcome) -> String {
    let stderr = out.stderr.trim();
    match out.code {
        Some(code) if stderr.is_empty() => format!("exit code {code}"),
        Some(code) => format!("exit code {code}: {stderr}"),
        None => format!("terminated by signal: {stderr}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn missing_tools(dir: &Path) -> EnvCheckConfig {
        EnvCheckConfig {
            python: "ytdiag-missing-python".to_string(),
            ffmpeg: "ytdiag-missing-ffmpeg".to_string(),
            packages: vec!["yaml".to_string(), "flask".to_string()],
            work_dir: Some(dir.to_path_buf()),
        }
    }

    #[test]
    fn missing_interpreter_skips_packages() {
        let tmp = TempDir::new().unwrap();
        let report = run(&missing_tools(tmp.path()));

        assert!(report.has_failures());
        assert_eq!(report.group_status(CheckGroup::Interpreter), CheckStatus::Fail);
        assert_eq!(report.group_status(CheckGroup::Ffmpeg), CheckStatus::Fail);
        assert_eq!(report.group_status(CheckGroup::Packages), CheckStatus::Skip);
        assert_eq!(report.group(CheckGroup::Packages).count(), 2);
    }

    #[test]
    fn write_probe_passes_and_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let report = run(&missing_tools(tmp.path()));

        assert_eq!(report.group_status(CheckGroup::Permissions), CheckStatus::Pass);
        assert!(!tmp.path().join(PERMISSION_PROBE_FILE).exists());
    }

    #[test]
    fn write_probe_fails_for_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let outcome = check_write_access(&tmp.path().join("gone"));
        assert_eq!(outcome.status, CheckStatus::Fail);
        assert!(outcome.detail.starts_with("Cannot write to"));
    }

    #[cfg(unix)]
    #[test]
    fn tool_on_path_records_version_line() {
        let mut checks = Vec::new();
        // Only the lookup is asserted; `sh` has no portable version flag.
        let found = check_tool(CheckGroup::Ffmpeg, "sh", "-c", &mut checks);
        assert!(found.is_some());
        assert_eq!(checks[0].status, CheckStatus::Pass);
        assert!(checks[0].detail.starts_with("found at: "));
    }
}
