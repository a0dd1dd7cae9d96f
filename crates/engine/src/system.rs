// crates/engine/src/system.rs
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ENV_VARS: &[&str] = &["PATH", "HOME", "USER", "SHELL", "LANG", "PWD", "VIRTUAL_ENV"];
pub const DEFAULT_PROBE_PATHS: &[&str] = &["/usr/bin", "/usr/local/bin", "/tmp", ".", "test_output"];

/// Snapshot of the host the diagnostics run on.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub os: &'static str,
    pub family: &'static str,
    pub arch: &'static str,
    pub release: Option<String>,
    pub hostname: Option<String>,
    pub cpus: usize,
    pub current_dir: Option<PathBuf>,
    pub user: Option<String>,
    pub executable: Option<PathBuf>,
}

impl SystemInfo {
    #[must_use]
    pub fn collect() -> Self {
        Self {
            os: std::env::consts::OS,
            family: std::env::consts::FAMILY,
            arch: std::env::consts::ARCH,
            release: read_proc("/proc/sys/kernel/osrelease"),
            hostname: read_proc("/proc/sys/kernel/hostname")
                .or_else(|| std::env::var("HOSTNAME").ok())
                .or_else(|| std::env::var("COMPUTERNAME").ok()),
            cpus: num_cpus::get(),
            current_dir: std::env::current_dir().ok(),
            user: std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .ok(),
            executable: std::env::current_exe().ok(),
        }
    }
}

fn read_proc(path: &str) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvVar {
    pub name: String,
    pub value: Option<String>,
}

#[must_use]
pub fn env_vars<S: AsRef<str>>(names: &[S]) -> Vec<EnvVar> {
    names
        .iter()
        .map(|n| EnvVar {
            name: n.as_ref().to_string(),
            value: std::env::var(n.as_ref()).ok(),
        })
        .collect()
}

/// Owner permission bits of a path, as `stat` reports them.
#[derive(Debug, Clone, Serialize)]
pub struct PathAccess {
    pub path: PathBuf,
    pub exists: bool,
    pub is_dir: bool,
    pub is_file: bool,
    pub readable: bool,
    pub writable: bool,
    pub executable: bool,
    /// Octal mode string such as `0o755` (Unix only).
    pub mode: Option<String>,
    pub error: Option<String>,
}

impl PathAccess {
    #[must_use]
    pub fn inspect(path: &Path) -> Self {
        let mut access = Self {
            path: path.to_path_buf(),
            exists: false,
            is_dir: false,
            is_file: false,
            readable: false,
            writable: false,
            executable: false,
            mode: None,
            error: None,
        };

        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return access,
            Err(e) => {
                access.error = Some(e.to_string());
                return access;
            }
        };

        access.exists = true;
        access.is_dir = meta.is_dir();
        access.is_file = meta.is_file();
        fill_permissions(&mut access, &meta);
        access
    }
}

#[cfg(unix)]
fn fill_permissions(access: &mut PathAccess, meta: &std::fs::Metadata) {
    use std::os::unix::fs::PermissionsExt;
    let mode = meta.permissions().mode();
    access.readable = mode & 0o400 != 0;
    access.writable = mode & 0o200 != 0;
    access.executable = mode & 0o100 != 0;
    access.mode = Some(format!("{:#o}", mode & 0o7777));
}

#[cfg(not(unix))]
fn fill_permissions(access: &mut PathAccess, meta: &std::fs::Metadata) {
    access.readable = true;
    access.writable = !meta.permissions().readonly();
    access.executable = access.is_dir;
}

/// Path probes for the `info` report, driven by configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InfoConfig {
    pub env_vars: Vec<String>,
    pub paths: Vec<PathBuf>,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            env_vars: DEFAULT_ENV_VARS.iter().map(|s| (*s).to_string()).collect(),
            paths: DEFAULT_PROBE_PATHS.iter().map(PathBuf::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    pub system: SystemInfo,
    pub env: Vec<EnvVar>,
    pub paths: Vec<PathAccess>,
}

#[must_use]
pub fn info_report(config: &InfoConfig) -> InfoReport {
    InfoReport {
        system: SystemInfo::collect(),
        env: env_vars(&config.env_vars),
        paths: config.paths.iter().map(|p| PathAccess::inspect(p)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_path_reports_not_existing() {
        let tmp = TempDir::new().unwrap();
        let access = PathAccess::inspect(&tmp.path().join("absent"));
        assert!(!access.exists);
        assert!(access.error.is_none());
        assert!(access.mode.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn reports_owner_bits() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("script.sh");
        std::fs::write(&file, "echo\n").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o640)).unwrap();

        let access = PathAccess::inspect(&file);
        assert!(access.exists && access.is_file && !access.is_dir);
        assert!(access.readable && access.writable && !access.executable);
        assert_eq!(access.mode.as_deref(), Some("0o640"));
    }

    #[test]
    fn unset_env_var_has_no_value() {
        let vars = env_vars(&["YTDIAG_SURELY_UNSET_VARIABLE"]);
        assert_eq!(vars.len(), 1);
        assert!(vars[0].value.is_none());
    }

    #[test]
    fn system_info_reports_compile_target() {
        let info = SystemInfo::collect();
        assert_eq!(info.os, std::env::consts::OS);
        assert!(info.cpus >= 1);
    }
}
