// crates/engine/src/upload.rs
use crate::error::{EngineError, Result};
use crate::tools;
use serde::{Deserialize, Serialize};
use std::process::{Command, ExitStatus};

/// The external uploader whose command group `ytdiag upload` forwards to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub program: String,
    /// Arguments placed before the forwarded ones, e.g. `["-m", "youtube_uploader"]`
    /// when the program is an interpreter.
    pub args: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            program: "youtube-uploader".to_string(),
            args: Vec::new(),
        }
    }
}

impl UploadConfig {
    /// The full argument vector passed to the uploader.
    #[must_use]
    pub fn command_line(&self, forwarded: &[String]) -> Vec<String> {
        self.args.iter().chain(forwarded).cloned().collect()
    }
}

/// Run the uploader with inherited stdio and wait for it.
///
/// # Errors
/// Returns an error when the program is not on `PATH` or cannot be started.
pub fn delegate(config: &UploadConfig, forwarded: &[String]) -> Result<ExitStatus> {
    let program = tools::require_executable(&config.program)?;
    let args = config.command_line(forwarded);
    tracing::info!(program = %program.display(), ?args, "delegating to uploader");

    Command::new(&program)
        .args(&args)
        .status()
        .map_err(|source| EngineError::Spawn {
            program: config.program.clone(),
            source,
        })
}
