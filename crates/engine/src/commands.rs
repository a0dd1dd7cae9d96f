// crates/engine/src/commands.rs
use crate::tools::{self, CommandOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellProbe {
    pub description: String,
    pub command: String,
}

impl ShellProbe {
    fn new(command: &str, description: &str) -> Self {
        Self {
            description: description.to_string(),
            command: command.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommandsConfig {
    pub probes: Vec<ShellProbe>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            probes: vec![
                ShellProbe::new("echo 'Hello, World!'", "Basic command execution"),
                ShellProbe::new("python3 -c \"print('Python works')\"", "Python command execution"),
                ShellProbe::new("which python3", "Python executable location"),
                ShellProbe::new("which ffmpeg", "FFmpeg installation"),
                ShellProbe::new("ls -la", "Directory listing"),
                ShellProbe::new("pwd", "Current working directory"),
                ShellProbe::new("whoami", "Current user"),
                ShellProbe::new("groups", "User groups"),
                ShellProbe::new("ulimit -a", "System limits"),
            ],
        }
    }
}

/// Either the captured run or the reason the shell could not be started.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProbeResult {
    Finished(CommandOutcome),
    Error { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeRecord {
    #[serde(flatten)]
    pub probe: ShellProbe,
    pub result: ProbeResult,
}

/// Run each probe in order through the platform shell.
#[must_use]
pub fn run(config: &CommandsConfig) -> Vec<ProbeRecord> {
    config
        .probes
        .iter()
        .map(|probe| {
            let result = match tools::run_shell(&probe.command) {
                Ok(outcome) => ProbeResult::Finished(outcome),
                Err(e) => ProbeResult::Error {
                    message: e.to_string(),
                },
            };
            ProbeRecord {
                probe: probe.clone(),
                result,
            }
        })
        .collect()
}
