use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Jsonl,
    Yaml,
}

/// Fixed file/content pair used by `write-check`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "lowercase")]
pub enum WritePreset {
    /// test_write.txt, removed afterwards
    #[default]
    Write,
    /// test_env.txt, removed afterwards
    Env,
    /// test_output.txt, kept; also prints to stdout and stderr
    Output,
}
