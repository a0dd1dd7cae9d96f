use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Jsonl,
    Yaml,
}

/// Fixed file/content pairs used by the write smoke check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePreset {
    /// `test_write.txt`, removed after verification.
    #[default]
    Write,
    /// `test_env.txt`, removed after verification.
    Env,
    /// `test_output.txt`, left in place.
    Output,
}

impl WritePreset {
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Write => "test_write.txt",
            Self::Env => "test_env.txt",
            Self::Output => "test_output.txt",
        }
    }

    #[must_use]
    pub const fn content(self) -> &'static str {
        match self {
            Self::Write => "This is a test message.\n",
            Self::Env => "Environment test successful!\n",
            Self::Output => "This is a test file.\nIf you can see this, file writing works.\n",
        }
    }

    #[must_use]
    pub const fn keeps_file(self) -> bool {
        matches!(self, Self::Output)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Skip,
}

impl CheckStatus {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Pass => "✅",
            Self::Fail => "❌",
            Self::Skip => "⏭",
        }
    }
}
