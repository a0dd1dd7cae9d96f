// crates/engine/src/config.rs
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_EXTENSIONS: &[&str] = &["py", "js", "ts", "tsx", "sh"];
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &["node_modules", ".git", "__pycache__", "venv", ".venv"];
pub const DEFAULT_TOP: usize = 20;
pub const DEFAULT_THRESHOLD: usize = 600;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(default, deny_unknown_fields)]
pub struct WalkOptions {
    #[builder(default)]
    pub roots: Vec<PathBuf>,
    #[builder(default = "1")]
    pub threads: usize,
    /// Skip dot-files. Off by default so hidden sources are counted too.
    #[builder(default)]
    pub skip_hidden: bool,
    #[builder(default)]
    pub git_ignore: bool,
    #[builder(default)]
    pub max_depth: Option<usize>,
    #[builder(default)]
    pub follow_links: bool,
    /// Directory names pruned wherever they appear in the tree.
    #[builder(default = "owned(DEFAULT_EXCLUDE_DIRS)")]
    pub exclude_dirs: Vec<String>,
    /// File name suffixes (without the leading dot) that are counted.
    #[builder(default = "owned(DEFAULT_EXTENSIONS)")]
    pub extensions: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            roots: vec![],
            threads: 1,
            skip_hidden: false,
            git_ignore: false,
            max_depth: None,
            follow_links: false,
            exclude_dirs: owned(DEFAULT_EXCLUDE_DIRS),
            extensions: owned(DEFAULT_EXTENSIONS),
        }
    }
}

impl WalkOptions {
    /// Whether a file name ends with one of the configured extensions.
    #[must_use]
    pub fn matches_extension(&self, file_name: &str) -> bool {
        self.extensions.iter().any(|ext| {
            let ext = ext.trim_start_matches('.');
            file_name
                .strip_suffix(ext)
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }

    #[must_use]
    pub fn is_excluded_dir(&self, dir_name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == dir_name)
    }
}

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    #[builder(default)]
    pub walk: WalkOptions,
    /// How many entries the "all files" section shows.
    #[builder(default = "DEFAULT_TOP")]
    pub top: usize,
    /// Files with strictly more lines than this are listed as large.
    #[builder(default = "DEFAULT_THRESHOLD")]
    pub threshold: usize,
    #[builder(default)]
    pub strict: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            walk: WalkOptions::default(),
            top: DEFAULT_TOP,
            threshold: DEFAULT_THRESHOLD,
            strict: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_requires_dot_boundary() {
        let opts = WalkOptions::default();
        assert!(opts.matches_extension("main.py"));
        assert!(opts.matches_extension("types.d.ts"));
        assert!(opts.matches_extension("App.tsx"));
        assert!(!opts.matches_extension("happy"));
        assert!(!opts.matches_extension("notes.txt"));
    }

    #[test]
    fn extensions_accept_leading_dot() {
        let opts = WalkOptionsBuilder::default()
            .extensions(vec![".rs".to_string()])
            .build()
            .unwrap();
        assert!(opts.matches_extension("lib.rs"));
        assert!(!opts.matches_extension("lib.py"));
    }

    #[test]
    fn builder_defaults_match_default_impl() {
        let built = ScanConfigBuilder::default().build().unwrap();
        assert_eq!(built.top, DEFAULT_TOP);
        assert_eq!(built.threshold, DEFAULT_THRESHOLD);
        assert_eq!(built.walk.exclude_dirs, owned(DEFAULT_EXCLUDE_DIRS));
    }

    #[test]
    fn yaml_section_fills_missing_fields() {
        let cfg: ScanConfig = serde_yaml::from_str("threshold: 100\n").unwrap();
        assert_eq!(cfg.threshold, 100);
        assert_eq!(cfg.top, DEFAULT_TOP);
        assert_eq!(cfg.walk.extensions.len(), DEFAULT_EXTENSIONS.len());
    }
}
