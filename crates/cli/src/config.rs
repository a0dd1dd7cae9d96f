// crates/cli/src/config.rs
use crate::args::{CountArgs, EnvArgs, InfoArgs, ServeArgs, VideoArgs, WriteCheckArgs};
use crate::error::{AppError, Result};
use crate::options;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use ytdiag_engine::commands::CommandsConfig;
use ytdiag_engine::config::{ScanConfig, ScanConfigBuilder, WalkOptions, WalkOptionsBuilder};
use ytdiag_engine::envcheck::EnvCheckConfig;
use ytdiag_engine::media::{ClipOutput, ClipSpec};
use ytdiag_engine::options as engine_options;
use ytdiag_engine::server::ServerConfig;
use ytdiag_engine::system::InfoConfig;
use ytdiag_engine::upload::UploadConfig;
use ytdiag_engine::write_check::WriteCheck;

pub const DEFAULT_CONFIG_FILE: &str = "ytdiag.yaml";

/// Contents of the optional YAML config file. Every section is optional and
/// every field inside a section falls back to its default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub scan: ScanConfig,
    pub env: EnvCheckConfig,
    pub info: InfoConfig,
    pub commands: CommandsConfig,
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub video: VideoSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoSection {
    pub ffmpeg: String,
    pub clip: ClipSpec,
}

impl Default for VideoSection {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            clip: ClipSpec::default(),
        }
    }
}

impl FileConfig {
    /// Load the explicit file, or `./ytdiag.yaml` when it exists, or defaults.
    ///
    /// # Errors
    /// Returns an error when an explicit file is missing or any file fails to parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    tracing::debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| AppError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| AppError::ConfigParse {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// # Errors
    /// Returns the YAML error for malformed input or unknown fields.
    pub fn parse(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Scan settings with command-line overrides applied.
    ///
    /// # Errors
    /// Returns an error when the builders reject the merged values.
    pub fn scan_config(&self, args: &CountArgs) -> Result<ScanConfig> {
        let base = &self.scan;
        let walk = walk_options(&base.walk, args)?;
        ScanConfigBuilder::default()
            .walk(walk)
            .top(args.top.unwrap_or(base.top))
            .threshold(args.threshold.unwrap_or(base.threshold))
            .strict(args.strict || base.strict)
            .build()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    #[must_use]
    pub fn env_config(&self, args: &EnvArgs) -> EnvCheckConfig {
        let mut cfg = self.env.clone();
        if let Some(python) = &args.python {
            cfg.python.clone_from(python);
        }
        if let Some(ffmpeg) = &args.ffmpeg {
            cfg.ffmpeg.clone_from(ffmpeg);
        }
        if !args.packages.is_empty() {
            cfg.packages.clone_from(&args.packages);
        }
        cfg
    }

    #[must_use]
    pub fn info_config(&self, args: &InfoArgs) -> InfoConfig {
        let mut cfg = self.info.clone();
        if !args.paths.is_empty() {
            cfg.paths.clone_from(&args.paths);
        }
        cfg
    }

    #[must_use]
    pub fn server_config(&self, args: &ServeArgs) -> ServerConfig {
        let mut cfg = self.server.clone();
        if let Some(bind) = &args.bind {
            cfg.bind.clone_from(bind);
        }
        if let Some(dir) = &args.projects_dir {
            cfg.projects_dir.clone_from(dir);
        }
        cfg
    }

    /// ffmpeg program, clip spec and destination for `video`.
    #[must_use]
    pub fn video_config(&self, args: &VideoArgs) -> (String, ClipSpec, ClipOutput) {
        let mut spec = self.video.clip.clone();
        if let Some(w) = args.width {
            spec.width = w;
        }
        if let Some(h) = args.height {
            spec.height = h;
        }
        if let Some(fps) = args.fps {
            spec.fps = fps;
        }
        if let Some(d) = args.duration {
            spec.duration_secs = d;
        }
        if let Some(color) = &args.color {
            spec.color.clone_from(color);
        }
        let ffmpeg = args.ffmpeg.clone().unwrap_or_else(|| self.video.ffmpeg.clone());
        let output = match &args.out {
            Some(dir) => ClipOutput::Dir(dir.clone()),
            None => ClipOutput::Temp { keep: args.keep },
        };
        (ffmpeg, spec, output)
    }
}

fn walk_options(base: &WalkOptions, args: &CountArgs) -> Result<WalkOptions> {
    let roots = if args.paths.is_empty() {
        if base.roots.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            base.roots.clone()
        }
    } else {
        args.paths.clone()
    };

    let extensions = if args.extensions.is_empty() {
        base.extensions.clone()
    } else {
        args.extensions.clone()
    };

    let mut exclude_dirs = base.exclude_dirs.clone();
    for dir in &args.exclude_dirs {
        if !exclude_dirs.contains(dir) {
            exclude_dirs.push(dir.clone());
        }
    }

    let threads = args.threads.unwrap_or_else(num_cpus::get);

    WalkOptionsBuilder::default()
        .roots(roots)
        .threads(threads)
        .skip_hidden(args.skip_hidden || base.skip_hidden)
        .git_ignore(args.gitignore || base.git_ignore)
        .max_depth(args.max_depth.or(base.max_depth))
        .follow_links(args.follow || base.follow_links)
        .exclude_dirs(exclude_dirs)
        .extensions(extensions)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))
}

impl From<&WriteCheckArgs> for WriteCheck {
    fn from(args: &WriteCheckArgs) -> Self {
        let preset = engine_options::WritePreset::from(args.preset);
        let mut check = Self::from(preset);
        if let Some(file) = &args.file {
            check.path.clone_from(file);
        }
        if let Some(content) = &args.content {
            check.content.clone_from(content);
        }
        check.keep = check.keep || args.keep;
        check
    }
}

// From trait implementations for CLI -> Engine enum conversion

macro_rules! map_enum {
    ($from:ty, $to:ty, $($variant:ident),+ $(,)?) => {
        impl From<$from> for $to {
            fn from(f: $from) -> Self {
                match f {
                    $( <$from>::$variant => <$to>::$variant, )+
                }
            }
        }
    };
}

map_enum!(
    options::OutputFormat,
    engine_options::OutputFormat,
    Table,
    Json,
    Jsonl,
    Yaml
);
map_enum!(
    options::WritePreset,
    engine_options::WritePreset,
    Write,
    Env,
    Output
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Args, Commands};
    use clap::Parser;

    fn count_args(argv: &[&str]) -> CountArgs {
        let mut full = vec!["ytdiag", "count"];
        full.extend_from_slice(argv);
        match Args::parse_from(full).command {
            Commands::Count(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = FileConfig::parse("").unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:5000");
        assert_eq!(cfg.video.clip.width, 640);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(FileConfig::parse("scan:\n  thresold: 5\n").is_err());
        assert!(FileConfig::parse("nonsense: true\n").is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let cfg = FileConfig::parse("scan:\n  top: 5\n  threshold: 100\n").unwrap();
        let scan = cfg
            .scan_config(&count_args(&["--threshold", "50", "src"]))
            .unwrap();
        assert_eq!(scan.top, 5);
        assert_eq!(scan.threshold, 50);
        assert_eq!(scan.walk.roots, vec![PathBuf::from("src")]);
    }

    #[test]
    fn extensions_replace_and_exclude_dirs_extend() {
        let cfg = FileConfig::default();
        let scan = cfg
            .scan_config(&count_args(&["--ext", "rs", "--exclude-dir", "target"]))
            .unwrap();
        assert_eq!(scan.walk.extensions, vec!["rs".to_string()]);
        assert!(scan.walk.exclude_dirs.iter().any(|d| d == "node_modules"));
        assert!(scan.walk.exclude_dirs.iter().any(|d| d == "target"));
        assert_eq!(scan.walk.roots, vec![PathBuf::from(".")]);
    }

    #[test]
    fn video_section_nests_clip_fields() {
        let cfg = FileConfig::parse("video:\n  ffmpeg: /opt/ffmpeg\n  clip:\n    fps: 30\n").unwrap();
        assert_eq!(cfg.video.ffmpeg, "/opt/ffmpeg");
        assert_eq!(cfg.video.clip.fps, 30);
        assert_eq!(cfg.video.clip.height, 480);
    }

    #[test]
    fn write_check_flags_override_preset() {
        let args = WriteCheckArgs {
            preset: options::WritePreset::Env,
            file: Some(PathBuf::from("custom.txt")),
            content: None,
            keep: true,
        };
        let check = WriteCheck::from(&args);
        assert_eq!(check.path, PathBuf::from("custom.txt"));
        assert_eq!(check.content, "Environment test successful!\n");
        assert!(check.keep);
    }
}
