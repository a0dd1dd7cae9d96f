// crates/cli/src/args.rs
use crate::options::{OutputFormat, WritePreset};
use crate::parsers::{parse_bind_addr, parse_even_dimension, parse_positive_u32, parse_positive_usize};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ytdiag",
    version = crate::VERSION,
    about = "Environment checks, smoke tests and debug tooling for the YTLite pipeline"
)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// YAML config file (default: ./ytdiag.yaml when present)
    #[arg(long, global = true, env = "YTDIAG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full environment check (interpreter, ffmpeg, packages, write access)
    Env(EnvArgs),
    /// Print system information, environment variables and path permissions
    Info(InfoArgs),
    /// Run the configured shell probes and show their output
    Commands,
    /// Write a fixed string to a file and verify it reads back identically
    WriteCheck(WriteCheckArgs),
    /// Locate ffmpeg, print its version and run a short smoke test
    Ffmpeg(FfmpegArgs),
    /// Generate a minimal video clip with ffmpeg
    Video(VideoArgs),
    /// Count lines per source file and print a sorted report
    Count(CountArgs),
    /// Start the single-threaded debug web server
    Serve(ServeArgs),
    /// Forward all arguments to the external uploader's command group.
    ///
    /// ytdiag's own global flags (--help, -v, --config, --log-file) are still
    /// read by ytdiag; put them after `--` to reach the uploader, e.g.
    /// `ytdiag upload -- --help`.
    #[command(after_help = "Use `ytdiag upload -- ARGS...` to forward flags such as --help or -v.")]
    Upload(UploadArgs),
    /// Print a fixed message to prove the command wiring works
    CliCheck,
}

impl Commands {
    /// Sub-command name as typed on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Env(_) => "env",
            Self::Info(_) => "info",
            Self::Commands => "commands",
            Self::WriteCheck(_) => "write-check",
            Self::Ffmpeg(_) => "ffmpeg",
            Self::Video(_) => "video",
            Self::Count(_) => "count",
            Self::Serve(_) => "serve",
            Self::Upload(_) => "upload",
            Self::CliCheck => "cli-check",
        }
    }

    /// Verbosity floor applied when `RUST_LOG` is unset. `serve` logs every
    /// request at info level.
    #[must_use]
    pub const fn min_verbosity(&self) -> u8 {
        match self {
            Self::Serve(_) => 1,
            _ => 0,
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct EnvArgs {
    /// Python interpreter used for the package checks
    #[arg(long)]
    pub python: Option<String>,

    /// ffmpeg executable name or path
    #[arg(long)]
    pub ffmpeg: Option<String>,

    /// Python package to import (repeatable; replaces the configured list)
    #[arg(long = "package", value_name = "NAME")]
    pub packages: Vec<String>,

    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct InfoArgs {
    /// Path to inspect (repeatable; replaces the configured list)
    #[arg(long = "path", value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WriteCheckArgs {
    #[arg(long, value_enum, default_value = "write")]
    pub preset: WritePreset,

    /// Override the preset's file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Override the preset's content
    #[arg(long)]
    pub content: Option<String>,

    /// Leave the file in place after verification
    #[arg(long)]
    pub keep: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct FfmpegArgs {
    #[arg(long)]
    pub ffmpeg: Option<String>,

    /// Only locate and print the version
    #[arg(long)]
    pub no_smoke: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct VideoArgs {
    #[arg(long)]
    pub ffmpeg: Option<String>,

    /// Output directory (default: fresh temporary directory)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Keep the temporary directory
    #[arg(long)]
    pub keep: bool,

    #[arg(long, value_parser = parse_even_dimension)]
    pub width: Option<u32>,

    #[arg(long, value_parser = parse_even_dimension)]
    pub height: Option<u32>,

    #[arg(long, value_parser = parse_positive_u32)]
    pub fps: Option<u32>,

    /// Clip length in seconds
    #[arg(long, value_parser = parse_positive_u32)]
    pub duration: Option<u32>,

    /// ffmpeg colour name for the background
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CountArgs {
    /// Directories to scan (default: current directory)
    pub paths: Vec<PathBuf>,

    /// Extensions to count, without the dot (repeatable; replaces the defaults)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Directory names to prune (repeatable; added to the defaults)
    #[arg(long = "exclude-dir", value_name = "NAME")]
    pub exclude_dirs: Vec<String>,

    /// Entries shown in the "all files" section
    #[arg(long, value_parser = parse_positive_usize)]
    pub top: Option<usize>,

    /// Files with more lines than this are listed as large
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Honour .gitignore / .ignore files
    #[arg(long)]
    pub gitignore: bool,

    /// Skip hidden files and directories
    #[arg(long)]
    pub skip_hidden: bool,

    #[arg(long)]
    pub max_depth: Option<usize>,

    #[arg(long)]
    pub follow: bool,

    /// Walker threads (default: logical CPUs)
    #[arg(long, value_parser = parse_positive_usize)]
    pub threads: Option<usize>,

    /// Fail on the first unreadable file
    #[arg(long)]
    pub strict: bool,

    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind, e.g. 127.0.0.1:5000
    #[arg(long, value_parser = parse_bind_addr)]
    pub bind: Option<String>,

    /// Directory listed by /api/projects
    #[arg(long)]
    pub projects_dir: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct UploadArgs {
    /// Arguments passed through to the uploader unchanged (after `--` to
    /// include ytdiag's global flags)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub forwarded: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn serve_raises_the_verbosity_floor() {
        let args = parse(&["ytdiag", "serve"]);
        assert_eq!(args.command.min_verbosity(), 1);
        assert_eq!(args.global.verbose.max(args.command.min_verbosity()), 1);

        let args = parse(&["ytdiag", "-vv", "serve"]);
        assert_eq!(args.global.verbose.max(args.command.min_verbosity()), 2);

        assert_eq!(parse(&["ytdiag", "count"]).command.min_verbosity(), 0);
    }

    #[test]
    fn upload_forwards_global_flags_after_separator() {
        let args = parse(&["ytdiag", "upload", "--", "--help", "-v", "--config", "x.yaml"]);
        assert_eq!(args.global.verbose, 0);
        assert!(args.global.config.is_none());
        match args.command {
            Commands::Upload(upload) => {
                assert_eq!(upload.forwarded, ["--help", "-v", "--config", "x.yaml"]);
            }
            other => panic!("unexpected command: {}", other.name()),
        }
    }
}
