// crates/cli/src/app.rs
use crate::args::{Args, Commands};
use crate::config::FileConfig;
use crate::error::Result;
use crate::presentation;
use std::process::ExitCode;
use ytdiag_engine::options::OutputFormat;
use ytdiag_engine::server::DebugServer;
use ytdiag_engine::write_check::{self, WriteCheck};
use ytdiag_engine::{commands, envcheck, media, system, upload};

/// Execute one sub-command. Diagnostic failures that the command reports
/// itself map to `ExitCode::FAILURE`; anything else bubbles up as an error.
///
/// # Errors
/// Returns an error when configuration, I/O, or an engine operation fails.
pub fn run(args: Args) -> Result<ExitCode> {
    let config = FileConfig::load(args.global.config.as_deref())?;

    match args.command {
        Commands::Env(env_args) => {
            let report = envcheck::run(&config.env_config(&env_args));
            presentation::print_env_report(&report, env_args.format.into())?;
            Ok(exit_code(!report.has_failures()))
        }
        Commands::Info(info_args) => {
            let report = system::info_report(&config.info_config(&info_args));
            presentation::print_info_report(&report, info_args.format.into())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Commands => {
            presentation::print_probe_records(&commands::run(&config.commands));
            Ok(ExitCode::SUCCESS)
        }
        Commands::WriteCheck(write_args) => {
            let check = WriteCheck::from(&write_args);
            println!("Attempting to write to {}...", check.path.display());
            let report = write_check::run(&check)?;
            presentation::print_write_report(&report);
            if matches!(write_args.preset, crate::options::WritePreset::Output) {
                println!("This is stdout output");
                eprintln!("This is stderr output");
            }
            Ok(exit_code(report.matched))
        }
        Commands::Ffmpeg(ffmpeg_args) => {
            let program = ffmpeg_args
                .ffmpeg
                .unwrap_or_else(|| config.env.ffmpeg.clone());
            let probe = media::probe_ffmpeg(&program, !ffmpeg_args.no_smoke)?;
            presentation::print_ffmpeg_probe(&probe);
            Ok(exit_code(probe.smoke.as_ref().is_none_or(|s| s.success)))
        }
        Commands::Video(video_args) => {
            let (ffmpeg, spec, output) = config.video_config(&video_args);
            let report = media::generate_clip(&ffmpeg, &spec, &output)?;
            presentation::print_clip_report(&report);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Count(count_args) => {
            let scan = config.scan_config(&count_args)?;
            let (report, errors) = ytdiag_engine::scan_report(&scan)?;
            for (path, err) in &errors {
                eprintln!("Error processing {}: {err}", path.display());
            }
            let format: OutputFormat = count_args.format.into();
            presentation::print_line_report(&report, format)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Serve(serve_args) => {
            let server_config = config.server_config(&serve_args);
            let server = DebugServer::bind(server_config.clone())?;
            let addr = server
                .local_addr()
                .map_or_else(|| server_config.bind.clone(), |a| a.to_string());
            println!("Starting debug server on http://{addr}");
            println!("Serving projects from {}", server_config.projects_dir.display());
            server.serve(None)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Upload(upload_args) => {
            let status = upload::delegate(&config.upload, &upload_args.forwarded)?;
            Ok(status
                .code()
                .and_then(|c| u8::try_from(c).ok())
                .map_or(ExitCode::FAILURE, ExitCode::from))
        }
        Commands::CliCheck => {
            println!("CLI is working");
            Ok(ExitCode::SUCCESS)
        }
    }
}

const fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
