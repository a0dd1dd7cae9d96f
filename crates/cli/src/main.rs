use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use ytdiag_cli::args::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    let verbose = args.global.verbose.max(args.command.min_verbosity());
    if let Err(e) = ytdiag_cli::logging::init(verbose, args.global.log_file.as_deref()) {
        eprintln!("Logging Error: {e}");
        return ExitCode::FAILURE;
    }

    let name = args.command.name();
    match ytdiag_cli::app::run(args).with_context(|| format!("ytdiag {name} failed")) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
