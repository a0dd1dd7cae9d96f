// crates/cli/src/presentation.rs
use crate::error::Result;
use serde::Serialize;
use ytdiag_engine::commands::{ProbeRecord, ProbeResult};
use ytdiag_engine::envcheck::{CheckGroup, EnvReport};
use ytdiag_engine::media::{ClipReport, FfmpegProbe};
use ytdiag_engine::options::{CheckStatus, OutputFormat};
use ytdiag_engine::stats::{FileLines, LineReport};
use ytdiag_engine::system::{InfoReport, PathAccess, SystemInfo};
use ytdiag_engine::write_check::WriteCheckReport;

const BANNER_WIDTH: usize = 50;

pub fn print_header(title: &str) {
    println!();
    println!("{}", "=".repeat(BANNER_WIDTH));
    println!(" {title}");
    println!("{}", "=".repeat(BANNER_WIDTH));
}

fn or_unknown<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Jsonl => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Table => return Ok(false),
    }
    Ok(true)
}

// ---------------------------------------------------------------- count

/// Print the line report.
///
/// # Errors
/// Returns an error when serialization fails.
pub fn print_line_report(report: &LineReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_line_table(report),
        OutputFormat::Jsonl => print_line_jsonl(report)?,
        OutputFormat::Json | OutputFormat::Yaml => {
            let doc = serde_json::json!({
                "version": crate::VERSION,
                "files": report.files,
                "total_files": report.total_files,
                "total_lines": report.total_lines,
                "threshold": report.threshold,
                "large_files": report.large_files().collect::<Vec<_>>(),
            });
            print_structured(&doc, format)?;
        }
    }
    Ok(())
}

fn line_row(f: &FileLines) -> String {
    format!("{:4} lines: {}", f.lines, f.path.display())
}

fn print_line_table(report: &LineReport) {
    println!("All files sorted by line count:");
    for f in report.top_files() {
        println!("{}", line_row(f));
    }

    println!();
    println!("Files with more than {} lines:", report.threshold);
    for f in report.large_files() {
        println!("{}", line_row(f));
    }
}

fn print_line_jsonl(report: &LineReport) -> Result<()> {
    for f in &report.files {
        let mut v = serde_json::to_value(f)?;
        if let Some(obj) = v.as_object_mut() {
            obj.insert("type".to_string(), "file".into());
        }
        println!("{v}");
    }
    let total = serde_json::json!({
        "type": "total",
        "version": crate::VERSION,
        "files": report.total_files,
        "lines": report.total_lines,
    });
    println!("{total}");
    Ok(())
}

// ---------------------------------------------------------------- env / info

fn print_system(info: &SystemInfo) {
    print_header("SYSTEM INFORMATION");
    println!("Platform: {}-{}", info.os, info.arch);
    println!("System: {}", info.os);
    println!("Family: {}", info.family);
    println!("Release: {}", or_unknown(info.release.as_deref()));
    println!("Machine: {}", info.arch);
    println!("Hostname: {}", or_unknown(info.hostname.as_deref()));
    println!("CPUs: {}", info.cpus);
    println!(
        "Current Directory: {}",
        or_unknown(info.current_dir.as_ref().map(|p| p.display()))
    );
    println!("User: {}", or_unknown(info.user.as_deref()));
    println!(
        "Executable: {}",
        or_unknown(info.executable.as_ref().map(|p| p.display()))
    );
}

/// Print the environment report; returns nothing, the caller decides the exit code.
///
/// # Errors
/// Returns an error when serialization fails.
pub fn print_env_report(report: &EnvReport, format: OutputFormat) -> Result<()> {
    if print_structured(report, format)? {
        return Ok(());
    }

    println!("ytdiag environment check");
    println!("========================");
    print_system(&report.system);

    for group in CheckGroup::ALL {
        print_header(&group.title().to_uppercase());
        for check in report.group(group) {
            println!("{} {}: {}", check.status.symbol(), check.name, check.detail);
        }
    }

    print_header("SUMMARY");
    for group in CheckGroup::ALL {
        println!("{}: {}", group.title(), report.group_status(group).symbol());
    }

    if report.group_status(CheckGroup::Ffmpeg) == CheckStatus::Fail {
        println!("\nFFmpeg is required for video processing. Please install it:");
        println!("  Ubuntu/Debian: sudo apt-get install ffmpeg");
        println!("  macOS: brew install ffmpeg");
        println!("  Windows: Download from https://ffmpeg.org/download.html");
    }
    if report.group_status(CheckGroup::Interpreter) == CheckStatus::Fail {
        println!("\nNo Python interpreter found. Install Python 3 or pass --python.");
    }
    if report.group_status(CheckGroup::Packages) == CheckStatus::Fail {
        println!("\nSome Python packages are missing. Install them with:");
        println!("  pip install -r requirements.txt");
    }
    if report.group_status(CheckGroup::Permissions) == CheckStatus::Fail {
        println!("\nCannot write to current directory. Check permissions.");
    }
    Ok(())
}

fn print_path_access(access: &PathAccess) {
    println!("\n{}:", access.path.display());
    if let Some(err) = &access.error {
        println!("  Error checking {}: {err}", access.path.display());
        return;
    }
    println!("  exists: {}", access.exists);
    if access.exists {
        println!("  is_dir: {}", access.is_dir);
        println!("  is_file: {}", access.is_file);
        println!("  readable: {}", access.readable);
        println!("  writable: {}", access.writable);
        println!("  executable: {}", access.executable);
        if let Some(mode) = &access.mode {
            println!("  mode: {mode}");
        }
    }
}

/// # Errors
/// Returns an error when serialization fails.
pub fn print_info_report(report: &InfoReport, format: OutputFormat) -> Result<()> {
    if print_structured(report, format)? {
        return Ok(());
    }

    print_system(&report.system);

    print_header("ENVIRONMENT VARIABLES");
    for var in &report.env {
        println!("{}: {}", var.name, var.value.as_deref().unwrap_or("Not set"));
    }

    print_header("FILE SYSTEM PERMISSIONS");
    for access in &report.paths {
        print_path_access(access);
    }
    Ok(())
}

// ---------------------------------------------------------------- commands

pub fn print_probe_records(records: &[ProbeRecord]) {
    println!("=== System Permission Checks ===");
    for record in records {
        println!("\n{}:", record.probe.description);
        println!("$ {}", record.probe.command);
        match &record.result {
            ProbeResult::Error { message } => println!("❌ Error: {message}"),
            ProbeResult::Finished(out) if out.success => {
                let stdout = out.stdout.trim();
                if stdout.is_empty() {
                    println!("✅ Command executed successfully");
                } else {
                    println!("✅ Output: {stdout}");
                }
            }
            ProbeResult::Finished(out) => {
                println!("❌ Failed with return code {}", or_unknown(out.code));
                let stderr = out.stderr.trim();
                if !stderr.is_empty() {
                    println!("Error: {stderr}");
                }
            }
        }
    }
}

// ---------------------------------------------------------------- smoke checks

pub fn print_write_report(report: &WriteCheckReport) {
    println!("Successfully wrote to {}", report.path.display());
    println!("File content: {:?}", report.content_read);
    if report.matched {
        println!("✅ Content verified ({} bytes)", report.bytes_written);
    } else {
        println!("❌ Content verification failed");
    }
    if report.removed {
        println!("Test file removed");
    } else {
        println!("Test file kept at {}", report.path.display());
    }
}

pub fn print_ffmpeg_probe(probe: &FfmpegProbe) {
    println!("FFmpeg Check");
    println!("============");
    println!("✅ FFmpeg found at: {}", probe.path.display());
    println!("\nFFmpeg Version:");
    println!("{}", probe.version.as_deref().unwrap_or("(no version output)"));

    if let Some(smoke) = &probe.smoke {
        println!("\nTesting FFmpeg with a simple command...");
        if smoke.success {
            println!("✅ FFmpeg is working correctly!");
        } else {
            println!("❌ FFmpeg test failed:");
            println!("{}", smoke.stderr.trim());
        }
    }
}

pub fn print_clip_report(report: &ClipReport) {
    println!("Running FFmpeg command: {}", report.command.join(" "));
    println!("✅ Test video created: {}", report.path.display());
    println!("   size: {} bytes", report.bytes);
    if !report.retained {
        println!("   (temporary directory removed; pass --keep to retain it)");
    }
}
