// crates/engine/src/lib.rs
use rayon::prelude::*;
use std::path::PathBuf;

pub mod commands;
pub mod config;
pub mod envcheck;
pub mod error;
pub mod filesystem;
pub mod media;
pub mod options;
pub mod processor;
pub mod server;
pub mod stats;
pub mod system;
pub mod tools;
pub mod upload;
pub mod write_check;

use crate::config::ScanConfig;
use crate::error::{EngineError, Result};
use crate::stats::{FileLines, LineReport, RunResult};

/// Walk the configured roots and count lines in every matching file.
///
/// The walker runs on a background thread feeding a bounded channel; rayon
/// workers count files as they arrive.
///
/// # Errors
///
/// Returns an error for walk setup failures (e.g. a missing root) or, in
/// strict mode, for the first file that cannot be read. Otherwise per-file
/// failures are collected in `RunResult::errors`.
pub fn run(config: &ScanConfig) -> Result<RunResult> {
    let (tx, rx) = crossbeam_channel::bounded(1024);
    let (err_tx, err_rx) = std::sync::mpsc::channel();

    let walk_cfg = config.walk.clone();
    let walker = std::thread::spawn(move || {
        if let Err(e) = crate::filesystem::walk_parallel(&walk_cfg, &tx) {
            let _ = err_tx.send(e);
        }
    });

    let iter = rx.into_iter().par_bridge();

    let mut result = if config.strict {
        let files = iter
            .map(processor::process_file)
            .collect::<Result<Vec<_>>>()?;
        RunResult {
            files,
            errors: Vec::new(),
        }
    } else {
        let (files, errors): (Vec<FileLines>, Vec<(PathBuf, EngineError)>) = iter
            .map(|path| {
                let key = path.clone();
                processor::process_file(path).map_err(|e| (key, e))
            })
            .partition_map(|r| match r {
                Ok(f) => rayon::iter::Either::Left(f),
                Err(e) => rayon::iter::Either::Right(e),
            });
        RunResult { files, errors }
    };

    if walker.join().is_err() {
        return Err(EngineError::Config("walker thread panicked".into()));
    }

    if let Ok(walk_err) = err_rx.try_recv() {
        return Err(walk_err);
    }

    for (path, err) in &result.errors {
        tracing::warn!(path = %path.display(), "{err}");
    }
    tracing::info!(files = result.files.len(), errors = result.errors.len(), "scan finished");

    result.files.sort_by(stats::rank);
    Ok(result)
}

/// Run a scan and shape it into the sorted report.
///
/// # Errors
/// See [`run`].
pub fn scan_report(config: &ScanConfig) -> Result<(LineReport, Vec<(PathBuf, EngineError)>)> {
    let result = run(config)?;
    Ok((
        LineReport::new(result.files, config.top, config.threshold),
        result.errors,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WalkOptions;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("src/web")).unwrap();
        fs::create_dir_all(root.join("venv/lib")).unwrap();
        fs::create_dir_all(root.join("__pycache__")).unwrap();
        fs::write(root.join("src/main.py"), "a\nb\nc\n").unwrap();
        fs::write(root.join("src/web/app.js"), "1\n2\n3\n4\n5\n6\n7").unwrap();
        fs::write(root.join("src/web/view.tsx"), "").unwrap();
        fs::write(root.join("run.sh"), "#!/bin/sh\n").unwrap();
        fs::write(root.join("README.md"), "x\n".repeat(50)).unwrap();
        fs::write(root.join("venv/lib/site.py"), "x\n".repeat(999)).unwrap();
        fs::write(root.join("__pycache__/mod.py"), "x\n").unwrap();
        tmp
    }

    fn config_for(root: &std::path::Path, strict: bool) -> ScanConfig {
        ScanConfig {
            walk: WalkOptions {
                roots: vec![root.to_path_buf()],
                threads: 2,
                ..WalkOptions::default()
            },
            strict,
            ..ScanConfig::default()
        }
    }

    #[test]
    fn counts_known_tree_in_non_increasing_order() {
        let tmp = tree();
        let (report, errors) = scan_report(&config_for(tmp.path(), false)).unwrap();
        assert!(errors.is_empty());

        let rows: Vec<(usize, PathBuf)> = report
            .files
            .iter()
            .map(|f| (f.lines, f.path.strip_prefix(tmp.path()).unwrap().to_path_buf()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (7, PathBuf::from("src/web/app.js")),
                (3, PathBuf::from("src/main.py")),
                (1, PathBuf::from("run.sh")),
                (0, PathBuf::from("src/web/view.tsx")),
            ]
        );
        assert_eq!(report.total_lines, 11);
        assert_eq!(report.large_files().count(), 0);
    }

    #[test]
    fn threshold_selects_large_files() {
        let tmp = tree();
        let config = ScanConfig {
            threshold: 5,
            ..config_for(tmp.path(), false)
        };
        let (report, _) = scan_report(&config).unwrap();
        let large: Vec<_> = report.large_files().map(|f| f.lines).collect();
        assert_eq!(large, vec![7]);
    }

    #[test]
    fn missing_root_fails_the_scan() {
        let tmp = TempDir::new().unwrap();
        let err = run(&config_for(&tmp.path().join("missing"), false)).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_collected_or_fatal_in_strict_mode() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tree();
        let locked = tmp.path().join("src/locked.py");
        fs::write(&locked, "secret\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::File::open(&locked).is_ok() {
            // Running as root: permission bits are not enforced.
            return;
        }

        let result = run(&config_for(tmp.path(), false)).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].0, locked);
        assert_eq!(result.files.len(), 4);

        assert!(run(&config_for(tmp.path(), true)).is_err());
    }
}
