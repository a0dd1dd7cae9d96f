use crate::config::WalkOptions;
use crate::error::{EngineError, Result};
use crossbeam_channel::Sender;
use ignore::WalkBuilder;
use std::path::PathBuf;

/// Parallel recursive directory walk.
///
/// Sends every regular file whose name matches the configured extensions.
/// Excluded directory names are pruned before descent.
///
/// # Errors
/// Returns an error if a root does not exist. Per-entry walk errors are logged
/// and skipped.
pub fn walk_parallel(options: &WalkOptions, tx: &Sender<PathBuf>) -> Result<()> {
    let Some((first, rest)) = options.roots.split_first() else {
        return Ok(());
    };

    for root in &options.roots {
        if !root.exists() {
            return Err(EngineError::Config(format!(
                "Scan root does not exist: {}",
                root.display()
            )));
        }
    }

    let mut builder = WalkBuilder::new(first);
    for root in rest {
        builder.add(root);
    }

    builder
        .threads(options.threads)
        .hidden(options.skip_hidden)
        .ignore(options.git_ignore)
        .git_ignore(options.git_ignore)
        .git_global(options.git_ignore)
        .git_exclude(options.git_ignore)
        .parents(options.git_ignore)
        .follow_links(options.follow_links)
        .max_depth(options.max_depth);

    let prune = options.clone();
    builder.filter_entry(move |entry| {
        // Roots are never pruned, even when their own name is excluded.
        if entry.depth() == 0 {
            return true;
        }
        if entry.file_type().is_some_and(|ft| ft.is_dir()) {
            return !prune.is_excluded_dir(&entry.file_name().to_string_lossy());
        }
        true
    });

    let walker = builder.build_parallel();
    walker.run(|| {
        let tx = tx.clone();
        let opts = options.clone();
        Box::new(move |entry| {
            match entry {
                Ok(entry) => {
                    if is_regular_file(&entry)
                        && opts.matches_extension(&entry.file_name().to_string_lossy())
                        && tx.send(entry.into_path()).is_err()
                    {
                        return ignore::WalkState::Quit;
                    }
                }
                Err(e) => tracing::warn!("walk: {e}"),
            }
            ignore::WalkState::Continue
        })
    });

    Ok(())
}

/// Regular files, plus symlinks whose target is a regular file.
fn is_regular_file(entry: &ignore::DirEntry) -> bool {
    if entry.file_type().is_some_and(|ft| ft.is_file()) {
        return true;
    }
    entry.path_is_symlink() && entry.path().is_file()
}
