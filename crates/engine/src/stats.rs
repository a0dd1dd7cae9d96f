// crates/engine/src/stats.rs
use crate::error::EngineError;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLines {
    pub path: PathBuf,
    pub lines: usize,
}

/// Outcome of one scan: counted files plus per-file failures.
#[derive(Debug, Default)]
pub struct RunResult {
    pub files: Vec<FileLines>,
    pub errors: Vec<(PathBuf, EngineError)>,
}

/// Ranking used by the report: most lines first, ties broken by the path
/// string (descending), the same order as a reverse sort on `(lines, path)`
/// pairs. Paths compare as raw bytes, not component by component.
#[must_use]
pub fn rank(a: &FileLines, b: &FileLines) -> Ordering {
    b.lines
        .cmp(&a.lines)
        .then_with(|| b.path.as_os_str().cmp(a.path.as_os_str()))
}

/// Sorted view over a scan with the two report sections precomputed.
#[derive(Debug, Clone, Serialize)]
pub struct LineReport {
    pub files: Vec<FileLines>,
    pub total_files: usize,
    pub total_lines: usize,
    pub top: usize,
    pub threshold: usize,
}

impl LineReport {
    #[must_use]
    pub fn new(mut files: Vec<FileLines>, top: usize, threshold: usize) -> Self {
        files.sort_by(rank);
        let total_lines = files.iter().map(|f| f.lines).sum();
        Self {
            total_files: files.len(),
            total_lines,
            files,
            top,
            threshold,
        }
    }

    /// The first `top` entries.
    #[must_use]
    pub fn top_files(&self) -> &[FileLines] {
        &self.files[..self.top.min(self.files.len())]
    }

    /// Files strictly above the threshold, in report order.
    pub fn large_files(&self) -> impl Iterator<Item = &FileLines> {
        self.files.iter().filter(move |f| f.lines > self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, lines: usize) -> FileLines {
        FileLines {
            path: PathBuf::from(path),
            lines,
        }
    }

    #[test]
    fn report_is_sorted_non_increasing() {
        let report = LineReport::new(
            vec![entry("a.py", 3), entry("b.py", 900), entry("c.py", 40)],
            20,
            600,
        );
        let counts: Vec<_> = report.files.iter().map(|f| f.lines).collect();
        assert_eq!(counts, vec![900, 40, 3]);
        assert!(report.files.windows(2).all(|w| w[0].lines >= w[1].lines));
        assert_eq!(report.total_lines, 943);
    }

    #[test]
    fn ties_break_on_path_descending() {
        let report = LineReport::new(vec![entry("a.py", 5), entry("b.py", 5)], 20, 600);
        assert_eq!(report.files[0].path, PathBuf::from("b.py"));
    }

    #[test]
    fn ties_compare_paths_as_strings() {
        let report = LineReport::new(
            vec![
                entry("./a/b.py", 5),
                entry("./src-x/f.py", 5),
                entry("./a.b.py", 5),
                entry("./src/g.py", 5),
            ],
            20,
            600,
        );
        let order: Vec<_> = report.files.iter().map(|f| f.path.to_string_lossy().into_owned()).collect();
        assert_eq!(order, ["./src/g.py", "./src-x/f.py", "./a/b.py", "./a.b.py"]);
    }

    #[test]
    fn top_is_clamped_to_len() {
        let report = LineReport::new(vec![entry("a.py", 1)], 20, 600);
        assert_eq!(report.top_files().len(), 1);
        let report = LineReport::new(vec![entry("a.py", 1), entry("b.py", 2)], 1, 600);
        assert_eq!(report.top_files(), &[entry("b.py", 2)]);
    }

    #[test]
    fn threshold_is_strict() {
        let report = LineReport::new(vec![entry("a.py", 600), entry("b.py", 601)], 20, 600);
        let large: Vec<_> = report.large_files().collect();
        assert_eq!(large, vec![&entry("b.py", 601)]);
    }
}
