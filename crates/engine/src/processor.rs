use crate::error::{EngineError, Result};
use crate::stats::FileLines;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Count the lines of a single file.
pub fn process_file(path: PathBuf) -> Result<FileLines> {
    let file = File::open(&path).map_err(|e| EngineError::FileRead {
        path: path.clone(),
        source: e,
    })?;
    let mut reader = BufReader::new(file);
    let lines = count_lines(&mut reader, &path)?;
    tracing::trace!(path = %path.display(), lines, "counted");
    Ok(FileLines { path, lines })
}

/// Streaming line count.
///
/// Counts `\n` bytes and adds one for a trailing line without a terminator,
/// so the result equals the number of lines a line iterator would yield.
/// Invalid UTF-8 does not matter because only bytes are inspected.
pub fn count_lines<R: BufRead>(reader: &mut R, path: &Path) -> Result<usize> {
    let mut lines = 0;
    let mut last_byte: Option<u8> = None;

    loop {
        let buf = reader.fill_buf().map_err(|e| EngineError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        if buf.is_empty() {
            break;
        }

        last_byte = buf.last().copied();
        lines += bytecount::count(buf, b'\n');

        let len = buf.len();
        reader.consume(len);
    }

    // 末尾に改行がない場合の行カウント補正
    if let Some(b) = last_byte
        && b != b'\n'
    {
        lines += 1;
    }

    Ok(lines)
}
