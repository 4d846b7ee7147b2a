//! Sampling I/O layer (§4.P): line-oriented reading and writing with the
//! `-`/`null` path sentinels and the same progress contract as the rest of
//! the pipeline.
//!
//! Grounded on `original_source/src/io/file_io.cpp`'s `TextFileReader`/
//! `TextFileWriter` (existence check before open, best-effort file-size
//! probe for progress, parent-directory auto-creation on write).

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};

/// Sentinel meaning "standard input/output", depending on position.
pub const STDIO_SENTINEL: &str = "-";
/// Sentinel meaning "discard output, but still compute statistics".
pub const DISCARD_SENTINEL: &str = "null";

pub fn is_stdio(path: &str) -> bool {
    path == STDIO_SENTINEL
}

pub fn is_discard(path: &str) -> bool {
    path == DISCARD_SENTINEL
}

fn classify_open_error(path: &Path, source: io::Error) -> Error {
    Error::from_io(path, source)
}

/// Reads every line of `path` (or standard input, if `path` is `-`) into
/// memory, invoking `on_progress` with a `0.0..=1.0` ratio as bytes are
/// consumed. Ratio is only meaningful when the file size can be probed
/// (stdin reports 1.0 once at the end).
pub fn read_all_lines(path: &str, mut on_progress: impl FnMut(f64)) -> Result<Vec<String>> {
    if is_stdio(path) {
        let stdin = io::stdin();
        let mut lines = Vec::new();
        for line in stdin.lock().lines() {
            lines.push(line.map_err(|e| classify_open_error(Path::new(path), e))?);
        }
        on_progress(1.0);
        return Ok(lines);
    }

    let p = Path::new(path);
    if !p.exists() {
        return Err(Error::NotFound { path: p.to_path_buf() });
    }
    let file_size = std::fs::metadata(p).map(|m| m.len()).unwrap_or(0);

    let file = File::open(p).map_err(|e| classify_open_error(p, e))?;
    let reader = BufReader::new(file);

    let mut lines = Vec::new();
    let mut bytes_read: u64 = 0;
    for line in reader.lines() {
        let line = line.map_err(|e| classify_open_error(p, e))?;
        bytes_read += line.len() as u64 + 1;
        if file_size > 0 {
            on_progress((bytes_read as f64 / file_size as f64).min(1.0));
        }
        lines.push(line);
    }
    if file_size > 0 {
        on_progress(1.0);
    }
    Ok(lines)
}

/// Streams `path` (or stdin) one line at a time through `on_line`, never
/// materializing the whole file. Same progress contract as
/// [`read_all_lines`].
pub fn process_line_by_line(
    path: &str,
    mut on_line: impl FnMut(&str),
    mut on_progress: impl FnMut(f64),
) -> Result<()> {
    if is_stdio(path) {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line.map_err(|e| classify_open_error(Path::new(path), e))?;
            on_line(&line);
        }
        on_progress(1.0);
        return Ok(());
    }

    let p = Path::new(path);
    if !p.exists() {
        return Err(Error::NotFound { path: p.to_path_buf() });
    }
    let file_size = std::fs::metadata(p).map(|m| m.len()).unwrap_or(0);

    let file = File::open(p).map_err(|e| classify_open_error(p, e))?;
    let reader = BufReader::new(file);

    let mut bytes_read: u64 = 0;
    for line in reader.lines() {
        let line = line.map_err(|e| classify_open_error(p, e))?;
        bytes_read += line.len() as u64 + 1;
        on_line(&line);
        if file_size > 0 {
            on_progress((bytes_read as f64 / file_size as f64).min(1.0));
        }
    }
    if file_size > 0 {
        on_progress(1.0);
    }
    Ok(())
}

/// Reads the whole file (or stdin) as a single UTF-8 string, malformed
/// bytes replaced with U+FFFD. Used by the PMI engine, which operates over
/// the full concatenated corpus rather than line-by-line.
pub fn read_file_content(path: &str, mut on_progress: impl FnMut(f64)) -> Result<String> {
    if is_stdio(path) {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf).map_err(|e| classify_open_error(Path::new(path), e))?;
        on_progress(1.0);
        return Ok(String::from_utf8_lossy(&buf).into_owned());
    }

    let p = Path::new(path);
    if !p.exists() {
        return Err(Error::NotFound { path: p.to_path_buf() });
    }
    let file_size = std::fs::metadata(p).map(|m| m.len()).unwrap_or(0);

    let mut file = File::open(p).map_err(|e| classify_open_error(p, e))?;
    let mut buf = Vec::with_capacity(file_size as usize);
    let mut chunk = [0u8; 8192];
    let mut read_total: u64 = 0;
    loop {
        let n = file.read(&mut chunk).map_err(|e| classify_open_error(p, e))?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        read_total += n as u64;
        if file_size > 0 {
            on_progress((read_total as f64 / file_size as f64).min(1.0));
        }
    }
    if file_size > 0 {
        on_progress(1.0);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes `lines` U+000A-terminated to `path` (or standard output), one
/// per line, creating parent directories on demand. If `path` is the
/// `null` sentinel, writing is skipped entirely — callers still compute
/// statistics from `lines` themselves.
pub fn write_lines<'a>(path: &str, lines: impl IntoIterator<Item = &'a str>) -> Result<()> {
    if is_discard(path) {
        return Ok(());
    }
    if is_stdio(path) {
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        for line in lines {
            writer.write_all(line.as_bytes()).map_err(|e| classify_open_error(Path::new(path), e))?;
            writer.write_all(b"\n").map_err(|e| classify_open_error(Path::new(path), e))?;
        }
        writer.flush().map_err(|e| classify_open_error(Path::new(path), e))?;
        return Ok(());
    }

    let p = Path::new(path);
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| classify_open_error(p, e))?;
        }
    }
    let file = File::create(p).map_err(|e| classify_open_error(p, e))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writer.write_all(line.as_bytes()).map_err(|e| classify_open_error(p, e))?;
        writer.write_all(b"\n").map_err(|e| classify_open_error(p, e))?;
    }
    writer.flush().map_err(|e| classify_open_error(p, e))?;
    Ok(())
}
