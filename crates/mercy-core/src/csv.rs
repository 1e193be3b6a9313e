//! Minimal comma-separated file access
//!
//! Rows are vectors of strings of arbitrary length. Fields are written joined
//! by `", "`. On read, every field is trimmed and inner runs of spaces or tabs
//! collapse to a single space, so `" Wrecking   Ball "` reads as
//! `"Wrecking Ball"`.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub const DELIMITER: &str = ", ";

/// Create or overwrite `path` with `rows`
pub fn save<P: AsRef<Path>>(path: P, rows: &[Vec<String>]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let file = File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    let mut writer = BufWriter::new(file);

    for row in rows {
        writeln!(writer, "{}", row.join(DELIMITER))
            .with_context(|| format!("Failed to write to {:?}", path))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush {:?}", path))
}

/// Read every line of `path` as a row; empty lines are skipped
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let reader = BufReader::new(file);

    let mut rows = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("Failed to read line {} from {:?}", line_num + 1, path))?;

        if line.trim().is_empty() {
            continue;
        }

        rows.push(line.split(',').map(reduce).collect());
    }

    Ok(rows)
}

/// Trim a field and collapse inner whitespace runs to one space
fn reduce(field: &str) -> String {
    field
        .split([' ', '\t'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
