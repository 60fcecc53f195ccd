// Cursor file discovery and size inventory

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::converter::sizes_in_bytes;
use super::wincur::CursorFormat;

pub fn is_windows_cursor_file(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        let ext_str = ext.to_string_lossy().to_lowercase();
        if matches!(ext_str.as_str(), "cur" | "ani" | "ico") {
            return true;
        }
        if matches!(ext_str.as_str(), "txt" | "md" | "inf" | "toml" | "png" | "svg") {
            return false;
        }
    }

    // check by content
    if let Ok(bytes) = fs::read(path) {
        return CursorFormat::detect(&bytes).is_some();
    }

    false
}

/// Cursor files directly inside `dir`, sorted by path.
pub fn scan_cursor_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut cursor_files = Vec::new();

    for entry in WalkDir::new(dir).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() && is_windows_cursor_file(path) {
            cursor_files.push(path.to_path_buf());
        }
    }

    Ok(cursor_files)
}

/// Sizes found per file, plus their union.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeReport {
    pub per_file: BTreeMap<String, BTreeSet<u32>>,
    pub all: BTreeSet<u32>,
}

fn join_sizes(sizes: &BTreeSet<u32>) -> String {
    sizes
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl SizeReport {
    pub fn is_empty(&self) -> bool {
        self.per_file.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec!["Available sizes by file:".to_string()];
        for (name, sizes) in &self.per_file {
            if sizes.is_empty() {
                lines.push(format!("  {}: (none)", name));
            } else {
                lines.push(format!("  {}: {}", name, join_sizes(sizes)));
            }
        }
        if !self.all.is_empty() {
            lines.push(format!("All sizes in directory: {}", join_sizes(&self.all)));
        }
        lines
    }
}

/// Inventory the sizes of every cursor file in `dir`.
///
/// Files that fail to decode are reported through `log_fn` and left out.
pub fn list_available_sizes<F>(dir: &Path, mut log_fn: F) -> Result<SizeReport>
where
    F: FnMut(String),
{
    let mut report = SizeReport::default();

    for path in scan_cursor_dir(dir)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let sizes = fs::read(&path)
            .with_context(|| format!("Failed to read cursor file {}", path.display()))
            .and_then(|data| sizes_in_bytes(&data, &mut log_fn).map_err(anyhow::Error::from));

        match sizes {
            Ok(sizes) => {
                report.all.extend(sizes.iter().copied());
                report.per_file.insert(name, sizes);
            }
            Err(e) => {
                log_fn(format!("Warning: Failed to read sizes from {}: {:#}", name, e));
            }
        }
    }

    if report.is_empty() {
        log_fn(format!(
            "Warning: No .ani or .cur files found in {}",
            dir.display()
        ));
    } else {
        for line in report.lines() {
            log::info!("{}", line);
        }
    }

    Ok(report)
}
