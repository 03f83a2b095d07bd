use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use log::debug;
use walkdir::WalkDir;

/// Extension of JMAE output files
pub const OUTPUT_EXTENSION: &str = "out";

/// Check if a path is a JMAE output file
pub fn is_output_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(OUTPUT_EXTENSION))
            .unwrap_or(false)
}

/// Collect output files under `dir`, sorted by path
pub fn collect_output_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(anyhow!("Input directory does not exist: {}", dir.display()));
    }

    let mut walker = WalkDir::new(dir);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| is_output_file(path))
        .collect();
    files.sort();

    debug!("Found {} output files in {}", files.len(), dir.display());
    Ok(files)
}
