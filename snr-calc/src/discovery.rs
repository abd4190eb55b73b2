//! Input folder scanning and frame classification.
//!
//! Only regular files directly inside the folder are considered. Candidates are
//! sorted by file name, so "first light frame" is deterministic across
//! platforms and filesystems. Classification looks at the file name alone,
//! never at the parent directories.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::config::FileConfig;

/// Append the platform path separator unless the folder already ends with one.
pub fn normalize_folder(folder: &str) -> String {
    if folder.ends_with(MAIN_SEPARATOR) || folder.ends_with('/') {
        folder.to_string()
    } else {
        format!("{folder}{MAIN_SEPARATOR}")
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}

/// List regular files in `folder` whose names end with `extension`, sorted by name.
pub fn discover_fits_files(folder: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if file_name(&path).ends_with(extension) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| file_name(a).cmp(file_name(b)));
    Ok(files)
}

/// Files whose name contains the dark marker, in input order.
pub fn dark_files<'a>(files: &'a [PathBuf], config: &FileConfig) -> Vec<&'a Path> {
    files
        .iter()
        .filter(|p| file_name(p).contains(&config.dark_marker))
        .map(PathBuf::as_path)
        .collect()
}

/// First file whose name contains the light marker.
pub fn light_frame<'a>(files: &'a [PathBuf], config: &FileConfig) -> Option<&'a Path> {
    files
        .iter()
        .find(|p| file_name(p).contains(&config.light_marker))
        .map(PathBuf::as_path)
}
