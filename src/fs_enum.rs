use crate::error::{Result, TransferError};
use std::path::{Path, PathBuf};
// Source enumeration for the client's transfer jobs

/// A local file queued for sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Name put on the wire (the file's base name)
    pub name: String,
    pub size: u64,
}

impl FileEntry {
    /// Stat a single file. Missing paths map to `FileNotFound`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TransferError::FileNotFound(path.to_path_buf())
            } else {
                TransferError::file_io(path, e)
            }
        })?;
        if !meta.is_file() {
            return Err(TransferError::file_io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                TransferError::file_io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
                )
            })?;
        Ok(FileEntry {
            path: path.to_path_buf(),
            name,
            size: meta.len(),
        })
    }
}

/// File filter options for batch sends
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub exclude_files: Vec<String>,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
}

impl FileFilter {
    /// Check if a file should be included
    fn should_include_file(&self, name: &str, size: u64) -> bool {
        for pattern in &self.exclude_files {
            if glob_match(pattern, name) {
                return false;
            }
        }

        if let Some(min) = self.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.max_size {
            if size > max {
                return false;
            }
        }

        true
    }
}

/// Simple glob matching (supports * wildcards)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    if pattern.contains('*') {
        if pattern.starts_with('*') && pattern.ends_with('*') {
            let middle = &pattern[1..pattern.len() - 1];
            return text.contains(middle);
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            return text.ends_with(suffix);
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            return text.starts_with(prefix);
        }
    }

    // Exact match
    pattern == text
}

/// List the regular files directly inside `root` (no recursion).
///
/// Symlinks to files are followed; directories and anything unreadable are
/// skipped. With `sorted`, entries come back ordered by file name so repeated
/// batches send in the same order; otherwise the platform listing order is
/// kept.
pub fn enumerate_top_level(root: &Path, filter: &FileFilter, sorted: bool) -> Result<Vec<FileEntry>> {
    use walkdir::WalkDir;

    if !root.is_dir() {
        return Err(TransferError::NotADirectory(root.to_path_buf()));
    }

    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);
    if sorted {
        walker = walker.sort_by_file_name();
    }

    let mut entries = Vec::new();
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let size = metadata.len();
        if filter.should_include_file(&name, size) {
            entries.push(FileEntry {
                path: entry.path().to_path_buf(),
                name,
                size,
            });
        }
    }

    Ok(entries)
}
