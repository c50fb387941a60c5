use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory names that always hold virtual environments.
const ENVIRONMENT_DIR_NAMES: [&str; 2] = ["env", "venv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Python,
    Notebook,
}

impl FileKind {
    /// Classify a file by name. Names starting with `_` are never sources.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.starts_with('_') {
            return None;
        }
        if name.ends_with(".py") {
            Some(FileKind::Python)
        } else if name.ends_with(".ipynb") {
            Some(FileKind::Notebook)
        } else {
            None
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(Self::from_file_name)
    }
}

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub kind: FileKind,
}

pub struct FileScanner {
    excluded_dir_names: Vec<String>,
}

impl FileScanner {
    pub fn new() -> Self {
        Self {
            excluded_dir_names: ENVIRONMENT_DIR_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Also prune directories with this exact name (the active environment).
    pub fn with_excluded_dir(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() && !self.excluded_dir_names.contains(&name) {
            self.excluded_dir_names.push(name);
        }
        self
    }

    pub fn scan_directory(&self, root_path: &Path) -> Result<Vec<FileInfo>> {
        if !root_path.is_dir() {
            anyhow::bail!("Not a directory: {}", root_path.display());
        }

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_pruned(entry));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable entry");
                    continue;
                }
            };

            if !entry.path().is_file() {
                continue;
            }

            if let Some(kind) = entry.file_name().to_str().and_then(FileKind::from_file_name) {
                files.push(FileInfo {
                    path: entry.into_path(),
                    kind,
                });
            }
        }

        debug!(root = %root_path.display(), count = files.len(), "Scan finished");
        Ok(files)
    }

    fn is_pruned(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        name.starts_with('.')
            || name.starts_with('_')
            || self.excluded_dir_names.iter().any(|excluded| *excluded == name)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
