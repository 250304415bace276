use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};
use crate::errors::SeedError;
use tracing::debug;

pub const MANIFEST_FILE: &str = "AndroidManifest.xml";

/// Directory names pruned from every walk unless the configuration says otherwise.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[".git", ".gradle", ".idea", "build"];

/// Walks an app tree in file-name order, pruning excluded directories.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    exclude: Vec<glob::Pattern>,
}

impl FileDiscovery {
    pub fn new<S: AsRef<str>>(exclude_dirs: &[S]) -> Result<Self, SeedError> {
        let exclude = exclude_dirs
            .iter()
            .map(|p| {
                glob::Pattern::new(p.as_ref()).map_err(|e| {
                    SeedError::Config(format!("Invalid exclude pattern '{}': {}", p.as_ref(), e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { exclude })
    }

    /// Every file under `root` accepted by `accept`, in walk order.
    pub fn walk<F>(&self, root: &Path, accept: F) -> Result<Vec<PathBuf>, SeedError>
    where
        F: Fn(&Path) -> bool,
    {
        let mut files = Vec::new();
        for entry in self.entries(root) {
            let entry = entry?;
            if entry.file_type().is_file() && accept(entry.path()) {
                files.push(entry.into_path());
            }
        }
        debug!(root = %root.display(), count = files.len(), "Walked tree");
        Ok(files)
    }

    /// First file accepted by `accept`; the walk stops there.
    pub fn find_first<F>(&self, root: &Path, accept: F) -> Result<Option<PathBuf>, SeedError>
    where
        F: Fn(&Path) -> bool,
    {
        for entry in self.entries(root) {
            let entry = entry?;
            if entry.file_type().is_file() && accept(entry.path()) {
                return Ok(Some(entry.into_path()));
            }
        }
        Ok(None)
    }

    fn entries(&self, root: &Path) -> impl Iterator<Item = walkdir::Result<DirEntry>> + '_ {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| !self.is_excluded(e))
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        self.exclude.iter().any(|p| p.matches(&name))
    }
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDE_DIRS
                .iter()
                .filter_map(|p| glob::Pattern::new(p).ok())
                .collect(),
        }
    }
}

pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

pub fn is_manifest(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some(MANIFEST_FILE)
}
