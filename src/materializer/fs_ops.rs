use std::fs;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use crate::errors::SeedError;
use tracing::debug;

/// Recursive copy of `src` into a new directory `dst`.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<(), SeedError> {
    if !src.is_dir() {
        return Err(SeedError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("source directory not found: {}", src.display()),
        )));
    }
    let mut files = 0usize;
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| SeedError::Internal(format!("walk escaped {}: {}", src.display(), e)))?;
        let target = dst.join(rel);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| SeedError::io_at(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| SeedError::io_at(entry.path(), e))?;
            files += 1;
        }
    }
    debug!(from = %src.display(), to = %dst.display(), files, "Copied tree");
    Ok(())
}

pub fn remove_dir_if_exists(path: &Path) -> Result<bool, SeedError> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SeedError::io_at(path, e)),
    }
}

pub fn rename(from: &Path, to: &Path) -> Result<(), SeedError> {
    fs::rename(from, to).map_err(|e| {
        SeedError::Materialize(format!("rename {} -> {} failed: {}", from.display(), to.display(), e))
    })
}

/// `<path><suffix>` as a sibling of `path`, e.g. `out_ImproperExport` + `_3`.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.components().as_path().as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

/// Absolute, symlink-free form of `path`, which need not exist yet. The
/// deepest existing ancestor is canonicalized and the rest appended.
pub fn resolve_path(path: &Path) -> Result<PathBuf, SeedError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut normal = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normal.pop();
            }
            other => normal.push(other),
        }
    }

    let mut base = normal.as_path();
    let mut tail: Vec<&OsStr> = Vec::new();
    loop {
        match base.canonicalize() {
            Ok(real) => return Ok(tail.iter().rev().fold(real, |acc, name| acc.join(name))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => match (base.parent(), base.file_name()) {
                (Some(parent), Some(name)) => {
                    tail.push(name);
                    base = parent;
                }
                _ => return Err(SeedError::io_at(path, e)),
            },
            Err(e) => return Err(SeedError::io_at(base, e)),
        }
    }
}

/// One of the two paths equals or contains the other.
pub fn overlaps(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// The mutant index if `path` is a `<working>_<index>` sibling of `working`.
pub fn indexed_output(working: &Path, path: &Path) -> Option<usize> {
    if path.parent() != working.parent() {
        return None;
    }
    let prefix = format!("{}_", working.file_name()?.to_str()?);
    let digits = path.file_name()?.to_str()?.strip_prefix(prefix.as_str())?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Existing `<working>_<index>` directories, sorted.
pub fn indexed_siblings(working: &Path) -> Result<Vec<PathBuf>, SeedError> {
    let parent = match working.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let entries = match fs::read_dir(parent) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(SeedError::io_at(parent, e)),
    };
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SeedError::io_at(parent, e))?;
        let candidate = working.with_file_name(entry.file_name());
        if entry.path().is_dir() && indexed_output(working, &candidate).is_some() {
            found.push(candidate);
        }
    }
    found.sort();
    Ok(found)
}
