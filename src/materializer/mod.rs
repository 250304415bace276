pub mod fs_ops;
pub mod journal;

use std::fs;
use std::path::{Path, PathBuf};
use crate::errors::SeedError;
use self::fs_ops::{copy_dir_all, indexed_siblings, remove_dir_if_exists, rename, with_suffix};
use self::journal::{backup_path, SwapJournal, SwapState};
use tracing::{debug, info, warn};

/// Persists mutations of one working destination tree.
///
/// In-place writes compound onto the working tree. Indexed writes peel the
/// mutated tree off into `<working>_<index>` and put a pristine copy back.
pub struct Materializer {
    working: PathBuf,
}

impl Materializer {
    /// Bind to `working`, rolling back any iteration an earlier run left
    /// half-done.
    pub fn open(working: &Path) -> Result<Self, SeedError> {
        if let Some(state) = recover(working)? {
            warn!(working = %working.display(), state = ?state, "Rolled back stale materialization journal");
        }
        Ok(Self {
            working: working.to_path_buf(),
        })
    }

    pub fn working(&self) -> &Path {
        &self.working
    }

    pub fn indexed_path(&self, index: usize) -> PathBuf {
        with_suffix(&self.working, &format!("_{index}"))
    }

    pub fn persist_in_place(&self, target: &Path, content: &str) -> Result<(), SeedError> {
        self.check_target(target)?;
        fs::write(target, content).map_err(|e| SeedError::io_at(target, e))?;
        debug!(file = %target.display(), "Mutation written in place");
        Ok(())
    }

    /// Materialize one mutant as `<working>_<index>` and leave the working
    /// tree pristine. Callers holding parsed views of files in the tree must
    /// reload them afterwards.
    pub fn persist_indexed(&self, target: &Path, content: &str, index: usize) -> Result<PathBuf, SeedError> {
        let rel = self.check_target(target)?.to_path_buf();
        let output = self.indexed_path(index);
        let backup = backup_path(&self.working);

        let mut journal = SwapJournal::begin(&self.working, &output, target, index)?;

        remove_dir_if_exists(&backup)?;
        copy_dir_all(&self.working, &backup)?;
        journal.advance(SwapState::MutatedInPlace)?;

        let mutated = self.working.join(&rel);
        fs::write(&mutated, content).map_err(|e| SeedError::io_at(&mutated, e))?;

        if remove_dir_if_exists(&output)? {
            warn!(output = %output.display(), "Replaced existing mutant directory");
        }
        rename(&self.working, &output)?;
        journal.advance(SwapState::IndexedOutput)?;

        rename(&backup, &self.working)?;
        journal.complete()?;

        info!(index, output = %output.display(), file = %rel.display(), "Mutant materialized");
        Ok(output)
    }

    /// Remove `<working>_<index>` trees left by an earlier run.
    pub fn clear_indexed(&self) -> Result<usize, SeedError> {
        let stale = indexed_siblings(&self.working)?;
        for dir in &stale {
            warn!(output = %dir.display(), "Removing stale mutant directory");
            remove_dir_if_exists(dir)?;
        }
        Ok(stale.len())
    }

    /// Delete the working tree once every indexed mutant is out.
    pub fn discard(self) -> Result<(), SeedError> {
        if remove_dir_if_exists(&self.working)? {
            debug!(working = %self.working.display(), "Removed working copy");
        }
        Ok(())
    }

    fn check_target<'a>(&self, target: &'a Path) -> Result<&'a Path, SeedError> {
        target.strip_prefix(&self.working).map_err(|_| {
            SeedError::Materialize(format!(
                "{} is outside working tree {}",
                target.display(),
                self.working.display()
            ))
        })
    }
}

/// Roll back an interrupted swap for `working`, if its journal exists.
pub fn recover(working: &Path) -> Result<Option<SwapState>, SeedError> {
    match SwapJournal::load(working)? {
        Some(journal) => Ok(Some(journal.roll_back()?)),
        None => Ok(None),
    }
}

/// Copy the pristine app into a fresh destination.
pub fn prepare_destination(source: &Path, destination: &Path, force: bool) -> Result<(), SeedError> {
    if destination.exists() {
        if !force {
            return Err(SeedError::DestinationExists(destination.to_path_buf()));
        }
        warn!(destination = %destination.display(), "Removing existing destination");
        remove_dir_if_exists(destination)?;
    }
    info!(source = %source.display(), destination = %destination.display(), "Copying app tree");
    copy_dir_all(source, destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn working(dir: &TempDir) -> PathBuf {
        let working = dir.path().join("out_TapjackingSetHideOverlayWindows");
        fs::create_dir_all(working.join("src")).unwrap();
        fs::write(working.join("src/A.java"), "a(true)").unwrap();
        fs::write(working.join("src/B.java"), "b(true)").unwrap();
        working
    }

    #[test]
    fn test_persist_in_place() {
        let dir = TempDir::new().unwrap();
        let working = working(&dir);
        let m = Materializer::open(&working).unwrap();
        m.persist_in_place(&working.join("src/A.java"), "a(false)").unwrap();
        assert_eq!(fs::read_to_string(working.join("src/A.java")).unwrap(), "a(false)");
    }

    #[test]
    fn test_persist_indexed_restores_pristine_tree() {
        let dir = TempDir::new().unwrap();
        let working = working(&dir);
        let m = Materializer::open(&working).unwrap();

        let out0 = m.persist_indexed(&working.join("src/A.java"), "a(false)", 0).unwrap();
        let out1 = m.persist_indexed(&working.join("src/B.java"), "b(false)", 1).unwrap();

        assert_eq!(out0, dir.path().join("out_TapjackingSetHideOverlayWindows_0"));
        assert_eq!(fs::read_to_string(out0.join("src/A.java")).unwrap(), "a(false)");
        assert_eq!(fs::read_to_string(out0.join("src/B.java")).unwrap(), "b(true)");
        assert_eq!(fs::read_to_string(out1.join("src/A.java")).unwrap(), "a(true)");
        assert_eq!(fs::read_to_string(out1.join("src/B.java")).unwrap(), "b(false)");

        // the working tree is pristine between iterations
        assert_eq!(fs::read_to_string(working.join("src/A.java")).unwrap(), "a(true)");
        assert_eq!(fs::read_to_string(working.join("src/B.java")).unwrap(), "b(true)");
        assert!(!backup_path(&working).exists());
        assert!(!journal::journal_path(&working).exists());

        m.discard().unwrap();
        assert!(!working.exists());
        assert!(out0.exists() && out1.exists());
    }

    #[test]
    fn test_persist_indexed_replaces_existing_output() {
        let dir = TempDir::new().unwrap();
        let working = working(&dir);
        let stale = dir.path().join("out_TapjackingSetHideOverlayWindows_0");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("stale.txt"), "old").unwrap();

        let m = Materializer::open(&working).unwrap();
        let out = m.persist_indexed(&working.join("src/A.java"), "a(false)", 0).unwrap();
        assert!(!out.join("stale.txt").exists());
        assert_eq!(fs::read_to_string(out.join("src/A.java")).unwrap(), "a(false)");
    }

    #[test]
    fn test_target_outside_working_tree_is_rejected() {
        let dir = TempDir::new().unwrap();
        let working = working(&dir);
        let m = Materializer::open(&working).unwrap();
        let err = m.persist_indexed(&dir.path().join("elsewhere.java"), "x", 0).unwrap_err();
        assert!(matches!(err, SeedError::Materialize(_)));
    }

    #[test]
    fn test_open_recovers_stale_journal() {
        let dir = TempDir::new().unwrap();
        let working = working(&dir);
        let mut journal = SwapJournal::begin(&working, &with_suffix(&working, "_0"), &working.join("src/A.java"), 0).unwrap();
        copy_dir_all(&working, &backup_path(&working)).unwrap();
        journal.advance(SwapState::MutatedInPlace).unwrap();
        fs::write(working.join("src/A.java"), "half-done").unwrap();

        Materializer::open(&working).unwrap();
        assert_eq!(fs::read_to_string(working.join("src/A.java")).unwrap(), "a(true)");
        assert!(!backup_path(&working).exists());
    }

    #[test]
    fn test_clear_indexed_removes_only_mutant_siblings() {
        let dir = TempDir::new().unwrap();
        let working = working(&dir);
        for name in ["out_TapjackingSetHideOverlayWindows_0", "out_TapjackingSetHideOverlayWindows_7", "out_Other_0"] {
            fs::create_dir_all(dir.path().join(name)).unwrap();
        }
        let m = Materializer::open(&working).unwrap();
        assert_eq!(m.clear_indexed().unwrap(), 2);
        assert!(!dir.path().join("out_TapjackingSetHideOverlayWindows_0").exists());
        assert!(!dir.path().join("out_TapjackingSetHideOverlayWindows_7").exists());
        assert!(dir.path().join("out_Other_0").exists());
        assert!(working.exists());
    }

    #[test]
    fn test_prepare_destination_requires_force() {
        let dir = TempDir::new().unwrap();
        let source = working(&dir);
        let dest = dir.path().join("dest");
        prepare_destination(&source, &dest, false).unwrap();
        assert!(matches!(
            prepare_destination(&source, &dest, false),
            Err(SeedError::DestinationExists(_))
        ));
        fs::write(dest.join("extra.txt"), "x").unwrap();
        prepare_destination(&source, &dest, true).unwrap();
        assert!(!dest.join("extra.txt").exists());
    }
}
