use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::errors::SeedError;
use super::fs_ops::{remove_dir_if_exists, rename, with_suffix};
use tracing::{info, warn};

const JOURNAL_SUFFIX: &str = ".seed-vulns-journal.json";
const BACKUP_SUFFIX: &str = ".seed-vulns-backup";

/// Where one candidate iteration of the backup/swap sequence stands.
///
/// `Pristine -> MutatedInPlace -> IndexedOutput -> Pristine`. The journal
/// is written before each transition's file-system work starts, so the
/// recorded state is the one to undo after a crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapState {
    /// Backup is being taken; the working tree is untouched.
    Pristine,
    /// Backup is complete; the working tree may hold the mutation.
    MutatedInPlace,
    /// The working tree became the indexed output; backup awaits restore.
    IndexedOutput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapJournal {
    pub state: SwapState,
    pub working: PathBuf,
    pub backup: PathBuf,
    pub output: PathBuf,
    pub target: PathBuf,
    pub index: usize,
    pub updated_at: DateTime<Utc>,
}

impl SwapJournal {
    pub fn begin(working: &Path, output: &Path, target: &Path, index: usize) -> Result<Self, SeedError> {
        let journal = Self {
            state: SwapState::Pristine,
            working: working.to_path_buf(),
            backup: backup_path(working),
            output: output.to_path_buf(),
            target: target.to_path_buf(),
            index,
            updated_at: Utc::now(),
        };
        journal.store()?;
        Ok(journal)
    }

    pub fn advance(&mut self, state: SwapState) -> Result<(), SeedError> {
        self.state = state;
        self.updated_at = Utc::now();
        self.store()
    }

    pub fn load(working: &Path) -> Result<Option<Self>, SeedError> {
        let path = journal_path(working);
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SeedError::io_at(&path, e)),
        }
    }

    pub fn complete(self) -> Result<(), SeedError> {
        clear(&self.working)
    }

    fn store(&self) -> Result<(), SeedError> {
        let path = journal_path(&self.working);
        let tmp = with_suffix(&path, ".tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?).map_err(|e| SeedError::io_at(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| SeedError::io_at(&path, e))
    }

    /// Undo a half-finished iteration so `working` is pristine again.
    pub fn roll_back(self) -> Result<SwapState, SeedError> {
        warn!(
            working = %self.working.display(),
            state = ?self.state,
            index = self.index,
            "Recovering interrupted materialization"
        );
        match self.state {
            SwapState::Pristine => {
                remove_dir_if_exists(&self.backup)?;
            }
            SwapState::MutatedInPlace => {
                if !self.backup.is_dir() {
                    return Err(SeedError::Materialize(format!(
                        "journal says backup {} is complete but it is missing",
                        self.backup.display()
                    )));
                }
                remove_dir_if_exists(&self.working)?;
                rename(&self.backup, &self.working)?;
            }
            SwapState::IndexedOutput => {
                if self.working.is_dir() {
                    remove_dir_if_exists(&self.backup)?;
                } else {
                    rename(&self.backup, &self.working)?;
                }
            }
        }
        let state = self.state;
        clear(&self.working)?;
        info!(working = %self.working.display(), "Working tree restored");
        Ok(state)
    }
}

pub fn journal_path(working: &Path) -> PathBuf {
    with_suffix(working, JOURNAL_SUFFIX)
}

pub fn backup_path(working: &Path) -> PathBuf {
    with_suffix(working, BACKUP_SUFFIX)
}

fn clear(working: &Path) -> Result<(), SeedError> {
    let path = journal_path(working);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SeedError::io_at(&path, e)),
    }
}
