use std::path::{Path, PathBuf};
use crate::errors::SeedError;
use crate::manifest::ManifestDocument;
use super::discovery::{is_manifest, FileDiscovery};
use super::{ArtifactKind, ArtifactRepository};
use tracing::debug;

/// Owns the app's `AndroidManifest.xml` and its parsed form.
///
/// Every write to the manifest re-parses it, so element ids and export
/// reasons taken before a write must not be reused after it.
pub struct ManifestRepository {
    root: PathBuf,
    files: Vec<PathBuf>,
    document: ManifestDocument,
}

impl ManifestRepository {
    /// Locate the first `AndroidManifest.xml` under `root` and parse it.
    pub fn open(root: &Path, discovery: &FileDiscovery) -> Result<Self, SeedError> {
        let path = discovery
            .find_first(root, is_manifest)?
            .ok_or_else(|| {
                SeedError::Manifest(format!("No AndroidManifest.xml found under {}", root.display()))
            })?;
        let document = ManifestDocument::load(&path)?;
        document.application()?;
        Ok(Self {
            root: root.to_path_buf(),
            files: vec![path],
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.files[0]
    }

    pub fn document(&self) -> &ManifestDocument {
        &self.document
    }
}

impl ArtifactRepository for ManifestRepository {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Manifest
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn find_files(&mut self) -> Result<&[PathBuf], SeedError> {
        Ok(&self.files)
    }

    fn write(&mut self, path: &Path, content: &str) -> Result<(), SeedError> {
        std::fs::write(path, content).map_err(|e| SeedError::io_at(path, e))?;
        if path == self.path() {
            self.reload()?;
        }
        Ok(())
    }

    fn reload(&mut self) -> Result<(), SeedError> {
        self.document = ManifestDocument::load(self.path())?;
        debug!(path = %self.path().display(), elements = self.document.elements().len(), "Re-parsed manifest");
        Ok(())
    }
}
