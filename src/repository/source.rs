use std::path::{Path, PathBuf};
use crate::errors::SeedError;
use super::discovery::{has_extension, FileDiscovery};
use super::{ArtifactKind, ArtifactRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    Java,
    Kotlin,
}

impl SourceLanguage {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Kotlin => "kt",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        [Self::Java, Self::Kotlin]
            .into_iter()
            .find(|lang| has_extension(path, lang.extension()))
    }
}

/// `.java` and `.kt` files of an app tree.
pub struct SourceRepository {
    root: PathBuf,
    discovery: FileDiscovery,
    files: Option<Vec<PathBuf>>,
}

impl SourceRepository {
    pub fn new(root: &Path, discovery: FileDiscovery) -> Self {
        Self {
            root: root.to_path_buf(),
            discovery,
            files: None,
        }
    }
}

impl ArtifactRepository for SourceRepository {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Source
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn find_files(&mut self) -> Result<&[PathBuf], SeedError> {
        if self.files.is_none() {
            let found = self
                .discovery
                .walk(&self.root, |p| SourceLanguage::from_path(p).is_some())?;
            self.files = Some(found);
        }
        Ok(self.files.as_deref().unwrap_or_default())
    }
}
