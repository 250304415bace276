use std::path::{Path, PathBuf};
use crate::errors::SeedError;
use super::discovery::{has_extension, is_manifest, FileDiscovery};
use super::{ArtifactKind, ArtifactRepository};

/// XML resources (layouts, values, ...) of an app tree. The manifest is
/// never treated as a resource.
pub struct ResourceRepository {
    root: PathBuf,
    discovery: FileDiscovery,
    files: Option<Vec<PathBuf>>,
}

impl ResourceRepository {
    pub fn new(root: &Path, discovery: FileDiscovery) -> Self {
        Self {
            root: root.to_path_buf(),
            discovery,
            files: None,
        }
    }
}

impl ArtifactRepository for ResourceRepository {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Resource
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn find_files(&mut self) -> Result<&[PathBuf], SeedError> {
        if self.files.is_none() {
            let found = self
                .discovery
                .walk(&self.root, |p| has_extension(p, "xml") && !is_manifest(p))?;
            self.files = Some(found);
        }
        Ok(self.files.as_deref().unwrap_or_default())
    }
}
