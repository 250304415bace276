pub mod discovery;
pub mod source;
pub mod resource;
pub mod manifest;

use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::errors::SeedError;
use tracing::{debug, info, warn};

pub use discovery::{FileDiscovery, MANIFEST_FILE};
pub use manifest::ManifestRepository;
pub use resource::ResourceRepository;
pub use source::{SourceLanguage, SourceRepository};

/// The kind of artifact an operator mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Manifest,
    Source,
    Resource,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::Manifest, Self::Source, Self::Resource];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::Source => "source",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A located, not yet mutated injection site.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub file_path: PathBuf,
    pub pattern: Option<Regex>,
    pub matched_excerpt: String,
    /// Byte range of the excerpt in the file content it was matched against.
    pub span: Range<usize>,
}

impl Candidate {
    pub fn pattern_str(&self) -> &str {
        self.pattern.as_ref().map_or("<none>", |p| p.as_str())
    }

    /// An edit replacing exactly this candidate's excerpt.
    pub fn edit(&self, replacement: String) -> Edit {
        Edit {
            span: self.span.clone(),
            original: self.matched_excerpt.clone(),
            replacement,
        }
    }
}

/// A single splice into a file: `original` at `span` becomes `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Range<usize>,
    pub original: String,
    pub replacement: String,
}

impl Edit {
    /// Apply to `content`, touching only the located occurrence.
    ///
    /// The recorded span wins when it still holds the original text;
    /// otherwise the first occurrence of the original is replaced.
    pub fn apply(&self, content: &str) -> Result<String, SeedError> {
        let span = if content.get(self.span.clone()) == Some(self.original.as_str()) {
            self.span.clone()
        } else {
            let start = content.find(&self.original).ok_or_else(|| {
                SeedError::Operator(format!(
                    "Excerpt no longer present in file content: {:?}",
                    self.original
                ))
            })?;
            start..start + self.original.len()
        };

        let mut out = String::with_capacity(content.len() + self.replacement.len());
        out.push_str(&content[..span.start]);
        out.push_str(&self.replacement);
        out.push_str(&content[span.end..]);
        Ok(out)
    }
}

/// File discovery and raw read/write over one artifact kind of an app tree.
pub trait ArtifactRepository {
    fn kind(&self) -> ArtifactKind;

    fn root(&self) -> &Path;

    /// Files of this kind, discovered once and cached.
    fn find_files(&mut self) -> Result<&[PathBuf], SeedError>;

    fn read(&self, path: &Path) -> Result<String, SeedError> {
        fs::read_to_string(path).map_err(|e| SeedError::io_at(path, e))
    }

    fn write(&mut self, path: &Path, content: &str) -> Result<(), SeedError> {
        fs::write(path, content).map_err(|e| SeedError::io_at(path, e))?;
        debug!(file = %path.display(), bytes = content.len(), "Wrote artifact");
        Ok(())
    }

    /// Drop any in-memory view derived from file content. Called after the
    /// materializer swapped the tree underneath the repository.
    fn reload(&mut self) -> Result<(), SeedError> {
        Ok(())
    }

    /// One candidate per (file, pattern) pair that matches, in file then
    /// pattern order. The excerpt is the pattern's first match.
    fn match_files(&mut self, patterns: &[Regex]) -> Result<Vec<Candidate>, SeedError> {
        let files = self.find_files()?.to_vec();
        let mut candidates = Vec::new();
        for file in files {
            let content = match self.read(&file) {
                Ok(c) => c,
                Err(SeedError::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                    warn!(file = %file.display(), "Skipping non UTF-8 file");
                    continue;
                }
                Err(e) => return Err(e),
            };
            for pattern in patterns {
                if let Some(m) = pattern.find(&content) {
                    candidates.push(Candidate {
                        file_path: file.clone(),
                        pattern: Some(pattern.clone()),
                        matched_excerpt: m.as_str().to_string(),
                        span: m.range(),
                    });
                }
            }
        }
        Ok(candidates)
    }
}

/// The repositories of one destination tree, created on first use.
pub struct RepositorySet {
    root: PathBuf,
    discovery: FileDiscovery,
    manifest: Option<ManifestRepository>,
    source: Option<SourceRepository>,
    resource: Option<ResourceRepository>,
}

impl RepositorySet {
    pub fn new(root: &Path, discovery: FileDiscovery) -> Self {
        Self {
            root: root.to_path_buf(),
            discovery,
            manifest: None,
            source: None,
            resource: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the repository for `kind` if needed and log what it found.
    pub fn ensure(&mut self, kind: ArtifactKind) -> Result<(), SeedError> {
        let root = self.root.clone();
        let repo = self.get(kind)?;
        let files = repo.find_files()?;
        info!(kind = %kind, root = %root.display(), count = files.len(), "Artifact repository ready");
        for file in files {
            debug!(kind = %kind, file = %file.display(), "Artifact file");
        }
        Ok(())
    }

    pub fn get(&mut self, kind: ArtifactKind) -> Result<&mut dyn ArtifactRepository, SeedError> {
        let repo: &mut dyn ArtifactRepository = match kind {
            ArtifactKind::Manifest => self.manifest()?,
            ArtifactKind::Source => self.source(),
            ArtifactKind::Resource => self.resource(),
        };
        Ok(repo)
    }

    pub fn manifest(&mut self) -> Result<&mut ManifestRepository, SeedError> {
        if self.manifest.is_none() {
            let repo = ManifestRepository::open(&self.root, &self.discovery)?;
            info!(path = %repo.path().display(), "Parsed manifest");
            self.manifest = Some(repo);
        }
        self.manifest
            .as_mut()
            .ok_or_else(|| SeedError::Internal("manifest repository missing after open".into()))
    }

    pub fn source(&mut self) -> &mut SourceRepository {
        let (root, discovery) = (&self.root, &self.discovery);
        self.source
            .get_or_insert_with(|| SourceRepository::new(root, discovery.clone()))
    }

    pub fn resource(&mut self) -> &mut ResourceRepository {
        let (root, discovery) = (&self.root, &self.discovery);
        self.resource
            .get_or_insert_with(|| ResourceRepository::new(root, discovery.clone()))
    }
}
