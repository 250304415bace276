use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("XML parse error in {path}: {message}")]
    Xml { path: PathBuf, message: String },

    /// A component landed in an export class the running operator cannot mutate.
    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Materialize error: {0}")]
    Materialize(String),

    #[error("Operator error: {0}")]
    Operator(String),

    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SeedError {
    /// Attach the offending path to an I/O failure.
    pub fn io_at(path: &std::path::Path, err: std::io::Error) -> Self {
        SeedError::Io(std::io::Error::new(
            err.kind(),
            format!("{}: {}", path.display(), err),
        ))
    }
}
