use super::types::SeedError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub exit_code: i32,
}

impl SeedError {
    /// Classify this error to determine its type and the process exit code.
    ///
    /// Every error is fatal for the run; the code only tells the caller
    /// which stage gave up.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            SeedError::Config(_) | SeedError::Yaml(_) | SeedError::Regex(_) => ErrorClassification {
                error_type: "ConfigError",
                exit_code: 2,
            },
            SeedError::Manifest(_) | SeedError::Xml { .. } => ErrorClassification {
                error_type: "ManifestError",
                exit_code: 3,
            },
            SeedError::Io(_) | SeedError::Walk(_) | SeedError::DestinationExists(_) => ErrorClassification {
                error_type: "FileSystemError",
                exit_code: 4,
            },
            SeedError::Materialize(_) => ErrorClassification {
                error_type: "MaterializeError",
                exit_code: 4,
            },
            SeedError::Classification(_) => ErrorClassification {
                error_type: "ClassificationError",
                exit_code: 1,
            },
            SeedError::Operator(_) => ErrorClassification {
                error_type: "OperatorError",
                exit_code: 1,
            },
            SeedError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                exit_code: 1,
            },
            SeedError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                exit_code: 1,
            },
        }
    }
}
