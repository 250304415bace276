use std::fs;
use std::path::Path;
use crate::errors::SeedError;
use crate::operators::registry::expand_names;
use crate::repository::FileDiscovery;
use super::types::SeedConfig;
use tracing::{debug, warn};

const MAX_CONFIG_BYTES: u64 = 1_048_576;

pub fn parse_config(path: &Path) -> Result<SeedConfig, SeedError> {
    if !path.exists() {
        return Err(SeedError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = fs::metadata(path).map_err(|e| SeedError::io_at(path, e))?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(SeedError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = fs::read_to_string(path).map_err(|e| SeedError::io_at(path, e))?;
    let config: SeedConfig = if content.trim().is_empty() {
        warn!(path = %path.display(), "Config file is empty");
        SeedConfig::default()
    } else {
        serde_yaml::from_str(&content)?
    };

    validate_conflicts(&config)?;
    debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Detect values that cannot run together or cannot run at all.
pub fn validate_conflicts(config: &SeedConfig) -> Result<(), SeedError> {
    if let Some(operators) = &config.operators {
        expand_names(operators)?;
    }

    if config.single == Some(true) && config.all_mutants == Some(true) {
        return Err(SeedError::Config(
            "single and all_mutants cannot both be enabled".into(),
        ));
    }

    if let Some(exclude) = config.exclude_dirs() {
        FileDiscovery::new(exclude)?;
    }

    Ok(())
}
