use std::fs;
use std::path::Path;
use chrono::{DateTime, SecondsFormat, Utc};
use crate::errors::SeedError;
use tracing::info;

const BUILD_HASH: Option<&str> = option_env!("SEED_VULNS_GIT_HASH");

/// Append-only sequence of operator report blocks, rendered once at the
/// end of a run.
#[derive(Debug, Clone)]
pub struct MutationReport {
    generated_at: DateTime<Utc>,
    blocks: Vec<String>,
}

impl MutationReport {
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: &str) {
        self.blocks.push(block.to_string());
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("\n========== Mutation Report ==========\n");
        out.push_str(&format!(
            "seed-vulns {} (build {}) at {}\n",
            env!("CARGO_PKG_VERSION"),
            BUILD_HASH.unwrap_or("unknown"),
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        for block in &self.blocks {
            out.push_str(block);
        }
        out
    }

    pub fn write_to(&self, path: &Path) -> Result<(), SeedError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SeedError::io_at(parent, e))?;
        }
        fs::write(path, self.render()).map_err(|e| SeedError::io_at(path, e))?;
        info!(path = %path.display(), blocks = self.blocks.len(), "Report written");
        Ok(())
    }
}
