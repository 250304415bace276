use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// Optional run configuration, loaded from YAML. Every field may be
/// overridden from the command line.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SeedConfig {
    pub operators: Option<Vec<String>>,
    pub single: Option<bool>,
    pub all_mutants: Option<bool>,
    pub comment_mutations: Option<bool>,
    pub seed: Option<u64>,
    pub discovery: Option<DiscoveryConfig>,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Glob patterns matched against directory names.
    pub exclude_dirs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    pub path: Option<PathBuf>,
}

impl SeedConfig {
    pub fn exclude_dirs(&self) -> Option<&[String]> {
        self.discovery.as_ref()?.exclude_dirs.as_deref()
    }

    pub fn report_path(&self) -> Option<&PathBuf> {
        self.report.as_ref()?.path.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_deserializes() {
        let yaml = r#"
operators: [ImproperExport, PlaintextHttp]
single: false
all_mutants: false
comment_mutations: true
seed: 42
discovery:
  exclude_dirs: [".git", ".gradle", "build"]
report:
  path: ./report.txt
"#;
        let config: SeedConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.operators.as_deref().unwrap().len(), 2);
        assert_eq!(config.comment_mutations, Some(true));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.exclude_dirs().unwrap(), [".git", ".gradle", "build"]);
        assert_eq!(config.report_path().unwrap(), &PathBuf::from("./report.txt"));
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: SeedConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SeedConfig::default());
        assert!(config.exclude_dirs().is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(serde_yaml::from_str::<SeedConfig>("operatorz: [A]").is_err());
    }
}
