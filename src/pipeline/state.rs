use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::operators::{MutationOutcome, OperatorName};
use crate::repository::discovery::DEFAULT_EXCLUDE_DIRS;
use super::report::MutationReport;

/// Everything one `seed` run needs, after merging the config file and the
/// command line.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub operators: Vec<String>,
    /// One higher-order mutant in `destination` instead of one tree per operator.
    pub single: bool,
    pub all_mutants: bool,
    pub comment_mutations: bool,
    pub seed: Option<u64>,
    pub exclude_dirs: Vec<String>,
    pub report_path: Option<PathBuf>,
    pub force: bool,
}

impl PipelineConfig {
    pub fn new(source: PathBuf, destination: PathBuf, operators: Vec<String>) -> Self {
        Self {
            source,
            destination,
            operators,
            single: false,
            all_mutants: false,
            comment_mutations: false,
            seed: None,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            report_path: None,
            force: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorStatus {
    Mutated,
    NoCandidates,
    AlreadyVulnerable,
}

impl From<&MutationOutcome> for OperatorStatus {
    fn from(outcome: &MutationOutcome) -> Self {
        match outcome {
            MutationOutcome::Mutated { .. } => Self::Mutated,
            MutationOutcome::NoCandidates => Self::NoCandidates,
            MutationOutcome::AlreadyVulnerable => Self::AlreadyVulnerable,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorRun {
    pub operator: OperatorName,
    pub status: OperatorStatus,
    pub outputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub runs: Vec<OperatorRun>,
}

impl RunSummary {
    pub fn record(&mut self, operator: OperatorName, outcome: &MutationOutcome) {
        let outputs = match outcome {
            MutationOutcome::Mutated { outputs, .. } => outputs.clone(),
            _ => Vec::new(),
        };
        self.runs.push(OperatorRun {
            operator,
            status: outcome.into(),
            outputs,
        });
    }

    pub fn mutated(&self) -> usize {
        self.count(OperatorStatus::Mutated)
    }

    pub fn skipped(&self) -> usize {
        self.runs.len() - self.mutated()
    }

    pub fn count(&self, status: OperatorStatus) -> usize {
        self.runs.iter().filter(|r| r.status == status).count()
    }

    /// Distinct output trees, in the order they were produced.
    pub fn outputs(&self) -> Vec<PathBuf> {
        let mut seen: Vec<PathBuf> = Vec::new();
        for output in self.runs.iter().flat_map(|r| &r.outputs) {
            if !seen.contains(output) {
                seen.push(output.clone());
            }
        }
        seen
    }
}

#[derive(Debug)]
pub struct RunResult {
    pub report: MutationReport,
    pub summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::default();
        let dest = PathBuf::from("/tmp/dest");
        summary.record(
            OperatorName::ImproperExport,
            &MutationOutcome::Mutated { report: String::new(), outputs: vec![dest.clone()] },
        );
        summary.record(
            OperatorName::PlaintextHttp,
            &MutationOutcome::Mutated { report: String::new(), outputs: vec![dest.clone()] },
        );
        summary.record(OperatorName::DebuggableApplication, &MutationOutcome::AlreadyVulnerable);
        summary.record(OperatorName::HardcodedSecret, &MutationOutcome::NoCandidates);

        assert_eq!(summary.mutated(), 2);
        assert_eq!(summary.skipped(), 2);
        assert_eq!(summary.count(OperatorStatus::AlreadyVulnerable), 1);
        assert_eq!(summary.outputs(), vec![dest]);
    }

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::new("src".into(), "dst".into(), vec!["ImproperExport".into()]);
        assert!(!config.single && !config.all_mutants && !config.force);
        assert!(config.exclude_dirs.iter().any(|d| d == "build"));
    }
}
