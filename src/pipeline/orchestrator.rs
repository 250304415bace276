use std::path::{Path, PathBuf};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::errors::SeedError;
use crate::materializer::fs_ops::{indexed_output, overlaps, resolve_path, with_suffix};
use crate::materializer::journal::backup_path;
use crate::materializer::{prepare_destination, Materializer};
use crate::operators::{resolve_operators, MutationContext, MutationOptions, MutationOutcome, Operator};
use crate::repository::{ArtifactKind, FileDiscovery, RepositorySet};
use super::report::MutationReport;
use super::state::{PipelineConfig, RunResult, RunSummary};
use tracing::{info, warn};

/// Drives the sequential mutation loop over the requested operators.
pub struct MutationOrchestrator {
    config: PipelineConfig,
    operators: Vec<Box<dyn Operator>>,
    discovery: FileDiscovery,
    rng: StdRng,
}

impl MutationOrchestrator {
    pub fn new(config: PipelineConfig) -> Result<Self, SeedError> {
        if !config.source.is_dir() {
            return Err(SeedError::Config(format!(
                "Source path is not a directory: {}",
                config.source.display()
            )));
        }
        if config.single && config.all_mutants {
            return Err(SeedError::Config("--single and --all-mutants cannot be combined".into()));
        }

        let operators = resolve_operators(&config.operators)?;
        check_outputs(&config, &operators)?;
        let discovery = FileDiscovery::new(&config.exclude_dirs)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            source = %config.source.display(),
            destination = %config.destination.display(),
            operators = ?operators.iter().map(|o| o.name().as_str()).collect::<Vec<_>>(),
            single = config.single,
            all_mutants = config.all_mutants,
            "Orchestrator ready"
        );

        Ok(Self {
            config,
            operators,
            discovery,
            rng,
        })
    }

    fn options(&self) -> MutationOptions {
        MutationOptions {
            comment_mutations: self.config.comment_mutations,
            all_mutants: self.config.all_mutants,
        }
    }

    pub fn run(&mut self) -> Result<RunResult, SeedError> {
        let mut report = MutationReport::new(Utc::now());
        let mut summary = RunSummary::default();

        if self.config.single {
            self.run_single(&mut report, &mut summary)?;
        } else {
            self.run_multi(&mut report, &mut summary)?;
        }

        info!(
            mutated = summary.mutated(),
            skipped = summary.skipped(),
            outputs = summary.outputs().len(),
            "Mutation run finished"
        );
        if let Some(path) = &self.config.report_path {
            report.write_to(path)?;
        }
        Ok(RunResult { report, summary })
    }

    /// Every operator compounds onto the one destination tree.
    fn run_single(&mut self, report: &mut MutationReport, summary: &mut RunSummary) -> Result<(), SeedError> {
        let destination = self.config.destination.clone();
        let materializer = Materializer::open(&destination)?;
        prepare_destination(&self.config.source, &destination, self.config.force)?;

        let mut repos = RepositorySet::new(&destination, self.discovery.clone());
        for kind in ArtifactKind::ALL {
            if self.operators.iter().any(|o| o.artifact_kind() == kind) {
                repos.ensure(kind)?;
            }
        }

        let options = self.options();
        for operator in &self.operators {
            let mut ctx = MutationContext {
                options,
                rng: &mut self.rng,
                materializer: &materializer,
            };
            info!(operator = %operator.name(), "Applying operator");
            let outcome = operator.mutate(&mut repos, &mut ctx)?;
            log_outcome(operator.as_ref(), &outcome);
            if let Some(block) = outcome.report() {
                report.push(block);
            }
            summary.record(operator.name(), &outcome);
        }
        Ok(())
    }

    /// Each operator gets its own `<dest>_<OperatorName>` copy of the source.
    fn run_multi(&mut self, report: &mut MutationReport, summary: &mut RunSummary) -> Result<(), SeedError> {
        let options = self.options();
        for operator in &self.operators {
            let working = with_suffix(&self.config.destination, &format!("_{}", operator.name()));
            info!(operator = %operator.name(), working = %working.display(), "Applying operator");

            let materializer = Materializer::open(&working)?;
            if self.config.force {
                materializer.clear_indexed()?;
            }
            prepare_destination(&self.config.source, &working, self.config.force)?;
            let mut repos = RepositorySet::new(&working, self.discovery.clone());
            repos.ensure(operator.artifact_kind())?;

            let mut ctx = MutationContext {
                options,
                rng: &mut self.rng,
                materializer: &materializer,
            };
            let outcome = operator.mutate(&mut repos, &mut ctx)?;
            log_outcome(operator.as_ref(), &outcome);

            if !outcome.is_mutated() {
                discard(materializer, &working, "Removed unmutated copy")?;
            } else if options.all_mutants {
                discard(materializer, &working, "Removed working copy after last mutant")?;
            }

            if let Some(block) = outcome.report() {
                report.push(block);
            }
            summary.record(operator.name(), &outcome);
        }
        Ok(())
    }
}

/// Working trees the run will create or remove, one per operator in multi mode.
fn working_paths(config: &PipelineConfig, operators: &[Box<dyn Operator>]) -> Vec<PathBuf> {
    if config.single {
        return vec![config.destination.clone()];
    }
    operators
        .iter()
        .map(|o| with_suffix(&config.destination, &format!("_{}", o.name())))
        .collect()
}

/// No output may equal, contain or sit inside the source tree.
fn check_outputs(config: &PipelineConfig, operators: &[Box<dyn Operator>]) -> Result<(), SeedError> {
    let source = resolve_path(&config.source)?;
    let clash = |output: &Path| {
        SeedError::Config(format!(
            "Output {} overlaps source {}",
            output.display(),
            config.source.display()
        ))
    };

    for working in working_paths(config, operators) {
        let resolved = resolve_path(&working)?;
        if overlaps(&resolved, &source) {
            return Err(clash(&working));
        }
        if overlaps(&backup_path(&resolved), &source) {
            return Err(clash(&backup_path(&working)));
        }
        if let Some(index) = source.ancestors().find_map(|a| indexed_output(&resolved, a)) {
            return Err(clash(&with_suffix(&working, &format!("_{index}"))));
        }
    }
    if let Some(report) = &config.report_path {
        if resolve_path(report)?.starts_with(&source) {
            return Err(clash(report));
        }
    }
    Ok(())
}

fn discard(materializer: Materializer, working: &Path, message: &str) -> Result<(), SeedError> {
    materializer.discard()?;
    info!(working = %working.display(), "{message}");
    Ok(())
}

fn log_outcome(operator: &dyn Operator, outcome: &MutationOutcome) {
    match outcome {
        MutationOutcome::Mutated { outputs, .. } => {
            info!(operator = %operator.name(), outputs = outputs.len(), "Operator mutated the app");
        }
        MutationOutcome::NoCandidates => {
            warn!(operator = %operator.name(), "No candidates found, nothing mutated");
        }
        MutationOutcome::AlreadyVulnerable => {
            info!(operator = %operator.name(), "Already vulnerable, nothing mutated");
        }
    }
}
