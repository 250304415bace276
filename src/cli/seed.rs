use std::path::PathBuf;
use crate::cli::commands::SeedArgs;
use crate::config::{self, SeedConfig};
use crate::errors::SeedError;
use crate::operators::registry::split_names;
use crate::pipeline::{MutationOrchestrator, PipelineConfig};
use tracing::info;

pub fn handle_seed(args: SeedArgs) -> Result<(), SeedError> {
    info!(source = %args.source, destination = %args.destination, "Seeding vulnerabilities");

    let file_config = match &args.config {
        Some(path) => Some(config::parse_config(&PathBuf::from(path))?),
        None => None,
    };

    let pipeline_config = build_pipeline_config(&args, file_config.as_ref())?;
    let mut orchestrator = MutationOrchestrator::new(pipeline_config)?;
    let result = orchestrator.run()?;

    print!("{}", result.report.render());

    info!(
        mutated = result.summary.mutated(),
        skipped = result.summary.skipped(),
        "Seeding completed"
    );
    for output in result.summary.outputs() {
        info!(output = %output.display(), "Mutant tree");
    }
    Ok(())
}

/// Command-line values win over the config file.
pub fn build_pipeline_config(args: &SeedArgs, file_config: Option<&SeedConfig>) -> Result<PipelineConfig, SeedError> {
    let operators = match (&args.operators, file_config.and_then(|c| c.operators.clone())) {
        (Some(list), _) => split_names(list),
        (None, Some(list)) => list,
        (None, None) => {
            return Err(SeedError::Config(
                "No operators given: pass --operators or set `operators` in the config file".into(),
            ))
        }
    };

    let mut config = PipelineConfig::new(
        PathBuf::from(&args.source),
        PathBuf::from(&args.destination),
        operators,
    );

    let from_file = |pick: fn(&SeedConfig) -> Option<bool>| file_config.and_then(pick).unwrap_or(false);
    config.single = args.single || from_file(|c| c.single);
    config.all_mutants = args.all_mutants || from_file(|c| c.all_mutants);
    config.comment_mutations = args.comment_mutations || from_file(|c| c.comment_mutations);
    config.seed = args.seed.or_else(|| file_config.and_then(|c| c.seed));
    config.force = args.force;

    if let Some(exclude) = file_config.and_then(|c| c.exclude_dirs()) {
        config.exclude_dirs = exclude.to_vec();
    }
    config.report_path = args
        .report
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| file_config.and_then(|c| c.report_path().cloned()));

    if config.single && config.all_mutants {
        return Err(SeedError::Config("single and all_mutants cannot both be enabled".into()));
    }

    Ok(config)
}
