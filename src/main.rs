use clap::Parser;
use seed_vulns::{cli, config, errors};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        cli::Commands::Seed(args) => cli::seed::handle_seed(args),
        cli::Commands::Operators => cli::operators::handle_operators(),
        cli::Commands::Recover(args) => cli::recover::handle_recover(args),
        cli::Commands::Validate(args) => handle_validate(args),
    };

    if let Err(e) = result {
        let classification = e.classify();
        error!(error_type = classification.error_type, "{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(classification.exit_code);
    }
}

fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), errors::SeedError> {
    let path = std::path::PathBuf::from(&args.config);
    let _config = config::parse_config(&path)?;
    println!("Configuration is valid: {}", args.config);
    Ok(())
}
