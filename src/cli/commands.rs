use clap::{Parser, Subcommand, Args};

#[derive(Parser)]
#[command(name = "seed-vulns", version, about = "Seed known vulnerabilities into Android app trees")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy an app and inject vulnerabilities into the copy
    Seed(SeedArgs),
    /// List available mutation operators
    Operators,
    /// Restore a working tree left behind by an interrupted run
    Recover(RecoverArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct SeedArgs {
    /// Directory holding the original app
    pub source: String,

    /// Where the mutated app is written
    pub destination: String,

    /// Comma-separated list of mutation operators
    #[arg(long)]
    pub operators: Option<String>,

    /// Output one higher-order mutant containing all mutations
    #[arg(short, long, conflicts_with = "all_mutants")]
    pub single: bool,

    /// Output one mutant per candidate site instead of one random pick
    #[arg(short, long)]
    pub all_mutants: bool,

    /// Leave a marker comment next to every mutated site
    #[arg(short, long)]
    pub comment_mutations: bool,

    /// Seed for candidate selection and secret generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// YAML configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Also write the report to this file
    #[arg(long)]
    pub report: Option<String>,

    /// Replace existing output directories
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Clone)]
pub struct RecoverArgs {
    /// Working tree of the interrupted run (e.g. out_ImproperExport)
    pub working_dir: String,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}
