use std::path::PathBuf;
use crate::cli::commands::RecoverArgs;
use crate::errors::SeedError;
use crate::materializer::recover;
use tracing::info;

pub fn handle_recover(args: RecoverArgs) -> Result<(), SeedError> {
    let working = PathBuf::from(&args.working_dir);
    match recover(&working)? {
        Some(state) => {
            info!(working = %working.display(), state = ?state, "Rolled back interrupted materialization");
            println!("Restored {} (interrupted in state {:?})", working.display(), state);
        }
        None => println!("Nothing to recover for {}", working.display()),
    }
    Ok(())
}
