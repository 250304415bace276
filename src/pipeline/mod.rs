pub mod orchestrator;
pub mod report;
pub mod state;

pub use orchestrator::MutationOrchestrator;
pub use report::MutationReport;
pub use state::{PipelineConfig, RunResult, RunSummary};
