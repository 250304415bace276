pub mod types;
pub mod classification;

pub use types::SeedError;
pub use classification::ErrorClassification;
