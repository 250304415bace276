pub mod cli;
pub mod config;
pub mod errors;
pub mod manifest;
pub mod materializer;
pub mod operators;
pub mod pipeline;
pub mod repository;
