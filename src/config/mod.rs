pub mod error;
pub mod run_config;
