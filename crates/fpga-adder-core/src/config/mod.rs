//! Configuration of an adder run.

pub mod run_config;
pub mod target;

// Re-export key items
pub use run_config::{AdderConfig, AdderConfigBuilder, BackendPreference, InputPattern};
pub use target::TargetMode;
