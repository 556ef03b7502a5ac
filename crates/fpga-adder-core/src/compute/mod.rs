//! Host-side computation: the CPU reference and its parallel thresholds.

pub mod reference;
pub mod thresholds;

pub use reference::{add_scalar, add_scalar_with, software_reference};
pub use thresholds::{get_parallel_config, ParallelThresholdsBuilder, ParallelThresholdsConfig};
