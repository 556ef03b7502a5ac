//! Thresholds for switching the CPU reference to parallel execution.
//!
//! The adder is one add per element, so parallelism only pays off for
//! buffers far larger than the default run.

use std::sync::OnceLock;

/// Global configuration for parallel thresholds
static GLOBAL_CONFIG: OnceLock<ParallelThresholdsConfig> = OnceLock::new();

/// Configuration for parallel execution thresholds
#[derive(Debug, Clone)]
pub struct ParallelThresholdsConfig {
    /// Minimum element count for a parallel elementwise pass
    pub vector_threshold: usize,

    /// Number of available threads (cached)
    pub num_threads: usize,

    /// Minimum chunk size for parallel iteration
    pub min_chunk_size: usize,
}

impl Default for ParallelThresholdsConfig {
    fn default() -> Self {
        let num_threads = rayon::current_num_threads();

        // More threads = higher spawn overhead = need larger buffers
        let base_vector = 65_536;
        let thread_scaling = (num_threads as f64).sqrt();

        Self {
            vector_threshold: (base_vector as f64 * thread_scaling) as usize,
            num_threads,
            min_chunk_size: 8192,
        }
    }
}

/// Builder for customizing parallel thresholds
#[derive(Debug, Default)]
pub struct ParallelThresholdsBuilder {
    config: ParallelThresholdsConfig,
}

impl ParallelThresholdsBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set vector operation threshold
    pub fn vector_threshold(mut self, threshold: usize) -> Self {
        self.config.vector_threshold = threshold;
        self
    }

    /// Set minimum chunk size
    pub fn min_chunk_size(mut self, size: usize) -> Self {
        self.config.min_chunk_size = size.max(1);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ParallelThresholdsConfig {
        self.config
    }
}

impl ParallelThresholdsConfig {
    /// Check if an elementwise pass of given size should be parallel
    pub fn should_parallelize(&self, size: usize) -> bool {
        size >= self.vector_threshold && self.num_threads > 1
    }

    /// Chunk size for a parallel pass over `total_size` elements
    pub fn optimal_chunk_size(&self, total_size: usize) -> usize {
        let ideal_chunks = self.num_threads * 4;
        total_size
            .div_ceil(ideal_chunks.max(1))
            .max(self.min_chunk_size)
            .max(1)
    }
}

/// Get the global parallel thresholds configuration
pub fn get_parallel_config() -> &'static ParallelThresholdsConfig {
    GLOBAL_CONFIG.get_or_init(ParallelThresholdsConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_run_stays_sequential() {
        let config = ParallelThresholdsConfig::default();
        assert!(!config.should_parallelize(4096));
    }

    #[test]
    fn test_single_thread_never_parallel() {
        let config = ParallelThresholdsConfig {
            vector_threshold: 10,
            num_threads: 1,
            min_chunk_size: 1,
        };
        assert!(!config.should_parallelize(1_000_000));
    }

    #[test]
    fn test_chunk_size_calculation() {
        let config = ParallelThresholdsConfig {
            vector_threshold: 10,
            num_threads: 4,
            min_chunk_size: 100,
        };
        assert_eq!(config.optimal_chunk_size(1000), 100);
        assert_eq!(config.optimal_chunk_size(160_000), 10_000);
    }

    #[test]
    fn test_chunk_size_never_zero() {
        let config = ParallelThresholdsConfig {
            vector_threshold: 0,
            num_threads: 4,
            min_chunk_size: 0,
        };
        assert_eq!(config.optimal_chunk_size(0), 1);
        assert_eq!(config.optimal_chunk_size(3), 1);
    }

    #[test]
    fn test_builder() {
        let config = ParallelThresholdsBuilder::new()
            .vector_threshold(5000)
            .min_chunk_size(0)
            .build();

        assert_eq!(config.vector_threshold, 5000);
        assert_eq!(config.min_chunk_size, 1);
    }
}
