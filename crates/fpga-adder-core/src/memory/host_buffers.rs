//! The three host buffers of an adder run.

use crate::compute::software_reference;
use crate::config::{AdderConfig, InputPattern};
use crate::core::error::Result;
use crate::core::types::Element;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Largest magnitude drawn for random inputs.
const RANDOM_BOUND: Element = 1 << 24;

/// Input, device result and CPU reference for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBuffers {
    /// Data sent to the device.
    pub input: Vec<Element>,
    /// Filled by the device; zero before the run.
    pub hw_results: Vec<Element>,
    /// Expected result computed on the host.
    pub sw_results: Vec<Element>,
}

impl HostBuffers {
    /// Allocate and fill the buffers for `config`.
    pub fn prepare(config: &AdderConfig) -> Result<Self> {
        config.validate()?;
        let input = fill_input(config.input_pattern, config.data_size);
        let sw_results = software_reference(&input, config.increment);
        Ok(Self {
            hw_results: vec![0; input.len()],
            input,
            sw_results,
        })
    }

    /// Number of elements per buffer.
    pub fn len(&self) -> usize {
        self.input.len()
    }

    /// Whether the buffers hold no elements.
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Size of one buffer in bytes.
    pub fn byte_len(&self) -> usize {
        std::mem::size_of_val(self.input.as_slice())
    }
}

fn fill_input(pattern: InputPattern, len: usize) -> Vec<Element> {
    match pattern {
        // validated: len fits in Element
        InputPattern::Sequential => (0..len).map(|i| i as Element).collect(),
        InputPattern::Random { seed } => {
            let mut rng = SmallRng::seed_from_u64(seed);
            (0..len)
                .map(|_| rng.gen_range(-RANDOM_BOUND..RANDOM_BOUND))
                .collect()
        }
    }
}
