//! Element type and fixed constants of the adder run.

use num_traits::WrappingAdd;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// Element type of the adder buffers (the kernel's `int`).
pub type Element = i32;

/// Compile-time constants of the default run.
pub mod constants {
    use super::Element;

    /// Number of elements in each buffer.
    pub const DATA_SIZE: usize = 4096;

    /// Value the kernel adds to every element.
    pub const INCR_VALUE: Element = 10;

    /// Name of the kernel inside the binary.
    pub const KERNEL_NAME: &str = "adder";

    /// OpenCL platform name the accelerator lives on.
    pub const PLATFORM_NAME: &str = "Xilinx";
}

/// Trait for lanes the CPU reference can compute over.
///
/// The device performs two's complement arithmetic, so the reference
/// wraps on overflow instead of panicking.
pub trait Lane: WrappingAdd + Copy + Default + PartialEq + Debug + Display + Send + Sync + 'static {}

impl<T> Lane for T where T: WrappingAdd + Copy + Default + PartialEq + Debug + Display + Send + Sync + 'static {}

/// Scalar arguments bound after the two buffer arguments.
///
/// Argument order on the kernel is `(input, output, inc, size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdderArgs {
    /// Value added to each element.
    pub increment: Element,
    /// Number of elements the kernel processes.
    pub size: Element,
}

impl AdderArgs {
    /// Number of elements as a host index bound.
    pub fn len(&self) -> usize {
        usize::try_from(self.size).unwrap_or(0)
    }

    /// Whether the kernel has nothing to process.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert_eq!(constants::DATA_SIZE, 4096);
        assert_eq!(constants::INCR_VALUE, 10);
        assert_eq!(constants::KERNEL_NAME, "adder");
    }

    #[test]
    fn test_args_len() {
        let args = AdderArgs { increment: 1, size: 8 };
        assert_eq!(args.len(), 8);
        assert!(!args.is_empty());

        let args = AdderArgs { increment: 1, size: -3 };
        assert!(args.is_empty());
    }
}
