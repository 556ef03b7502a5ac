//! Host-side driver for the FPGA `adder` example kernel.
//!
//! The kernel adds a fixed increment to every element of an integer buffer.
//! This crate does everything around it: allocates the host buffers, finds an
//! accelerator, locates and loads the precompiled binary, moves data to and
//! from the device, launches the kernel and checks the result against a CPU
//! reference.
//!
//! # Modules
//!
//! - [`binary`]: kernel binary search and loading
//! - [`compute`]: CPU reference implementation
//! - [`config`]: run configuration and build target resolution
//! - [`core`]: error type, element type and constants
//! - [`device`]: accelerator backends (OpenCL, CUDA, host emulation)
//! - [`host`]: the end-to-end procedure
//! - [`memory`]: host buffers
//! - [`verify`]: result comparison
//!
//! # Example
//!
//! ```rust
//! use fpga_adder_core::prelude::*;
//!
//! let host = AdderHost::new(AdderConfig::default()).unwrap();
//! let mut backend = EmulatedBackend::new();
//! let report = host.run(&mut backend).unwrap();
//! assert!(report.passed());
//! ```

pub mod binary;
pub mod compute;
pub mod config;
pub mod core;
pub mod device;
pub mod host;
pub mod memory;
pub mod verify;

// Re-export commonly used items at the crate root
pub use crate::core::error::{HostError, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::binary::{BinaryLocator, KernelBinary};
    pub use crate::config::{AdderConfig, AdderConfigBuilder, BackendPreference, InputPattern, TargetMode};
    pub use crate::core::error::{HostError, Result};
    pub use crate::core::types::{constants, AdderArgs, Element};
    pub use crate::device::{
        open_backend, AcceleratorBackend, BackendKind, DeviceInfo, DeviceSelector,
        EmulatedBackend, ExecutionStats,
    };
    pub use crate::host::{AdderHost, RunReport};
    pub use crate::memory::HostBuffers;
    pub use crate::verify::{verify, Mismatch, Verification};
}
