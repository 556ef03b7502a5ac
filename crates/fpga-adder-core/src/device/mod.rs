//! Accelerator backends for the adder kernel.
//!
//! The host procedure talks to hardware only through [`AcceleratorBackend`].
//! Three implementations exist:
//!
//! - [`opencl::OpenClBackend`]: the Xilinx OpenCL runtime, loading a
//!   precompiled `.xclbin` (feature `opencl`)
//! - [`cuda::CudaBackend`]: a CUDA device running the same kernel compiled at
//!   runtime with NVRTC (feature `cuda`)
//! - [`emulated::EmulatedBackend`]: host-memory emulation, always available
//!   but only used when asked for explicitly
//!
//! # Example
//!
//! ```rust
//! use fpga_adder_core::device::{AcceleratorBackend, EmulatedBackend};
//! use fpga_adder_core::core::AdderArgs;
//!
//! let mut backend = EmulatedBackend::new();
//! backend.load_kernel(None, "adder").unwrap();
//!
//! let input = vec![1, 2, 3];
//! let mut output = vec![0; 3];
//! backend
//!     .execute(&input, &mut output, AdderArgs { increment: 10, size: 3 })
//!     .unwrap();
//! assert_eq!(output, vec![11, 12, 13]);
//! ```

#[cfg(feature = "cuda")]
pub mod cuda;

pub mod emulated;

#[cfg(feature = "opencl")]
pub mod opencl;

pub mod selector;

pub use emulated::EmulatedBackend;
pub use selector::DeviceSelector;

use crate::binary::KernelBinary;
use crate::config::{AdderConfig, BackendPreference};
use crate::core::error::{HostError, Result};
use crate::core::types::{AdderArgs, Element};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Runtime actually driving the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// OpenCL
    OpenCl,
    /// NVIDIA CUDA
    Cuda,
    /// Host emulation
    Emulated,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenCl => write!(f, "OpenCL"),
            Self::Cuda => write!(f, "CUDA"),
            Self::Emulated => write!(f, "Emulated"),
        }
    }
}

/// Information about an accelerator device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name as reported by the runtime
    pub name: String,
    /// Vendor string
    pub vendor: String,
    /// Platform the device belongs to
    pub platform: String,
    /// Backend type
    pub backend: BackendKind,
    /// Global memory in bytes, when the runtime reports it
    pub global_memory_bytes: Option<u64>,
    /// Compute units, when the runtime reports them
    pub compute_units: Option<u32>,
}

/// Timing of one kernel execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStats {
    /// Kernel duration in nanoseconds, when profiling is available
    pub kernel_nanos: Option<u64>,
}

/// Accelerator runtime able to run the adder kernel.
pub trait AcceleratorBackend {
    /// Runtime type
    fn kind(&self) -> BackendKind;

    /// The device this backend was opened on
    fn device_info(&self) -> &DeviceInfo;

    /// Whether [`load_kernel`](Self::load_kernel) needs a binary file
    fn requires_binary(&self) -> bool;

    /// Prepare the kernel named `kernel_name` for execution.
    fn load_kernel(&mut self, binary: Option<&KernelBinary>, kernel_name: &str) -> Result<()>;

    /// Migrate `input` to the device, run the kernel with `args`, migrate the
    /// result into `output` and block until everything has completed.
    fn execute(
        &mut self,
        input: &[Element],
        output: &mut [Element],
        args: AdderArgs,
    ) -> Result<ExecutionStats>;
}

impl<B: AcceleratorBackend + ?Sized> AcceleratorBackend for Box<B> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn device_info(&self) -> &DeviceInfo {
        (**self).device_info()
    }

    fn requires_binary(&self) -> bool {
        (**self).requires_binary()
    }

    fn load_kernel(&mut self, binary: Option<&KernelBinary>, kernel_name: &str) -> Result<()> {
        (**self).load_kernel(binary, kernel_name)
    }

    fn execute(
        &mut self,
        input: &[Element],
        output: &mut [Element],
        args: AdderArgs,
    ) -> Result<ExecutionStats> {
        (**self).execute(input, output, args)
    }
}

/// Check that both host buffers hold exactly `args.size` elements.
pub(crate) fn check_lengths(input: &[Element], output: &[Element], args: AdderArgs) -> Result<usize> {
    let n = args.len();
    if input.len() != n {
        return Err(HostError::length_mismatch(n, input.len()));
    }
    if output.len() != n {
        return Err(HostError::length_mismatch(n, output.len()));
    }
    Ok(n)
}

/// Open the backend requested by `config`.
pub fn open_backend(config: &AdderConfig) -> Result<Box<dyn AcceleratorBackend>> {
    match config.backend {
        BackendPreference::OpenCl => open_opencl(config),
        BackendPreference::Cuda => open_cuda(config),
        BackendPreference::Emulated => Ok(Box::new(EmulatedBackend::new())),
        BackendPreference::Auto => {
            let opencl = match open_opencl(config) {
                Err(e @ (HostError::NoDevice { .. } | HostError::BackendUnavailable { .. })) => e,
                other => return other,
            };
            debug!("OpenCL backend unavailable: {}", opencl);
            let cuda = match open_cuda(config) {
                Err(e @ (HostError::NoDevice { .. } | HostError::BackendUnavailable { .. })) => e,
                other => return other,
            };
            debug!("CUDA backend unavailable: {}", cuda);
            Err(HostError::no_device(format!(
                "no accelerator found ({opencl}; {cuda}); use the emulated backend to run without one"
            )))
        }
    }
}

#[cfg(feature = "opencl")]
fn open_opencl(config: &AdderConfig) -> Result<Box<dyn AcceleratorBackend>> {
    Ok(Box::new(opencl::OpenClBackend::open(config)?))
}

#[cfg(not(feature = "opencl"))]
fn open_opencl(_config: &AdderConfig) -> Result<Box<dyn AcceleratorBackend>> {
    Err(HostError::backend_unavailable("opencl", "opencl"))
}

#[cfg(feature = "cuda")]
fn open_cuda(config: &AdderConfig) -> Result<Box<dyn AcceleratorBackend>> {
    Ok(Box::new(cuda::CudaBackend::open(config)?))
}

#[cfg(not(feature = "cuda"))]
fn open_cuda(_config: &AdderConfig) -> Result<Box<dyn AcceleratorBackend>> {
    Err(HostError::backend_unavailable("cuda", "cuda"))
}
