//! Host-memory emulation of the adder kernel.
//!
//! Mirrors the device flow step by step: input is copied into a separate
//! "global memory" buffer, the kernel reads and writes only that memory, and
//! the result is copied back. No binary is needed.

use super::{check_lengths, AcceleratorBackend, BackendKind, DeviceInfo, ExecutionStats};
use crate::binary::KernelBinary;
use crate::compute::add_scalar;
use crate::core::error::{HostError, Result};
use crate::core::types::{AdderArgs, Element};
use std::time::Instant;
use tracing::debug;

/// Device name reported by the emulator.
pub const EMULATOR_DEVICE_NAME: &str = "host_emulator";

/// Runs the adder on host memory.
#[derive(Debug)]
pub struct EmulatedBackend {
    info: DeviceInfo,
    kernel: Option<String>,
    global_in: Vec<Element>,
    global_out: Vec<Element>,
}

impl Default for EmulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulatedBackend {
    /// Create an emulator with no kernel loaded.
    pub fn new() -> Self {
        Self {
            info: DeviceInfo {
                name: EMULATOR_DEVICE_NAME.to_string(),
                vendor: "host".to_string(),
                platform: "emulation".to_string(),
                backend: BackendKind::Emulated,
                global_memory_bytes: None,
                compute_units: Some(u32::try_from(rayon::current_num_threads()).unwrap_or(1)),
            },
            kernel: None,
            global_in: Vec::new(),
            global_out: Vec::new(),
        }
    }

    /// Name of the loaded kernel, if any.
    pub fn kernel_name(&self) -> Option<&str> {
        self.kernel.as_deref()
    }
}

impl AcceleratorBackend for EmulatedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Emulated
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    fn requires_binary(&self) -> bool {
        false
    }

    fn load_kernel(&mut self, _binary: Option<&KernelBinary>, kernel_name: &str) -> Result<()> {
        if kernel_name != crate::core::types::constants::KERNEL_NAME {
            return Err(HostError::kernel_load(
                kernel_name,
                "the emulator only provides the 'adder' kernel",
            ));
        }
        self.kernel = Some(kernel_name.to_string());
        Ok(())
    }

    fn execute(
        &mut self,
        input: &[Element],
        output: &mut [Element],
        args: AdderArgs,
    ) -> Result<ExecutionStats> {
        if self.kernel.is_none() {
            return Err(HostError::launch("no kernel loaded"));
        }
        let n = check_lengths(input, output, args)?;

        // host -> device
        self.global_in.clear();
        self.global_in.extend_from_slice(input);
        self.global_out.clear();
        self.global_out.resize(n, 0);
        debug!("emulator: migrated {} elements to device", n);

        let start = Instant::now();
        add_scalar(&self.global_in, &mut self.global_out, args.increment)?;
        let elapsed = start.elapsed();

        // device -> host
        output.copy_from_slice(&self.global_out);
        debug!("emulator: kernel finished in {:?}", elapsed);

        Ok(ExecutionStats {
            kernel_nanos: u64::try_from(elapsed.as_nanos()).ok(),
        })
    }
}
