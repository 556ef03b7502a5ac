//! CUDA backend running the adder on a GPU.
//!
//! The kernel is compiled at runtime with NVRTC, so no binary file is
//! involved. Arithmetic goes through unsigned ints to get the same wrapping
//! behaviour as the FPGA kernel.

use super::{
    check_lengths, AcceleratorBackend, BackendKind, DeviceInfo, DeviceSelector, ExecutionStats,
};
use crate::binary::KernelBinary;
use crate::config::AdderConfig;
use crate::core::error::{HostError, Result};
use crate::core::types::{constants, AdderArgs, Element};
use cudarc::driver::{CudaDevice, CudaFunction, LaunchAsync, LaunchConfig};
use cudarc::nvrtc::compile_ptx;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

const BACKEND: &str = "CUDA";
const MODULE_NAME: &str = "fpga_adder";

/// CUDA C source of the adder kernel.
pub const ADDER_SRC: &str = r#"
extern "C" __global__ void adder(const int* in, int* out, int inc, int size) {
    int i = blockIdx.x * blockDim.x + threadIdx.x;
    if (i < size) {
        out[i] = (int)((unsigned int)in[i] + (unsigned int)inc);
    }
}
"#;

/// Enumerate CUDA devices.
pub fn enumerate_devices() -> Result<Vec<(Arc<CudaDevice>, DeviceInfo)>> {
    let count = CudaDevice::count()
        .map_err(|e| HostError::no_device(format!("CUDA driver unavailable: {e}")))?;
    if count <= 0 {
        return Err(HostError::no_device("no CUDA devices"));
    }

    let mut devices = Vec::new();
    for ordinal in 0..usize::try_from(count).unwrap_or(0) {
        let device = CudaDevice::new(ordinal).map_err(|e| HostError::runtime(BACKEND, e))?;
        let info = DeviceInfo {
            name: device
                .name()
                .unwrap_or_else(|_| format!("CUDA Device {ordinal}")),
            vendor: "NVIDIA".to_string(),
            platform: "CUDA".to_string(),
            backend: BackendKind::Cuda,
            global_memory_bytes: None,
            compute_units: None,
        };
        debug!("Found GPU: {}", info.name);
        devices.push((device, info));
    }
    Ok(devices)
}

/// The adder on a CUDA device.
pub struct CudaBackend {
    info: DeviceInfo,
    device: Arc<CudaDevice>,
    function: Option<CudaFunction>,
}

impl std::fmt::Debug for CudaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CudaBackend")
            .field("device", &self.info.name)
            .field("kernel_loaded", &self.function.is_some())
            .finish()
    }
}

impl CudaBackend {
    /// Pick a device according to `config` and initialise it.
    pub fn open(config: &AdderConfig) -> Result<Self> {
        let mut devices = enumerate_devices()?;
        let infos: Vec<DeviceInfo> = devices.iter().map(|(_, info)| info.clone()).collect();
        let position = DeviceSelector::from_config(config).select(&infos)?;
        let (device, info) = devices.swap_remove(position);
        info!("Opened CUDA device {}", info.name);
        Ok(Self {
            info,
            device,
            function: None,
        })
    }
}

impl AcceleratorBackend for CudaBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cuda
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    fn requires_binary(&self) -> bool {
        false
    }

    fn load_kernel(&mut self, _binary: Option<&KernelBinary>, kernel_name: &str) -> Result<()> {
        if kernel_name != constants::KERNEL_NAME {
            return Err(HostError::kernel_load(
                kernel_name,
                "the CUDA backend only provides the 'adder' kernel",
            ));
        }
        let ptx = compile_ptx(ADDER_SRC).map_err(|e| HostError::kernel_load(kernel_name, e))?;
        self.device
            .load_ptx(ptx, MODULE_NAME, &[constants::KERNEL_NAME])
            .map_err(|e| HostError::kernel_load(kernel_name, e))?;
        let function = self
            .device
            .get_func(MODULE_NAME, constants::KERNEL_NAME)
            .ok_or_else(|| HostError::kernel_load(kernel_name, "function missing from module"))?;
        self.function = Some(function);
        info!("Compiled kernel '{}' with NVRTC", kernel_name);
        Ok(())
    }

    fn execute(
        &mut self,
        input: &[Element],
        output: &mut [Element],
        args: AdderArgs,
    ) -> Result<ExecutionStats> {
        let function = self
            .function
            .clone()
            .ok_or_else(|| HostError::launch("no kernel loaded"))?;
        let n = check_lengths(input, output, args)?;

        let input_dev = self
            .device
            .htod_sync_copy(input)
            .map_err(|e| HostError::transfer(format!("H2D copy failed: {e}")))?;
        let mut output_dev = self
            .device
            .alloc_zeros::<Element>(n)
            .map_err(|e| HostError::transfer(format!("allocation failed: {e}")))?;

        let elems = u32::try_from(n).map_err(|_| HostError::launch("too many elements"))?;
        let config = LaunchConfig::for_num_elems(elems);
        let start = Instant::now();
        unsafe {
            function
                .launch(config, (&input_dev, &mut output_dev, args.increment, args.size))
                .map_err(HostError::launch)?;
        }
        self.device.synchronize().map_err(HostError::launch)?;
        let elapsed = start.elapsed();

        self.device
            .dtoh_sync_copy_into(&output_dev, output)
            .map_err(|e| HostError::transfer(format!("D2H copy failed: {e}")))?;

        Ok(ExecutionStats {
            kernel_nanos: u64::try_from(elapsed.as_nanos()).ok(),
        })
    }
}
