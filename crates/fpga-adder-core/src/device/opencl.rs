//! Xilinx OpenCL backend.
//!
//! Devices are the `ACCELERATOR` devices of the platform named in the
//! configuration (`Xilinx` by default). The kernel is built from a
//! precompiled binary and launched as a single work-item task.

use super::{
    check_lengths, AcceleratorBackend, BackendKind, DeviceInfo, DeviceSelector, ExecutionStats,
};
use crate::binary::KernelBinary;
use crate::config::AdderConfig;
use crate::core::error::{HostError, Result};
use crate::core::types::{AdderArgs, Element};
use opencl3::command_queue::{CommandQueue, CL_QUEUE_PROFILING_ENABLE};
use opencl3::context::Context;
use opencl3::device::{Device, CL_DEVICE_TYPE_ACCELERATOR};
use opencl3::event::Event;
use opencl3::kernel::{ExecuteKernel, Kernel};
use opencl3::memory::{Buffer, CL_MEM_READ_ONLY, CL_MEM_WRITE_ONLY};
use opencl3::platform::get_platforms;
use opencl3::program::Program;
use opencl3::types::{cl_int, CL_NON_BLOCKING};
use std::ptr;
use tracing::{debug, info};

const BACKEND: &str = "OpenCL";

/// Enumerate the accelerator devices of `platform_name`.
pub fn enumerate_devices(platform_name: &str) -> Result<Vec<(Device, DeviceInfo)>> {
    let platforms =
        get_platforms().map_err(|e| HostError::no_device(format!("no OpenCL platforms: {e}")))?;

    let platform = platforms
        .into_iter()
        .find(|p| p.name().map(|n| n == platform_name).unwrap_or(false))
        .ok_or_else(|| HostError::no_device(format!("no OpenCL platform named '{platform_name}'")))?;
    debug!("Found platform: {}", platform_name);

    let ids = platform
        .get_devices(CL_DEVICE_TYPE_ACCELERATOR)
        .map_err(|e| HostError::no_device(format!("no accelerator on '{platform_name}': {e}")))?;
    if ids.is_empty() {
        return Err(HostError::no_device(format!(
            "no accelerator on '{platform_name}'"
        )));
    }

    Ok(ids
        .into_iter()
        .map(|id| {
            let device = Device::new(id);
            let info = DeviceInfo {
                name: device.name().unwrap_or_default(),
                vendor: device.vendor().unwrap_or_default(),
                platform: platform_name.to_string(),
                backend: BackendKind::OpenCl,
                global_memory_bytes: device.global_mem_size().ok(),
                compute_units: device.max_compute_units().ok(),
            };
            debug!("Found accelerator: {} (vendor: {})", info.name, info.vendor);
            (device, info)
        })
        .collect())
}

/// The adder on an OpenCL accelerator.
pub struct OpenClBackend {
    info: DeviceInfo,
    // keeps the device handle alive for the context
    _device: Device,
    context: Context,
    queue: CommandQueue,
    program: Option<Program>,
    kernel: Option<Kernel>,
    profiling: bool,
}

impl std::fmt::Debug for OpenClBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenClBackend")
            .field("device", &self.info.name)
            .field("kernel_loaded", &self.kernel.is_some())
            .field("profiling", &self.profiling)
            .finish()
    }
}

impl OpenClBackend {
    /// Discover devices, pick one, and create its context and queue.
    pub fn open(config: &AdderConfig) -> Result<Self> {
        let mut devices = enumerate_devices(&config.platform_name)?;
        let infos: Vec<DeviceInfo> = devices.iter().map(|(_, info)| info.clone()).collect();
        let position = DeviceSelector::from_config(config).select(&infos)?;
        let (device, info) = devices.swap_remove(position);

        let context = Context::from_device(&device).map_err(|e| HostError::runtime(BACKEND, e))?;
        let properties = if config.profiling {
            CL_QUEUE_PROFILING_ENABLE
        } else {
            0
        };
        // Xilinx runtimes are OpenCL 1.2, which lacks clCreateCommandQueueWithProperties.
        #[allow(deprecated)]
        let queue = CommandQueue::create_default(&context, properties)
            .map_err(|e| HostError::runtime(BACKEND, e))?;

        info!("Opened OpenCL device {}", info.name);
        Ok(Self {
            info,
            _device: device,
            context,
            queue,
            program: None,
            kernel: None,
            profiling: config.profiling,
        })
    }

    /// Enqueue input migration, the task and output migration. Returns the
    /// kernel event; the caller must finish the queue on every path.
    fn enqueue_run(
        &self,
        kernel: &Kernel,
        buffer_input: &mut Buffer<cl_int>,
        buffer_output: &Buffer<cl_int>,
        input: &[Element],
        output: &mut [Element],
        args: AdderArgs,
    ) -> Result<Event> {
        let write_event = unsafe {
            self.queue
                .enqueue_write_buffer(buffer_input, CL_NON_BLOCKING, 0, input, &[])
                .map_err(|e| HostError::transfer(format!("input migration: {e}")))?
        };
        debug!("input migration enqueued ({} elements)", input.len());

        let kernel_event = unsafe {
            ExecuteKernel::new(kernel)
                .set_arg(&*buffer_input)
                .set_arg(buffer_output)
                .set_arg(&args.increment)
                .set_arg(&args.size)
                .set_global_work_size(1)
                .set_wait_event(&write_event)
                .enqueue_nd_range(&self.queue)
                .map_err(HostError::launch)?
        };
        debug!("kernel task enqueued");

        let _read_event = unsafe {
            self.queue
                .enqueue_read_buffer(buffer_output, CL_NON_BLOCKING, 0, output, &[kernel_event.get()])
                .map_err(|e| HostError::transfer(format!("output migration: {e}")))?
        };
        Ok(kernel_event)
    }

    fn kernel_duration(&self, event: &Event) -> Option<u64> {
        if !self.profiling {
            return None;
        }
        let start = event.profiling_command_start().ok()?;
        let end = event.profiling_command_end().ok()?;
        end.checked_sub(start)
    }
}

/// Run `finish` whatever `enqueued` holds; an enqueue error takes precedence.
fn settle<T>(enqueued: Result<T>, finish: impl FnOnce() -> Result<()>) -> Result<T> {
    let finished = finish();
    let value = enqueued?;
    finished?;
    Ok(value)
}

impl AcceleratorBackend for OpenClBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::OpenCl
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    fn requires_binary(&self) -> bool {
        true
    }

    fn load_kernel(&mut self, binary: Option<&KernelBinary>, kernel_name: &str) -> Result<()> {
        let binary = binary.ok_or_else(|| {
            HostError::kernel_load(kernel_name, "the OpenCL backend needs a kernel binary")
        })?;

        let program =
            Program::create_and_build_from_binary(&self.context, &[binary.as_bytes()], "")
                .map_err(|e| HostError::kernel_load(kernel_name, e))?;
        let kernel =
            Kernel::create(&program, kernel_name).map_err(|e| HostError::kernel_load(kernel_name, e))?;

        info!(
            "Loaded kernel '{}' from {}",
            kernel_name,
            binary.path().display()
        );
        self.program = Some(program);
        self.kernel = Some(kernel);
        Ok(())
    }

    fn execute(
        &mut self,
        input: &[Element],
        output: &mut [Element],
        args: AdderArgs,
    ) -> Result<ExecutionStats> {
        let kernel = self
            .kernel
            .as_ref()
            .ok_or_else(|| HostError::launch("no kernel loaded"))?;
        let n = check_lengths(input, output, args)?;

        let mut buffer_input = unsafe {
            Buffer::<cl_int>::create(&self.context, CL_MEM_READ_ONLY, n, ptr::null_mut())
                .map_err(|e| HostError::transfer(format!("input buffer: {e}")))?
        };
        let buffer_output = unsafe {
            Buffer::<cl_int>::create(&self.context, CL_MEM_WRITE_ONLY, n, ptr::null_mut())
                .map_err(|e| HostError::transfer(format!("output buffer: {e}")))?
        };

        let enqueued =
            self.enqueue_run(kernel, &mut buffer_input, &buffer_output, input, output, args);
        // Transfers may still reference `input` and `output` until the queue drains.
        let kernel_event = settle(enqueued, || self.queue.finish().map_err(HostError::launch))?;
        debug!("queue finished");

        Ok(ExecutionStats {
            kernel_nanos: self.kernel_duration(&kernel_event),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerate_graceful_on_missing_hardware() {
        match enumerate_devices("Xilinx") {
            Ok(devices) => assert!(!devices.is_empty()),
            Err(e) => assert!(matches!(e, HostError::NoDevice { .. }), "unexpected error: {e}"),
        }
    }

    #[test]
    fn settle_finishes_queue_on_enqueue_error() {
        let finished = std::cell::Cell::new(0);
        let result: Result<u32> = settle(Err(HostError::launch("enqueue failed")), || {
            finished.set(finished.get() + 1);
            Ok(())
        });
        assert_eq!(finished.get(), 1);
        assert!(matches!(result, Err(HostError::Launch { .. })));
    }

    #[test]
    fn settle_reports_enqueue_error_before_finish_error() {
        let result: Result<u32> = settle(Err(HostError::transfer("write")), || {
            Err(HostError::launch("finish"))
        });
        assert!(matches!(result, Err(HostError::Transfer { .. })));

        let result: Result<u32> = settle(Ok(7), || Err(HostError::launch("finish")));
        assert!(matches!(result, Err(HostError::Launch { .. })));

        assert_eq!(settle(Ok(7), || Ok(())).unwrap(), 7);
    }

    #[test]
    fn unknown_platform_is_no_device() {
        let err = enumerate_devices("definitely-not-a-platform").unwrap_err();
        assert!(matches!(err, HostError::NoDevice { .. }));
    }
}
