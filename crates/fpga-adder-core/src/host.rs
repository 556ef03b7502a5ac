//! The host procedure: buffers, binary, kernel run, self-check.

use crate::binary::{find_binary_file, import_binary_file, BinaryLocator};
use crate::config::AdderConfig;
use crate::core::error::Result;
use crate::device::{AcceleratorBackend, BackendKind};
use crate::memory::HostBuffers;
use crate::verify::{verify, Verification};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Backend that ran the kernel
    pub backend: BackendKind,
    /// Device name
    pub device: String,
    /// Build target the binary was looked up for
    pub target: Option<String>,
    /// Binary that was loaded
    pub binary: Option<PathBuf>,
    /// Elements processed
    pub data_size: usize,
    /// Increment applied
    pub increment: i32,
    /// Self-check outcome
    pub verification: Verification,
    /// Kernel duration, when the backend measured it
    pub kernel_nanos: Option<u64>,
    /// Time from buffer migration to completion
    pub wall_nanos: u64,
}

impl RunReport {
    /// Whether the device result matched the CPU reference.
    pub fn passed(&self) -> bool {
        self.verification.passed()
    }
}

/// Drives one adder run on a backend.
#[derive(Debug, Clone)]
pub struct AdderHost {
    config: AdderConfig,
    locator: BinaryLocator,
}

impl AdderHost {
    /// Create a host for `config`, locating binaries from the environment.
    pub fn new(config: AdderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            locator: BinaryLocator::from_env(),
        })
    }

    /// Use a specific binary locator.
    pub fn with_locator(mut self, locator: BinaryLocator) -> Self {
        self.locator = locator;
        self
    }

    /// The run configuration.
    pub fn config(&self) -> &AdderConfig {
        &self.config
    }

    /// Prepare fresh buffers and run.
    pub fn run<B: AcceleratorBackend + ?Sized>(&self, backend: &mut B) -> Result<RunReport> {
        let mut buffers = HostBuffers::prepare(&self.config)?;
        self.run_with_buffers(backend, &mut buffers)
    }

    /// Run on caller-provided buffers; `hw_results` holds the device output
    /// afterwards.
    pub fn run_with_buffers<B: AcceleratorBackend + ?Sized>(
        &self,
        backend: &mut B,
        buffers: &mut HostBuffers,
    ) -> Result<RunReport> {
        let device = backend.device_info().name.clone();
        let kernel_name = &self.config.kernel_name;

        let (binary, target) = if backend.requires_binary() {
            let path = find_binary_file(
                &self.locator,
                self.config.binary_path.as_deref(),
                &device,
                kernel_name,
            )?;
            let binary = import_binary_file(&path)?;
            backend.load_kernel(Some(&binary), kernel_name)?;
            (Some(path), Some(self.locator.target().to_string()))
        } else {
            if self.config.binary_path.is_some() {
                warn!("{} backend ignores the kernel binary", backend.kind());
            }
            backend.load_kernel(None, kernel_name)?;
            (None, None)
        };

        let args = self.config.kernel_args()?;
        debug!(
            "launching '{}' with inc={} size={}",
            kernel_name, args.increment, args.size
        );
        let start = Instant::now();
        let stats = backend.execute(&buffers.input, &mut buffers.hw_results, args)?;
        let wall_nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);

        let verification = verify(&buffers.hw_results, &buffers.sw_results)?;
        match &verification {
            Verification::Passed => info!("All {} results match", buffers.len()),
            Verification::Failed(m) => warn!("Result mismatch: {}", m),
        }

        Ok(RunReport {
            backend: backend.kind(),
            device,
            target,
            binary,
            data_size: buffers.len(),
            increment: self.config.increment,
            verification,
            kernel_nanos: stats.kernel_nanos,
            wall_nanos,
        })
    }
}
