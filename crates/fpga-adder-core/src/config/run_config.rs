//! Run configuration for the adder host.
//!
//! [`AdderConfig::default`] reproduces the fixed example run: 4096 sequential
//! inputs, increment 10, kernel `adder`, first accelerator device, binary
//! resolved by search. Everything else is an override.

use crate::core::error::{HostError, Result};
use crate::core::types::{constants, AdderArgs, Element};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How the input buffer is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum InputPattern {
    /// `input[i] = i`
    #[default]
    Sequential,
    /// Reproducible pseudo-random values.
    Random {
        /// Seed for the generator
        seed: u64,
    },
}

/// Which accelerator runtime drives the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendPreference {
    /// OpenCL if compiled in, then CUDA; never host emulation.
    #[default]
    Auto,
    /// Xilinx OpenCL runtime
    OpenCl,
    /// CUDA driver with a runtime-compiled kernel
    Cuda,
    /// Host-memory emulation of the kernel
    Emulated,
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::OpenCl => write!(f, "opencl"),
            Self::Cuda => write!(f, "cuda"),
            Self::Emulated => write!(f, "emulated"),
        }
    }
}

impl FromStr for BackendPreference {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "opencl" | "ocl" => Ok(Self::OpenCl),
            "cuda" => Ok(Self::Cuda),
            "emulated" | "emu" | "cpu" => Ok(Self::Emulated),
            other => Err(HostError::invalid_configuration(
                "backend",
                format!("unknown backend '{other}' (expected auto, opencl, cuda or emulated)"),
            )),
        }
    }
}

/// Complete configuration of one adder run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdderConfig {
    /// Number of elements per buffer.
    pub data_size: usize,
    /// Value the kernel adds.
    pub increment: Element,
    /// Kernel name inside the binary.
    pub kernel_name: String,
    /// Input fill pattern.
    pub input_pattern: InputPattern,
    /// Backend to run on.
    pub backend: BackendPreference,
    /// OpenCL platform to take devices from.
    pub platform_name: String,
    /// Index of the device among the enumerated ones.
    pub device_index: usize,
    /// Case-insensitive substring the device name must contain.
    pub device_name: Option<String>,
    /// Explicit binary path; bypasses the search.
    pub binary_path: Option<PathBuf>,
    /// Enable queue profiling to report kernel duration.
    pub profiling: bool,
}

impl Default for AdderConfig {
    fn default() -> Self {
        Self {
            data_size: constants::DATA_SIZE,
            increment: constants::INCR_VALUE,
            kernel_name: constants::KERNEL_NAME.to_string(),
            input_pattern: InputPattern::Sequential,
            backend: BackendPreference::Auto,
            platform_name: constants::PLATFORM_NAME.to_string(),
            device_index: 0,
            device_name: None,
            binary_path: None,
            profiling: true,
        }
    }
}

impl AdderConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| HostError::io(path, e))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            HostError::invalid_configuration("config", format!("{}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration describes a runnable kernel launch.
    pub fn validate(&self) -> Result<()> {
        if self.data_size == 0 {
            return Err(HostError::invalid_configuration(
                "data_size",
                "must be greater than zero",
            ));
        }
        if Element::try_from(self.data_size).is_err() {
            return Err(HostError::invalid_configuration(
                "data_size",
                format!("{} does not fit the kernel's int size argument", self.data_size),
            ));
        }
        if self.kernel_name.trim().is_empty() {
            return Err(HostError::invalid_configuration(
                "kernel_name",
                "must not be empty",
            ));
        }
        Ok(())
    }

    /// Scalar kernel arguments for this configuration.
    pub fn kernel_args(&self) -> Result<AdderArgs> {
        let size = Element::try_from(self.data_size).map_err(|_| {
            HostError::invalid_configuration("data_size", "does not fit in i32")
        })?;
        Ok(AdderArgs {
            increment: self.increment,
            size,
        })
    }

    /// Size of one buffer in bytes.
    pub fn buffer_bytes(&self) -> usize {
        self.data_size * std::mem::size_of::<Element>()
    }
}

/// Builder for creating a custom run configuration.
#[derive(Debug, Clone, Default)]
pub struct AdderConfigBuilder {
    config: AdderConfig,
}

impl AdderConfigBuilder {
    /// Create a new builder starting from the default run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: AdderConfig) -> Self {
        Self { config }
    }

    /// Set the number of elements.
    pub fn data_size(mut self, data_size: usize) -> Self {
        self.config.data_size = data_size;
        self
    }

    /// Set the increment.
    pub fn increment(mut self, increment: Element) -> Self {
        self.config.increment = increment;
        self
    }

    /// Set the kernel name.
    pub fn kernel_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.kernel_name = name.into();
        self
    }

    /// Set the input pattern.
    pub fn input_pattern(mut self, pattern: InputPattern) -> Self {
        self.config.input_pattern = pattern;
        self
    }

    /// Set the backend.
    pub fn backend(mut self, backend: BackendPreference) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the OpenCL platform name.
    pub fn platform_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.platform_name = name.into();
        self
    }

    /// Set the device index.
    pub fn device_index(mut self, index: usize) -> Self {
        self.config.device_index = index;
        self
    }

    /// Require the device name to contain `name`.
    pub fn device_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.device_name = Some(name.into());
        self
    }

    /// Use an explicit binary instead of searching.
    pub fn binary_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.binary_path = Some(path.into());
        self
    }

    /// Enable or disable queue profiling.
    pub fn profiling(mut self, enabled: bool) -> Self {
        self.config.profiling = enabled;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<AdderConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
