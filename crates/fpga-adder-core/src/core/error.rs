//! Error types for the adder host driver.
//!
//! Every failure the host can hit before the result comparison (bad
//! configuration, missing binary, device runtime errors) maps to a
//! [`HostError`]. A result mismatch is *not* an error: it is reported through
//! [`crate::verify::Verification`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while driving the accelerator.
#[derive(Debug, Clone, Error)]
pub enum HostError {
    /// Invalid run configuration.
    #[error("Invalid configuration for '{parameter}': {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
    },

    /// No kernel binary exists at the resolved path.
    #[error("Kernel binary not found: {}", path.display())]
    BinaryNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// More than one distinct kernel binary matched the search patterns.
    #[error("Multiple xclbin files discovered: {} and {}", first.display(), second.display())]
    AmbiguousBinary {
        /// First match found
        first: PathBuf,
        /// Conflicting match
        second: PathBuf,
    },

    /// Filesystem failure while reading a binary or a configuration file.
    #[error("I/O error on {}: {reason}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error message
        reason: String,
    },

    /// No suitable accelerator device was found.
    #[error("No accelerator device: {reason}")]
    NoDevice {
        /// Why discovery came back empty
        reason: String,
    },

    /// The vendor runtime rejected a device-level call.
    #[error("{backend} runtime error: {reason}")]
    Runtime {
        /// Backend that reported the failure
        backend: String,
        /// Runtime error message
        reason: String,
    },

    /// Program build or kernel lookup failed.
    #[error("Failed to load kernel '{kernel}': {reason}")]
    KernelLoad {
        /// Kernel name
        kernel: String,
        /// Why loading failed
        reason: String,
    },

    /// Host/device data migration failed.
    #[error("Memory transfer failed: {reason}")]
    Transfer {
        /// Description of the failed transfer
        reason: String,
    },

    /// Kernel enqueue or completion wait failed.
    #[error("Kernel launch failed: {reason}")]
    Launch {
        /// Description of the launch failure
        reason: String,
    },

    /// Host buffers do not have the expected length.
    #[error("Buffer length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected element count
        expected: usize,
        /// Actual element count
        actual: usize,
    },

    /// The requested backend was not compiled into this build.
    #[error("Backend '{backend}' is not available in this build (enable the '{feature}' feature)")]
    BackendUnavailable {
        /// Requested backend
        backend: String,
        /// Cargo feature that provides it
        feature: String,
    },
}

impl HostError {
    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2>(parameter: S1, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
        }
    }

    /// Create a BinaryNotFound error.
    pub fn binary_not_found<P: Into<PathBuf>>(path: P) -> Self {
        Self::BinaryNotFound { path: path.into() }
    }

    /// Create an Io error from a path and any displayable cause.
    pub fn io<P, E>(path: P, err: E) -> Self
    where
        P: Into<PathBuf>,
        E: std::fmt::Display,
    {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Create a NoDevice error.
    pub fn no_device<S: Into<String>>(reason: S) -> Self {
        Self::NoDevice {
            reason: reason.into(),
        }
    }

    /// Create a Runtime error for the given backend.
    pub fn runtime<S1, S2>(backend: S1, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: std::fmt::Display,
    {
        Self::Runtime {
            backend: backend.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a KernelLoad error.
    pub fn kernel_load<S1, S2>(kernel: S1, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: std::fmt::Display,
    {
        Self::KernelLoad {
            kernel: kernel.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a Transfer error.
    pub fn transfer<S: std::fmt::Display>(reason: S) -> Self {
        Self::Transfer {
            reason: reason.to_string(),
        }
    }

    /// Create a Launch error.
    pub fn launch<S: std::fmt::Display>(reason: S) -> Self {
        Self::Launch {
            reason: reason.to_string(),
        }
    }

    /// Create a LengthMismatch error.
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }

    /// Create a BackendUnavailable error.
    pub fn backend_unavailable<S1, S2>(backend: S1, feature: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::BackendUnavailable {
            backend: backend.into(),
            feature: feature.into(),
        }
    }
}

/// Result type alias for host operations.
pub type Result<T> = std::result::Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = HostError::invalid_configuration("data_size", "must be positive");
        assert!(matches!(err, HostError::InvalidConfiguration { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'data_size': must be positive"
        );

        let err = HostError::length_mismatch(4096, 10);
        assert_eq!(
            err.to_string(),
            "Buffer length mismatch: expected 4096, got 10"
        );
    }

    #[test]
    fn test_path_errors_name_the_file() {
        let err = HostError::binary_not_found("xclbin/adder.hw.dev.xclbin");
        assert!(err.to_string().contains("xclbin/adder.hw.dev.xclbin"));

        let err = HostError::AmbiguousBinary {
            first: PathBuf::from("a.xclbin"),
            second: PathBuf::from("b.xclbin"),
        };
        let msg = err.to_string();
        assert!(msg.contains("a.xclbin") && msg.contains("b.xclbin"));
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            HostError::io("cfg.json", "permission denied"),
            HostError::no_device("no Xilinx platform"),
            HostError::runtime("OpenCL", "CL_OUT_OF_RESOURCES"),
            HostError::kernel_load("adder", "invalid binary"),
            HostError::transfer("read back failed"),
            HostError::launch("enqueue failed"),
            HostError::backend_unavailable("cuda", "cuda"),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
