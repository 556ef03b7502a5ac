//! Kernel binary discovery and loading.

pub mod container;
pub mod locator;

pub use container::{KernelBinary, XCLBIN2_MAGIC};
pub use locator::{sanitize_device_name, versionless_device_name, BinaryLocator};

use crate::core::error::Result;
use std::path::Path;

/// Resolve the binary for `kernel_name` on `device_name`, honouring an
/// explicit path when one is given.
pub fn find_binary_file(
    locator: &BinaryLocator,
    explicit: Option<&Path>,
    device_name: &str,
    kernel_name: &str,
) -> Result<std::path::PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => locator.find(device_name, kernel_name),
    }
}

/// Read the binary at `path`.
pub fn import_binary_file<P: AsRef<Path>>(path: P) -> Result<KernelBinary> {
    KernelBinary::import(path)
}
