//! Loading a kernel binary into memory.

use crate::core::error::{HostError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Magic bytes at the start of an `xclbin2` container.
pub const XCLBIN2_MAGIC: &[u8; 8] = b"xclbin2\0";

/// A kernel binary read from disk.
#[derive(Clone, PartialEq, Eq)]
pub struct KernelBinary {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl fmt::Debug for KernelBinary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelBinary")
            .field("path", &self.path)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl KernelBinary {
    /// Read the whole binary at `path`.
    pub fn import<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(HostError::binary_not_found(path));
        }
        let bytes = std::fs::read(path).map_err(|e| HostError::io(path, e))?;
        let binary = Self::from_bytes(path, bytes);
        debug!("Loaded {} ({} bytes)", path.display(), binary.len());
        if !binary.has_xclbin2_magic() {
            warn!(
                "{} does not start with the xclbin2 magic; the runtime may reject it",
                path.display()
            );
        }
        Ok(binary)
    }

    /// Wrap bytes already in memory.
    pub fn from_bytes<P: Into<PathBuf>>(path: P, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }

    /// Where the binary came from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw container bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file was empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the bytes start with the `xclbin2` container magic.
    pub fn has_xclbin2_magic(&self) -> bool {
        self.bytes.starts_with(XCLBIN2_MAGIC)
    }
}
