//! Search for the precompiled kernel binary.
//!
//! Binaries are named after the kernel, the build target and the device they
//! were built for, and may live in several conventional directories. The
//! locator walks every directory and pattern and insists on a single match.

use crate::config::target::{TargetMode, XCL_BINDIR};
use crate::core::error::{HostError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directories searched after `$XCL_BINDIR`, in order.
pub const DEFAULT_SEARCH_DIRS: [&str; 3] = ["xclbin", "..", "."];

/// File name produced by IDE builds.
pub const GUI_CONTAINER_NAME: &str = "binary_container_1.xclbin";

/// Replace `:` and `.` in a device name with `_`.
///
/// `xilinx:xil-accel-rd-ku115:4ddr-xpr:3.2` becomes
/// `xilinx_xil-accel-rd-ku115_4ddr-xpr_3_2`.
pub fn sanitize_device_name(device_name: &str) -> String {
    device_name
        .chars()
        .map(|c| if c == ':' || c == '.' { '_' } else { c })
        .collect()
}

/// Device name without its version field.
///
/// Colons become `_` and the name is cut at the third colon, so
/// `xilinx:xil-accel-rd-ku115:4ddr-xpr:3.2` becomes
/// `xilinx_xil-accel-rd-ku115_4ddr-xpr`.
pub fn versionless_device_name(device_name: &str) -> String {
    let mut out = String::with_capacity(device_name.len());
    let mut colons = 0;
    for c in device_name.chars() {
        if c == ':' {
            colons += 1;
            if colons == 3 {
                break;
            }
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}

/// Locates `<kernel>.<target>.<device>.xclbin` and its fallbacks.
#[derive(Debug, Clone)]
pub struct BinaryLocator {
    target: TargetMode,
    search_dirs: Vec<PathBuf>,
}

impl BinaryLocator {
    /// Create a locator for `target` with the default search directories.
    pub fn new(target: TargetMode) -> Self {
        let bindir = std::env::var_os(XCL_BINDIR).map(PathBuf::from);
        let search_dirs = bindir
            .into_iter()
            .chain(DEFAULT_SEARCH_DIRS.iter().map(PathBuf::from))
            .collect();
        Self {
            target,
            search_dirs,
        }
    }

    /// Create a locator from the runtime environment.
    pub fn from_env() -> Self {
        Self::new(TargetMode::from_env())
    }

    /// Replace the search directories.
    pub fn with_search_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Build target the locator looks for.
    pub fn target(&self) -> &TargetMode {
        &self.target
    }

    /// Directories searched, in order.
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Candidate paths inside `dir`, in priority order.
    pub fn candidates(&self, dir: &Path, device_name: &str, kernel_name: &str) -> Vec<PathBuf> {
        let mode = self.target.as_str();
        vec![
            dir.join(format!(
                "{kernel_name}.{mode}.{}.xclbin",
                sanitize_device_name(device_name)
            )),
            dir.join(format!(
                "{kernel_name}.{mode}.{}.xclbin",
                versionless_device_name(device_name)
            )),
            dir.join(GUI_CONTAINER_NAME),
            dir.join(format!("{kernel_name}.xclbin")),
        ]
    }

    /// Resolve the binary for `kernel_name` on `device_name`.
    ///
    /// When nothing matches, the preferred path (first pattern in the first
    /// directory) is returned so that loading it reports a useful name.
    pub fn find(&self, device_name: &str, kernel_name: &str) -> Result<PathBuf> {
        debug!("searching {} xclbin for {} ({})", kernel_name, device_name, self.target);

        let mut found: Option<(PathBuf, PathBuf)> = None;
        for dir in self.search_dirs.iter().filter(|d| d.is_dir()) {
            for candidate in self.candidates(dir, device_name, kernel_name) {
                if !candidate.is_file() {
                    continue;
                }
                let canonical = candidate
                    .canonicalize()
                    .map_err(|e| HostError::io(&candidate, e))?;
                debug!("xclbin candidate: {}", candidate.display());

                match &found {
                    Some((first, first_canonical)) if *first_canonical != canonical => {
                        return Err(HostError::AmbiguousBinary {
                            first: first.clone(),
                            second: candidate,
                        });
                    }
                    Some(_) => {}
                    None => found = Some((candidate, canonical)),
                }
            }
        }

        match found {
            Some((path, _)) => {
                info!("Using xclbin {}", path.display());
                Ok(path)
            }
            None => {
                let first_dir = self
                    .search_dirs
                    .first()
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from("."));
                let preferred = self
                    .candidates(&first_dir, device_name, kernel_name)
                    .swap_remove(0);
                debug!("no xclbin matched, preferring {}", preferred.display());
                Ok(preferred)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE: &str = "xilinx:xil-accel-rd-ku115:4ddr-xpr:3.2";

    #[test]
    fn test_device_name_fixups() {
        assert_eq!(
            sanitize_device_name(DEVICE),
            "xilinx_xil-accel-rd-ku115_4ddr-xpr_3_2"
        );
        assert_eq!(
            versionless_device_name(DEVICE),
            "xilinx_xil-accel-rd-ku115_4ddr-xpr"
        );
        assert_eq!(versionless_device_name("xilinx_u250_xdma_201830_2"), "xilinx_u250_xdma_201830_2");
    }

    #[test]
    fn test_candidate_order() {
        let locator = BinaryLocator::new(TargetMode::SoftwareEmulation);
        let names: Vec<String> = locator
            .candidates(Path::new("xclbin"), DEVICE, "adder")
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "xclbin/adder.sw_emu.xilinx_xil-accel-rd-ku115_4ddr-xpr_3_2.xclbin",
                "xclbin/adder.sw_emu.xilinx_xil-accel-rd-ku115_4ddr-xpr.xclbin",
                "xclbin/binary_container_1.xclbin",
                "xclbin/adder.xclbin",
            ]
        );
    }

    #[test]
    fn test_no_match_returns_preferred_path() {
        let locator = BinaryLocator::new(TargetMode::Hardware)
            .with_search_dirs(["does-not-exist-a", "does-not-exist-b"]);
        let path = locator.find(DEVICE, "adder").unwrap();
        assert_eq!(
            path,
            PathBuf::from("does-not-exist-a/adder.hw.xilinx_xil-accel-rd-ku115_4ddr-xpr_3_2.xclbin")
        );
    }
}
