//! Build target resolution from the Xilinx runtime environment.
//!
//! The binary name encodes the target it was built for (`sw_emu`, `hw_emu`,
//! `hw`), so the host must agree with the runtime on which one is active.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable selecting emulation.
pub const XCL_EMULATION_MODE: &str = "XCL_EMULATION_MODE";

/// Environment variable naming the target when emulation is `true`.
pub const XCL_TARGET: &str = "XCL_TARGET";

/// Environment variable naming an extra binary directory.
pub const XCL_BINDIR: &str = "XCL_BINDIR";

/// Target a kernel binary was built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    /// Real hardware (`hw`)
    Hardware,
    /// Software emulation (`sw_emu`)
    SoftwareEmulation,
    /// Hardware emulation (`hw_emu`)
    HardwareEmulation,
    /// Any other target string, used verbatim
    Other(String),
}

impl TargetMode {
    /// Parse a target string as it appears in binary file names.
    pub fn parse(s: &str) -> Self {
        match s {
            "hw" => Self::Hardware,
            "sw_emu" => Self::SoftwareEmulation,
            "hw_emu" => Self::HardwareEmulation,
            other => Self::Other(other.to_string()),
        }
    }

    /// Name used in binary file names.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hardware => "hw",
            Self::SoftwareEmulation => "sw_emu",
            Self::HardwareEmulation => "hw_emu",
            Self::Other(s) => s,
        }
    }

    /// Whether this target runs without real hardware.
    pub fn is_emulation(&self) -> bool {
        matches!(self, Self::SoftwareEmulation | Self::HardwareEmulation)
    }

    /// Resolve the target from the two environment values.
    ///
    /// Unset mode means hardware. A mode of `true` defers to `xcl_target`,
    /// falling back to software emulation. Any other mode is the target.
    pub fn resolve(xcl_mode: Option<&str>, xcl_target: Option<&str>) -> Self {
        match xcl_mode {
            None => Self::Hardware,
            Some("true") => xcl_target.map_or(Self::SoftwareEmulation, Self::parse),
            Some(mode) => Self::parse(mode),
        }
    }

    /// Resolve the target from the process environment.
    pub fn from_env() -> Self {
        let mode = std::env::var(XCL_EMULATION_MODE).ok();
        let target = std::env::var(XCL_TARGET).ok();
        Self::resolve(mode.as_deref(), target.as_deref())
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_mode_is_hardware() {
        assert_eq!(TargetMode::resolve(None, None), TargetMode::Hardware);
        assert_eq!(TargetMode::resolve(None, Some("hw_emu")), TargetMode::Hardware);
    }

    #[test]
    fn test_true_mode_defers_to_target() {
        assert_eq!(
            TargetMode::resolve(Some("true"), None),
            TargetMode::SoftwareEmulation
        );
        assert_eq!(
            TargetMode::resolve(Some("true"), Some("hw_emu")),
            TargetMode::HardwareEmulation
        );
    }

    #[test]
    fn test_explicit_mode_used_verbatim() {
        assert_eq!(
            TargetMode::resolve(Some("hw_emu"), Some("sw_emu")),
            TargetMode::HardwareEmulation
        );
        let custom = TargetMode::resolve(Some("custom_target"), None);
        assert_eq!(custom.as_str(), "custom_target");
        assert!(!custom.is_emulation());
    }
}
