//! Comparison of the device result against the CPU reference.

use crate::core::error::{HostError, Result};
use crate::core::types::Element;
use serde::{Deserialize, Serialize};
use std::fmt;

/// First element where the device disagrees with the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Element index
    pub index: usize,
    /// CPU reference value
    pub cpu: Element,
    /// Value the device produced
    pub device: Element,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "i = {} CPU result = {} Device result = {}",
            self.index, self.cpu, self.device
        )
    }
}

/// Outcome of the self-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Verification {
    /// Every element matched.
    Passed,
    /// Stopped at the first mismatch.
    Failed(Mismatch),
}

impl Verification {
    /// Whether every element matched.
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// The mismatch, when the check failed.
    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            Self::Passed => None,
            Self::Failed(m) => Some(m),
        }
    }
}

/// Compare `hw` with `sw` element by element, stopping at the first mismatch.
pub fn verify(hw: &[Element], sw: &[Element]) -> Result<Verification> {
    if hw.len() != sw.len() {
        return Err(HostError::length_mismatch(sw.len(), hw.len()));
    }
    Ok(hw
        .iter()
        .zip(sw)
        .position(|(h, s)| h != s)
        .map_or(Verification::Passed, |index| {
            Verification::Failed(Mismatch {
                index,
                cpu: sw[index],
                device: hw[index],
            })
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_buffers_pass() {
        let v = verify(&[1, 2, 3], &[1, 2, 3]).unwrap();
        assert!(v.passed());
        assert!(v.mismatch().is_none());
    }

    #[test]
    fn test_reports_first_mismatch_only() {
        let v = verify(&[1, 9, 8], &[1, 2, 3]).unwrap();
        assert_eq!(
            v,
            Verification::Failed(Mismatch {
                index: 1,
                cpu: 2,
                device: 9
            })
        );
        assert_eq!(
            v.mismatch().unwrap().to_string(),
            "i = 1 CPU result = 2 Device result = 9"
        );
    }

    #[test]
    fn test_untouched_output_fails_at_zero() {
        let sw: Vec<i32> = (10..20).collect();
        let hw = vec![0; 10];
        let v = verify(&hw, &sw).unwrap();
        assert_eq!(v.mismatch().map(|m| m.index), Some(0));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(verify(&[1], &[1, 2]).is_err());
    }
}
